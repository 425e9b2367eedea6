//! Rex Runner - a deterministic side-scrolling runner simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `highscores`: Persisted high score collaborator
//!
//! Rendering, input-device handling and audio playback are host concerns;
//! the host drives the simulation with `Runner::update` and reads back
//! render state through the public fields and query methods.

pub mod highscores;
pub mod sim;

pub use highscores::HighScoreStore;
pub use sim::{GameEvent, GameState, Runner};

/// Game configuration constants
///
/// These values are load-bearing for gameplay feel; change them and the
/// jump arcs, spawn rhythm and difficulty ramp all shift together.
pub mod consts {
    /// Reference frame rate the physics constants were tuned against
    pub const FPS: f32 = 60.0;
    /// Milliseconds per reference frame
    pub const MS_PER_FRAME: f32 = 1000.0 / FPS;

    /// Logical world dimensions
    pub const GAME_WIDTH: f32 = 600.0;
    pub const GAME_HEIGHT: f32 = 150.0;
    /// Gap between the ground line and the bottom of the world
    pub const BOTTOM_PAD: f32 = 10.0;

    /// Horizontal speed range (world units per reference frame)
    pub const SPEED: f32 = 6.0;
    pub const MAX_SPEED: f32 = 13.0;
    /// Speed gained per simulation tick while playing
    pub const ACCELERATION: f32 = 0.001;

    /// Obstacle-free warm-up period after a round starts (ms)
    pub const CLEAR_TIME: f32 = 3000.0;
    /// Scales each obstacle type's minimum gap into the spawn-gap formula
    pub const GAP_COEFFICIENT: f32 = 0.6;
    /// Upper gap bound as a multiple of the lower bound
    pub const MAX_GAP_COEFFICIENT: f32 = 1.5;
    /// Largest obstacle group (adjacent identical units)
    pub const MAX_OBSTACLE_LENGTH: u32 = 3;
    /// Consecutive spawns of one type before it is forced to vary
    pub const MAX_OBSTACLE_DUPLICATION: usize = 2;

    /// Cloud population limits
    pub const MAX_CLOUDS: usize = 6;
    /// Chance per eligible tick that a new cloud spawns
    pub const CLOUD_FREQUENCY: f32 = 0.5;
    /// Background cloud parallax factor
    pub const BG_CLOUD_SPEED: f32 = 0.2;

    /// Score points per distance unit
    pub const SCORE_COEFFICIENT: f32 = 0.025;
    /// Score interval that triggers the achievement flash
    pub const ACHIEVEMENT_DISTANCE: u32 = 100;
    /// Half-period of one flash blink (ms)
    pub const FLASH_DURATION: f32 = 250.0;
    /// Number of blinks per achievement
    pub const FLASH_ITERATIONS: u32 = 3;

    /// Score interval that toggles night mode
    pub const INVERT_DISTANCE: u32 = 700;
    /// Night mode auto-reverts after this long (ms)
    pub const INVERT_FADE_DURATION: f32 = 12000.0;

    /// Restart is ignored until this long after a crash (ms)
    pub const GAMEOVER_CLEAR_TIME: f32 = 750.0;
}
