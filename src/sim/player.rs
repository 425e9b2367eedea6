//! The player entity (T-Rex)
//!
//! Jump and duck physics plus the waiting/running/jumping/ducking/crashed
//! state machine. Jump integration deliberately rounds each per-tick y
//! increment to whole units, keeping the sprite off sub-pixel boundaries.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionBox;
use crate::consts::{BOTTOM_PAD, GAME_HEIGHT, MS_PER_FRAME};

/// Sprite dimensions
pub const TREX_WIDTH: f32 = 44.0;
pub const TREX_WIDTH_DUCK: f32 = 59.0;
pub const TREX_HEIGHT: f32 = 47.0;

/// Fixed horizontal position
pub const START_X_POS: f32 = 50.0;
/// Ground line for the player's top-left corner
pub const GROUND_Y_POS: f32 = GAME_HEIGHT - TREX_HEIGHT - BOTTOM_PAD;

/// Downward acceleration per reference frame
pub const GRAVITY: f32 = 0.6;
/// Base upward launch velocity (negative y is up); currentSpeed/10 is
/// subtracted on top so faster runs jump slightly higher
pub const INITIAL_JUMP_VELOCITY: f32 = -10.0;
/// Velocity the jump is clamped to on early release (starts the fall)
pub const DROP_VELOCITY: f32 = -5.0;
/// Forced velocity when ducking mid-air
pub const SPEED_DROP_VELOCITY: f32 = 1.0;
/// Descent multiplier while speed-dropping
pub const SPEED_DROP_COEFFICIENT: f32 = 3.0;
/// Minimum jump rise before an early release takes effect
pub const MIN_JUMP_HEIGHT: f32 = 30.0;
/// Absolute ceiling; the jump is force-released above this
pub const MAX_JUMP_HEIGHT: f32 = 30.0;

/// Longest randomized delay between idle blinks (ms)
pub const BLINK_TIMING: f32 = 7000.0;
/// How long the closed-eye frame is held (ms)
pub const BLINK_DURATION: f32 = 100.0;
/// Idle blinks stop after this many
pub const MAX_BLINK_COUNT: u32 = 3;

/// Running gait frame time (ms)
pub const RUNNING_FRAME_MS: f32 = 1000.0 / 12.0;
/// Ducking gait frame time (ms)
pub const DUCKING_FRAME_MS: f32 = 1000.0 / 8.0;

/// Collision sub-boxes for the running/jumping pose
pub const COLLISION_BOXES_RUNNING: &[CollisionBox] = &[
    CollisionBox::new(22.0, 0.0, 17.0, 16.0),
    CollisionBox::new(1.0, 18.0, 30.0, 9.0),
    CollisionBox::new(10.0, 35.0, 14.0, 8.0),
    CollisionBox::new(1.0, 24.0, 29.0, 5.0),
    CollisionBox::new(5.0, 30.0, 21.0, 4.0),
    CollisionBox::new(9.0, 34.0, 15.0, 4.0),
];

/// Collision sub-box for the ducking pose
pub const COLLISION_BOXES_DUCKING: &[CollisionBox] = &[CollisionBox::new(1.0, 18.0, 55.0, 25.0)];

/// Player animation/physics state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrexStatus {
    /// Pre-round idle, blinking on a randomized delay
    Waiting,
    Running,
    Jumping,
    Ducking,
    /// Terminal until the round is reset
    Crashed,
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trex {
    /// Top-left corner; x is fixed, y varies while airborne
    pub pos: Vec2,
    pub status: TrexStatus,
    /// Signed jump velocity (negative = rising)
    pub jump_velocity: f32,
    pub jumping: bool,
    pub ducking: bool,
    /// Duck requested mid-air; forces a fast descent
    pub speed_drop: bool,
    /// Set once the jump has risen past the minimum-height threshold
    pub reached_min_height: bool,
    /// Duck held while airborne, to be applied on landing
    pub duck_queued: bool,
    /// Early release received before the minimum height; applied once the
    /// threshold is crossed so a tap always yields the minimum hop
    release_queued: bool,
    /// Completed jumps this round
    pub jump_count: u32,
    /// Current animation frame within the active gait
    pub frame: usize,
    frame_timer: f32,
    blink_timer: f32,
    blink_delay: f32,
    pub blink_count: u32,
}

impl Default for Trex {
    fn default() -> Self {
        Self::new()
    }
}

impl Trex {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(START_X_POS, GROUND_Y_POS),
            status: TrexStatus::Waiting,
            jump_velocity: 0.0,
            jumping: false,
            ducking: false,
            speed_drop: false,
            reached_min_height: false,
            duck_queued: false,
            release_queued: false,
            jump_count: 0,
            frame: 0,
            frame_timer: 0.0,
            blink_timer: 0.0,
            blink_delay: 0.0,
            blink_count: 0,
        }
    }

    /// Current sprite width (depends only on pose)
    pub fn width(&self) -> f32 {
        if self.ducking {
            TREX_WIDTH_DUCK
        } else {
            TREX_WIDTH
        }
    }

    /// Current sprite height
    pub fn height(&self) -> f32 {
        TREX_HEIGHT
    }

    /// Collision sub-boxes for the current pose
    pub fn collision_boxes(&self) -> &'static [CollisionBox] {
        if self.ducking {
            COLLISION_BOXES_DUCKING
        } else {
            COLLISION_BOXES_RUNNING
        }
    }

    /// Minimum-height threshold in world y (smaller y is higher)
    fn min_jump_y(&self) -> f32 {
        GROUND_Y_POS - MIN_JUMP_HEIGHT
    }

    /// Begin a jump; no-op while already airborne
    pub fn start_jump(&mut self, speed: f32) {
        if self.jumping {
            return;
        }
        self.set_status(TrexStatus::Jumping);
        self.jump_velocity = INITIAL_JUMP_VELOCITY - speed / 10.0;
        self.jumping = true;
        self.reached_min_height = false;
        self.release_queued = false;
        self.speed_drop = false;
    }

    /// Release the jump early
    ///
    /// Takes effect only after the minimum height is reached; earlier
    /// releases are queued and applied at the threshold.
    pub fn end_jump(&mut self) {
        if !self.jumping {
            return;
        }
        if self.reached_min_height {
            if self.jump_velocity < DROP_VELOCITY {
                self.jump_velocity = DROP_VELOCITY;
            }
        } else {
            self.release_queued = true;
        }
    }

    /// Duck requested while airborne: force a fast descent and queue the
    /// duck pose for landing
    pub fn set_speed_drop(&mut self) {
        if !self.jumping {
            return;
        }
        self.speed_drop = true;
        self.jump_velocity = SPEED_DROP_VELOCITY;
        self.duck_queued = true;
    }

    /// Duck toggle while grounded
    pub fn set_duck(&mut self, is_ducking: bool) {
        if is_ducking && !self.jumping && self.status != TrexStatus::Ducking {
            self.set_status(TrexStatus::Ducking);
            self.ducking = true;
        } else if !is_ducking && self.status == TrexStatus::Ducking {
            self.set_status(TrexStatus::Running);
            self.ducking = false;
        }
    }

    /// Duck input released (both grounded and airborne cases)
    pub fn clear_duck(&mut self) {
        self.duck_queued = false;
        if self.jumping {
            self.speed_drop = false;
        } else if self.status == TrexStatus::Ducking {
            self.set_duck(false);
        }
    }

    /// Externally triggered crash pose; terminal until `reset`
    pub fn crash(&mut self) {
        self.set_status(TrexStatus::Crashed);
        self.jumping = false;
        self.ducking = false;
        self.speed_drop = false;
    }

    /// Back to the initial running pose for a new round
    pub fn reset(&mut self) {
        self.pos.y = GROUND_Y_POS;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.ducking = false;
        self.speed_drop = false;
        self.reached_min_height = false;
        self.duck_queued = false;
        self.release_queued = false;
        self.jump_count = 0;
        self.set_status(TrexStatus::Running);
    }

    fn set_status(&mut self, status: TrexStatus) {
        if self.status != status {
            self.status = status;
            self.frame = 0;
            self.frame_timer = 0.0;
        }
    }

    /// Per-tick update while the round is live
    pub fn update(&mut self, delta_ms: f32) {
        if self.jumping {
            self.update_jump(delta_ms);
        }
        self.update_animation(delta_ms);
    }

    fn update_jump(&mut self, delta_ms: f32) {
        let frames_elapsed = delta_ms / MS_PER_FRAME;

        // Integrate position, then velocity; the increment is rounded to
        // whole units per tick
        if self.speed_drop {
            self.pos.y += (self.jump_velocity * SPEED_DROP_COEFFICIENT * frames_elapsed).round();
        } else {
            self.pos.y += (self.jump_velocity * frames_elapsed).round();
        }
        self.jump_velocity += GRAVITY * frames_elapsed;

        if self.pos.y < self.min_jump_y() || self.speed_drop {
            if !self.reached_min_height {
                self.reached_min_height = true;
                if self.release_queued {
                    self.release_queued = false;
                    self.end_jump();
                }
            }
        }

        // Hard ceiling
        if self.pos.y < MAX_JUMP_HEIGHT {
            self.end_jump();
        }

        if self.pos.y >= GROUND_Y_POS {
            self.land();
        }
    }

    fn land(&mut self) {
        self.pos.y = GROUND_Y_POS;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.speed_drop = false;
        self.reached_min_height = false;
        self.release_queued = false;
        self.jump_count += 1;

        self.set_status(TrexStatus::Running);
        if self.duck_queued {
            self.set_duck(true);
        }
    }

    fn update_animation(&mut self, delta_ms: f32) {
        let frame_ms = match self.status {
            TrexStatus::Running => RUNNING_FRAME_MS,
            TrexStatus::Ducking => DUCKING_FRAME_MS,
            // Jumping and crashed are static poses
            _ => return,
        };
        self.frame_timer += delta_ms;
        if self.frame_timer >= frame_ms {
            self.frame_timer -= frame_ms;
            self.frame = (self.frame + 1) % 2;
        }
    }

    /// Idle blink animation while the game is in the waiting state
    ///
    /// Frame 1 is the closed-eye frame, held for 100ms, up to three times
    /// on a randomized 0-7000ms delay.
    pub fn update_waiting(&mut self, delta_ms: f32, rng: &mut Pcg32) {
        if self.status != TrexStatus::Waiting || self.blink_count >= MAX_BLINK_COUNT {
            return;
        }
        if self.blink_delay == 0.0 {
            self.blink_delay = rng.random_range(0.0..BLINK_TIMING).ceil();
        }

        self.blink_timer += delta_ms;
        if self.frame == 1 {
            if self.blink_timer >= BLINK_DURATION {
                self.frame = 0;
                self.blink_timer = 0.0;
                self.blink_count += 1;
                self.blink_delay = rng.random_range(0.0..BLINK_TIMING).ceil();
            }
        } else if self.blink_timer >= self.blink_delay {
            self.frame = 1;
            self.blink_timer = 0.0;
        }
    }
}
