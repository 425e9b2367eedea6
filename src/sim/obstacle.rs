//! Obstacle entities and their static type tables
//!
//! Obstacle "type" is a closed enumeration over three variants with fixed
//! geometry; the only polymorphism is a config-table lookup, so there is
//! no trait object anywhere in the spawn path.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionBox;
use crate::consts::{FPS, GAME_WIDTH, GAP_COEFFICIENT, MAX_GAP_COEFFICIENT, MAX_OBSTACLE_LENGTH};

/// Pterodactyl wing flap frame time (ms)
const PTERODACTYL_FRAME_MS: f32 = 1000.0 / 6.0;
/// Pterodactyl speed offset magnitude relative to the ground scroll
const PTERODACTYL_SPEED_OFFSET: f32 = 0.8;

/// The closed set of hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    CactusSmall,
    CactusLarge,
    Pterodactyl,
}

/// All spawnable kinds, in table order
pub const OBSTACLE_KINDS: [ObstacleKind; 3] = [
    ObstacleKind::CactusSmall,
    ObstacleKind::CactusLarge,
    ObstacleKind::Pterodactyl,
];

/// Static per-type geometry and spawn rules
#[derive(Debug)]
pub struct ObstacleTemplate {
    /// Width of a single group unit
    pub width: f32,
    pub height: f32,
    /// Candidate vertical placements (pterodactyl has three altitudes)
    pub y_positions: &'static [f32],
    /// Speed below which groups of >1 unit never form
    pub multiple_speed: f32,
    /// Base horizontal gap to the next obstacle
    pub min_gap: f32,
    /// Speed gate; the type is ineligible below this
    pub min_speed: f32,
    /// Collision sub-boxes for one group unit, relative to the sprite origin
    pub collision_boxes: &'static [CollisionBox],
    /// Animation frame count (1 = static sprite)
    pub num_frames: usize,
    /// Whether instances drift relative to the ground scroll
    pub has_speed_offset: bool,
}

const CACTUS_SMALL: ObstacleTemplate = ObstacleTemplate {
    width: 17.0,
    height: 35.0,
    y_positions: &[105.0],
    multiple_speed: 4.0,
    min_gap: 120.0,
    min_speed: 0.0,
    collision_boxes: &[
        CollisionBox::new(0.0, 7.0, 5.0, 27.0),
        CollisionBox::new(4.0, 0.0, 6.0, 34.0),
        CollisionBox::new(10.0, 4.0, 7.0, 14.0),
    ],
    num_frames: 1,
    has_speed_offset: false,
};

const CACTUS_LARGE: ObstacleTemplate = ObstacleTemplate {
    width: 25.0,
    height: 50.0,
    y_positions: &[90.0],
    multiple_speed: 7.0,
    min_gap: 120.0,
    min_speed: 0.0,
    collision_boxes: &[
        CollisionBox::new(0.0, 12.0, 7.0, 38.0),
        CollisionBox::new(8.0, 0.0, 7.0, 49.0),
        CollisionBox::new(13.0, 10.0, 10.0, 38.0),
    ],
    num_frames: 1,
    has_speed_offset: false,
};

const PTERODACTYL: ObstacleTemplate = ObstacleTemplate {
    width: 46.0,
    height: 40.0,
    y_positions: &[100.0, 75.0, 50.0],
    // Effectively never grouped
    multiple_speed: 999.0,
    min_gap: 150.0,
    min_speed: 8.5,
    collision_boxes: &[
        CollisionBox::new(15.0, 15.0, 16.0, 5.0),
        CollisionBox::new(18.0, 21.0, 24.0, 6.0),
        CollisionBox::new(2.0, 14.0, 4.0, 3.0),
        CollisionBox::new(6.0, 10.0, 4.0, 7.0),
        CollisionBox::new(10.0, 8.0, 6.0, 9.0),
    ],
    num_frames: 2,
    has_speed_offset: true,
};

impl ObstacleKind {
    pub fn template(self) -> &'static ObstacleTemplate {
        match self {
            ObstacleKind::CactusSmall => &CACTUS_SMALL,
            ObstacleKind::CactusLarge => &CACTUS_LARGE,
            ObstacleKind::Pterodactyl => &PTERODACTYL,
        }
    }
}

/// A single live hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Top-left corner; x scrolls left, y is fixed after spawn
    pub pos: Vec2,
    /// Group size (adjacent identical units, cacti only)
    pub size: u32,
    /// Distance to keep clear before the next obstacle may spawn
    pub gap: f32,
    /// Per-instance drift relative to the ground scroll (pterodactyl)
    pub speed_offset: f32,
    /// Current animation frame
    pub frame: usize,
    frame_timer: f32,
    /// Flagged once fully off-screen left; purged by the horizon
    pub removed: bool,
    /// Set once this obstacle has triggered its successor's spawn
    pub following_spawned: bool,
}

impl Obstacle {
    /// Spawn a new obstacle at the right edge of the world
    pub fn new(kind: ObstacleKind, speed: f32, rng: &mut Pcg32) -> Self {
        let template = kind.template();

        // Group size rolls 1..=3 but collapses to 1 below the type's
        // multiple-speed threshold
        let mut size = rng.random_range(1..=MAX_OBSTACLE_LENGTH);
        if size > 1 && template.multiple_speed > speed {
            size = 1;
        }

        let y = template.y_positions[rng.random_range(0..template.y_positions.len())];

        let speed_offset = if template.has_speed_offset {
            if rng.random_bool(0.5) {
                PTERODACTYL_SPEED_OFFSET
            } else {
                -PTERODACTYL_SPEED_OFFSET
            }
        } else {
            0.0
        };

        let mut obstacle = Self {
            kind,
            pos: Vec2::new(GAME_WIDTH, y),
            size,
            gap: 0.0,
            speed_offset,
            frame: 0,
            frame_timer: 0.0,
            removed: false,
            following_spawned: false,
        };
        obstacle.gap = obstacle.roll_gap(speed, rng);
        obstacle
    }

    /// Total sprite width including group units
    pub fn width(&self) -> f32 {
        self.template().width * self.size as f32
    }

    pub fn template(&self) -> &'static ObstacleTemplate {
        self.kind.template()
    }

    /// Sample the gap to the next obstacle: bounded below by
    /// `round(width * speed + minGap * gapCoefficient)` and above by 1.5x that
    fn roll_gap(&self, speed: f32, rng: &mut Pcg32) -> f32 {
        let min_gap = (self.width() * speed + self.template().min_gap * GAP_COEFFICIENT).round();
        let max_gap = (min_gap * MAX_GAP_COEFFICIENT).round();
        rng.random_range(min_gap..=max_gap).round()
    }

    /// Scroll left and advance the flap animation
    pub fn update(&mut self, delta_ms: f32, speed: f32) {
        if self.removed {
            return;
        }

        // Increment is floored to whole units per tick (anti-jitter tuning)
        let speed = speed + self.speed_offset;
        self.pos.x -= (speed * (FPS / 1000.0) * delta_ms).floor();

        let template = self.template();
        if template.num_frames > 1 {
            self.frame_timer += delta_ms;
            if self.frame_timer >= PTERODACTYL_FRAME_MS {
                self.frame_timer -= PTERODACTYL_FRAME_MS;
                self.frame = (self.frame + 1) % template.num_frames;
            }
        }

        if !self.is_visible() {
            self.removed = true;
        }
    }

    /// Still at least partially on screen
    pub fn is_visible(&self) -> bool {
        self.pos.x + self.width() > 0.0
    }
}
