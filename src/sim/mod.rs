//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick-driven only, parameterized by elapsed milliseconds
//! - Seeded RNG only, owned by the game instance
//! - Stable entity iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod engine;
pub mod horizon;
pub mod night;
pub mod obstacle;
pub mod player;

pub use collision::{CollisionBox, check_collision};
pub use engine::{GameEvent, GameState, Runner};
pub use horizon::{Cloud, GroundScroll, Horizon};
pub use night::{NightMode, Star};
pub use obstacle::{Obstacle, ObstacleKind, ObstacleTemplate};
pub use player::{Trex, TrexStatus};
