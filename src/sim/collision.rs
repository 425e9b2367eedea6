//! Two-phase AABB collision detection between the player and an obstacle
//!
//! Phase one shrinks both outer bounding boxes by one unit on every side
//! (a fairness margin) and rejects on non-overlap. Phase two tests the
//! pose-specific player sub-boxes against the obstacle's template boxes,
//! replicated once per group unit.

use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::player::Trex;

/// An axis-aligned collision rectangle, relative to a sprite origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CollisionBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Translate this box by an offset (used to move sprite-relative boxes
    /// into world space)
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Exclusive half-open AABB overlap test (touching edges do not collide)
    pub fn overlaps(&self, other: &CollisionBox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Check whether the player currently intersects the given obstacle
///
/// Applied once per tick against the nearest live obstacle only.
pub fn check_collision(trex: &Trex, obstacle: &Obstacle) -> bool {
    // Coarse boxes, shrunk by 1 unit on each side
    let trex_box = CollisionBox::new(
        trex.pos.x + 1.0,
        trex.pos.y + 1.0,
        trex.width() - 2.0,
        trex.height() - 2.0,
    );
    let template = obstacle.template();
    let obstacle_box = CollisionBox::new(
        obstacle.pos.x + 1.0,
        obstacle.pos.y + 1.0,
        obstacle.width() - 2.0,
        template.height - 2.0,
    );

    if !trex_box.overlaps(&obstacle_box) {
        return false;
    }

    // Fine-grained pass: every player sub-box against every obstacle
    // sub-box, the latter repeated per group unit
    let unit_width = template.width;
    for t_box in trex.collision_boxes() {
        let t_box = t_box.offset(trex_box.x, trex_box.y);
        for unit in 0..obstacle.size {
            let unit_dx = obstacle_box.x + unit as f32 * unit_width;
            for o_box in template.collision_boxes {
                if t_box.overlaps(&o_box.offset(unit_dx, obstacle_box.y)) {
                    return true;
                }
            }
        }
    }

    false
}
