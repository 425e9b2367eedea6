//! Horizon: ground scroll, cloud cover, and the obstacle population
//!
//! Owns everything that scrolls past the player. Obstacles spawn off the
//! right edge once the previous one has cleared its gap, with a speed
//! eligibility filter and a cap on consecutive duplicates; clouds are
//! cosmetic and spawn on their own probability gate.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::night::NightMode;
use super::obstacle::{OBSTACLE_KINDS, Obstacle, ObstacleKind};
use crate::consts::{
    BG_CLOUD_SPEED, CLOUD_FREQUENCY, FPS, GAME_WIDTH, MAX_CLOUDS, MAX_OBSTACLE_DUPLICATION,
};

/// Cloud sprite width
pub const CLOUD_WIDTH: f32 = 46.0;
/// Sky band for cloud placement (y grows downward)
pub const CLOUD_MAX_SKY_LEVEL: f32 = 30.0;
pub const CLOUD_MIN_SKY_LEVEL: f32 = 71.0;
/// Gap range before the next cloud may spawn
pub const CLOUD_MIN_GAP: f32 = 100.0;
pub const CLOUD_MAX_GAP: f32 = 400.0;

/// Chance that a wrapped ground segment comes back bumpy
const GROUND_BUMP_THRESHOLD: f64 = 0.5;

/// A purely cosmetic background cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    /// How far past the right edge this cloud must scroll before the next
    /// one becomes eligible
    pub gap: f32,
    pub removed: bool,
}

impl Cloud {
    pub fn new(rng: &mut Pcg32) -> Self {
        Self {
            pos: Vec2::new(
                GAME_WIDTH,
                rng.random_range(CLOUD_MAX_SKY_LEVEL..=CLOUD_MIN_SKY_LEVEL).round(),
            ),
            gap: rng.random_range(CLOUD_MIN_GAP..=CLOUD_MAX_GAP).round(),
            removed: false,
        }
    }

    /// Scroll by the precomputed parallax increment (ceiled per tick)
    pub fn update(&mut self, scroll: f32) {
        if self.removed {
            return;
        }
        self.pos.x -= scroll.ceil();
        if !self.is_visible() {
            self.removed = true;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.pos.x + CLOUD_WIDTH > 0.0
    }
}

/// Two wrapping ground segments, each the full world width
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundScroll {
    /// Left edges of the two segments
    pub x: [f32; 2],
    /// Texture variant per segment (bumpy vs flat)
    pub bumpy: [bool; 2],
}

impl GroundScroll {
    pub fn new(rng: &mut Pcg32) -> Self {
        Self {
            x: [0.0, GAME_WIDTH],
            bumpy: [
                rng.random_bool(GROUND_BUMP_THRESHOLD),
                rng.random_bool(GROUND_BUMP_THRESHOLD),
            ],
        }
    }

    /// Scroll left by a floored per-tick increment; when the leading
    /// segment leaves the screen it wraps behind the other and re-rolls
    /// its texture
    pub fn update(&mut self, delta_ms: f32, speed: f32, rng: &mut Pcg32) {
        let increment = (speed * (FPS / 1000.0) * delta_ms).floor();
        let lead = if self.x[0] <= 0.0 { 0 } else { 1 };
        let follow = 1 - lead;

        self.x[lead] -= increment;
        self.x[follow] = self.x[lead] + GAME_WIDTH;

        if self.x[lead] <= -GAME_WIDTH {
            self.x[lead] += GAME_WIDTH * 2.0;
            self.x[follow] = self.x[lead] - GAME_WIDTH;
            self.bumpy[lead] = rng.random_bool(GROUND_BUMP_THRESHOLD);
        }
    }

    pub fn reset(&mut self) {
        self.x = [0.0, GAME_WIDTH];
    }
}

/// The scrolling environment: ground, clouds, obstacles, night overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Horizon {
    pub ground: GroundScroll,
    pub clouds: Vec<Cloud>,
    pub obstacles: Vec<Obstacle>,
    pub night: NightMode,
    /// Most recent spawn types, newest first, for the duplicate cap
    obstacle_history: Vec<ObstacleKind>,
}

impl Horizon {
    pub fn new(rng: &mut Pcg32) -> Self {
        let mut horizon = Self {
            ground: GroundScroll::new(rng),
            clouds: Vec::new(),
            obstacles: Vec::new(),
            night: NightMode::new(rng),
            obstacle_history: Vec::new(),
        };
        horizon.clouds.push(Cloud::new(rng));
        horizon
    }

    /// Per-tick update, in fixed order: ground, night overlay, clouds,
    /// then obstacles (only once the round's clear time has elapsed)
    pub fn update(
        &mut self,
        delta_ms: f32,
        speed: f32,
        update_obstacles: bool,
        show_night: bool,
        rng: &mut Pcg32,
    ) {
        self.ground.update(delta_ms, speed, rng);
        self.night.update(show_night, rng);
        self.update_clouds(delta_ms, speed, rng);
        if update_obstacles {
            self.update_obstacles(delta_ms, speed, rng);
        }
    }

    fn update_clouds(&mut self, delta_ms: f32, speed: f32, rng: &mut Pcg32) {
        let scroll = BG_CLOUD_SPEED / 1000.0 * delta_ms * speed;
        for cloud in &mut self.clouds {
            cloud.update(scroll);
        }

        let spawn = match self.clouds.last() {
            Some(last) => {
                self.clouds.len() < MAX_CLOUDS
                    && GAME_WIDTH - last.pos.x > last.gap
                    && rng.random::<f32>() < CLOUD_FREQUENCY
            }
            None => true,
        };
        if spawn {
            self.clouds.push(Cloud::new(rng));
        }

        self.clouds.retain(|c| !c.removed);
    }

    fn update_obstacles(&mut self, delta_ms: f32, speed: f32, rng: &mut Pcg32) {
        for obstacle in &mut self.obstacles {
            obstacle.update(delta_ms, speed);
        }
        self.obstacles.retain(|o| !o.removed);

        let spawn_next = match self.obstacles.last_mut() {
            Some(last) => {
                let cleared_gap = !last.following_spawned
                    && last.is_visible()
                    && last.pos.x + last.width() + last.gap < GAME_WIDTH;
                if cleared_gap {
                    last.following_spawned = true;
                }
                cleared_gap
            }
            None => true,
        };
        if spawn_next {
            self.add_new_obstacle(speed, rng);
        }
    }

    /// Pick an eligible type (speed-gated, duplicate-capped) and spawn it
    fn add_new_obstacle(&mut self, speed: f32, rng: &mut Pcg32) {
        let eligible: Vec<ObstacleKind> = OBSTACLE_KINDS
            .iter()
            .copied()
            .filter(|kind| kind.template().min_speed <= speed)
            .collect();

        // Ban a type that has already spawned MAX_OBSTACLE_DUPLICATION
        // times in a row, provided an alternative exists
        let banned = self.duplicate_kind();
        let pool: Vec<ObstacleKind> = match banned {
            Some(kind) if eligible.iter().any(|k| *k != kind) => {
                eligible.into_iter().filter(|k| *k != kind).collect()
            }
            _ => eligible,
        };

        let kind = pool[rng.random_range(0..pool.len())];
        self.obstacles.push(Obstacle::new(kind, speed, rng));

        self.obstacle_history.insert(0, kind);
        self.obstacle_history.truncate(MAX_OBSTACLE_DUPLICATION);
    }

    /// The type that would exceed the consecutive-duplicate cap, if any
    fn duplicate_kind(&self) -> Option<ObstacleKind> {
        if self.obstacle_history.len() < MAX_OBSTACLE_DUPLICATION {
            return None;
        }
        let first = self.obstacle_history[0];
        self.obstacle_history
            .iter()
            .all(|k| *k == first)
            .then_some(first)
    }

    /// Clear per-round state for a restart
    pub fn reset(&mut self, rng: &mut Pcg32) {
        self.obstacles.clear();
        self.obstacle_history.clear();
        self.ground.reset();
        self.night.reset(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MS_PER_FRAME;
    use rand::SeedableRng;

    /// Drive the spawn policy directly and record the chosen types
    fn run_spawns(speed: f32, seed: u64, spawns: usize) -> Vec<ObstacleKind> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut horizon = Horizon::new(&mut rng);
        let mut kinds = Vec::with_capacity(spawns);
        for _ in 0..spawns {
            horizon.add_new_obstacle(speed, &mut rng);
            kinds.push(horizon.obstacles.last().unwrap().kind);
            // The live list is irrelevant here; the history drives the cap
            horizon.obstacles.clear();
        }
        kinds
    }

    #[test]
    fn test_first_update_spawns_an_obstacle() {
        let mut rng = Pcg32::seed_from_u64(20);
        let mut horizon = Horizon::new(&mut rng);
        assert!(horizon.obstacles.is_empty());
        horizon.update(MS_PER_FRAME, 6.0, true, false, &mut rng);
        assert_eq!(horizon.obstacles.len(), 1);
    }

    #[test]
    fn test_no_spawn_while_obstacles_disabled() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut horizon = Horizon::new(&mut rng);
        for _ in 0..500 {
            horizon.update(MS_PER_FRAME, 6.0, false, false, &mut rng);
        }
        assert!(horizon.obstacles.is_empty());
    }

    #[test]
    fn test_next_obstacle_waits_for_gap() {
        let mut rng = Pcg32::seed_from_u64(22);
        let mut horizon = Horizon::new(&mut rng);
        horizon.update(MS_PER_FRAME, 6.0, true, false, &mut rng);

        let first_gap = horizon.obstacles[0].gap;
        let first_width = horizon.obstacles[0].width();
        while horizon.obstacles.len() == 1 {
            horizon.update(MS_PER_FRAME, 6.0, true, false, &mut rng);
        }
        // The trailing obstacle had to clear width + gap from the right edge
        let x = horizon.obstacles[0].pos.x;
        assert!(x + first_width + first_gap < GAME_WIDTH);
    }

    #[test]
    fn test_pterodactyl_gated_behind_min_speed() {
        for seed in 0..5 {
            let kinds = run_spawns(8.0, seed, 40);
            assert!(kinds.iter().all(|k| *k != ObstacleKind::Pterodactyl));
        }
    }

    #[test]
    fn test_duplicate_cap_over_long_run() {
        for seed in 0..5 {
            let kinds = run_spawns(9.0, seed, 80);
            let mut consecutive = 1;
            for pair in kinds.windows(2) {
                if pair[0] == pair[1] {
                    consecutive += 1;
                } else {
                    consecutive = 1;
                }
                assert!(
                    consecutive <= MAX_OBSTACLE_DUPLICATION,
                    "type {:?} repeated {} times (seed {})",
                    pair[0],
                    consecutive,
                    seed
                );
            }
        }
    }

    #[test]
    fn test_cloud_population_capped() {
        let mut rng = Pcg32::seed_from_u64(23);
        let mut horizon = Horizon::new(&mut rng);
        for _ in 0..5000 {
            horizon.update(MS_PER_FRAME, 6.0, false, false, &mut rng);
            assert!(horizon.clouds.len() <= MAX_CLOUDS);
        }
        // Clouds keep cycling rather than dying out
        assert!(!horizon.clouds.is_empty());
    }

    #[test]
    fn test_ground_segments_stay_adjacent() {
        let mut rng = Pcg32::seed_from_u64(24);
        let mut horizon = Horizon::new(&mut rng);
        for _ in 0..2000 {
            horizon.update(MS_PER_FRAME, 9.0, false, false, &mut rng);
            let [a, b] = horizon.ground.x;
            assert!((a - b).abs() == GAME_WIDTH);
            assert!(a > -GAME_WIDTH && b > -GAME_WIDTH);
        }
    }

    #[test]
    fn test_reset_clears_round_state() {
        let mut rng = Pcg32::seed_from_u64(25);
        let mut horizon = Horizon::new(&mut rng);
        for _ in 0..300 {
            horizon.update(MS_PER_FRAME, 9.0, true, true, &mut rng);
        }
        assert!(!horizon.obstacles.is_empty());
        horizon.reset(&mut rng);
        assert!(horizon.obstacles.is_empty());
        assert_eq!(horizon.night.opacity, 0.0);
        assert_eq!(horizon.ground.x, [0.0, GAME_WIDTH]);
    }
}
