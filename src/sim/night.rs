//! Night-mode lighting sub-state machine
//!
//! Driven by a single boolean from the engine each tick. Activation
//! advances the moon phase and fades the overlay in; deactivation fades
//! it out and re-randomizes the star field once fully transparent.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::GAME_WIDTH;

/// Opacity change per tick while fading
pub const FADE_SPEED: f32 = 0.035;
/// Moon sprite width
pub const MOON_WIDTH: f32 = 20.0;
/// Moon vertical placement
pub const MOON_Y_POS: f32 = 30.0;
/// Moon scroll per tick (independent of world speed)
pub const MOON_SPEED: f32 = 0.25;
/// Number of moon phases cycled through
pub const MOON_PHASES: usize = 7;
/// Star scroll per tick
pub const STAR_SPEED: f32 = 0.3;
/// Star field size
pub const NUM_STARS: usize = 2;
/// Stars spawn with y in [0, STAR_MAX_Y]
pub const STAR_MAX_Y: f32 = 70.0;
/// Star sprite size (used for wrap width)
pub const STAR_SIZE: f32 = 9.0;

/// A background star
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    /// One of two sprite variants
    pub variant: u8,
}

/// Night-mode overlay state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightMode {
    /// 0 = day, 1 = full night; changes only by `FADE_SPEED` per tick
    pub opacity: f32,
    pub moon_x: f32,
    /// Discrete moon phase index, advanced once per activation
    pub phase: usize,
    pub stars: Vec<Star>,
    /// Set while a night cycle is in progress; cleared once the fade-out
    /// completes and the stars have been re-randomized
    pub activated: bool,
}

impl NightMode {
    pub fn new(rng: &mut Pcg32) -> Self {
        let mut night = Self {
            opacity: 0.0,
            moon_x: GAME_WIDTH - 50.0,
            phase: 0,
            stars: Vec::with_capacity(NUM_STARS),
            activated: false,
        };
        night.place_stars(rng);
        night
    }

    /// Per-tick update; `show` is the engine's desired night state
    pub fn update(&mut self, show: bool, rng: &mut Pcg32) {
        // Phase advances on the activation edge, before the fade-in starts
        if show && self.opacity == 0.0 {
            self.phase = (self.phase + 1) % MOON_PHASES;
            self.activated = true;
        }

        if show {
            self.opacity = (self.opacity + FADE_SPEED).min(1.0);
        } else {
            self.opacity = (self.opacity - FADE_SPEED).max(0.0);
        }

        if self.opacity > 0.0 {
            self.moon_x = wrap_x(self.moon_x, MOON_SPEED, MOON_WIDTH);
            for star in &mut self.stars {
                star.pos.x = wrap_x(star.pos.x, STAR_SPEED, STAR_SIZE);
            }
        } else if !show && self.activated {
            // Fully faded out; next activation gets a fresh sky
            self.place_stars(rng);
            self.activated = false;
        }
    }

    /// Scatter stars over evenly sized horizontal segments
    fn place_stars(&mut self, rng: &mut Pcg32) {
        let segment = (GAME_WIDTH / NUM_STARS as f32).round();
        self.stars.clear();
        for i in 0..NUM_STARS {
            let x = rng.random_range(segment * i as f32..segment * (i + 1) as f32).round();
            let y = rng.random_range(0.0..=STAR_MAX_Y).round();
            self.stars.push(Star {
                pos: Vec2::new(x, y),
                variant: (i % 2) as u8,
            });
        }
    }

    /// Immediate daytime reset (round restart)
    pub fn reset(&mut self, rng: &mut Pcg32) {
        self.opacity = 0.0;
        self.activated = false;
        self.moon_x = GAME_WIDTH - 50.0;
        self.place_stars(rng);
    }
}

/// Scroll left at a fixed rate, wrapping to the right edge once off screen
fn wrap_x(x: f32, speed: f32, width: f32) -> f32 {
    if x < -width { GAME_WIDTH } else { x - speed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fade_in_and_out_rates() {
        let mut rng = Pcg32::seed_from_u64(10);
        let mut night = NightMode::new(&mut rng);

        night.update(true, &mut rng);
        assert_eq!(night.opacity, FADE_SPEED);

        // Full fade-in takes ceil(1 / 0.035) = 29 ticks
        for _ in 0..40 {
            night.update(true, &mut rng);
        }
        assert_eq!(night.opacity, 1.0);

        night.update(false, &mut rng);
        assert_eq!(night.opacity, 1.0 - FADE_SPEED);
    }

    #[test]
    fn test_phase_advances_once_per_activation() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut night = NightMode::new(&mut rng);
        let phase0 = night.phase;

        for _ in 0..10 {
            night.update(true, &mut rng);
        }
        assert_eq!(night.phase, (phase0 + 1) % MOON_PHASES);

        // Fade fully out, then reactivate
        for _ in 0..40 {
            night.update(false, &mut rng);
        }
        for _ in 0..10 {
            night.update(true, &mut rng);
        }
        assert_eq!(night.phase, (phase0 + 2) % MOON_PHASES);
    }

    #[test]
    fn test_stars_rerandomized_only_after_full_fade_out() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut night = NightMode::new(&mut rng);

        for _ in 0..40 {
            night.update(true, &mut rng);
        }
        let mid_fade: Vec<f32> = night.stars.iter().map(|s| s.pos.y).collect();

        // Partially faded out: same stars, still activated
        for _ in 0..5 {
            night.update(false, &mut rng);
        }
        let partial: Vec<f32> = night.stars.iter().map(|s| s.pos.y).collect();
        assert_eq!(mid_fade, partial);
        assert!(night.activated);

        // Complete the fade-out; the flag clears and the sky re-rolls
        for _ in 0..40 {
            night.update(false, &mut rng);
        }
        assert!(!night.activated);
        assert_eq!(night.opacity, 0.0);
    }

    #[test]
    fn test_moon_wraps_to_right_edge() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut night = NightMode::new(&mut rng);
        night.moon_x = -MOON_WIDTH - 1.0;
        night.opacity = 0.5;
        night.update(true, &mut rng);
        assert_eq!(night.moon_x, GAME_WIDTH);
    }

    #[test]
    fn test_star_positions_in_band() {
        let mut rng = Pcg32::seed_from_u64(14);
        let night = NightMode::new(&mut rng);
        assert_eq!(night.stars.len(), NUM_STARS);
        for star in &night.stars {
            assert!(star.pos.y >= 0.0 && star.pos.y <= STAR_MAX_Y);
            assert!(star.pos.x >= 0.0 && star.pos.x <= GAME_WIDTH);
        }
    }
}
