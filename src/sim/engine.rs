//! Top-level game engine and state machine
//!
//! One `Runner` owns the whole world: the player, the horizon, the seeded
//! RNG, and the per-round counters. The host calls `update` once per frame
//! with a pre-clamped delta and feeds inputs through the four logical
//! input methods; side effects surface through the drained event queue.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::check_collision;
use super::horizon::Horizon;
use super::player::Trex;
use crate::consts::*;

/// Top-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Pre-round idle; the player blinks, nothing scrolls
    Waiting,
    Playing,
    Paused,
    /// Round over; recoverable via restart after the cooldown
    Crashed,
}

/// Fire-and-forget side effects for the host's audio/persistence
/// collaborators; failures out there never reach the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PlayJump,
    /// Score crossed an achievement boundary
    PlayAchievement,
    PlayGameOver,
    /// A new high score to persist
    HighScore(u32),
}

/// Achievement score-flash animation (blinks the score display)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScoreFlash {
    active: bool,
    timer: f32,
    iterations: u32,
}

impl ScoreFlash {
    /// Returns true on the tick an achievement triggers
    fn update(&mut self, delta_ms: f32, score: u32) -> bool {
        if !self.active {
            if score > 0 && score % ACHIEVEMENT_DISTANCE == 0 {
                self.active = true;
                self.timer = 0.0;
                self.iterations = 0;
                return true;
            }
            return false;
        }

        self.timer += delta_ms;
        if self.timer > FLASH_DURATION * 2.0 {
            self.timer = 0.0;
            self.iterations += 1;
            if self.iterations >= FLASH_ITERATIONS {
                self.active = false;
            }
        }
        false
    }

    /// Score visibility; hidden during the first half of each blink
    fn visible(&self) -> bool {
        !self.active || self.timer >= FLASH_DURATION
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The game engine root
#[derive(Debug, Clone)]
pub struct Runner {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub state: GameState,
    pub trex: Trex,
    pub horizon: Horizon,
    /// Current speed in world units per reference frame
    pub speed: f32,
    /// Raw distance accumulator (score is derived from this)
    pub distance: f32,
    /// Best score seen, seeded from the persistence collaborator
    pub high_score: u32,
    /// Completed rounds since construction
    pub play_count: u32,
    /// Set by the host once assets are ready; the engine only reads it
    pub loaded: bool,
    running_time: f32,
    game_over_timer: f32,
    inverted: bool,
    invert_timer: f32,
    flash: ScoreFlash,
    events: Vec<GameEvent>,
}

impl Runner {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let horizon = Horizon::new(&mut rng);
        Self {
            seed,
            rng,
            state: GameState::Waiting,
            trex: Trex::new(),
            horizon,
            speed: SPEED,
            distance: 0.0,
            high_score: 0,
            play_count: 0,
            loaded: false,
            running_time: 0.0,
            game_over_timer: 0.0,
            inverted: false,
            invert_timer: 0.0,
            flash: ScoreFlash::default(),
            events: Vec::new(),
        }
    }

    /// Derived score: floor(distance * coefficient)
    pub fn score(&self) -> u32 {
        (self.distance * SCORE_COEFFICIENT).floor() as u32
    }

    /// Whether the score display is currently visible (achievement flash)
    pub fn score_visible(&self) -> bool {
        self.flash.visible()
    }

    /// Night mode currently requested by the score timer
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Drain pending collaborator events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the simulation by one frame
    ///
    /// `delta_ms` must already be clamped by the caller to a sane bound
    /// (e.g. 0-50 ms) after stalls.
    pub fn update(&mut self, delta_ms: f32) {
        match self.state {
            GameState::Waiting => self.trex.update_waiting(delta_ms, &mut self.rng),
            GameState::Playing => self.update_playing(delta_ms),
            GameState::Crashed => self.game_over_timer += delta_ms,
            GameState::Paused => {}
        }
    }

    fn update_playing(&mut self, delta_ms: f32) {
        self.running_time += delta_ms;
        let has_obstacles = self.running_time > CLEAR_TIME;

        // Order matters: the collision check below must see the player and
        // obstacle positions from this tick
        self.trex.update(delta_ms);
        self.horizon
            .update(delta_ms, self.speed, has_obstacles, self.inverted, &mut self.rng);

        if has_obstacles {
            if let Some(nearest) = self.horizon.obstacles.first() {
                if check_collision(&self.trex, nearest) {
                    self.game_over();
                    return;
                }
            }
        }

        self.distance += self.speed * delta_ms / MS_PER_FRAME;
        if self.speed < MAX_SPEED {
            self.speed += ACCELERATION;
        }

        self.update_night(delta_ms);

        if self.flash.update(delta_ms, self.score()) {
            self.events.push(GameEvent::PlayAchievement);
        }
    }

    /// Night toggling: flips on at every `INVERT_DISTANCE` score boundary,
    /// reverts on its own after `INVERT_FADE_DURATION`. Independent of the
    /// achievement flash even when the boundaries coincide.
    fn update_night(&mut self, delta_ms: f32) {
        if self.invert_timer > INVERT_FADE_DURATION {
            self.invert_timer = 0.0;
            self.inverted = false;
        } else if self.invert_timer > 0.0 {
            self.invert_timer += delta_ms;
        } else {
            let score = self.score();
            if score > 0 && score % INVERT_DISTANCE == 0 {
                self.inverted = true;
                self.invert_timer += delta_ms;
            }
        }
    }

    fn game_over(&mut self) {
        log::info!("game over at score {}", self.score());
        self.state = GameState::Crashed;
        self.trex.crash();
        self.game_over_timer = 0.0;
        self.events.push(GameEvent::PlayGameOver);

        let score = self.score();
        if score > self.high_score {
            self.high_score = score;
            self.events.push(GameEvent::HighScore(score));
        }
    }

    /// Action input (spacebar / tap): context-dependent
    pub fn on_action_start(&mut self) {
        match self.state {
            GameState::Waiting => {
                log::debug!("round started");
                self.state = GameState::Playing;
                self.running_time = 0.0;
                self.trex.reset();
                self.events.push(GameEvent::PlayJump);
                self.trex.start_jump(self.speed);
            }
            GameState::Playing => {
                if !self.trex.jumping && !self.trex.ducking {
                    self.events.push(GameEvent::PlayJump);
                    self.trex.start_jump(self.speed);
                }
            }
            GameState::Paused => self.resume(),
            GameState::Crashed => {
                // No-op until the post-crash cooldown elapses
                if self.game_over_timer >= GAMEOVER_CLEAR_TIME {
                    self.restart();
                }
            }
        }
    }

    /// Action released: end a jump early (subject to the min-height rule)
    pub fn on_action_end(&mut self) {
        if self.state == GameState::Playing && self.trex.jumping {
            self.trex.end_jump();
        }
    }

    /// Duck pressed: grounded duck, or mid-air speed drop
    pub fn on_duck_start(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        if self.trex.jumping {
            self.trex.set_speed_drop();
        } else {
            self.trex.set_duck(true);
        }
    }

    /// Duck released
    pub fn on_duck_end(&mut self) {
        if self.state == GameState::Playing {
            self.trex.clear_duck();
        }
    }

    /// Pause; a defined no-op outside of `Playing`
    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.state = GameState::Paused;
        }
    }

    /// Resume; a defined no-op outside of `Paused`
    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.state = GameState::Playing;
        }
    }

    /// Reset all per-round state and go straight back to `Playing`
    fn restart(&mut self) {
        log::info!("restart (round {})", self.play_count + 1);
        self.play_count += 1;
        self.state = GameState::Playing;
        self.speed = SPEED;
        self.distance = 0.0;
        self.running_time = 0.0;
        self.game_over_timer = 0.0;
        self.inverted = false;
        self.invert_timer = 0.0;
        self.flash.reset();
        self.trex.reset();
        self.horizon.reset(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::{Obstacle, ObstacleKind};
    use crate::sim::player::TrexStatus;
    use rand::SeedableRng;

    const DT: f32 = MS_PER_FRAME;

    fn planted_cactus(runner: &Runner) -> Obstacle {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut obstacle = Obstacle::new(ObstacleKind::CactusSmall, runner.speed, &mut rng);
        obstacle.pos.x = runner.trex.pos.x;
        obstacle.gap = 1000.0;
        obstacle
    }

    #[test]
    fn test_action_starts_round_with_jump() {
        let mut runner = Runner::new(1);
        assert_eq!(runner.state, GameState::Waiting);

        runner.on_action_start();
        assert_eq!(runner.state, GameState::Playing);
        assert_eq!(runner.trex.status, TrexStatus::Jumping);

        // 50 ticks with no input: back on the ground, distance accrued,
        // speed ramped by at most 50 * acceleration
        for _ in 0..50 {
            runner.update(DT);
        }
        assert_eq!(runner.trex.status, TrexStatus::Running);
        assert!(runner.distance > 0.0);
        assert!(runner.speed > SPEED);
        assert!(runner.speed <= SPEED + 50.0 * ACCELERATION);
    }

    #[test]
    fn test_no_obstacles_before_clear_time() {
        let mut runner = Runner::new(2);
        runner.on_action_start();
        let mut elapsed = 0.0;
        while elapsed + DT <= CLEAR_TIME {
            runner.update(DT);
            elapsed += DT;
            assert!(runner.horizon.obstacles.is_empty());
        }
        // Past the clear time they appear
        for _ in 0..10 {
            runner.update(DT);
        }
        assert!(!runner.horizon.obstacles.is_empty());
    }

    #[test]
    fn test_collision_crashes_and_updates_high_score() {
        let mut runner = Runner::new(3);
        runner.on_action_start();
        for _ in 0..300 {
            runner.update(DT);
            if runner.state == GameState::Crashed {
                break;
            }
        }
        // Force a deterministic crash regardless of how the run went
        if runner.state != GameState::Crashed {
            runner.running_time = CLEAR_TIME + 1.0;
            runner.trex.reset();
            runner.horizon.obstacles.clear();
            runner.horizon.obstacles.insert(0, planted_cactus(&runner));
            runner.update(DT);
        }

        assert_eq!(runner.state, GameState::Crashed);
        assert_eq!(runner.trex.status, TrexStatus::Crashed);
        assert!(runner.game_over_timer < GAMEOVER_CLEAR_TIME);

        let events = runner.take_events();
        assert!(events.contains(&GameEvent::PlayGameOver));
        if runner.score() > 0 {
            assert!(events.contains(&GameEvent::HighScore(runner.score())));
            assert_eq!(runner.high_score, runner.score());
        }
    }

    #[test]
    fn test_restart_gated_by_cooldown() {
        let mut runner = Runner::new(4);
        runner.on_action_start();
        runner.running_time = CLEAR_TIME + 1.0;
        runner.horizon.obstacles.insert(0, planted_cactus(&runner));
        runner.update(DT);
        assert_eq!(runner.state, GameState::Crashed);

        // Before the cooldown: restart attempts are ignored
        runner.update(100.0);
        runner.on_action_start();
        assert_eq!(runner.state, GameState::Crashed);

        // After the cooldown: full per-round reset, straight to Playing
        runner.update(GAMEOVER_CLEAR_TIME);
        runner.on_action_start();
        assert_eq!(runner.state, GameState::Playing);
        assert_eq!(runner.distance, 0.0);
        assert_eq!(runner.speed, SPEED);
        assert!(runner.horizon.obstacles.is_empty());
        assert_eq!(runner.play_count, 1);
    }

    #[test]
    fn test_score_frozen_while_paused_and_crashed() {
        let mut runner = Runner::new(5);
        runner.on_action_start();
        for _ in 0..100 {
            runner.update(DT);
        }
        let score = runner.score();

        runner.pause();
        for _ in 0..100 {
            runner.update(DT);
        }
        assert_eq!(runner.score(), score);

        runner.resume();
        runner.running_time = CLEAR_TIME + 1.0;
        runner.horizon.obstacles.clear();
        runner.horizon.obstacles.insert(0, planted_cactus(&runner));
        runner.update(DT);
        assert_eq!(runner.state, GameState::Crashed);
        let crashed_score = runner.score();
        for _ in 0..100 {
            runner.update(DT);
        }
        assert_eq!(runner.score(), crashed_score);
    }

    #[test]
    fn test_score_monotonic_while_playing() {
        let mut runner = Runner::new(6);
        runner.on_action_start();
        let mut last = 0;
        for _ in 0..500 {
            runner.update(DT);
            if runner.state != GameState::Playing {
                break;
            }
            let score = runner.score();
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn test_pause_resume_are_noops_elsewhere() {
        let mut runner = Runner::new(7);
        runner.pause();
        assert_eq!(runner.state, GameState::Waiting);
        runner.resume();
        assert_eq!(runner.state, GameState::Waiting);

        runner.on_action_start();
        runner.pause();
        assert_eq!(runner.state, GameState::Paused);
        // Action input also resumes
        runner.on_action_start();
        assert_eq!(runner.state, GameState::Playing);
    }

    #[test]
    fn test_night_mode_toggles_and_reverts() {
        let mut runner = Runner::new(8);
        runner.on_action_start();
        runner.update(DT);
        assert!(!runner.is_inverted());

        // Jump the score straight onto an invert boundary
        runner.distance = INVERT_DISTANCE as f32 / SCORE_COEFFICIENT;
        runner.speed = SPEED; // keep the score pinned closely for one tick
        runner.update(DT);
        assert!(runner.is_inverted());
        assert!(runner.horizon.night.activated || runner.horizon.night.opacity == 0.0);

        // Runs out after the fade duration; keep the warm-up clock pinned
        // so no obstacle can end the round mid-test
        let ticks = (INVERT_FADE_DURATION / DT) as u32 + 10;
        for _ in 0..ticks {
            runner.running_time = 0.0;
            runner.update(DT);
        }
        assert_eq!(runner.state, GameState::Playing);
        assert!(!runner.is_inverted());
    }

    #[test]
    fn test_achievement_flash_blinks_and_expires() {
        let mut runner = Runner::new(9);
        runner.on_action_start();
        runner.update(DT);

        runner.distance = ACHIEVEMENT_DISTANCE as f32 / SCORE_COEFFICIENT;
        runner.update(DT);
        assert!(runner.take_events().contains(&GameEvent::PlayAchievement));
        // Freshly triggered: first half of the blink hides the score
        assert!(!runner.score_visible());

        let mut saw_visible = false;
        let total = ((FLASH_DURATION * 2.0 * FLASH_ITERATIONS as f32) / DT) as u32 + 10;
        for _ in 0..total {
            runner.update(DT);
            saw_visible |= runner.score_visible();
        }
        assert!(saw_visible);
        assert!(runner.score_visible());
        assert!(!runner.flash.active);
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = Runner::new(12345);
        let mut b = Runner::new(12345);
        a.on_action_start();
        b.on_action_start();
        for _ in 0..400 {
            a.update(DT);
            b.update(DT);
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.horizon.obstacles.len(), b.horizon.obstacles.len());
        for (oa, ob) in a.horizon.obstacles.iter().zip(&b.horizon.obstacles) {
            assert_eq!(oa.kind, ob.kind);
            assert_eq!(oa.pos, ob.pos);
        }
    }
}
