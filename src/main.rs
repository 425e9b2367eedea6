//! Rex Runner entry point
//!
//! Headless demo driver: runs the simulation at a fixed frame cadence with
//! a small autopilot on the controls, then reports the score. Useful for
//! smoke-testing the engine and for profiling; a real host would swap the
//! autopilot for device input and add a renderer on the query surface.

use rex_runner::consts::*;
use rex_runner::sim::{GameEvent, GameState, Runner, TrexStatus};
use rex_runner::HighScoreStore;

/// Largest delta the driver will feed the engine after a stall
const MAX_FRAME_MS: f32 = 50.0;

/// Decides when to press and release the jump control
///
/// Jumps when the nearest obstacle closes within a speed-scaled window,
/// ducks under nothing (cacti only need jumps; pterodactyls at the low
/// altitude get jumped over too, which is usually good enough for a demo).
struct Autopilot {
    action_held: bool,
    hold_ticks: u32,
}

impl Autopilot {
    fn new() -> Self {
        Self {
            action_held: false,
            hold_ticks: 0,
        }
    }

    fn drive(&mut self, runner: &mut Runner) {
        match runner.state {
            GameState::Waiting => runner.on_action_start(),
            GameState::Crashed => runner.on_action_start(),
            GameState::Playing => {
                if self.action_held {
                    self.hold_ticks += 1;
                    // Hold long enough to clear the minimum hop, then let go
                    if self.hold_ticks > 10 {
                        runner.on_action_end();
                        self.action_held = false;
                    }
                    return;
                }

                let grounded = runner.trex.status == TrexStatus::Running;
                let danger_close = runner.horizon.obstacles.first().is_some_and(|nearest| {
                    let lead = runner.speed * 14.0;
                    nearest.pos.x < runner.trex.pos.x + lead
                        && nearest.pos.x + nearest.width() > runner.trex.pos.x
                });
                if grounded && danger_close {
                    runner.on_action_start();
                    self.action_held = true;
                    self.hold_ticks = 0;
                }
            }
            GameState::Paused => {}
        }
    }
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xD1_90);
    let seconds: f32 = std::env::args()
        .nth(2)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(120.0);

    let store = HighScoreStore::default_location();

    let mut runner = Runner::new(seed);
    runner.high_score = store.load();
    runner.loaded = true;

    log::info!(
        "running {} simulated seconds with seed {:#x}",
        seconds,
        seed
    );

    let mut best_round = 0;
    let frames = (seconds * FPS) as u64;
    let mut autopilot = Autopilot::new();

    for _ in 0..frames {
        autopilot.drive(&mut runner);
        runner.update(MS_PER_FRAME.min(MAX_FRAME_MS));

        for event in runner.take_events() {
            match event {
                GameEvent::PlayJump => log::trace!("sfx: jump"),
                GameEvent::PlayAchievement => {
                    log::debug!("achievement at score {}", runner.score());
                }
                GameEvent::PlayGameOver => {
                    best_round = best_round.max(runner.score());
                    log::debug!("crashed at score {}", runner.score());
                }
                GameEvent::HighScore(score) => store.save(score),
            }
        }
    }

    best_round = best_round.max(runner.score());
    println!(
        "rounds played: {}  best score: {}  high score: {}",
        runner.play_count + 1,
        best_round,
        runner.high_score
    );
}
