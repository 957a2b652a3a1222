//! Presentation logic — scene sequence, stage state, input routing
//!
//! Scene flow:
//!   gift → book-show → book-open → page-0 … page-(n-1) → finale
//!
//! `Presentation` is what the engine talks to: it owns the sequencer and
//! the gesture adapters and routes raw input events into single steps.

pub mod input;
pub mod ports;
pub mod scenes;
pub mod sequencer;
pub mod stage;
pub mod visual;

use anyhow::{Context, Result};
use giftbook_common::AppConfig;

use crate::game::input::{InputAdapters, WheelVerdict};
use crate::game::ports::{AudioPort, FocusPort};
use crate::game::scenes::{build_sequence, Scene};
use crate::game::sequencer::{ClickOutcome, Sequencer, StepOutcome};
use crate::game::stage::Stage;
use crate::game::visual::Applicator;

/// Deferred work owned by the sequencer's scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// End of the step cooldown
    ClearCooldown,
    /// Delayed cover flip of the book-open scene
    FlipCover,
}

pub struct Presentation<A, F> {
    pub sequencer: Sequencer<A, F>,
    pub input: InputAdapters,
}

impl<A: AudioPort, F: FocusPort> Presentation<A, F> {
    pub fn new(config: &AppConfig, audio: A, focus: F) -> Result<Self> {
        let stage = Stage::new(config.book.page_count);
        let sequence = build_sequence(stage.page_count(), config.book.page_indexing);

        let start = match &config.book.start_at {
            Some(name) => {
                let scene: Scene = name.parse()?;
                sequence
                    .position_of(scene)
                    .with_context(|| format!("Scene '{}' is not part of a {}-page book", name, stage.page_count()))?
            }
            None => 0,
        };

        let applicator = Applicator::new(stage, audio, focus, config.timing.cover_flip_delay_ms);
        Ok(Self {
            sequencer: Sequencer::starting_at(sequence, applicator, config.timing.cooldown_ms, start),
            input: InputAdapters::from_config(&config.input),
        })
    }

    pub fn scene(&self) -> Scene {
        self.sequencer.scene()
    }

    pub fn stage(&self) -> &Stage {
        self.sequencer.stage()
    }

    /// Run due timers (call every frame with the elapsed engine time)
    pub fn update(&mut self, now_ms: u64) {
        self.sequencer.tick(now_ms);
    }

    pub fn on_wheel(&mut self, delta_y: f32) -> WheelVerdict {
        let verdict = self.input.wheel.on_wheel(delta_y);
        if let Some(direction) = verdict.direction {
            self.sequencer.step(direction);
        }
        verdict
    }

    pub fn on_touch_start(&mut self, y: f32) {
        self.input.touch.on_touch_start(y);
    }

    /// Returns the step outcome if the gesture was a swipe
    pub fn on_touch_end(&mut self, y: Option<f32>) -> Option<StepOutcome> {
        let direction = self.input.touch.on_touch_end(y)?;
        Some(self.sequencer.step(direction))
    }

    pub fn on_key_down(&mut self, key: &str) -> Option<StepOutcome> {
        let direction = self.input.keys.on_key(key)?;
        Some(self.sequencer.step(direction))
    }

    pub fn on_primary_click(&mut self) -> ClickOutcome {
        self.sequencer.on_primary_click()
    }
}
