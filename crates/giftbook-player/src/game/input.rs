//! Input adapters — wheel, touch swipe and keyboard gestures normalized
//! into a single navigation `Direction`.
//!
//! Conventions: scrolling *up* / swiping *up* / the forward key moves the
//! presentation forward. Wheel deltas use the "positive = scroll down"
//! convention; engines with the opposite sign flip it before calling in.

use giftbook_common::InputConfig;

use crate::game::sequencer::Direction;

/// Result of a wheel event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelVerdict {
    pub direction: Option<Direction>,
    /// The host must not scroll the page for this event
    pub suppress_scroll: bool,
}

#[derive(Debug, Clone)]
pub struct WheelAdapter {
    noise_floor: f32,
}

impl WheelAdapter {
    pub fn new(noise_floor: f32) -> Self {
        Self { noise_floor }
    }

    pub fn on_wheel(&self, delta_y: f32) -> WheelVerdict {
        // Touchpads emit a stream of tiny deltas
        let direction = if delta_y.abs() < self.noise_floor || delta_y == 0.0 {
            None
        } else if delta_y < 0.0 {
            Some(Direction::Forward)
        } else {
            Some(Direction::Backward)
        };
        WheelVerdict {
            direction,
            suppress_scroll: true,
        }
    }
}

/// Vertical swipe detector
#[derive(Debug, Clone)]
pub struct TouchAdapter {
    threshold: f32,
    start_y: Option<f32>,
}

impl TouchAdapter {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start_y: None,
        }
    }

    pub fn on_touch_start(&mut self, y: f32) {
        self.start_y = Some(y);
    }

    /// Finish the gesture. A missing end coordinate counts as no movement.
    pub fn on_touch_end(&mut self, end_y: Option<f32>) -> Option<Direction> {
        let start = self.start_y.take()?;
        let diff = start - end_y.unwrap_or(start);
        if diff.abs() <= self.threshold {
            return None;
        }
        Some(if diff > 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        })
    }
}

/// Two designated keys, identified by DOM-style key names (e.g. "ArrowUp")
#[derive(Debug, Clone)]
pub struct KeyAdapter {
    forward: String,
    backward: String,
}

impl KeyAdapter {
    pub fn new(forward: impl Into<String>, backward: impl Into<String>) -> Self {
        Self {
            forward: forward.into(),
            backward: backward.into(),
        }
    }

    pub fn on_key(&self, key: &str) -> Option<Direction> {
        if key == self.forward {
            Some(Direction::Forward)
        } else if key == self.backward {
            Some(Direction::Backward)
        } else {
            None
        }
    }
}

/// The three gesture adapters configured together
#[derive(Debug, Clone)]
pub struct InputAdapters {
    pub wheel: WheelAdapter,
    pub touch: TouchAdapter,
    pub keys: KeyAdapter,
}

impl InputAdapters {
    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            wheel: WheelAdapter::new(config.wheel_noise_floor),
            touch: TouchAdapter::new(config.swipe_threshold),
            keys: KeyAdapter::new(config.forward_key.clone(), config.backward_key.clone()),
        }
    }
}
