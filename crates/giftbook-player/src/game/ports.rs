//! Host capabilities used by the presentation: background audio and
//! input focus. Both are best-effort; failures come back as errors so
//! callers can log them.

use thiserror::Error;

use crate::game::stage::ElementId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Playback refused by the host (e.g. autoplay policy, no device)
    #[error("playback rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FocusError {
    #[error("focus target {0:?} is not focusable")]
    MissingTarget(ElementId),
}

/// Background music element
pub trait AudioPort {
    fn is_paused(&self) -> bool;
    fn play(&mut self) -> Result<(), AudioError>;
}

/// Moves input focus to an element
pub trait FocusPort {
    fn focus(&mut self, target: ElementId, prevent_scroll: bool) -> Result<(), FocusError>;
}

/// A missing audio element is never paused and never fails
impl<A: AudioPort> AudioPort for Option<A> {
    fn is_paused(&self) -> bool {
        self.as_ref().is_some_and(|a| a.is_paused())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        match self {
            Some(a) => a.play(),
            None => Ok(()),
        }
    }
}

/// Start the music if it is paused; rejection is logged and dropped.
/// Returns true if playback was requested.
pub fn ensure_music_plays<A: AudioPort>(audio: &mut A) -> bool {
    if !audio.is_paused() {
        return false;
    }
    if let Err(e) = audio.play() {
        tracing::warn!("Background music did not start: {}", e);
    }
    true
}

/// Focus ring kept by the engine; the renderer outlines the focused element
#[derive(Debug)]
pub struct FocusRing {
    focusable: Vec<ElementId>,
    focused: Option<ElementId>,
}

impl FocusRing {
    pub fn new(focusable: Vec<ElementId>) -> Self {
        Self {
            focusable,
            focused: None,
        }
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }
}

impl FocusPort for FocusRing {
    fn focus(&mut self, target: ElementId, _prevent_scroll: bool) -> Result<(), FocusError> {
        // The window never scrolls, so prevent_scroll has nothing to suppress
        if !self.focusable.contains(&target) {
            return Err(FocusError::MissingTarget(target));
        }
        self.focused = Some(target);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockAudio;
    use super::*;

    #[test]
    fn plays_only_when_paused() {
        let mut audio = MockAudio::paused();
        assert!(ensure_music_plays(&mut audio));
        assert_eq!(audio.play_calls, 1);
        assert!(!ensure_music_plays(&mut audio));
        assert_eq!(audio.play_calls, 1);
    }

    #[test]
    fn rejection_is_swallowed() {
        let mut audio = MockAudio::rejecting();
        assert!(ensure_music_plays(&mut audio));
        assert!(ensure_music_plays(&mut audio));
        assert_eq!(audio.play_calls, 2);
        assert!(audio.is_paused());
    }

    #[test]
    fn absent_audio_is_never_paused() {
        let mut audio: Option<MockAudio> = None;
        assert!(!audio.is_paused());
        assert!(!ensure_music_plays(&mut audio));
        assert_eq!(audio.play(), Ok(()));
    }

    #[test]
    fn focus_ring_remembers_target() {
        let mut ring = FocusRing::new(vec![ElementId::Book]);
        assert_eq!(ring.focused(), None);
        ring.focus(ElementId::Book, true).unwrap();
        assert_eq!(ring.focused(), Some(ElementId::Book));
    }

    #[test]
    fn focus_ring_rejects_unknown_target() {
        let mut ring = FocusRing::new(vec![ElementId::Book]);
        assert_eq!(
            ring.focus(ElementId::Cover, true),
            Err(FocusError::MissingTarget(ElementId::Cover))
        );
        assert_eq!(ring.focused(), None);
    }
}
