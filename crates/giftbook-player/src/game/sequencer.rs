//! Sequence controller — position, cooldown gate and scene application.
//!
//! States are the positions `0..len`; transitions are single forward or
//! backward steps. Both ends clamp. After an accepted step further input
//! is dropped (not queued) until the cooldown task clears the throttle.

use crate::engine::timers::{Scheduler, TimerHandle};
use crate::game::ports::{AudioPort, FocusPort};
use crate::game::scenes::{Scene, Sequence};
use crate::game::stage::Stage;
use crate::game::visual::Applicator;
use crate::game::TimerTask;

/// Normalized navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Dropped because the cooldown is still running
    Ignored,
    /// Already at the first / last scene
    AtBound,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Click on the first scene acts as a forward step
    Stepped(StepOutcome),
    /// Anywhere else it only opens or closes the gift box
    ToggledGift { open: bool },
}

pub struct Sequencer<A, F> {
    sequence: Sequence,
    position: usize,
    throttled: bool,
    cooldown_ms: u64,
    cooldown: Option<TimerHandle>,
    timers: Scheduler<TimerTask>,
    applicator: Applicator<A, F>,
}

impl<A: AudioPort, F: FocusPort> Sequencer<A, F> {
    /// Start at `position` (clamped into the sequence). The initial scene is
    /// applied once and does not consume a cooldown.
    pub fn starting_at(
        sequence: Sequence,
        applicator: Applicator<A, F>,
        cooldown_ms: u64,
        position: usize,
    ) -> Self {
        let position = position.min(sequence.last_position());
        let mut seq = Self {
            sequence,
            position,
            throttled: false,
            cooldown_ms,
            cooldown: None,
            timers: Scheduler::new(),
            applicator,
        };
        seq.apply_current();
        tracing::debug!(
            "Sequence: {}",
            seq.sequence.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" → ")
        );
        tracing::info!(
            "Presentation ready: {} scenes, starting at {}",
            seq.sequence.len(),
            seq.scene()
        );
        seq
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn scene(&self) -> Scene {
        self.sequence.get(self.position).unwrap_or(Scene::Gift)
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    pub fn stage(&self) -> &Stage {
        self.applicator.stage()
    }

    pub fn applicator(&self) -> &Applicator<A, F> {
        &self.applicator
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Move one scene forward or backward. The new scene is applied before
    /// this returns.
    pub fn step(&mut self, direction: Direction) -> StepOutcome {
        if self.throttled {
            tracing::trace!("Step {:?} dropped (cooldown)", direction);
            return StepOutcome::Ignored;
        }
        let next = match direction {
            Direction::Forward if self.position < self.sequence.last_position() => self.position + 1,
            Direction::Backward if self.position > 0 => self.position - 1,
            _ => {
                tracing::trace!("Step {:?} at bound {}", direction, self.position);
                return StepOutcome::AtBound;
            }
        };

        self.position = next;
        self.throttled = true;
        self.cooldown = Some(self.timers.schedule(self.cooldown_ms, TimerTask::ClearCooldown));
        self.apply_current();
        tracing::debug!("Scene → {} ({}/{})", self.scene(), self.position, self.sequence.last_position());
        StepOutcome::Advanced
    }

    /// Primary element (gift box) clicked
    pub fn on_primary_click(&mut self) -> ClickOutcome {
        if self.position == 0 {
            return ClickOutcome::Stepped(self.step(Direction::Forward));
        }
        let open = self.applicator.toggle_gift_open();
        tracing::debug!("Gift box {}", if open { "opened" } else { "closed" });
        ClickOutcome::ToggledGift { open }
    }

    /// Advance the clock and run every timer task that became due
    pub fn tick(&mut self, now_ms: u64) {
        for (handle, task) in self.timers.advance_to(now_ms) {
            match task {
                TimerTask::ClearCooldown => {
                    if self.cooldown == Some(handle) {
                        self.cooldown = None;
                        self.throttled = false;
                    }
                }
                TimerTask::FlipCover => self.applicator.on_cover_flip_due(handle),
            }
        }
    }

    fn apply_current(&mut self) {
        let scene = self.scene();
        self.applicator.apply(scene, &mut self.timers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ports::mock::{MockAudio, MockFocus};
    use crate::game::scenes::build_sequence;
    use crate::game::stage::{Marker, Section};
    use giftbook_common::PageIndexing;

    const COOLDOWN: u64 = 600;

    fn sequencer(pages: usize) -> Sequencer<MockAudio, MockFocus> {
        let stage = Stage::new(pages);
        let sequence = build_sequence(stage.page_count(), PageIndexing::ZeroBased);
        let app = Applicator::new(stage, MockAudio::paused(), MockFocus::default(), 300);
        Sequencer::starting_at(sequence, app, COOLDOWN, 0)
    }

    /// Step and let the cooldown run out
    fn step_settled(seq: &mut Sequencer<MockAudio, MockFocus>, dir: Direction) -> StepOutcome {
        let outcome = seq.step(dir);
        let now = seq.now_ms();
        seq.tick(now + COOLDOWN);
        outcome
    }

    fn walk(seq: &mut Sequencer<MockAudio, MockFocus>, dirs: &[Direction]) {
        for dir in dirs {
            assert_eq!(step_settled(seq, *dir), StepOutcome::Advanced);
        }
    }

    #[test]
    fn starts_at_gift_without_cooldown() {
        let seq = sequencer(3);
        assert_eq!(seq.position(), 0);
        assert_eq!(seq.scene(), Scene::Gift);
        assert!(!seq.is_throttled());
        assert_eq!(seq.stage().active_section(), Some(Section::Gift));
    }

    #[test]
    fn start_position_is_applied_and_clamped() {
        let stage = Stage::new(3);
        let sequence = build_sequence(3, PageIndexing::ZeroBased);
        let app = Applicator::new(stage, MockAudio::paused(), MockFocus::default(), 300);
        let seq = Sequencer::starting_at(sequence, app, COOLDOWN, 99);
        assert_eq!(seq.scene(), Scene::Finale);
        assert!(!seq.is_throttled());
        assert_eq!(seq.stage().flipped_pages(), vec![0, 1, 2]);
    }

    #[test]
    fn backward_at_start_is_a_bound() {
        let mut seq = sequencer(3);
        assert_eq!(seq.step(Direction::Backward), StepOutcome::AtBound);
        assert_eq!(seq.position(), 0);
        assert!(!seq.is_throttled());
    }

    #[test]
    fn forward_at_end_stays_put() {
        let mut seq = sequencer(1);
        while seq.position() < seq.sequence().last_position() {
            step_settled(&mut seq, Direction::Forward);
        }
        let last = seq.position();
        for _ in 0..3 {
            assert_eq!(step_settled(&mut seq, Direction::Forward), StepOutcome::AtBound);
            assert_eq!(seq.position(), last);
        }
    }

    #[test]
    fn throttle_drops_back_to_back_steps() {
        let mut seq = sequencer(3);
        assert_eq!(seq.step(Direction::Forward), StepOutcome::Advanced);
        assert_eq!(seq.step(Direction::Forward), StepOutcome::Ignored);
        assert_eq!(seq.position(), 1);

        seq.tick(COOLDOWN - 1);
        assert_eq!(seq.step(Direction::Forward), StepOutcome::Ignored);

        seq.tick(COOLDOWN);
        assert_eq!(seq.step(Direction::Forward), StepOutcome::Advanced);
        assert_eq!(seq.position(), 2);
    }

    #[test]
    fn visual_state_is_path_independent() {
        use Direction::{Backward, Forward};

        let mut direct = sequencer(3);
        walk(&mut direct, &[Forward, Forward, Forward, Forward]);

        let mut winding = sequencer(3);
        walk(
            &mut winding,
            &[Forward, Forward, Forward, Forward, Forward, Backward, Backward, Forward],
        );

        assert_eq!(direct.position(), winding.position());
        assert_eq!(direct.stage().flipped_pages(), winding.stage().flipped_pages());
        assert_eq!(direct.stage().active_section(), winding.stage().active_section());
        assert_eq!(
            direct.stage().cover.has(Marker::Flipped),
            winding.stage().cover.has(Marker::Flipped)
        );
    }

    #[test]
    fn page_reveal_grows_and_shrinks() {
        let mut seq = sequencer(4);
        walk(&mut seq, &[Direction::Forward; 5]);
        assert_eq!(seq.scene(), Scene::Page(2));
        assert_eq!(seq.stage().flipped_pages(), vec![0, 1, 2]);

        walk(&mut seq, &[Direction::Backward]);
        assert_eq!(seq.scene(), Scene::Page(1));
        assert_eq!(seq.stage().flipped_pages(), vec![0, 1]);
    }

    #[test]
    fn three_page_walkthrough() {
        let mut seq = sequencer(3);

        // Click on the gift starts the show
        assert_eq!(seq.on_primary_click(), ClickOutcome::Stepped(StepOutcome::Advanced));
        assert_eq!(seq.position(), 1);
        assert_eq!(seq.scene(), Scene::BookShow);
        assert_eq!(seq.stage().active_section(), Some(Section::Book));
        assert!(seq.stage().container.has(Marker::Visible));
        assert!(seq.stage().flipped_pages().is_empty());
        seq.tick(COOLDOWN);

        walk(&mut seq, &[Direction::Forward; 2]);
        assert_eq!(seq.position(), 3);
        assert_eq!(seq.scene(), Scene::Page(0));
        assert!(seq.stage().cover.has(Marker::Flipped));
        assert_eq!(seq.stage().flipped_pages(), vec![0]);

        walk(&mut seq, &[Direction::Forward; 3]);
        assert_eq!(seq.position(), 6);
        assert_eq!(seq.scene(), Scene::Finale);
        assert_eq!(seq.stage().flipped_pages(), vec![0, 1, 2]);
        assert_eq!(seq.stage().active_section(), Some(Section::Finale));

        walk(&mut seq, &[Direction::Backward]);
        assert_eq!(seq.position(), 5);
        assert_eq!(seq.scene(), Scene::Page(2));
        assert_eq!(seq.stage().active_section(), Some(Section::Book));
        assert!(!seq.stage().section(Section::Finale).has(Marker::Active));
        assert_eq!(seq.stage().flipped_pages(), vec![0, 1, 2]);
    }

    #[test]
    fn click_after_start_toggles_gift_only() {
        let mut seq = sequencer(3);
        walk(&mut seq, &[Direction::Forward; 2]);

        assert_eq!(seq.on_primary_click(), ClickOutcome::ToggledGift { open: true });
        assert_eq!(seq.position(), 2);
        assert!(!seq.is_throttled());
        assert_eq!(seq.on_primary_click(), ClickOutcome::ToggledGift { open: false });
    }

    #[test]
    fn click_during_cooldown_at_gift_is_ignored() {
        let mut seq = sequencer(3);
        seq.step(Direction::Forward);
        seq.tick(COOLDOWN);
        seq.step(Direction::Backward);
        assert_eq!(seq.position(), 0);
        assert_eq!(seq.on_primary_click(), ClickOutcome::Stepped(StepOutcome::Ignored));
    }

    #[test]
    fn cover_flip_lands_inside_cooldown() {
        let mut seq = sequencer(3);
        walk(&mut seq, &[Direction::Forward]);
        seq.step(Direction::Forward);
        assert_eq!(seq.scene(), Scene::BookOpen);
        let opened_at = seq.now_ms();

        seq.tick(opened_at + 299);
        assert!(!seq.stage().cover.has(Marker::Flipped));
        seq.tick(opened_at + 300);
        assert!(seq.stage().cover.has(Marker::Flipped));
        assert!(seq.is_throttled());

        seq.tick(opened_at + COOLDOWN);
        seq.step(Direction::Backward);
        assert_eq!(seq.scene(), Scene::BookShow);
        assert!(!seq.stage().cover.has(Marker::Flipped));
    }

    #[test]
    fn stale_cover_flip_is_cancelled_with_zero_cooldown() {
        let stage = Stage::new(3);
        let sequence = build_sequence(3, PageIndexing::ZeroBased);
        let app = Applicator::new(stage, MockAudio::paused(), MockFocus::default(), 300);
        let mut seq = Sequencer::starting_at(sequence, app, 0, 2);
        assert!(seq.applicator().cover_flip_pending());

        // with no cooldown the user can leave book-open before the flip
        seq.tick(0);
        assert_eq!(seq.step(Direction::Backward), StepOutcome::Advanced);
        seq.tick(1_000);
        assert_eq!(seq.scene(), Scene::BookShow);
        assert!(!seq.stage().cover.has(Marker::Flipped));
    }

    #[test]
    fn music_starts_once_book_shows() {
        let mut seq = sequencer(2);
        assert_eq!(seq.applicator().audio().play_calls, 0);
        walk(&mut seq, &[Direction::Forward]);
        assert_eq!(seq.applicator().audio().play_calls, 1);
        walk(&mut seq, &[Direction::Forward]);
        // already playing
        assert_eq!(seq.applicator().audio().play_calls, 1);
    }

    #[test]
    fn empty_book_reaches_finale_after_open() {
        let mut seq = sequencer(0);
        walk(&mut seq, &[Direction::Forward; 3]);
        assert_eq!(seq.scene(), Scene::Finale);
        assert!(seq.stage().flipped_pages().is_empty());
    }
}
