//! Visual applicator — turns the current scene into stage markers.
//!
//! `VisualState::for_scene` is a pure function of the scene and the page
//! count. `Applicator::apply` writes only the differences into the stage,
//! so CSS-style transitions on untouched pages are never restarted.

use crate::engine::timers::{Scheduler, TimerHandle};
use crate::game::ports::{ensure_music_plays, AudioPort, FocusPort};
use crate::game::scenes::Scene;
use crate::game::stage::{ElementId, Marker, Section, Stage};
use crate::game::TimerTask;

/// Stacking order of turned page `i` is `FLIPPED_Z_BASE + i`
pub const FLIPPED_Z_BASE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverState {
    Closed,
    /// Turns once the opening delay has passed
    FlipAfterDelay,
    Flipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerState {
    pub visible: bool,
    pub opening: bool,
    pub open: bool,
}

/// Everything the stage should show for one scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualState {
    pub section: Section,
    pub gift_open: bool,
    pub container: ContainerState,
    pub cover: CoverState,
    /// Pages `0..flipped_pages` are turned
    pub flipped_pages: usize,
}

impl VisualState {
    pub fn for_scene(scene: Scene, page_count: usize) -> Self {
        let fully_open = ContainerState {
            visible: true,
            opening: true,
            open: true,
        };
        match scene {
            Scene::Gift => Self {
                section: Section::Gift,
                gift_open: false,
                container: ContainerState::default(),
                cover: CoverState::Closed,
                flipped_pages: 0,
            },
            Scene::BookShow => Self {
                section: Section::Book,
                gift_open: false,
                container: ContainerState {
                    visible: true,
                    ..Default::default()
                },
                cover: CoverState::Closed,
                flipped_pages: 0,
            },
            Scene::BookOpen => Self {
                section: Section::Book,
                gift_open: false,
                container: ContainerState {
                    visible: true,
                    opening: true,
                    open: false,
                },
                cover: CoverState::FlipAfterDelay,
                flipped_pages: 0,
            },
            Scene::Page(k) => Self {
                section: Section::Book,
                gift_open: false,
                container: fully_open,
                cover: CoverState::Flipped,
                flipped_pages: (k + 1).min(page_count),
            },
            // The book stays open under the finale so rewinding to the
            // last page changes nothing but the section
            Scene::Finale => Self {
                section: Section::Finale,
                gift_open: false,
                container: fully_open,
                cover: CoverState::Flipped,
                flipped_pages: page_count,
            },
        }
    }
}

/// Applies scenes to the stage and drives the audio / focus ports
pub struct Applicator<A, F> {
    stage: Stage,
    audio: A,
    focus: F,
    cover_flip_delay_ms: u64,
    pending_flip: Option<TimerHandle>,
}

impl<A: AudioPort, F: FocusPort> Applicator<A, F> {
    pub fn new(stage: Stage, audio: A, focus: F, cover_flip_delay_ms: u64) -> Self {
        Self {
            stage,
            audio,
            focus,
            cover_flip_delay_ms,
            pending_flip: None,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn focus(&self) -> &F {
        &self.focus
    }

    /// Whether a delayed cover flip is still waiting to fire
    pub fn cover_flip_pending(&self) -> bool {
        self.pending_flip.is_some()
    }

    pub fn apply(&mut self, scene: Scene, timers: &mut Scheduler<TimerTask>) {
        let target = VisualState::for_scene(scene, self.stage.page_count());

        if let Some(handle) = self.pending_flip.take() {
            if timers.cancel(handle) {
                tracing::trace!("Cancelled pending cover flip");
            }
        }

        for section in Section::ALL {
            self.stage
                .section_mut(section)
                .set(Marker::Active, section == target.section);
        }
        self.stage.gift_box.set(Marker::Open, target.gift_open);

        let container = &mut self.stage.container;
        container.set(Marker::Visible, target.container.visible);
        container.set(Marker::Opening, target.container.opening);
        container.set(Marker::Open, target.container.open);

        match target.cover {
            CoverState::Closed => {
                self.stage.cover.set(Marker::Flipped, false);
            }
            CoverState::Flipped => {
                self.stage.cover.set(Marker::Flipped, true);
            }
            CoverState::FlipAfterDelay => {
                // Already turned when rewinding from a page scene
                if !self.stage.cover.has(Marker::Flipped) {
                    let handle = timers.schedule(self.cover_flip_delay_ms, TimerTask::FlipCover);
                    self.pending_flip = Some(handle);
                }
            }
        }

        self.apply_pages(target.flipped_pages);

        if scene.wants_music() {
            ensure_music_plays(&mut self.audio);
        }
        if scene.is_book() {
            if let Err(e) = self.focus.focus(ElementId::Book, true) {
                tracing::warn!("Could not focus the book: {}", e);
            }
        }

        tracing::debug!(
            "Applied scene {} ({} of {} pages turned)",
            scene,
            target.flipped_pages,
            self.stage.page_count()
        );
    }

    fn apply_pages(&mut self, flipped: usize) {
        for i in 0..self.stage.page_count() {
            let turned = i < flipped;
            let z = if turned {
                FLIPPED_Z_BASE + i as i32
            } else {
                self.stage.original_z(i).unwrap_or(0)
            };
            if let Some(page) = self.stage.page_mut(i) {
                page.set(Marker::Flipped, turned);
                page.set_z_index(z);
            }
        }
    }

    /// Scheduler callback for `TimerTask::FlipCover`. Stale handles are ignored.
    pub fn on_cover_flip_due(&mut self, handle: TimerHandle) {
        if self.pending_flip != Some(handle) {
            return;
        }
        self.pending_flip = None;
        self.stage.cover.set(Marker::Flipped, true);
        tracing::trace!("Cover flipped");
    }

    /// Cosmetic open/close of the gift box. Returns the new open state.
    pub fn toggle_gift_open(&mut self) -> bool {
        let open = self.stage.gift_box.toggle(Marker::Open);
        ensure_music_plays(&mut self.audio);
        open
    }
}
