//! Scene registry — the fixed, ordered list of presentation scenes.
//!
//! Layout of a sequence built for N content pages:
//!   0      gift       — wrapped gift box
//!   1      book-show  — storybook visible, cover closed
//!   2      book-open  — book opens, cover flips after a short delay
//!   3..    page-k     — one scene per turned page
//!   last   finale     — every page turned, closing section

use std::fmt;
use std::str::FromStr;

use giftbook_common::PageIndexing;

/// Which part of the presentation is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    Gift,
    BookShow,
    BookOpen,
    /// Zero-based index of the last turned page
    Page(usize),
    Finale,
}

impl Scene {
    /// Scenes that show the storybook (and receive focus)
    pub fn is_book(&self) -> bool {
        matches!(self, Scene::BookShow | Scene::BookOpen | Scene::Page(_))
    }

    /// Every scene past the gift tries to start the background music
    pub fn wants_music(&self) -> bool {
        !matches!(self, Scene::Gift)
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scene::Gift => f.write_str("gift"),
            Scene::BookShow => f.write_str("book-show"),
            Scene::BookOpen => f.write_str("book-open"),
            Scene::Page(k) => write!(f, "page-{}", k),
            Scene::Finale => f.write_str("finale"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scene name '{0}'")]
pub struct UnknownScene(pub String);

impl FromStr for Scene {
    type Err = UnknownScene;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gift" => Ok(Scene::Gift),
            "book-show" => Ok(Scene::BookShow),
            "book-open" => Ok(Scene::BookOpen),
            "finale" => Ok(Scene::Finale),
            _ => s
                .strip_prefix("page-")
                .and_then(|k| k.parse::<usize>().ok().filter(|n| n.to_string() == k))
                .map(Scene::Page)
                .ok_or_else(|| UnknownScene(s.to_string())),
        }
    }
}

/// Ordered, immutable scene list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    scenes: Vec<Scene>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always false — a sequence holds at least gift, book and finale scenes
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<Scene> {
        self.scenes.get(position).copied()
    }

    pub fn last_position(&self) -> usize {
        self.scenes.len().saturating_sub(1)
    }

    pub fn position_of(&self, scene: Scene) -> Option<usize> {
        self.scenes.iter().position(|s| *s == scene)
    }

    pub fn iter(&self) -> impl Iterator<Item = Scene> + '_ {
        self.scenes.iter().copied()
    }
}

/// Build the sequence for a book with `page_count` content pages
pub fn build_sequence(page_count: usize, indexing: PageIndexing) -> Sequence {
    let page_scenes = indexing.scene_pages(page_count);
    let mut scenes = Vec::with_capacity(4 + page_scenes);
    scenes.push(Scene::Gift);
    scenes.push(Scene::BookShow);
    scenes.push(Scene::BookOpen);
    scenes.extend((0..page_scenes).map(Scene::Page));
    scenes.push(Scene::Finale);
    tracing::debug!(
        "Scene sequence: {} scenes for {} pages ({})",
        scenes.len(),
        page_count,
        indexing.name()
    );
    Sequence { scenes }
}
