//! Stage — the fixed element tree the presentation manipulates.
//!
//! Holds the three top-level sections, the gift box, the storybook
//! container, the focusable book, its cover and the content pages.
//! Each element carries a set of presentation markers and an optional
//! stacking order. Every real change bumps the element's mutation
//! counter; writes that change nothing are not counted.

use std::collections::BTreeSet;

/// Top-level section of the presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Gift,
    Book,
    Finale,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Gift, Section::Book, Section::Finale];
}

/// Presentation markers toggled on elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    Active,
    Open,
    Visible,
    Opening,
    Flipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Section(Section),
    GiftBox,
    /// Outer storybook container (visible / opening / open)
    Container,
    /// Inner book, the focus target
    Book,
    Cover,
    Page(usize),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    markers: BTreeSet<Marker>,
    pub z_index: Option<i32>,
    mutations: u32,
}

impl Element {
    fn new(id: ElementId, z_index: Option<i32>) -> Self {
        Self {
            id,
            markers: BTreeSet::new(),
            z_index,
            mutations: 0,
        }
    }

    pub fn has(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    /// Add or remove a marker. Returns true if the element changed.
    pub fn set(&mut self, marker: Marker, on: bool) -> bool {
        let changed = if on {
            self.markers.insert(marker)
        } else {
            self.markers.remove(&marker)
        };
        if changed {
            self.mutations += 1;
        }
        changed
    }

    pub fn toggle(&mut self, marker: Marker) -> bool {
        let on = !self.has(marker);
        self.set(marker, on);
        on
    }

    /// Set the stacking order. Returns true if it changed.
    pub fn set_z_index(&mut self, z: i32) -> bool {
        if self.z_index == Some(z) {
            return false;
        }
        self.z_index = Some(z);
        self.mutations += 1;
        true
    }

    /// Number of effective marker / stacking changes so far
    pub fn mutations(&self) -> u32 {
        self.mutations
    }
}

/// The whole managed element tree
#[derive(Debug, Clone)]
pub struct Stage {
    sections: [Element; 3],
    pub gift_box: Element,
    pub container: Element,
    pub book: Element,
    pub cover: Element,
    pages: Vec<Element>,
    /// Stacking order each page had when the stage was built
    original_z: Vec<i32>,
}

impl Stage {
    /// Build a stage with `page_count` content pages. Unturned pages are
    /// stacked with the first page on top.
    pub fn new(page_count: usize) -> Self {
        let original_z: Vec<i32> = (0..page_count).map(|i| (page_count - i) as i32).collect();
        let pages = original_z
            .iter()
            .enumerate()
            .map(|(i, z)| Element::new(ElementId::Page(i), Some(*z)))
            .collect();
        Self {
            sections: Section::ALL.map(|s| Element::new(ElementId::Section(s), None)),
            gift_box: Element::new(ElementId::GiftBox, None),
            container: Element::new(ElementId::Container, None),
            book: Element::new(ElementId::Book, None),
            cover: Element::new(ElementId::Cover, None),
            pages,
            original_z,
        }
    }

    /// Number of content pages found in the book
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn section(&self, section: Section) -> &Element {
        &self.sections[section as usize]
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Element {
        &mut self.sections[section as usize]
    }

    /// The section carrying the active marker, if exactly one does
    pub fn active_section(&self) -> Option<Section> {
        let mut active = Section::ALL
            .into_iter()
            .filter(|s| self.section(*s).has(Marker::Active));
        match (active.next(), active.next()) {
            (Some(s), None) => Some(s),
            _ => None,
        }
    }

    pub fn page(&self, index: usize) -> Option<&Element> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.pages.get_mut(index)
    }

    pub fn pages(&self) -> &[Element] {
        &self.pages
    }

    pub fn original_z(&self, index: usize) -> Option<i32> {
        self.original_z.get(index).copied()
    }

    /// Indices of pages currently marked flipped, ascending
    pub fn flipped_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has(Marker::Flipped))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_stacks_on_top() {
        let stage = Stage::new(3);
        assert_eq!(stage.page_count(), 3);
        assert_eq!(stage.original_z(0), Some(3));
        assert_eq!(stage.original_z(2), Some(1));
        assert!(stage.flipped_pages().is_empty());
    }

    #[test]
    fn only_real_changes_count() {
        let mut stage = Stage::new(1);
        assert!(stage.cover.set(Marker::Flipped, true));
        assert!(!stage.cover.set(Marker::Flipped, true));
        assert_eq!(stage.cover.mutations(), 1);

        let page = stage.page_mut(0).unwrap();
        assert!(!page.set_z_index(1));
        assert!(page.set_z_index(100));
        assert_eq!(page.mutations(), 1);
    }

    #[test]
    fn toggle_flips_marker() {
        let mut stage = Stage::new(0);
        assert!(stage.gift_box.toggle(Marker::Open));
        assert!(stage.gift_box.has(Marker::Open));
        assert!(!stage.gift_box.toggle(Marker::Open));
        assert!(!stage.gift_box.has(Marker::Open));
    }

    #[test]
    fn active_section_requires_exactly_one() {
        let mut stage = Stage::new(0);
        assert_eq!(stage.active_section(), None);
        stage.section_mut(Section::Book).set(Marker::Active, true);
        assert_eq!(stage.active_section(), Some(Section::Book));
        stage.section_mut(Section::Finale).set(Marker::Active, true);
        assert_eq!(stage.active_section(), None);
    }
}
