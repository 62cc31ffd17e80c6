//! Sticky-note collection on a page.
//!
//! The drag/resize/emoji UI lives in the shell; this module owns the
//! ordered collection and its add/update/move/remove operations.

use crate::id::NodeId;
use crate::model::{NotebookState, PageRef, StickyNote};
use serde::Deserialize;

/// Partial update of a sticky note. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StickyPatch {
    pub text: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub emoji: Option<String>,
}

impl StickyPatch {
    fn apply(self, note: &mut StickyNote) {
        if let Some(text) = self.text {
            note.text = text;
        }
        if let Some(color) = self.color {
            note.color = color;
        }
        if let Some(text_color) = self.text_color {
            note.text_color = text_color;
        }
        if let Some(emoji) = self.emoji {
            note.emoji = emoji;
        }
    }
}

/// Where the next note lands on a page of `page_width` logical pixels:
/// near the right edge, cascading down by 20px per existing note.
pub fn next_sticky_position(page_width: f64, existing: usize) -> (f64, f64) {
    let x = (page_width - 260.0).max(20.0);
    let y = 60.0 + existing as f64 * 20.0;
    (x, y)
}

impl NotebookState {
    /// Append a blank note to a page. Returns its id.
    pub fn add_sticky_note(&mut self, at: &PageRef, page_width: f64) -> Option<NodeId> {
        let page = self.page_mut(at)?;
        let index = page.sticky_notes.len();
        let (x, y) = next_sticky_position(page_width, index);
        let note = StickyNote::new(index, x, y);
        let id = note.id.clone();
        page.sticky_notes.push(note);
        log::debug!("added sticky {id} to page {}", at.page_id);
        Some(id)
    }

    pub fn update_sticky_note(&mut self, at: &PageRef, id: &NodeId, patch: StickyPatch) -> bool {
        match self.page_mut(at).and_then(|p| p.sticky_note_mut(id)) {
            Some(note) => {
                patch.apply(note);
                true
            }
            None => false,
        }
    }

    pub fn move_sticky_note(&mut self, at: &PageRef, id: &NodeId, x: f64, y: f64) -> bool {
        match self.page_mut(at).and_then(|p| p.sticky_note_mut(id)) {
            Some(note) => {
                note.x = x;
                note.y = y;
                true
            }
            None => false,
        }
    }

    pub fn remove_sticky_note(&mut self, at: &PageRef, id: &NodeId) -> bool {
        let Some(page) = self.page_mut(at) else {
            return false;
        };
        let before = page.sticky_notes.len();
        page.sticky_notes.retain(|n| &n.id != id);
        page.sticky_notes.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::defaults;

    #[test]
    fn notes_cascade_from_the_right_edge() {
        let mut state = NotebookState::starter();
        let at = state.active_ref().unwrap();
        let first = state.add_sticky_note(&at, 900.0).unwrap();
        let second = state.add_sticky_note(&at, 900.0).unwrap();

        let page = state.page(&at).unwrap();
        let a = page.sticky_note(&first).unwrap();
        let b = page.sticky_note(&second).unwrap();
        assert_eq!((a.x, a.y), (640.0, 60.0));
        assert_eq!((b.x, b.y), (640.0, 80.0));
        assert_eq!(a.color, defaults::STICKY_PALETTE[0]);
        assert_eq!(b.color, defaults::STICKY_PALETTE[1]);
    }

    #[test]
    fn narrow_pages_clamp_x() {
        assert_eq!(next_sticky_position(100.0, 0), (20.0, 60.0));
    }

    #[test]
    fn patch_touches_only_given_fields() {
        let mut state = NotebookState::starter();
        let at = state.active_ref().unwrap();
        let id = state.add_sticky_note(&at, 800.0).unwrap();
        let patch = StickyPatch {
            text: Some("call back".into()),
            emoji: Some("🔥".into()),
            ..Default::default()
        };
        assert!(state.update_sticky_note(&at, &id, patch));

        let note = state.page(&at).unwrap().sticky_note(&id).unwrap();
        assert_eq!(note.text, "call back");
        assert_eq!(note.emoji, "🔥");
        assert_eq!(note.text_color, defaults::STICKY_TEXT_COLOR);
    }

    #[test]
    fn move_and_remove() {
        let mut state = NotebookState::starter();
        let at = state.active_ref().unwrap();
        let id = state.add_sticky_note(&at, 800.0).unwrap();
        assert!(state.move_sticky_note(&at, &id, 12.5, 40.0));
        let note = state.page(&at).unwrap().sticky_note(&id).unwrap();
        assert_eq!((note.x, note.y), (12.5, 40.0));

        assert!(state.remove_sticky_note(&at, &id));
        assert!(!state.remove_sticky_note(&at, &id));
        assert!(state.page(&at).unwrap().sticky_notes.is_empty());
    }

    #[test]
    fn unknown_note_is_a_noop() {
        let mut state = NotebookState::starter();
        let at = state.active_ref().unwrap();
        let ghost = NodeId::from("sticky-ghost");
        assert!(!state.move_sticky_note(&at, &ghost, 1.0, 1.0));
        assert!(!state.update_sticky_note(&at, &ghost, StickyPatch::default()));
    }
}
