//! Normalization of arbitrary persisted input into a valid [`NotebookState`].
//!
//! Migration never fails. It walks a decoded JSON value of unknown shape
//! and builds a structurally complete state:
//!
//! | Input | Result |
//! |-------|--------|
//! | root not an object | empty notebook |
//! | array field missing / not an array | empty sequence |
//! | array entry not an object | entry dropped |
//! | string field missing / not a string | documented default |
//! | `id` missing, empty, or already used | freshly generated id |
//! | `x` / `y` not a number | `(80, 120)` |
//! | unknown fields | ignored |
//!
//! Empty strings are kept as stored (a page may legitimately have an empty
//! title), so migrating a state this crate wrote is a no-op.
//!
//! Migration does not touch the cursor beyond reading it; callers run
//! [`NotebookState::repair`] afterwards.

use crate::id::{IdKind, NodeId};
use crate::model::{BackgroundImage, NotebookState, Page, Section, StickyNote, Subsection, defaults};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Normalize `raw` into a notebook state.
pub fn migrate(raw: &Value) -> NotebookState {
    let Some(obj) = raw.as_object() else {
        log::warn!("persisted notebook is not an object; starting empty");
        return NotebookState::empty();
    };

    let mut m = Migrator::default();
    let state = NotebookState {
        sections: m.array(obj, "sections", Migrator::section),
        active_section_id: optional_id(obj, "activeSectionId"),
        active_subsection_id: optional_id(obj, "activeSubsectionId"),
        active_page_id: optional_id(obj, "activePageId"),
    };
    if m.regenerated > 0 || m.dropped > 0 {
        log::debug!(
            "migration regenerated {} ids, dropped {} malformed entries",
            m.regenerated,
            m.dropped
        );
    }
    state
}

#[derive(Default)]
struct Migrator {
    seen: HashSet<String>,
    regenerated: usize,
    dropped: usize,
}

impl Migrator {
    fn array<T>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        mut f: impl FnMut(&mut Self, &Map<String, Value>) -> T,
    ) -> Vec<T> {
        let Some(items) = obj.get(key).and_then(Value::as_array) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item.as_object() {
                Some(entry) => out.push(f(self, entry)),
                None => self.dropped += 1,
            }
        }
        out
    }

    fn id(&mut self, obj: &Map<String, Value>, kind: IdKind) -> NodeId {
        if let Some(id) = obj.get("id").and_then(Value::as_str)
            && !id.is_empty()
            && self.seen.insert(id.to_string())
        {
            return NodeId::from_raw(id);
        }
        self.regenerated += 1;
        let id = NodeId::generate(kind);
        self.seen.insert(id.as_str().to_string());
        id
    }

    fn section(&mut self, obj: &Map<String, Value>) -> Section {
        Section {
            id: self.id(obj, IdKind::Section),
            name: string_or(obj, "name", defaults::MIGRATED_SECTION_NAME),
            color: string_or(obj, "color", defaults::SECTION_COLOR),
            background_image: obj
                .get("backgroundImage")
                .and_then(Value::as_str)
                .map(BackgroundImage::classify)
                .unwrap_or_default(),
            pages: self.array(obj, "pages", Self::page),
            subsections: self.array(obj, "subsections", Self::subsection),
        }
    }

    fn subsection(&mut self, obj: &Map<String, Value>) -> Subsection {
        Subsection {
            id: self.id(obj, IdKind::Subsection),
            name: string_or(obj, "name", defaults::MIGRATED_SUBSECTION_NAME),
            pages: self.array(obj, "pages", Self::page),
        }
    }

    fn page(&mut self, obj: &Map<String, Value>) -> Page {
        Page {
            id: self.id(obj, IdKind::Page),
            title: string_or(obj, "title", defaults::PAGE_TITLE),
            bg_color: string_or(obj, "bgColor", defaults::PAGE_BG),
            content: string_or(obj, "content", ""),
            ink: string_or(obj, "ink", ""),
            sticky_notes: self.array(obj, "stickyNotes", Self::sticky),
        }
    }

    fn sticky(&mut self, obj: &Map<String, Value>) -> StickyNote {
        StickyNote {
            id: self.id(obj, IdKind::Sticky),
            text: string_or(obj, "text", ""),
            color: string_or(obj, "color", defaults::STICKY_PALETTE[0]),
            text_color: string_or(obj, "textColor", defaults::STICKY_TEXT_COLOR),
            emoji: string_or(obj, "emoji", defaults::STICKY_EMOJI),
            x: number_or(obj, "x", defaults::STICKY_X),
            y: number_or(obj, "y", defaults::STICKY_Y),
        }
    }
}

fn string_or(obj: &Map<String, Value>, key: &str, fallback: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

fn number_or(obj: &Map<String, Value>, key: &str, fallback: f64) -> f64 {
    obj.get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(fallback)
}

fn optional_id(obj: &Map<String, Value>, key: &str) -> Option<NodeId> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(NodeId::from_raw)
}
