//! Notebook document model.
//!
//! The document is a tree of owned collections: the root holds sections,
//! a section holds pages and subsections, a subsection holds pages. No
//! entity references another horizontally and none is shared between two
//! parents, so removing a node from its parent's `Vec` discards its whole
//! subtree.
//!
//! The serde layout matches the persisted record exactly (camelCase keys,
//! every field always written).

use crate::id::{IdKind, NodeId};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Defaults used when creating entities and when migrating old state.
pub mod defaults {
    pub const PAGE_BG: &str = "#f6f1ea";
    pub const SECTION_COLOR: &str = "#5f7f74";
    pub const PAGE_TITLE: &str = "Untitled page";
    pub const NEW_SECTION_NAME: &str = "New section";
    pub const NEW_SUBSECTION_NAME: &str = "New subsection";
    pub const MIGRATED_SECTION_NAME: &str = "Untitled section";
    pub const MIGRATED_SUBSECTION_NAME: &str = "Untitled subsection";

    pub const STICKY_PALETTE: [&str; 6] = [
        "#fff1a8", "#ffe1d6", "#e2f4ff", "#e9f7d2", "#f9e7ff", "#ffeec5",
    ];
    pub const STICKY_TEXT_COLOR: &str = "#1f2a33";
    pub const STICKY_EMOJI: &str = "📝";
    pub const STICKY_X: f64 = 80.0;
    pub const STICKY_Y: f64 = 120.0;
}

// ─── Background image ────────────────────────────────────────────────────

/// A section's backdrop, classified once when it enters the model.
///
/// Persisted as a plain string (preset name, URL, or `data:` URL) and
/// parsed back into this variant on read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackgroundImage {
    #[default]
    None,
    /// One of the bundled assets, by file name (`cozy3.jpg`).
    Preset(String),
    /// An uploaded image carried inline.
    EmbeddedData { mime: String, bytes: Vec<u8> },
    /// Anything fetched by URL: `http(s)`, `blob:`, or an absolute path.
    RemoteUrl(String),
}

impl BackgroundImage {
    /// Bundled preset assets shipped with the notebook shell.
    pub const PRESETS: [&'static str; 10] = [
        "cozy1.jpg",
        "cozy2.jpg",
        "cozy3.jpg",
        "cozy4.jpg",
        "cozy5.jpg",
        "cozy6.jpg",
        "cozy7.jpg",
        "cozy8.jpg",
        "cozy9.jpg",
        "cozy10.jpg",
    ];

    /// Classify a stored string by its prefix.
    pub fn classify(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() {
            return BackgroundImage::None;
        }
        if value.starts_with("data:") {
            // Undecodable payloads are kept verbatim rather than dropped.
            return match parse_data_url(value) {
                Some((mime, bytes)) => BackgroundImage::EmbeddedData { mime, bytes },
                None => BackgroundImage::RemoteUrl(value.to_string()),
            };
        }
        if value.starts_with("blob:") || value.starts_with("http") || value.starts_with('/') {
            return BackgroundImage::RemoteUrl(value.to_string());
        }
        let name = value.strip_prefix("img/").unwrap_or(value);
        BackgroundImage::Preset(name.to_string())
    }

    /// Embed raw image bytes (e.g. from an upload).
    pub fn embedded(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        BackgroundImage::EmbeddedData {
            mime: mime.into(),
            bytes,
        }
    }

    /// The string form written to storage.
    pub fn to_stored(&self) -> String {
        match self {
            BackgroundImage::None => String::new(),
            BackgroundImage::Preset(name) => name.clone(),
            BackgroundImage::EmbeddedData { mime, bytes } => {
                format!("data:{mime};base64,{}", STANDARD.encode(bytes))
            }
            BackgroundImage::RemoteUrl(url) => url.clone(),
        }
    }

    /// URL the shell should load, or `None` when there is no backdrop.
    pub fn css_url(&self) -> Option<String> {
        match self {
            BackgroundImage::None => None,
            BackgroundImage::Preset(name) => Some(format!("img/{name}")),
            other => Some(other.to_stored()),
        }
    }

    /// True for a preset that is one of [`Self::PRESETS`].
    pub fn is_bundled_preset(&self) -> bool {
        matches!(self, BackgroundImage::Preset(name) if Self::PRESETS.contains(&name.as_str()))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BackgroundImage::None)
    }
}

/// Split `data:<mime>;base64,<payload>` into its mime type and bytes.
fn parse_data_url(value: &str) -> Option<(String, Vec<u8>)> {
    let rest = value.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

impl Serialize for BackgroundImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_stored())
    }
}

impl<'de> Deserialize<'de> for BackgroundImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(BackgroundImage::classify(&s))
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

/// A sticky note pinned to a page, in page-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub id: NodeId,
    pub text: String,
    pub color: String,
    pub text_color: String,
    pub emoji: String,
    pub x: f64,
    pub y: f64,
}

impl StickyNote {
    /// A blank note using palette slot `index` at `(x, y)`.
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Self {
            id: NodeId::generate(IdKind::Sticky),
            text: String::new(),
            color: defaults::STICKY_PALETTE[index % defaults::STICKY_PALETTE.len()].to_string(),
            text_color: defaults::STICKY_TEXT_COLOR.to_string(),
            emoji: defaults::STICKY_EMOJI.to_string(),
            x,
            y,
        }
    }
}

/// A leaf content unit: rich text, an ink snapshot, and sticky notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: NodeId,
    pub title: String,
    pub bg_color: String,
    /// Serialized rich-text markup. Opaque to the core.
    pub content: String,
    /// PNG data URL of the freehand layer, or empty.
    pub ink: String,
    pub sticky_notes: Vec<StickyNote>,
}

impl Page {
    pub fn new(title: impl Into<String>, bg_color: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(IdKind::Page),
            title: title.into(),
            bg_color: bg_color.into(),
            content: String::new(),
            ink: String::new(),
            sticky_notes: Vec::new(),
        }
    }

    /// The page synthesized whenever a container needs one.
    pub fn untitled() -> Self {
        Self::new(defaults::PAGE_TITLE, defaults::PAGE_BG)
    }

    pub fn sticky_note(&self, id: &NodeId) -> Option<&StickyNote> {
        self.sticky_notes.iter().find(|n| &n.id == id)
    }

    pub fn sticky_note_mut(&mut self, id: &NodeId) -> Option<&mut StickyNote> {
        self.sticky_notes.iter_mut().find(|n| &n.id == id)
    }
}

/// A second-level container of pages. Cannot nest further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    pub id: NodeId,
    pub name: String,
    pub pages: Vec<Page>,
}

impl Subsection {
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: NodeId::generate(IdKind::Subsection),
            name: name.into(),
            pages,
        }
    }
}

/// A top-level container: its own pages plus subsections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: NodeId,
    pub name: String,
    pub color: String,
    pub background_image: BackgroundImage,
    pub pages: Vec<Page>,
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn new(name: impl Into<String>, color: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: NodeId::generate(IdKind::Section),
            name: name.into(),
            color: color.into(),
            background_image: BackgroundImage::None,
            pages,
            subsections: Vec::new(),
        }
    }

    pub fn subsection(&self, id: &NodeId) -> Option<&Subsection> {
        self.subsections.iter().find(|s| &s.id == id)
    }

    pub fn subsection_mut(&mut self, id: &NodeId) -> Option<&mut Subsection> {
        self.subsections.iter_mut().find(|s| &s.id == id)
    }

    /// The page list of the section itself (`None`) or of one subsection.
    pub fn pages_in(&self, subsection_id: Option<&NodeId>) -> Option<&Vec<Page>> {
        match subsection_id {
            None => Some(&self.pages),
            Some(id) => self.subsection(id).map(|s| &s.pages),
        }
    }

    pub fn pages_in_mut(&mut self, subsection_id: Option<&NodeId>) -> Option<&mut Vec<Page>> {
        match subsection_id {
            None => Some(&mut self.pages),
            Some(id) => self.subsection_mut(id).map(|s| &mut s.pages),
        }
    }

    /// First page in depth-first order: own pages, then each subsection's.
    /// Returns the owning subsection id (if any) with the page id.
    pub fn first_page(&self) -> Option<(Option<NodeId>, NodeId)> {
        if let Some(page) = self.pages.first() {
            return Some((None, page.id.clone()));
        }
        self.subsections.iter().find_map(|sub| {
            sub.pages
                .first()
                .map(|page| (Some(sub.id.clone()), page.id.clone()))
        })
    }

    /// Every page owned by this section, own pages first.
    pub fn all_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages
            .iter()
            .chain(self.subsections.iter().flat_map(|s| s.pages.iter()))
    }
}

// ─── Cursor ──────────────────────────────────────────────────────────────

/// Address of one page: the active-selection triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRef {
    pub section_id: NodeId,
    pub subsection_id: Option<NodeId>,
    pub page_id: NodeId,
}

impl PageRef {
    pub fn new(section_id: NodeId, subsection_id: Option<NodeId>, page_id: NodeId) -> Self {
        Self {
            section_id,
            subsection_id,
            page_id,
        }
    }
}

// ─── Root ────────────────────────────────────────────────────────────────

/// The whole notebook: sections plus the active-selection cursor.
///
/// Invariant (restored by [`NotebookState::repair`] after every structural
/// mutation): if `sections` is non-empty, the three active ids resolve to an
/// existing page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookState {
    pub sections: Vec<Section>,
    pub active_section_id: Option<NodeId>,
    pub active_subsection_id: Option<NodeId>,
    pub active_page_id: Option<NodeId>,
}

impl NotebookState {
    /// A notebook with no sections and an empty cursor.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The document handed to first-time users.
    pub fn starter() -> Self {
        let engineering = Section::new(
            "Data Engineering",
            defaults::SECTION_COLOR,
            vec![Page::new("Pipeline plan", defaults::PAGE_BG)],
        );
        let science = Section::new(
            "Data Science",
            "#4a6f78",
            vec![Page::new("Model ideas", defaults::PAGE_BG)],
        );
        let active_section_id = Some(engineering.id.clone());
        let active_page_id = Some(engineering.pages[0].id.clone());
        Self {
            sections: vec![engineering, science],
            active_section_id,
            active_subsection_id: None,
            active_page_id,
        }
    }

    pub fn section(&self, id: &NodeId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn section_mut(&mut self, id: &NodeId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.id == id)
    }

    /// Resolve a page address.
    pub fn page(&self, at: &PageRef) -> Option<&Page> {
        self.section(&at.section_id)?
            .pages_in(at.subsection_id.as_ref())?
            .iter()
            .find(|p| p.id == at.page_id)
    }

    pub fn page_mut(&mut self, at: &PageRef) -> Option<&mut Page> {
        self.section_mut(&at.section_id)?
            .pages_in_mut(at.subsection_id.as_ref())?
            .iter_mut()
            .find(|p| p.id == at.page_id)
    }

    /// The cursor as an address, if all required ids are set.
    pub fn active_ref(&self) -> Option<PageRef> {
        Some(PageRef::new(
            self.active_section_id.clone()?,
            self.active_subsection_id.clone(),
            self.active_page_id.clone()?,
        ))
    }

    /// The page the cursor resolves to.
    pub fn active_page(&self) -> Option<&Page> {
        self.page(&self.active_ref()?)
    }

    pub fn active_page_mut(&mut self) -> Option<&mut Page> {
        let at = self.active_ref()?;
        self.page_mut(&at)
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.section(self.active_section_id.as_ref()?)
    }

    /// Whether the selection invariant currently holds.
    pub fn cursor_is_valid(&self) -> bool {
        self.sections.is_empty() || self.active_page().is_some()
    }

    /// Every page in the notebook in depth-first order.
    pub fn all_pages(&self) -> impl Iterator<Item = &Page> {
        self.sections.iter().flat_map(|s| s.all_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn background_classification_by_prefix() {
        assert_eq!(BackgroundImage::classify(""), BackgroundImage::None);
        assert_eq!(BackgroundImage::classify("   "), BackgroundImage::None);
        assert_eq!(
            BackgroundImage::classify("cozy3.jpg"),
            BackgroundImage::Preset("cozy3.jpg".into())
        );
        assert_eq!(
            BackgroundImage::classify("img/cozy3.jpg"),
            BackgroundImage::Preset("cozy3.jpg".into())
        );
        assert_eq!(
            BackgroundImage::classify("https://example.com/a.png"),
            BackgroundImage::RemoteUrl("https://example.com/a.png".into())
        );
        assert_eq!(
            BackgroundImage::classify("blob:abc"),
            BackgroundImage::RemoteUrl("blob:abc".into())
        );
        assert_eq!(
            BackgroundImage::classify("/static/bg.png"),
            BackgroundImage::RemoteUrl("/static/bg.png".into())
        );
    }

    #[test]
    fn embedded_background_decodes_and_reencodes() {
        let bg = BackgroundImage::classify("data:image/png;base64,AAEC");
        assert_eq!(bg, BackgroundImage::embedded("image/png", vec![0, 1, 2]));
        assert_eq!(bg.to_stored(), "data:image/png;base64,AAEC");
    }

    #[test]
    fn undecodable_data_url_is_kept_verbatim() {
        let raw = "data:image/png;base64,@@not-base64@@";
        let bg = BackgroundImage::classify(raw);
        assert_eq!(bg, BackgroundImage::RemoteUrl(raw.into()));
        assert_eq!(bg.to_stored(), raw);
    }

    #[test]
    fn preset_css_url_points_into_img_dir() {
        let bg = BackgroundImage::Preset("cozy1.jpg".into());
        assert!(bg.is_bundled_preset());
        assert_eq!(bg.css_url().as_deref(), Some("img/cozy1.jpg"));
        assert_eq!(BackgroundImage::None.css_url(), None);
        assert!(!BackgroundImage::Preset("mine.jpg".into()).is_bundled_preset());
    }

    #[test]
    fn serialized_layout_uses_camel_case_and_writes_every_field() {
        let state = NotebookState::starter();
        let value = serde_json::to_value(&state).unwrap();
        let section = &value["sections"][0];
        assert!(section["backgroundImage"].is_string());
        let page = &section["pages"][0];
        for key in ["id", "title", "bgColor", "content", "ink", "stickyNotes"] {
            assert!(page.get(key).is_some(), "missing {key}");
        }
        assert!(value["activeSubsectionId"].is_null());
        assert!(value["activePageId"].is_string());
    }

    #[test]
    fn first_page_prefers_own_pages_then_subsections() {
        let mut section = Section::new("S", defaults::SECTION_COLOR, vec![]);
        let empty_sub = Subsection::new("empty", vec![]);
        let sub = Subsection::new("full", vec![Page::untitled()]);
        let expected = (Some(sub.id.clone()), sub.pages[0].id.clone());
        section.subsections.push(empty_sub);
        section.subsections.push(sub);
        assert_eq!(section.first_page(), Some(expected));

        section.pages.push(Page::untitled());
        let own = section.pages[0].id.clone();
        assert_eq!(section.first_page(), Some((None, own)));
    }

    #[test]
    fn starter_state_cursor_is_valid() {
        let state = NotebookState::starter();
        assert_eq!(state.sections.len(), 2);
        assert!(state.cursor_is_valid());
        assert_eq!(state.active_page().unwrap().title, "Pipeline plan");
    }

    #[test]
    fn sticky_note_palette_wraps() {
        let note = StickyNote::new(7, 0.0, 0.0);
        assert_eq!(note.color, defaults::STICKY_PALETTE[1]);
        assert_eq!(note.emoji, defaults::STICKY_EMOJI);
    }
}
