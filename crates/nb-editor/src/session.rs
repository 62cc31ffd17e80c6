//! The editing session: one notebook, one ink surface, one store.
//!
//! `Session` is the surface the shell talks to. It owns the authoritative
//! [`NotebookState`] and keeps the ink surface bound to the active page:
//!
//! - **Structure**: every tree mutation that changes something is saved
//!   immediately. Stale ids are no-ops and are not saved.
//! - **Ink**: pointer events feed the [`InkTool`]; when a stroke ends, the
//!   whole surface is snapshotted into the active page and saved.
//! - **Page switches**: a stroke in progress is committed to the page it was
//!   drawn on before the cursor moves, then the surface is resynced to the
//!   new page's snapshot. While the layout is zero-sized the surface cannot
//!   be resynced; it is cleared and left unbound, and ink is neither
//!   captured nor committed until a real resync binds it to the active page.

use crate::config::SessionConfig;
use crate::input::InputEvent;
use crate::tools::{InkTool, ToolOutcome};
use nb_core::{
    BackgroundImage, KeyValueStore, NodeId, NotebookState, Page, PageRef, Result, StickyPatch,
    StoreError, load_state, save_state,
};
use nb_ink::{InkMode, InkSurface, Resync, SurfaceSize, resync};

pub struct Session {
    state: NotebookState,
    surface: InkSurface,
    tool: InkTool,
    store: Box<dyn KeyValueStore>,
    config: SessionConfig,
    /// Last layout size reported by the shell, in logical pixels.
    layout: (f32, f32),
    /// Page whose ink the surface currently holds.
    bound: Option<PageRef>,
}

impl Session {
    /// Load the notebook from `store`, falling back to the starter document.
    pub fn open(store: Box<dyn KeyValueStore>, config: SessionConfig) -> Self {
        let state = load_state(store.as_ref(), &config.storage_key);
        log::debug!(
            "opened notebook: {} sections, {} pages",
            state.sections.len(),
            state.all_pages().count()
        );
        Self {
            state,
            surface: InkSurface::new(),
            tool: InkTool::new(config.pen()),
            store,
            config,
            layout: (0.0, 0.0),
            bound: None,
        }
    }

    pub fn state(&self) -> &NotebookState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn surface(&self) -> &InkSurface {
        &self.surface
    }

    pub fn tool(&self) -> &InkTool {
        &self.tool
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.state.active_page()
    }

    /// Write the whole notebook to the store.
    pub fn save(&mut self) -> std::result::Result<(), StoreError> {
        save_state(self.store.as_mut(), &self.config.storage_key, &self.state)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            log::warn!("failed to save notebook: {e}");
        }
    }

    // ─── Structure ───────────────────────────────────────────────────────

    /// Commit any stroke in progress and remember where the cursor was.
    fn begin_structural(&mut self) -> Option<PageRef> {
        self.flush_stroke();
        self.state.active_ref()
    }

    /// Save after a structural change and follow the cursor with the surface.
    fn end_structural(&mut self, before: Option<PageRef>, changed: bool) {
        if !changed {
            return;
        }
        self.persist();
        if self.state.active_ref() != before {
            self.resync_ink();
        }
    }

    pub fn create_section(&mut self, name: &str, color: &str) -> NodeId {
        let before = self.begin_structural();
        let id = self.state.create_section(name, color).id.clone();
        self.end_structural(before, true);
        id
    }

    pub fn create_subsection(
        &mut self,
        section_id: &NodeId,
        name: &str,
        page_bg: &str,
    ) -> Option<NodeId> {
        let before = self.begin_structural();
        let id = self
            .state
            .create_subsection(section_id, name, page_bg)
            .map(|s| s.id.clone());
        self.end_structural(before, id.is_some());
        id
    }

    pub fn create_page(
        &mut self,
        section_id: &NodeId,
        subsection_id: Option<&NodeId>,
        title: &str,
        bg_color: &str,
    ) -> Option<NodeId> {
        let before = self.begin_structural();
        let id = self
            .state
            .create_page(section_id, subsection_id, title, bg_color)
            .map(|p| p.id.clone());
        self.end_structural(before, id.is_some());
        id
    }

    pub fn delete_section(&mut self, id: &NodeId) -> bool {
        let before = self.begin_structural();
        let changed = self.state.delete_section(id);
        self.end_structural(before, changed);
        changed
    }

    pub fn delete_subsection(&mut self, section_id: &NodeId, id: &NodeId) -> bool {
        let before = self.begin_structural();
        let changed = self.state.delete_subsection(section_id, id);
        self.end_structural(before, changed);
        changed
    }

    pub fn delete_page(
        &mut self,
        section_id: &NodeId,
        subsection_id: Option<&NodeId>,
        id: &NodeId,
    ) -> bool {
        let before = self.begin_structural();
        let changed = self.state.delete_page(section_id, subsection_id, id);
        self.end_structural(before, changed);
        changed
    }

    /// Open a specific page.
    pub fn select_page(
        &mut self,
        section_id: &NodeId,
        subsection_id: Option<&NodeId>,
        page_id: &NodeId,
    ) -> Result<()> {
        let before = self.begin_structural();
        let result = self.state.set_active(section_id, subsection_id, page_id);
        self.end_structural(before, result.is_ok());
        result
    }

    pub fn select_section(&mut self, id: &NodeId) -> Option<PageRef> {
        let before = self.begin_structural();
        let at = self.state.select_section(id);
        self.end_structural(before, at.is_some());
        at
    }

    pub fn select_subsection(&mut self, section_id: &NodeId, id: &NodeId) -> Option<PageRef> {
        let before = self.begin_structural();
        let at = self.state.select_subsection(section_id, id);
        self.end_structural(before, at.is_some());
        at
    }

    // ─── Sections and pages ──────────────────────────────────────────────

    pub fn set_section_color(&mut self, id: &NodeId, color: &str) -> bool {
        let changed = self.state.update_section_color(id, color);
        if changed {
            self.persist();
        }
        changed
    }

    pub fn set_section_background(&mut self, id: &NodeId, background: BackgroundImage) -> bool {
        let changed = self.state.update_section_background(id, background);
        if changed {
            self.persist();
        }
        changed
    }

    /// Apply `edit` to the active page and save if it resolved.
    fn edit_active(&mut self, edit: impl FnOnce(&mut NotebookState, &PageRef) -> bool) -> bool {
        let Some(at) = self.state.active_ref() else {
            return false;
        };
        let changed = edit(&mut self.state, &at);
        if changed {
            self.persist();
        }
        changed
    }

    pub fn set_page_title(&mut self, title: &str) -> bool {
        self.edit_active(|state, at| state.update_page_title(at, title))
    }

    pub fn set_page_background(&mut self, bg_color: &str) -> bool {
        self.edit_active(|state, at| state.update_page_background(at, bg_color))
    }

    pub fn page_content(&self) -> &str {
        self.active_page().map(|p| p.content.as_str()).unwrap_or_default()
    }

    pub fn set_page_content(&mut self, content: &str) -> bool {
        self.edit_active(|state, at| state.set_page_content(at, content))
    }

    // ─── Sticky notes ────────────────────────────────────────────────────

    /// Add a note to the active page, placed against a page of `page_width`
    /// logical pixels.
    pub fn add_sticky_note(&mut self, page_width: f64) -> Option<NodeId> {
        let mut added = None;
        self.edit_active(|state, at| {
            added = state.add_sticky_note(at, page_width);
            added.is_some()
        });
        added
    }

    pub fn update_sticky_note(&mut self, id: &NodeId, patch: StickyPatch) -> bool {
        self.edit_active(|state, at| state.update_sticky_note(at, id, patch))
    }

    pub fn move_sticky_note(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        self.edit_active(|state, at| state.move_sticky_note(at, id, x, y))
    }

    pub fn remove_sticky_note(&mut self, id: &NodeId) -> bool {
        self.edit_active(|state, at| state.remove_sticky_note(at, id))
    }

    // ─── Ink ─────────────────────────────────────────────────────────────

    pub fn mode(&self) -> InkMode {
        self.tool.mode()
    }

    /// Switch between writing, drawing and erasing. A stroke in progress is
    /// committed first.
    pub fn set_mode(&mut self, mode: InkMode) {
        if self.tool.set_mode(mode) {
            self.commit_ink();
        }
    }

    pub fn set_pen_color(&mut self, hex: &str) {
        self.tool.pen_mut().color = nb_ink::Color::from_hex_or_black(hex);
        self.config.pen_color = hex.to_string();
    }

    pub fn set_pen_size(&mut self, size: f32) {
        if size > 0.0 {
            self.tool.pen_mut().size = size;
            self.config.pen_size = size;
        }
    }

    /// Whether the surface holds the active page's ink.
    pub fn is_surface_bound(&self) -> bool {
        self.bound.is_some() && self.bound == self.state.active_ref()
    }

    /// Route a pointer event to the ink tool. A finished stroke is
    /// snapshotted into the active page.
    pub fn pointer(&mut self, event: &InputEvent) -> ToolOutcome {
        if !self.tool.is_capturing() && !self.is_surface_bound() {
            return ToolOutcome::Ignored;
        }
        let outcome = self.tool.handle(event, &mut self.surface);
        if outcome == ToolOutcome::Finished {
            self.commit_ink();
        }
        outcome
    }

    fn flush_stroke(&mut self) {
        if self.tool.finish() {
            self.commit_ink();
        }
    }

    /// Snapshot the surface into the active page and save.
    pub fn commit_ink(&mut self) {
        if self.surface.pixel_width() == 0 || self.surface.pixel_height() == 0 {
            return;
        }
        if !self.is_surface_bound() {
            log::debug!("surface not bound to the active page; ink not committed");
            return;
        }
        let snapshot = match self.surface.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("failed to snapshot ink: {e}");
                return;
            }
        };
        self.edit_active(|state, at| state.set_page_ink(at, snapshot));
    }

    /// The active page's persisted ink snapshot, empty when it has none.
    pub fn ink_snapshot(&self) -> &str {
        self.active_page().map(|p| p.ink.as_str()).unwrap_or_default()
    }

    /// Replace the active page's ink with a raster produced elsewhere and
    /// repaint the surface from it.
    pub fn submit_ink(&mut self, snapshot: String) -> bool {
        self.tool.finish();
        let changed = self.edit_active(|state, at| state.set_page_ink(at, snapshot));
        if changed {
            self.resync_ink();
        }
        changed
    }

    /// Erase all ink on the active page.
    pub fn clear_ink(&mut self) -> bool {
        self.tool.finish();
        self.surface.clear();
        self.edit_active(|state, at| state.set_page_ink(at, String::new()))
    }

    /// The page area changed size.
    pub fn resize(&mut self, width: f32, height: f32) -> Resync {
        self.flush_stroke();
        self.layout = (width, height);
        self.resync_ink()
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) -> Resync {
        self.flush_stroke();
        self.config.device_pixel_ratio = ratio;
        self.resync_ink()
    }

    /// Rebind the surface to the current layout and repaint the active page.
    ///
    /// A zero-sized layout keeps the buffer, but if the cursor has moved off
    /// the page the surface was bound to, its pixels are cleared so no other
    /// page's ink can be shown or committed.
    fn resync_ink(&mut self) -> Resync {
        let size = SurfaceSize::new(self.layout.0, self.layout.1, self.config.device_pixel_ratio);
        let active = self.state.active_ref();
        let ink = self
            .state
            .active_page()
            .map(|p| p.ink.as_str())
            .unwrap_or_default();
        let outcome = resync(&mut self.surface, size, ink);
        if outcome == Resync::Skipped {
            if self.bound != active {
                self.surface.clear();
                self.bound = None;
            }
        } else {
            self.bound = active;
        }
        outcome
    }
}
