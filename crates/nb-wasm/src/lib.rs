//! WASM bridge for the notebook: exposes the session to the browser shell.
//!
//! Compiled via `wasm-pack build --target web`. The shell owns the DOM
//! (rich-text editor, sticky-note widgets, toolbars) and forwards pointer
//! events here; ink is composited in Rust and blitted onto a 2D canvas.

mod storage;

use nb_core::{BackgroundImage, MemoryStore, NodeId, StickyPatch};
use nb_editor::{InputEvent, PointerSample, Session, SessionConfig, ToolOutcome};
use nb_ink::InkMode;
use storage::LocalStorage;
use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, ImageData};

/// The main WASM-facing notebook controller.
#[wasm_bindgen]
pub struct Notebook {
    session: Session,
}

#[wasm_bindgen]
impl Notebook {
    /// Open the notebook persisted in `localStorage`.
    ///
    /// `config_json` is a `SessionConfig` object; missing fields take their
    /// defaults and an unparsable string is treated as `{}`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();

        let config: SessionConfig = if config_json.trim().is_empty() {
            SessionConfig::default()
        } else {
            serde_json::from_str(config_json).unwrap_or_else(|e| {
                log::warn!("invalid notebook config: {e}");
                SessionConfig::default()
            })
        };
        let session = match LocalStorage::from_window() {
            Some(store) => Session::open(Box::new(store), config),
            None => {
                log::warn!("localStorage unavailable; notebook will not persist");
                Session::open(Box::new(MemoryStore::new()), config)
            }
        };
        Self { session }
    }

    // ─── Reading ─────────────────────────────────────────────────────────

    /// The whole notebook in its persisted layout.
    pub fn get_state_json(&self) -> String {
        serde_json::to_string(self.session.state()).unwrap_or_else(|_| "{}".to_string())
    }

    /// The active page, or `null`.
    pub fn get_active_page_json(&self) -> String {
        serde_json::to_string(&self.session.active_page()).unwrap_or_else(|_| "null".to_string())
    }

    /// Displayable URL for a section's background image, if it has one.
    pub fn get_section_background_url(&self, section_id: &str) -> Option<String> {
        self.session
            .state()
            .section(&NodeId::from(section_id))
            .and_then(|s| s.background_image.css_url())
    }

    /// Names of the bundled background presets.
    pub fn get_background_presets(&self) -> js_sys::Array {
        BackgroundImage::PRESETS
            .iter()
            .map(|name| JsValue::from_str(name))
            .collect()
    }

    // ─── Structure ───────────────────────────────────────────────────────

    /// Returns the new section's id.
    pub fn create_section(&mut self, name: &str, color: &str) -> String {
        self.session.create_section(name, color).to_string()
    }

    /// Returns the new subsection's id, or an empty string for an unknown section.
    pub fn create_subsection(&mut self, section_id: &str, name: &str, page_bg: &str) -> String {
        self.session
            .create_subsection(&NodeId::from(section_id), name, page_bg)
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Returns the new page's id, or an empty string for an unknown container.
    pub fn create_page(
        &mut self,
        section_id: &str,
        subsection_id: Option<String>,
        title: &str,
        bg_color: &str,
    ) -> String {
        let sub = subsection_id.map(NodeId::from_raw);
        self.session
            .create_page(&NodeId::from(section_id), sub.as_ref(), title, bg_color)
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn delete_section(&mut self, section_id: &str) -> bool {
        self.session.delete_section(&NodeId::from(section_id))
    }

    pub fn delete_subsection(&mut self, section_id: &str, subsection_id: &str) -> bool {
        self.session
            .delete_subsection(&NodeId::from(section_id), &NodeId::from(subsection_id))
    }

    pub fn delete_page(
        &mut self,
        section_id: &str,
        subsection_id: Option<String>,
        page_id: &str,
    ) -> bool {
        let sub = subsection_id.map(NodeId::from_raw);
        self.session
            .delete_page(&NodeId::from(section_id), sub.as_ref(), &NodeId::from(page_id))
    }

    /// Returns `false` if the page no longer exists.
    pub fn select_page(
        &mut self,
        section_id: &str,
        subsection_id: Option<String>,
        page_id: &str,
    ) -> bool {
        let sub = subsection_id.map(NodeId::from_raw);
        match self
            .session
            .select_page(&NodeId::from(section_id), sub.as_ref(), &NodeId::from(page_id))
        {
            Ok(()) => true,
            Err(e) => {
                log::debug!("select_page: {e}");
                false
            }
        }
    }

    pub fn select_section(&mut self, section_id: &str) -> bool {
        self.session.select_section(&NodeId::from(section_id)).is_some()
    }

    pub fn select_subsection(&mut self, section_id: &str, subsection_id: &str) -> bool {
        self.session
            .select_subsection(&NodeId::from(section_id), &NodeId::from(subsection_id))
            .is_some()
    }

    // ─── Section and page fields ─────────────────────────────────────────

    pub fn set_section_color(&mut self, section_id: &str, color: &str) -> bool {
        self.session.set_section_color(&NodeId::from(section_id), color)
    }

    /// `image` is a preset name, an `img/` path, a URL, or a data URL.
    pub fn set_section_background(&mut self, section_id: &str, image: &str) -> bool {
        self.session
            .set_section_background(&NodeId::from(section_id), BackgroundImage::classify(image))
    }

    pub fn set_page_title(&mut self, title: &str) -> bool {
        self.session.set_page_title(title)
    }

    pub fn set_page_background(&mut self, bg_color: &str) -> bool {
        self.session.set_page_background(bg_color)
    }

    pub fn get_page_content(&self) -> String {
        self.session.page_content().to_string()
    }

    pub fn set_page_content(&mut self, content: &str) -> bool {
        self.session.set_page_content(content)
    }

    // ─── Sticky notes ────────────────────────────────────────────────────

    /// Returns the new note's id.
    pub fn add_sticky_note(&mut self, page_width: f64) -> String {
        self.session
            .add_sticky_note(page_width)
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// `patch_json` holds any of `text`, `color`, `textColor`, `emoji`.
    pub fn update_sticky_note(&mut self, note_id: &str, patch_json: &str) -> bool {
        let patch: StickyPatch = match serde_json::from_str(patch_json) {
            Ok(patch) => patch,
            Err(e) => {
                log::warn!("invalid sticky patch: {e}");
                return false;
            }
        };
        self.session.update_sticky_note(&NodeId::from(note_id), patch)
    }

    pub fn move_sticky_note(&mut self, note_id: &str, x: f64, y: f64) -> bool {
        self.session.move_sticky_note(&NodeId::from(note_id), x, y)
    }

    pub fn remove_sticky_note(&mut self, note_id: &str) -> bool {
        self.session.remove_sticky_note(&NodeId::from(note_id))
    }

    // ─── Ink ─────────────────────────────────────────────────────────────

    /// `"write"`, `"draw"` or `"erase"`. Returns `false` for anything else.
    pub fn set_mode(&mut self, mode: &str) -> bool {
        match serde_json::from_value::<InkMode>(serde_json::Value::String(mode.to_string())) {
            Ok(mode) => {
                self.session.set_mode(mode);
                true
            }
            Err(_) => false,
        }
    }

    pub fn get_mode(&self) -> String {
        let mode = match self.session.mode() {
            InkMode::Write => "write",
            InkMode::Draw => "draw",
            InkMode::Erase => "erase",
        };
        mode.to_string()
    }

    pub fn set_pen_color(&mut self, hex: &str) {
        self.session.set_pen_color(hex);
    }

    pub fn set_pen_size(&mut self, size: f32) {
        self.session.set_pen_size(size);
    }

    /// Handle pointer down. Returns true if a stroke started.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32, pressure: f32) -> bool {
        let event = InputEvent::from_pointer_down(x, y, Some(pressure));
        self.session.pointer(&event) == ToolOutcome::Started
    }

    /// Handle pointer move. Returns true if the surface changed.
    pub fn handle_pointer_move(&mut self, x: f32, y: f32, pressure: f32) -> bool {
        let event = InputEvent::from_pointer_move(x, y, Some(pressure));
        matches!(self.session.pointer(&event), ToolOutcome::Drew(n) if n > 0)
    }

    /// Handle a move carrying coalesced samples, flattened as
    /// `[x0, y0, p0, x1, y1, p1, ...]`.
    pub fn handle_pointer_move_coalesced(&mut self, samples: &[f32]) -> bool {
        let event = InputEvent::from_coalesced(
            samples
                .chunks_exact(3)
                .map(|s| PointerSample::new(s[0], s[1], Some(s[2]))),
        );
        matches!(self.session.pointer(&event), ToolOutcome::Drew(n) if n > 0)
    }

    /// Returns true if a stroke was finished and saved.
    pub fn handle_pointer_up(&mut self) -> bool {
        self.session.pointer(&InputEvent::PointerUp) == ToolOutcome::Finished
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.session.pointer(&InputEvent::PointerLeave) == ToolOutcome::Finished
    }

    pub fn handle_pointer_cancel(&mut self) -> bool {
        self.session.pointer(&InputEvent::PointerCancel) == ToolOutcome::Finished
    }

    pub fn get_ink_snapshot(&self) -> String {
        self.session.ink_snapshot().to_string()
    }

    pub fn submit_ink(&mut self, snapshot: String) -> bool {
        self.session.submit_ink(snapshot)
    }

    pub fn clear_ink(&mut self) -> bool {
        self.session.clear_ink()
    }

    /// The page area's layout size changed.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(width, height);
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.session.set_device_pixel_ratio(ratio);
    }

    /// Backing width in device pixels; the shell sizes the canvas to match.
    pub fn surface_width(&self) -> u32 {
        self.session.surface().pixel_width()
    }

    pub fn surface_height(&self) -> u32 {
        self.session.surface().pixel_height()
    }

    /// Copy the ink surface onto a 2D canvas context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let surface = self.session.surface();
        let (w, h) = (surface.pixel_width(), surface.pixel_height());
        if w == 0 || h == 0 {
            return Ok(());
        }
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(surface.pixels().as_raw().as_slice()),
            w,
            h,
        )?;
        ctx.put_image_data(&data, 0.0, 0.0)
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("notebook panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
