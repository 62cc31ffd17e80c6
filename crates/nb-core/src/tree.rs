//! Structural operations on the document tree.
//!
//! Every public operation leaves [`NotebookState`] satisfying the selection
//! invariant. Operations aimed at ids that no longer exist (a stale UI
//! callback after a deletion, say) do nothing and report that through their
//! return value so the caller can skip the save.

use crate::error::{NotebookError, Result};
use crate::id::NodeId;
use crate::model::{BackgroundImage, NotebookState, Page, PageRef, Section, Subsection, defaults};

fn non_blank(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

impl NotebookState {
    // ─── Creation ────────────────────────────────────────────────────────

    /// Append a section holding one untitled page and make that page active.
    pub fn create_section(&mut self, name: &str, color: &str) -> &Section {
        let section = Section::new(
            non_blank(name, defaults::NEW_SECTION_NAME),
            non_blank(color, defaults::SECTION_COLOR),
            vec![Page::untitled()],
        );
        self.point_at(section.id.clone(), None, section.pages[0].id.clone());
        log::debug!("created section {} ({:?})", section.id, section.name);

        let idx = self.sections.len();
        self.sections.push(section);
        &self.sections[idx]
    }

    /// Append a subsection with one page to `section_id` and activate it.
    pub fn create_subsection(
        &mut self,
        section_id: &NodeId,
        name: &str,
        page_bg: &str,
    ) -> Option<&Subsection> {
        let Some(section) = self.sections.iter_mut().find(|s| &s.id == section_id) else {
            log::debug!("create_subsection: unknown section {section_id}");
            return None;
        };
        let page = Page::new(defaults::PAGE_TITLE, non_blank(page_bg, defaults::PAGE_BG));
        let subsection = Subsection::new(non_blank(name, defaults::NEW_SUBSECTION_NAME), vec![page]);
        let sub_id = subsection.id.clone();
        let page_id = subsection.pages[0].id.clone();
        section.subsections.push(subsection);

        self.point_at(section_id.clone(), Some(sub_id.clone()), page_id);
        log::debug!("created subsection {sub_id} in {section_id}");
        self.section(section_id)?.subsection(&sub_id)
    }

    /// Append a page to a section (or one of its subsections) and activate it.
    pub fn create_page(
        &mut self,
        section_id: &NodeId,
        subsection_id: Option<&NodeId>,
        title: &str,
        bg_color: &str,
    ) -> Option<&Page> {
        let Some(pages) = self
            .section_mut(section_id)
            .and_then(|s| s.pages_in_mut(subsection_id))
        else {
            log::debug!("create_page: unknown container {section_id}/{subsection_id:?}");
            return None;
        };
        let page = Page::new(
            non_blank(title, defaults::PAGE_TITLE),
            non_blank(bg_color, defaults::PAGE_BG),
        );
        let at = PageRef::new(section_id.clone(), subsection_id.cloned(), page.id.clone());
        pages.push(page);

        self.point_at(at.section_id.clone(), at.subsection_id.clone(), at.page_id.clone());
        log::debug!("created page {}", at.page_id);
        self.page(&at)
    }

    // ─── Deletion ────────────────────────────────────────────────────────

    /// Remove a section and everything it owns.
    pub fn delete_section(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.sections.iter().position(|s| &s.id == id) else {
            log::debug!("delete_section: unknown section {id}");
            return false;
        };
        let removed = self.sections.remove(index);
        log::debug!(
            "deleted section {id} ({} pages)",
            removed.all_pages().count()
        );

        if self.active_section_id.as_ref() == Some(id) {
            self.active_section_id = self.sections.first().map(|s| s.id.clone());
            self.active_subsection_id = None;
            self.active_page_id = None;
        }
        self.repair();
        true
    }

    /// Remove a subsection and its pages.
    pub fn delete_subsection(&mut self, section_id: &NodeId, id: &NodeId) -> bool {
        let Some(section) = self.section_mut(section_id) else {
            log::debug!("delete_subsection: unknown section {section_id}");
            return false;
        };
        let Some(index) = section.subsections.iter().position(|s| &s.id == id) else {
            log::debug!("delete_subsection: unknown subsection {id}");
            return false;
        };
        section.subsections.remove(index);
        log::debug!("deleted subsection {id}");

        if self.active_subsection_id.as_ref() == Some(id) {
            self.active_subsection_id = None;
            self.active_page_id = None;
        }
        self.repair();
        true
    }

    /// Remove one page from a section or subsection.
    pub fn delete_page(
        &mut self,
        section_id: &NodeId,
        subsection_id: Option<&NodeId>,
        id: &NodeId,
    ) -> bool {
        let Some(pages) = self
            .section_mut(section_id)
            .and_then(|s| s.pages_in_mut(subsection_id))
        else {
            log::debug!("delete_page: unknown container {section_id}/{subsection_id:?}");
            return false;
        };
        let Some(index) = pages.iter().position(|p| &p.id == id) else {
            log::debug!("delete_page: unknown page {id}");
            return false;
        };
        pages.remove(index);
        log::debug!("deleted page {id}");

        if self.active_page_id.as_ref() == Some(id) {
            self.active_page_id = None;
        }
        self.repair();
        true
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Point the cursor at a specific page.
    ///
    /// The only operation that may select a page other than the first in
    /// its container. Fails without mutating if the address is unknown.
    pub fn set_active(
        &mut self,
        section_id: &NodeId,
        subsection_id: Option<&NodeId>,
        page_id: &NodeId,
    ) -> Result<()> {
        let at = PageRef::new(section_id.clone(), subsection_id.cloned(), page_id.clone());
        if self.page(&at).is_none() {
            return Err(NotebookError::UnknownReference(format!(
                "{section_id}/{}/{page_id}",
                subsection_id.map(NodeId::as_str).unwrap_or("-")
            )));
        }
        self.point_at(at.section_id, at.subsection_id, at.page_id);
        Ok(())
    }

    /// Activate the first page of a section, creating one if it has none.
    pub fn select_section(&mut self, id: &NodeId) -> Option<PageRef> {
        let section = self.section_mut(id)?;
        let (sub_id, page_id) = match section.first_page() {
            Some(found) => found,
            None => {
                let page = Page::untitled();
                let page_id = page.id.clone();
                section.pages.push(page);
                (None, page_id)
            }
        };
        self.point_at(id.clone(), sub_id, page_id);
        self.active_ref()
    }

    /// Activate the first page of a subsection, creating one inside it if empty.
    pub fn select_subsection(&mut self, section_id: &NodeId, id: &NodeId) -> Option<PageRef> {
        let subsection = self.section_mut(section_id)?.subsection_mut(id)?;
        let page_id = match subsection.pages.first() {
            Some(page) => page.id.clone(),
            None => {
                let page = Page::untitled();
                let page_id = page.id.clone();
                subsection.pages.push(page);
                page_id
            }
        };
        self.point_at(section_id.clone(), Some(id.clone()), page_id);
        self.active_ref()
    }

    fn point_at(&mut self, section_id: NodeId, subsection_id: Option<NodeId>, page_id: NodeId) {
        self.active_section_id = Some(section_id);
        self.active_subsection_id = subsection_id;
        self.active_page_id = Some(page_id);
    }

    /// Restore the selection invariant.
    ///
    /// An empty tree gets a fallback section with one page. Otherwise an
    /// unknown active section falls back to the first section, an unknown
    /// subsection is dropped, and an unresolvable page is replaced by the
    /// first page of the active section in depth-first order, synthesizing
    /// one if the section holds none. Returns whether anything changed.
    pub fn repair(&mut self) -> bool {
        if self.sections.is_empty() {
            let fallback = Section::new(
                defaults::NEW_SECTION_NAME,
                defaults::SECTION_COLOR,
                vec![Page::untitled()],
            );
            log::debug!("repair: tree empty, synthesized section {}", fallback.id);
            self.point_at(fallback.id.clone(), None, fallback.pages[0].id.clone());
            self.sections.push(fallback);
            return true;
        }

        let before = (
            self.active_section_id.clone(),
            self.active_subsection_id.clone(),
            self.active_page_id.clone(),
        );

        let section_idx = match self
            .active_section_id
            .as_ref()
            .and_then(|id| self.sections.iter().position(|s| &s.id == id))
        {
            Some(idx) => idx,
            None => {
                self.active_section_id = Some(self.sections[0].id.clone());
                self.active_subsection_id = None;
                self.active_page_id = None;
                0
            }
        };

        if let Some(sub_id) = &self.active_subsection_id
            && self.sections[section_idx].subsection(sub_id).is_none()
        {
            self.active_subsection_id = None;
        }

        let mut synthesized = false;
        if self.active_page().is_none() {
            let section = &mut self.sections[section_idx];
            match section.first_page() {
                Some((sub_id, page_id)) => {
                    self.active_subsection_id = sub_id;
                    self.active_page_id = Some(page_id);
                }
                None => {
                    let page = Page::untitled();
                    log::debug!(
                        "repair: section {} empty, synthesized page {}",
                        section.id,
                        page.id
                    );
                    self.active_subsection_id = None;
                    self.active_page_id = Some(page.id.clone());
                    section.pages.push(page);
                    synthesized = true;
                }
            }
        }

        let after = (
            self.active_section_id.clone(),
            self.active_subsection_id.clone(),
            self.active_page_id.clone(),
        );
        if before != after {
            log::debug!("repair: cursor {before:?} -> {after:?}");
        }
        synthesized || before != after
    }

    // ─── Field updates ───────────────────────────────────────────────────

    pub fn update_section_color(&mut self, id: &NodeId, color: &str) -> bool {
        match self.section_mut(id) {
            Some(section) => {
                section.color = color.to_string();
                true
            }
            None => false,
        }
    }

    pub fn update_section_background(&mut self, id: &NodeId, background: BackgroundImage) -> bool {
        match self.section_mut(id) {
            Some(section) => {
                section.background_image = background;
                true
            }
            None => false,
        }
    }

    /// Set a page title. Surrounding whitespace is trimmed; an empty title
    /// is kept as-is (the shell displays a placeholder).
    pub fn update_page_title(&mut self, at: &PageRef, title: &str) -> bool {
        self.with_page(at, |page| page.title = title.trim().to_string())
    }

    pub fn update_page_background(&mut self, at: &PageRef, bg_color: &str) -> bool {
        self.with_page(at, |page| page.bg_color = bg_color.to_string())
    }

    /// Replace the opaque rich-text payload of a page.
    pub fn set_page_content(&mut self, at: &PageRef, content: &str) -> bool {
        self.with_page(at, |page| page.content = content.to_string())
    }

    /// Replace the ink snapshot of a page (empty string clears it).
    pub fn set_page_ink(&mut self, at: &PageRef, ink: String) -> bool {
        self.with_page(at, |page| page.ink = ink)
    }

    pub(crate) fn with_page(&mut self, at: &PageRef, f: impl FnOnce(&mut Page)) -> bool {
        match self.page_mut(at) {
            Some(page) => {
                f(page);
                true
            }
            None => {
                log::debug!("stale page reference {}", at.page_id);
                false
            }
        }
    }
}
