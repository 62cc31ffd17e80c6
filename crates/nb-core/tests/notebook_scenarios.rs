//! Integration tests: end-to-end notebook scenarios through the gateway.

use nb_core::*;
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn new_section_in_empty_tree_is_selected() {
    init_logging();
    let mut state = NotebookState::empty();
    let section = state.create_section("Work", "#123456");
    let page_id = section.pages[0].id.clone();

    assert_eq!(state.sections.len(), 1);
    assert_eq!(state.all_pages().count(), 1);
    assert_eq!(state.active_page().map(|p| &p.id), Some(&page_id));
}

#[test]
fn deleting_selected_second_page_selects_first() {
    init_logging();
    let mut state = NotebookState::empty();
    let sid = state.create_section("S", "#000000").id.clone();
    let p1 = state.sections[0].pages[0].id.clone();
    state.update_page_title(&state.active_ref().unwrap(), "P1");
    let p2 = state.create_page(&sid, None, "P2", "").unwrap().id.clone();

    state.set_active(&sid, None, &p2).unwrap();
    assert!(state.delete_page(&sid, None, &p2));

    let active = state.active_page().unwrap();
    assert_eq!(active.id, p1);
    assert_eq!(active.title, "P1");
}

#[test]
fn deleting_last_section_synthesizes_fallback() {
    init_logging();
    let mut state = NotebookState::empty();
    let sid = state.create_section("Only", "#000000").id.clone();
    assert!(state.delete_section(&sid));

    assert_eq!(state.sections.len(), 1);
    assert_eq!(state.sections[0].pages.len(), 1);
    assert_eq!(state.active_section_id.as_ref(), Some(&state.sections[0].id));
    assert!(state.cursor_is_valid());
}

#[test]
fn legacy_payload_survives_load_save_cycle() {
    init_logging();
    let legacy = r#"{
        "sections": [
            {
                "id": "section-old",
                "name": "Archive",
                "backgroundImage": "img/cozy2.jpg",
                "pages": [{ "id": "page-old", "title": "Notes", "content": "<b>hi</b>" }]
            }
        ],
        "activeSectionId": "section-old",
        "activePageId": "page-old",
        "theme": "dark"
    }"#;
    let mut store = MemoryStore::with_slot(DEFAULT_STORAGE_KEY, legacy);
    let state = load_state(&store, DEFAULT_STORAGE_KEY);

    assert_eq!(state.active_page().unwrap().content, "<b>hi</b>");
    assert_eq!(state.sections[0].subsections, vec![]);
    assert_eq!(state.sections[0].color, defaults::SECTION_COLOR);
    assert_eq!(
        state.sections[0].background_image,
        BackgroundImage::Preset("cozy2.jpg".into())
    );

    save_state(&mut store, DEFAULT_STORAGE_KEY, &state).unwrap();
    let raw = store.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    let written: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(written["sections"][0]["backgroundImage"], "cozy2.jpg");
    assert_eq!(written["sections"][0]["pages"][0]["bgColor"], "#f6f1ea");
    assert!(written.get("theme").is_none());
    assert_eq!(load_state(&store, DEFAULT_STORAGE_KEY), state);
}

#[test]
fn subsection_workflow() {
    init_logging();
    let mut state = NotebookState::starter();
    let sid = state.sections[0].id.clone();
    let sub = state.create_subsection(&sid, "Drafts", "#fafafa").unwrap().id.clone();
    let extra = state
        .create_page(&sid, Some(&sub), "Second draft", "")
        .unwrap()
        .id
        .clone();
    assert_eq!(state.active_subsection_id.as_ref(), Some(&sub));
    assert_eq!(state.active_page_id.as_ref(), Some(&extra));

    assert!(state.delete_subsection(&sid, &sub));
    assert_eq!(state.active_subsection_id, None);
    assert_eq!(state.active_page().unwrap().title, "Pipeline plan");
}
