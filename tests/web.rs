// Browser tests: wire a minimal page and drive it through the exported entrypoints.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlButtonElement, HtmlElement};

use valentine_page::{show_screen, start_page};

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r#"
<div id="screen-intro" class="screen"><div id="start-envelope"></div></div>
<div id="screen-question" class="screen">
  <button id="yes-btn">Yes</button><button id="no-btn">No</button>
</div>
<div id="screen-verification" class="screen"><div id="robot-checkbox"><div id="checkbox"></div></div></div>
<div id="screen-loading" class="screen"><div id="progress-fill"></div></div>
<div id="screen-puzzle" class="screen">
  <div id="image-grid"></div>
  <button id="refresh-btn"></button><button id="audio-btn"></button><button id="info-btn"></button>
  <button id="verify-btn">Verify</button>
</div>
<div id="screen-success" class="screen"><span class="pixel-heart"></span></div>
<button id="home-btn"></button>
"#;

fn document() -> Document {
    web_sys::window().and_then(|w| w.document()).expect("document available")
}

fn element(id: &str) -> HtmlElement {
    document().get_element_by_id(id).and_then(|e| e.dyn_into().ok()).expect(id)
}

fn is_active(id: &str) -> bool {
    element(id).class_list().contains("active")
}

fn mount() {
    document().body().expect("body").set_inner_html(PAGE);
    start_page().expect("page starts");
}

#[wasm_bindgen_test]
fn page_flow_in_the_browser() {
    mount();

    // intro is shown on start, home hidden
    assert!(is_active("screen-intro"));
    assert_eq!(element("home-btn").style().get_property_value("display").unwrap(), "none");

    show_screen("question");
    assert!(is_active("screen-question"));
    assert!(!is_active("screen-intro"));
    assert_eq!(element("home-btn").style().get_property_value("display").unwrap(), "flex");

    // unknown names leave the current screen alone
    show_screen("nope");
    assert!(is_active("screen-question"));

    show_screen("puzzle");
    assert!(is_active("screen-puzzle"));
    let grid = element("image-grid");
    assert_eq!(grid.child_element_count(), 9);
    let correct = grid.query_selector_all("[data-correct='true']").unwrap();
    assert_eq!(correct.length(), 6);

    let verify: HtmlButtonElement = element("verify-btn").dyn_into().unwrap();
    assert!(verify.disabled());

    let tile: HtmlElement = grid.query_selector(".grid-item").unwrap().unwrap().dyn_into().unwrap();
    tile.click();
    assert!(tile.class_list().contains("selected"));
    assert!(!verify.disabled());

    tile.click();
    assert!(!tile.class_list().contains("selected"));
    assert!(verify.disabled());
}
