#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn add_canvas(id: &str) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    canvas.set_id(id);
    canvas
        .style()
        .set_property("width", "160px")
        .unwrap();
    canvas
        .style()
        .set_property("height", "90px")
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn mounts_or_falls_back() {
    let canvas = add_canvas("services-canvas");
    let config = r##"
version = 1

[[canvas]]
id = "services-canvas"
effect = "grid"
color = [0.0, 0.5, 0.6]
speed = 0.5

[canvas.fallback]
background = "rgb(26, 26, 26)"
"##;
    let live = webcanvas::mount_site(config).unwrap();
    let element: &HtmlElement = canvas.unchecked_ref();
    let background = element.style().get_property_value("background-color").unwrap();
    assert!(live == 1 || background == "rgb(26, 26, 26)");

    webcanvas::dispose_all();
    assert_eq!(webcanvas::live_canvases().length(), 0);
    canvas.remove();
}

#[wasm_bindgen_test]
fn rejects_invalid_config() {
    assert!(webcanvas::mount_site("version = 2").is_err());
}

#[wasm_bindgen_test]
fn missing_canvas_mounts_nothing() {
    let config = "version = 1\n[[canvas]]\nid = \"nowhere\"\neffect = \"waves\"\n";
    assert_eq!(webcanvas::mount_site(config).unwrap(), 0);
}

#[wasm_bindgen_test]
fn unknown_effect_skips_only_that_canvas() {
    let canvas = add_canvas("why-us-canvas");
    let config = r#"
version = 1

[[canvas]]
id = "why-us-canvas"
effect = "grid"

[[canvas]]
id = "news-canvas"
effect = "sparkles"
"#;
    let live = webcanvas::mount_site(config).unwrap();
    let ids: Vec<String> = webcanvas::live_canvases()
        .iter()
        .filter_map(|id| id.as_string())
        .collect();
    assert!(live <= 1);
    assert!(!ids.iter().any(|id| id == "news-canvas"));

    webcanvas::dispose_all();
    canvas.remove();
}

#[wasm_bindgen_test]
fn bad_options_json_is_an_error() {
    add_canvas("facts-canvas");
    assert!(webcanvas::attach_canvas("facts-canvas", "void main() {}", "{not json", false).is_err());
}
