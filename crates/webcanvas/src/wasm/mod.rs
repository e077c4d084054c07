use std::cell::RefCell;

use effects::resolve;
use renderer::{CanvasConfig, CanvasSpec, Page, RenderOptions};
use siteconfig::{SiteConfig, BUNDLED_SITE};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

mod canvas;
mod console;
mod context;
mod document;
mod frame;

pub use canvas::DomCanvas;
pub use console::{initialise_tracing, ConsoleMakeWriter};
pub use context::WebGlContext;
pub use document::DomDocument;
pub use frame::AnimationFrameScheduler;

thread_local! {
    static PAGE: RefCell<Page<DomCanvas>> = RefCell::new(Page::new());
}

fn host() -> Result<(DomDocument, AnimationFrameScheduler), JsValue> {
    let document = DomDocument::current().ok_or("no document")?;
    let scheduler = AnimationFrameScheduler::current().ok_or("no window")?;
    Ok((document, scheduler))
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Module entry point: installs the panic hook and console logging, then
/// mounts the bundled site as soon as the DOM is ready.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    initialise_tracing(console::DEFAULT_FILTER);

    let (document, _) = host()?;
    if document.raw().ready_state() == "loading" {
        let on_ready = Closure::once_into_js(move || {
            if let Err(err) = mount_site(BUNDLED_SITE) {
                tracing::error!(error = ?err, "failed to mount bundled site");
            }
        });
        document
            .raw()
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    } else {
        mount_site(BUNDLED_SITE)?;
    }
    Ok(())
}

/// Replaces the mounted page with the canvases described by `config` (site
/// TOML). Entries naming an unknown effect are skipped. Returns how many
/// canvases are rendering.
#[wasm_bindgen]
pub fn mount_site(config: &str) -> Result<usize, JsValue> {
    let config = SiteConfig::from_toml_str(config).map_err(to_js)?;
    let resolution = resolve(&config);
    let (document, scheduler) = host()?;

    PAGE.with(|page| {
        let mut page = page.borrow_mut();
        page.dispose_all();
        *page = Page::mount(&document, &scheduler, &resolution.specs);
        Ok(page.live_ids().len())
    })
}

/// Attaches `fragment` to the canvas with `id`, replacing whatever ran there.
/// `options` is a JSON object such as `{"color":[0,0.5,0.6],"speed":0.5}`.
#[wasm_bindgen]
pub fn attach_canvas(
    id: &str,
    fragment: &str,
    options: &str,
    interactive: bool,
) -> Result<(), JsValue> {
    let options = RenderOptions::from_json(options).map_err(to_js)?;
    let spec = CanvasSpec::new(
        id,
        CanvasConfig::new(fragment)
            .with_options(options)
            .interactive(interactive),
    );
    let (document, scheduler) = host()?;

    let attached = PAGE.with(|page| page.borrow_mut().attach(&document, &scheduler, &spec));
    if attached {
        Ok(())
    } else {
        let reason = PAGE.with(|page| {
            page.borrow()
                .failures()
                .last()
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("canvas '{id}' failed to attach"))
        });
        Err(JsValue::from_str(&reason))
    }
}

/// Stops every canvas and releases its GPU resources.
#[wasm_bindgen]
pub fn dispose_all() {
    PAGE.with(|page| page.borrow_mut().dispose_all());
}

/// Ids of the canvases currently rendering.
#[wasm_bindgen]
pub fn live_canvases() -> js_sys::Array {
    PAGE.with(|page| {
        page.borrow()
            .live_ids()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    })
}
