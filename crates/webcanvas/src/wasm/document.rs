use renderer::Document;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlElement};

use super::canvas::DomCanvas;

pub struct DomDocument {
    document: web_sys::Document,
}

impl DomDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The document of the current window, if there is one.
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }
}

impl Document for DomDocument {
    type Target = DomCanvas;

    fn canvas_by_id(&self, id: &str) -> Option<DomCanvas> {
        let element = self.document.get_element_by_id(id)?;
        match element.dyn_into::<HtmlCanvasElement>() {
            Ok(canvas) => Some(DomCanvas::new(canvas)),
            Err(other) => {
                tracing::warn!(canvas = %id, tag = %other.tag_name(), "element is not a <canvas>");
                None
            }
        }
    }

    fn set_background(&self, selector: &str, color: &str) -> bool {
        let Ok(Some(element)) = self.document.query_selector(selector) else {
            return false;
        };
        let Ok(element) = element.dyn_into::<HtmlElement>() else {
            return false;
        };
        element
            .style()
            .set_property("background-color", color)
            .is_ok()
    }
}
