use renderer::{Cancellable, CanvasSize, CanvasTarget, ClientRect, PointerTracker};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, WebGlRenderingContext};

use super::context::WebGlContext;

const POINTER_EVENT: &str = "pointermove";

/// A `<canvas>` element in the live document.
#[derive(Clone)]
pub struct DomCanvas {
    element: HtmlCanvasElement,
}

impl DomCanvas {
    pub fn new(element: HtmlCanvasElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.element
    }
}

impl CanvasTarget for DomCanvas {
    type Context = WebGlContext;

    fn label(&self) -> String {
        let id = self.element.id();
        if id.is_empty() {
            "<canvas>".to_string()
        } else {
            id
        }
    }

    fn context(&self) -> Option<WebGlContext> {
        let context = match self.element.get_context("webgl") {
            Ok(Some(context)) => context,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(canvas = %self.label(), error = ?err, "getContext threw");
                return None;
            }
        };
        context
            .dyn_into::<WebGlRenderingContext>()
            .ok()
            .map(WebGlContext::new)
    }

    fn drawing_buffer_size(&self) -> CanvasSize {
        CanvasSize::new(self.element.width(), self.element.height())
    }

    fn display_size(&self) -> CanvasSize {
        let width = u32::try_from(self.element.client_width()).unwrap_or(0);
        let height = u32::try_from(self.element.client_height()).unwrap_or(0);
        CanvasSize::new(width, height)
    }

    fn set_drawing_buffer_size(&self, size: CanvasSize) {
        self.element.set_width(size.width);
        self.element.set_height(size.height);
    }

    fn subscribe_pointer(&self, tracker: PointerTracker) -> Option<Box<dyn Cancellable>> {
        let element = self.element.clone();
        let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let rect = element.get_bounding_client_rect();
            tracker.record_client(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
                ClientRect::new(rect.left(), rect.top(), rect.width(), rect.height()),
            );
        });
        if let Err(err) = self
            .element
            .add_event_listener_with_callback(POINTER_EVENT, closure.as_ref().unchecked_ref())
        {
            tracing::warn!(canvas = %self.label(), error = ?err, "failed to add pointer listener");
            return None;
        }
        Some(Box::new(PointerListener {
            element: self.element.clone(),
            closure: Some(closure),
        }))
    }
}

struct PointerListener {
    element: HtmlCanvasElement,
    closure: Option<Closure<dyn FnMut(MouseEvent)>>,
}

impl Cancellable for PointerListener {
    fn cancel(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .element
                .remove_event_listener_with_callback(POINTER_EVENT, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for PointerListener {
    fn drop(&mut self) {
        self.cancel();
    }
}
