//! Seams between the runtime and whatever hosts it.
//!
//! The browser backend implements these over the DOM and WebGL; the
//! [`headless`](crate::headless) backend implements them in memory. The
//! runtime never touches a host API directly.

use crate::error::HostError;
use crate::pointer::PointerTracker;
use crate::types::{CanvasSize, ShaderStage, UniformValue};

/// Capability returned by hosts for anything that must be stopped later:
/// repeating frame tasks and event subscriptions.
pub trait Cancellable {
    /// Stops the task. Calling it more than once is a no-op.
    fn cancel(&mut self);
}

/// Callback invoked once per display refresh with a monotonic timestamp in
/// milliseconds.
pub type FrameCallback = Box<dyn FnMut(f64)>;

/// Frame-synchronised scheduler ("request next frame").
///
/// `start` turns a callback into a repeating task: the host invokes it once
/// per refresh and requests the following frame only after the callback
/// returns, so at most one request per task is ever outstanding.
pub trait FrameScheduler {
    /// Current time on the same clock the frame timestamps use.
    fn now(&self) -> f64;

    fn start(&self, callback: FrameCallback) -> Result<Box<dyn Cancellable>, HostError>;
}

/// Minimal slice of a WebGL-style immediate-mode context.
pub trait GraphicsContext {
    type Shader;
    type Program;
    type Buffer;
    type UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    /// Uploads and compiles `source`; the error carries the driver info log.
    fn compile_shader(&self, shader: &Self::Shader, source: &str) -> Result<(), String>;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    /// Attaches both stages and links; the error carries the driver info log.
    fn link_program(
        &self,
        program: &Self::Program,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<(), String>;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: &Self::Program);

    /// Creates a static vertex buffer holding `data`.
    fn create_vertex_buffer(&self, data: &[u8]) -> Option<Self::Buffer>;
    /// Points attribute `name` at tightly packed float components of `buffer`.
    /// Returns false when the program has no active attribute of that name.
    fn bind_vertex_attribute(
        &self,
        program: &Self::Program,
        buffer: &Self::Buffer,
        name: &str,
        components: i32,
    ) -> bool;
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformValue);

    fn viewport(&self, size: CanvasSize);
    /// Non-indexed triangle list draw starting at vertex zero.
    fn draw_triangles(&self, vertex_count: i32);
}

/// Drawable element owned by the document. The runtime holds it for the
/// lifetime of a canvas but never removes it.
pub trait CanvasTarget {
    type Context: GraphicsContext;

    /// Human-readable identifier used in logs and errors.
    fn label(&self) -> String;

    /// Requests the rendering context; `None` when the capability is missing.
    fn context(&self) -> Option<Self::Context>;

    /// Size of the pixel backing store.
    fn drawing_buffer_size(&self) -> CanvasSize;

    /// Size the element is laid out at.
    fn display_size(&self) -> CanvasSize;

    fn set_drawing_buffer_size(&self, size: CanvasSize);

    /// Forwards pointer movement over the element into `tracker` until the
    /// returned subscription is cancelled. `None` if the host cannot listen.
    fn subscribe_pointer(&self, tracker: PointerTracker) -> Option<Box<dyn Cancellable>>;
}

/// Page-level lookups.
pub trait Document {
    type Target: CanvasTarget;

    fn canvas_by_id(&self, id: &str) -> Option<Self::Target>;

    /// Paints `color` behind the element matching `selector`. Returns false
    /// when nothing matched.
    fn set_background(&self, selector: &str, color: &str) -> bool;
}
