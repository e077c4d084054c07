//! Shader canvas runtime.
//!
//! Each decorative canvas on a page gets its own [`ShaderCanvas`]: a rendering
//! context, a program built from the shared full-screen quad vertex stage plus
//! an effect fragment stage, one quad buffer, and a repeating frame task. The
//! overall flow is:
//!
//! ```text
//!   siteconfig / effects
//!          │ CanvasSpec (id, CanvasConfig, Fallback)
//!          ▼
//!   Page::mount ──▶ ShaderCanvas::attach ──▶ build_program ──▶ FrameScheduler::start
//!                           │                                        │
//!                           └─▶ Fallback on failure                  └─▶ tick(): size ─▶ uniforms ─▶ draw
//! ```
//!
//! Host access goes through the traits in [`host`]. The browser backend lives
//! in the `webcanvas` crate; [`headless`] provides an in-memory host used by
//! tests and the `canvasctl` simulator.

pub mod canvas;
pub mod compile;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod page;
pub mod pointer;
pub mod timeline;
pub mod types;
pub mod uniforms;

pub use canvas::{attach_or_log, FrameStats, ShaderCanvas};
pub use compile::{ProgramError, VERTEX_SHADER};
pub use error::{AttachError, AttachErrorKind, HostError};
pub use host::{Cancellable, CanvasTarget, Document, FrameCallback, FrameScheduler, GraphicsContext};
pub use page::{CanvasSpec, Fallback, Page};
pub use pointer::{ClientRect, PointerTracker};
pub use types::{
    CanvasConfig, CanvasSize, RenderOptions, ShaderStage, UniformNames, UniformValue,
    DEFAULT_COLOR, DEFAULT_SPEED,
};
