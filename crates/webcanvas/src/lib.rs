//! Browser host for the shader canvas runtime.
//!
//! Implements the `renderer` host traits over WebGL 1, the DOM and
//! `requestAnimationFrame`, and exposes a small JavaScript surface:
//! `start` (runs on module load and mounts the bundled site once the DOM is
//! ready), `mount_site`, `attach_canvas`, `dispose_all` and `live_canvases`.

#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

// Host builds (workspace `cargo test`) get an empty stub so the crate still
// compiles outside the browser.
#[cfg(not(target_arch = "wasm32"))]
pub fn start() {}
