//! Built-in shader effects and the glue that turns a [`siteconfig::SiteConfig`]
//! into canvases the runtime can mount.
//!
//! Effects are plain data: a GLSL ES 1.00 fragment stage written against the
//! standard uniform names plus a flag saying whether it reads the pointer.

mod catalog;
mod resolve;

pub use catalog::{catalog, lookup, Effect};
pub use resolve::{check, resolve, resolve_canvas, Resolution, ResolveError};
