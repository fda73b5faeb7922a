//! orientfix WASM - WebAssembly bindings for orientfix
//!
//! This crate exposes orientfix-core's orientation planning and correction
//! to JavaScript/TypeScript applications, e.g. to normalize photos in the
//! browser before upload.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper type for RGB canvases
//! - `orientation` - Planning, EXIF reading and correction bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { normalize_orientation } from '@orientfix/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const upright = normalize_orientation(bytes, 90);
//! ```

use wasm_bindgen::prelude::*;

mod orientation;
mod types;

// Re-export public types
pub use orientation::{correct_canvas, normalize_orientation, plan_orientation, read_orientation};
pub use types::JsCanvas;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
