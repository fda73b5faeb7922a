//! Orientation WASM bindings.
//!
//! # Functions
//!
//! - [`plan_orientation`] - The transform plan for a raw EXIF orientation value
//! - [`read_orientation`] - Read the raw EXIF orientation value from file bytes
//! - [`normalize_orientation`] - Rewrite an encoded image upright
//! - [`correct_canvas`] - Apply the plan for an orientation value to an RGB canvas
//!
//! # Example
//!
//! ```typescript
//! import { read_orientation, plan_orientation, normalize_orientation } from '@orientfix/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! console.log(plan_orientation(read_orientation(bytes)));
//! // [{ op: "rotate_clockwise", degrees: 90 }]
//!
//! const upright = normalize_orientation(bytes, 90);
//! ```

use crate::types::JsCanvas;
use orientfix_core::{
    execute, metadata, plan, CanvasBackend, FixError, FixerConfig, OrientationCode,
    OrientationFixer, TransformPlan,
};
use wasm_bindgen::prelude::*;
use web_sys::console;

/// Get the transform plan for a raw EXIF orientation value.
///
/// Absent, out-of-range and upright (1) values all give an empty array.
///
/// # Returns
///
/// An array of `{ op, degrees? }` objects, in application order.
#[wasm_bindgen]
pub fn plan_orientation(raw: Option<u32>) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&planned(raw)).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read the raw EXIF orientation value from encoded image bytes.
///
/// Returns `undefined` if there is no readable orientation tag.
#[wasm_bindgen]
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    metadata::read_orientation(bytes)
}

/// Rewrite an encoded JPEG, PNG or GIF so it displays upright.
///
/// Returns the input bytes unchanged when no correction is needed.
///
/// # Arguments
///
/// * `bytes` - The encoded image as a `Uint8Array`
/// * `jpeg_quality` - JPEG quality for re-encoding (1-100)
///
/// # Errors
///
/// Returns an error if the format is unsupported or the image is corrupted.
#[wasm_bindgen]
pub fn normalize_orientation(bytes: &[u8], jpeg_quality: u8) -> Result<Vec<u8>, JsValue> {
    normalize(bytes, jpeg_quality).map_err(|e| {
        let message = e.to_string();
        console::warn_1(&JsValue::from_str(&message));
        JsValue::from_str(&message)
    })
}

/// Apply the plan for a raw EXIF orientation value to an RGB canvas.
///
/// # Errors
///
/// Returns an error if the canvas pixel buffer doesn't match its dimensions.
#[wasm_bindgen]
pub fn correct_canvas(canvas: &JsCanvas, raw: Option<u32>) -> Result<JsCanvas, JsValue> {
    correct(canvas, raw).map_err(|e| JsValue::from_str(&e))
}

fn planned(raw: Option<u32>) -> TransformPlan {
    OrientationCode::parse(raw)
        .map(plan)
        .unwrap_or(TransformPlan::EMPTY)
}

fn normalize(bytes: &[u8], jpeg_quality: u8) -> Result<Vec<u8>, FixError> {
    let fixer = OrientationFixer::new(FixerConfig {
        jpeg_quality,
        ..Default::default()
    });
    fixer.fix_bytes(bytes).map(|(output, _)| output)
}

fn correct(canvas: &JsCanvas, raw: Option<u32>) -> Result<JsCanvas, String> {
    let source = canvas
        .to_canvas()
        .ok_or_else(|| "Pixel buffer does not match width * height * 3".to_string())?;

    let mut backend = CanvasBackend::new(source).map_err(|e| e.to_string())?;
    execute(planned(raw), &mut backend).map_err(|e| e.to_string())?;
    Ok(JsCanvas::from_canvas(backend.into_committed()))
}
