//! WASM bindings for the interactive crop session.
//!
//! Wraps the core `CropSession` in a JavaScript-friendly interface. Scalars
//! cross the boundary as plain numbers; structured values (rects, the
//! committed parameter map) cross as JSON-shaped objects via
//! serde_wasm_bindgen; the valid-region quad crosses as a flat coordinate
//! array for cheap consumption by a canvas overlay.

use perspect_core::{
    CropRect, CropSession, GestureStrategy, PerspectiveParameters, ResizeHandle,
    SessionParameters,
};
use wasm_bindgen::prelude::*;

/// Interactive crop session wrapper for JavaScript.
///
/// One instance corresponds to one image being edited. All coordinates are
/// normalized to [0, 1] in logical (display-oriented) space; the committed
/// parameter map uses the rotation-invariant texture encoding, matching what
/// the persistence layer stores.
#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session for an image of the given pixel dimensions.
    #[wasm_bindgen(constructor)]
    pub fn new(texture_width: u32, texture_height: u32) -> Result<JsCropSession, JsError> {
        Ok(JsCropSession {
            inner: CropSession::new(texture_width, texture_height)?,
        })
    }

    /// Rebuild a session from a previously committed parameter map.
    pub fn from_parameters(
        parameters: JsValue,
        texture_width: u32,
        texture_height: u32,
    ) -> Result<JsCropSession, JsError> {
        let saved: SessionParameters = serde_wasm_bindgen::from_value(parameters)
            .map_err(|e| JsError::new(&format!("invalid session parameters: {}", e)))?;
        Ok(JsCropSession {
            inner: CropSession::from_parameters(&saved, texture_width, texture_height)?,
        })
    }

    /// Current crop rect in logical space, as `{left, top, right, bottom}`.
    pub fn crop_rect(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.crop_rect())
    }

    /// Current crop rect in texture space (the persisted encoding).
    pub fn texture_crop_rect(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.texture_crop_rect())
    }

    /// The valid-region quad in logical space as a flat
    /// `[x0, y0, x1, y1, x2, y2, x3, y3]` array, for drawing the boundary
    /// overlay.
    pub fn valid_quad_points(&self) -> js_sys::Array {
        let array = js_sys::Array::new();
        for point in &self.inner.valid_quad().points {
            array.push(&JsValue::from_f64(point.x));
            array.push(&JsValue::from_f64(point.y));
        }
        array
    }

    /// Whether the current crop samples safely inside the texture.
    #[wasm_bindgen(getter)]
    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    /// True while a gesture is in flight.
    #[wasm_bindgen(getter)]
    pub fn is_dragging(&self) -> bool {
        self.inner.is_dragging()
    }

    /// Begin a resize gesture on one of the eight handles.
    ///
    /// Handle values follow the on-screen layout:
    /// 0 = top-left, 1 = top, 2 = top-right, 3 = right, 4 = bottom-right,
    /// 5 = bottom, 6 = bottom-left, 7 = left.
    pub fn begin_resize(&mut self, handle: u8, lock_aspect: bool) {
        self.inner.begin_gesture(GestureStrategy::Resize {
            handle: handle_from_u8(handle),
            lock_aspect,
        });
    }

    /// Begin a pan gesture.
    pub fn begin_pan(&mut self) {
        self.inner.begin_gesture(GestureStrategy::Pan);
    }

    /// Feed one pointer delta (normalized logical units) into the active
    /// gesture. Returns true when the candidate was accepted.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> bool {
        self.inner.drag_by(dx, dy)
    }

    /// End the active gesture and return the committed parameter map.
    pub fn end_gesture(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.inner.end_gesture())
    }

    /// Replace the crop programmatically. Returns false if the rect could
    /// not be made valid even by shrinking.
    pub fn set_crop(&mut self, left: f64, top: f64, right: f64, bottom: f64) -> bool {
        self.inner.set_crop(CropRect::new(left, top, right, bottom))
    }

    /// Apply a new set of perspective parameters. The logical aspect ratio
    /// is derived from the texture dimensions and the rotation step.
    pub fn set_perspective(
        &mut self,
        vertical: f64,
        horizontal: f64,
        straighten_degrees: f64,
        rotate_steps: u8,
        flip_horizontal: bool,
    ) -> Result<(), JsError> {
        let params = PerspectiveParameters {
            vertical,
            horizontal,
            straighten_degrees,
            rotate_steps,
            flip_horizontal,
            image_aspect_ratio: self.inner.logical_aspect_for_steps(rotate_steps),
        };
        self.inner.update_perspective(params)?;
        Ok(())
    }

    /// Rotate the display a quarter turn clockwise.
    pub fn rotate_clockwise(&mut self) -> Result<(), JsError> {
        self.inner.rotate_clockwise()?;
        Ok(())
    }

    /// Snapshot the committed state without ending a gesture.
    pub fn committed_parameters(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.committed_parameters())
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("serialization failed: {}", e)))
}

/// Convert a u8 handle index to the core ResizeHandle enum.
///
/// Unknown values default to the bottom-right handle.
fn handle_from_u8(value: u8) -> ResizeHandle {
    match value {
        0 => ResizeHandle::TopLeft,
        1 => ResizeHandle::Top,
        2 => ResizeHandle::TopRight,
        3 => ResizeHandle::Right,
        5 => ResizeHandle::Bottom,
        6 => ResizeHandle::BottomLeft,
        7 => ResizeHandle::Left,
        _ => ResizeHandle::BottomRight,
    }
}
