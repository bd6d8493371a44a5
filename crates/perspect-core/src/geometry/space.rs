//! Remapping between texture-space and logical-space crop rectangles.
//!
//! A crop is persisted in *texture space*: rotation-invariant coordinates
//! covering the original image pixels. On screen the user interacts with the
//! crop in *logical space*, which follows the current 90-degree orientation.
//! The two are related by the algebraic inverse of a 90° x `rotate_steps`
//! rotation; width and height swap whenever `rotate_steps` is odd.
//!
//! `rotate_steps` counts quarter turns clockwise, 0 to 3. Both functions are
//! pure and exact inverses of each other:
//! `logical_to_texture(texture_to_logical(r, s), s) == r` for every `s`.

use super::rect::CropRect;

/// Convert a texture-space rect to logical (display-oriented) space.
pub fn texture_to_logical(rect: &CropRect, rotate_steps: u8) -> CropRect {
    let c = rect.center();
    let (cx, cy) = match rotate_steps % 4 {
        0 => (c.x, c.y),
        1 => (1.0 - c.y, c.x),
        2 => (1.0 - c.x, 1.0 - c.y),
        _ => (c.y, 1.0 - c.x),
    };
    let (w, h) = oriented_size(rect, rotate_steps);
    CropRect::from_center(cx, cy, w, h)
}

/// Convert a logical-space rect back to texture space.
pub fn logical_to_texture(rect: &CropRect, rotate_steps: u8) -> CropRect {
    let c = rect.center();
    let (cx, cy) = match rotate_steps % 4 {
        0 => (c.x, c.y),
        1 => (c.y, 1.0 - c.x),
        2 => (1.0 - c.x, 1.0 - c.y),
        _ => (1.0 - c.y, c.x),
    };
    let (w, h) = oriented_size(rect, rotate_steps);
    CropRect::from_center(cx, cy, w, h)
}

/// Width/height, swapped when the rotation is an odd number of quarter turns.
#[inline]
fn oriented_size(rect: &CropRect, rotate_steps: u8) -> (f64, f64) {
    if rotate_steps % 2 == 1 {
        (rect.height(), rect.width())
    } else {
        (rect.width(), rect.height())
    }
}
