use crate::models::SelectionPoint;

/// On-screen rectangle occupied by the rendered image, in viewport units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderedRect {
    /// Rectangle anchored at the viewport origin.
    pub fn at_origin(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Whether a pointer position falls inside the rectangle, edges included.
    pub fn contains(&self, pointer: PointerPos) -> bool {
        pointer.x >= self.left
            && pointer.x <= self.left + self.width
            && pointer.y >= self.top
            && pointer.y <= self.top + self.height
    }
}

/// Pointer position in the same viewport units as [`RenderedRect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPos {
    pub x: f64,
    pub y: f64,
}

/// Map a pointer position on the rendered image to native pixel coordinates.
///
/// The pointer's offset inside `rect` is scaled linearly up to the native
/// resolution, so the mapping stays correct however the image is scaled or
/// positioned on screen. Values pass through unclamped; callers wanting
/// in-bounds points must check `rect.contains` first.
pub fn map_to_native(rect: RenderedRect, pointer: PointerPos, native: (u32, u32)) -> SelectionPoint {
    let (native_w, native_h) = native;
    SelectionPoint {
        x: native_w as f64 * ((pointer.x - rect.left) / rect.width),
        y: native_h as f64 * ((pointer.y - rect.top) / rect.height),
    }
}
