//! Pixel-rectangle zoom math.
//!
//! All functions are pure: they take the current [`Viewport`] and a
//! rectangle in its pixel space and return the new `(center_re, center_im,
//! diameter)` to pass to `update_bounds`. Rectangles may extend past the
//! viewport edges, so coordinates are signed.

use crate::viewport::Viewport;

/// Below this diameter `f64` steps stop resolving neighbouring pixels.
pub const MIN_DIAMETER: f64 = 1e-15;

/// Whether zooming further in would only produce float noise.
pub fn is_zoom_exhausted(diameter: f64) -> bool {
    diameter < MIN_DIAMETER
}

/// Normalise corners so `(x1, y1)` is the minimum, or `None` for a
/// rectangle with no area.
fn normalise(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<(i32, i32, i32, i32)> {
    if x1 == x2 || y1 == y2 {
        return None;
    }
    Some((x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)))
}

/// Bounds that make the pixel rectangle fill the view.
///
/// The new diameter is the larger of the rectangle's two complex extents,
/// so the whole rectangle stays visible after the aspect correction in
/// `update_bounds`.
pub fn zoom_in_bounds(vp: &Viewport, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<(f64, f64, f64)> {
    let (x1, y1, x2, y2) = normalise(x1, y1, x2, y2)?;

    let re1 = vp.min_re() + x1 as f64 * vp.step_re();
    let im1 = vp.min_im() + y1 as f64 * vp.step_im();
    let re2 = vp.min_re() + x2 as f64 * vp.step_re();
    let im2 = vp.min_im() + y2 as f64 * vp.step_im();

    let center_re = (re1 + re2) / 2.0;
    let center_im = (im1 + im2) / 2.0;
    let diameter = (re2 - re1).max(im2 - im1);
    Some((center_re, center_im, diameter))
}

/// Inverse of [`zoom_in_bounds`]: bounds in which the current view shrinks
/// to occupy the pixel rectangle.
pub fn zoom_out_bounds(
    vp: &Viewport,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
) -> Option<(f64, f64, f64)> {
    let (x1, y1, x2, y2) = normalise(x1, y1, x2, y2)?;

    let width = vp.width() as f64;
    let height = vp.height() as f64;
    let scale = (width / (x2 - x1) as f64).max(height / (y2 - y1) as f64);

    // Integer pixel offset of the rectangle centre from the screen centre.
    let offset_x = (x1 + x2) / 2 - (vp.width() / 2) as i32;
    let offset_y = (y1 + y2) / 2 - (vp.height() / 2) as i32;

    let center_re = vp.center_re() + offset_x as f64 * vp.step_re() * scale;
    let center_im = vp.center_im() + offset_y as f64 * vp.step_im() * scale;
    let diameter = vp.diameter() * scale;
    Some((center_re, center_im, diameter))
}

/// `w × h` rectangle centred on `(cx, cy)`, as `(x1, y1, x2, y2)`.
pub fn centered_rect(cx: i32, cy: i32, w: i32, h: i32) -> (i32, i32, i32, i32) {
    let x1 = cx - w / 2;
    let y1 = cy - h / 2;
    (x1, y1, x1 + w, y1 + h)
}
