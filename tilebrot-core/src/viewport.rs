use serde::{Deserialize, Serialize};

/// Real part of the default ("home") view centre.
pub const HOME_CENTER_RE: f64 = -0.5;
/// Imaginary part of the default view centre.
pub const HOME_CENTER_IM: f64 = 0.0;
/// Vertical extent of the default view, which shows the whole set.
pub const HOME_DIAMETER: f64 = 3.0;

/// Maps a pixel grid onto a rectangle of the complex plane.
///
/// The viewport keeps two equivalent descriptions in sync: the centre and
/// diameter the user navigates with, and the min/max/step values the kernels
/// iterate over. Pixel `(0, 0)` sits at `(min_re, min_im)`; increasing pixel-y
/// increases the imaginary part.
///
/// Serialises as size, centre and diameter only; the bounds and steps are
/// re-derived on load, so explicit (tile) bounds do not survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ViewportState", into = "ViewportState")]
pub struct Viewport {
    width: u32,
    height: u32,

    center_re: f64,
    center_im: f64,
    diameter: f64,

    min_re: f64,
    min_im: f64,
    max_re: f64,
    max_im: f64,
    step_re: f64,
    step_im: f64,
}

#[derive(Serialize, Deserialize)]
struct ViewportState {
    width: u32,
    height: u32,
    center_re: f64,
    center_im: f64,
    diameter: f64,
}

impl From<ViewportState> for Viewport {
    fn from(state: ViewportState) -> Self {
        let mut vp = Viewport::new(state.width, state.height);
        vp.update_bounds(state.center_re, state.center_im, state.diameter);
        vp
    }
}

impl From<Viewport> for ViewportState {
    fn from(vp: Viewport) -> Self {
        Self {
            width: vp.width,
            height: vp.height,
            center_re: vp.center_re,
            center_im: vp.center_im,
            diameter: vp.diameter,
        }
    }
}

impl Viewport {
    /// Viewport of the given pixel size showing the home view.
    ///
    /// Zero-sized viewports are allowed here because grid tiles can be
    /// empty when there are more columns than pixels; the steps are then
    /// non-finite but never used.
    pub fn new(width: u32, height: u32) -> Self {
        let mut vp = Self {
            width,
            height,
            center_re: HOME_CENTER_RE,
            center_im: HOME_CENTER_IM,
            diameter: HOME_DIAMETER,
            min_re: 0.0,
            min_im: 0.0,
            max_re: 0.0,
            max_im: 0.0,
            step_re: 0.0,
            step_im: 0.0,
        };
        vp.update_bounds(HOME_CENTER_RE, HOME_CENTER_IM, HOME_DIAMETER);
        vp
    }

    /// Re-centre on `(center_re, center_im)` with `diameter` as the vertical
    /// extent. The horizontal extent is scaled by the aspect ratio.
    pub fn update_bounds(&mut self, center_re: f64, center_im: f64, diameter: f64) {
        let aspect = self.width as f64 / self.height as f64;
        self.center_re = center_re;
        self.center_im = center_im;
        self.diameter = diameter;
        self.min_re = center_re - diameter * 0.5 * aspect;
        self.min_im = center_im - diameter * 0.5;
        self.max_re = center_re + diameter * 0.5 * aspect;
        self.max_im = center_im + diameter * 0.5;
        self.update_steps();
    }

    /// Set the four bounds exactly, without aspect correction.
    ///
    /// Centre and diameter are derived from the rectangle, with the diameter
    /// being the larger of the two extents.
    pub fn update_bounds_explicit(&mut self, min_re: f64, min_im: f64, max_re: f64, max_im: f64) {
        self.min_re = min_re;
        self.min_im = min_im;
        self.max_re = max_re;
        self.max_im = max_im;
        self.center_re = (min_re + max_re) / 2.0;
        self.center_im = (min_im + max_im) / 2.0;
        self.diameter = (max_re - min_re).max(max_im - min_im);
        self.update_steps();
    }

    /// Change the pixel size, keeping the centre and diameter.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.update_bounds(self.center_re, self.center_im, self.diameter);
    }

    fn update_steps(&mut self) {
        self.step_re = (self.max_re - self.min_re) / self.width as f64;
        self.step_im = (self.max_im - self.min_im) / self.height as f64;
    }

    /// Complex coordinate of pixel `(px, py)`.
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32) -> (f64, f64) {
        (
            self.min_re + px as f64 * self.step_re,
            self.min_im + py as f64 * self.step_im,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels covered by the viewport.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn center_re(&self) -> f64 {
        self.center_re
    }

    pub fn center_im(&self) -> f64 {
        self.center_im
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn min_re(&self) -> f64 {
        self.min_re
    }

    pub fn min_im(&self) -> f64 {
        self.min_im
    }

    pub fn max_re(&self) -> f64 {
        self.max_re
    }

    pub fn max_im(&self) -> f64 {
        self.max_im
    }

    pub fn step_re(&self) -> f64 {
        self.step_re
    }

    pub fn step_im(&self) -> f64 {
        self.step_im
    }
}
