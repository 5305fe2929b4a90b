//! Uniform layouts and readback decoding.

use bytemuck::{Pod, Zeroable};
use tilebrot_core::{Viewport, MAX_ITER};

/// Bytes per texel of the `Rgba8Unorm` target.
const BYTES_PER_PIXEL: u32 = 4;

/// Uniforms for the single-precision shader. Matches `Bounds` with `$T = f32`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FloatBounds {
    pub min_re: f32,
    pub min_im: f32,
    pub step_re: f32,
    pub step_im: f32,
    pub height: u32,
    pub max_iter: u32,
    pub _pad: [u32; 2],
}

impl FloatBounds {
    pub fn from_viewport(vp: &Viewport) -> Self {
        Self {
            min_re: vp.min_re() as f32,
            min_im: vp.min_im() as f32,
            step_re: vp.step_re() as f32,
            step_im: vp.step_im() as f32,
            height: vp.height(),
            max_iter: MAX_ITER,
            _pad: [0; 2],
        }
    }
}

/// Uniforms for the double-precision shader. Matches `Bounds` with `$T = f64`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DoubleBounds {
    pub min_re: f64,
    pub min_im: f64,
    pub step_re: f64,
    pub step_im: f64,
    pub height: u32,
    pub max_iter: u32,
    pub _pad: [u32; 2],
}

impl DoubleBounds {
    pub fn from_viewport(vp: &Viewport) -> Self {
        Self {
            min_re: vp.min_re(),
            min_im: vp.min_im(),
            step_re: vp.step_re(),
            step_im: vp.step_im(),
            height: vp.height(),
            max_iter: MAX_ITER,
            _pad: [0; 2],
        }
    }
}

/// Row pitch of the readback buffer: `width` texels rounded up to the copy
/// alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Turn mapped readback bytes into row-major iteration counts.
///
/// Each texel encodes `R + 256 * G`; values are clamped to [`MAX_ITER`].
/// Framebuffer rows are stored bottom-up relative to the field, so row `r`
/// lands in output row `height - 1 - r`. `out` must hold `width * height`
/// values.
pub fn decode_readback(bytes: &[u8], width: u32, height: u32, padded_row: u32, out: &mut [u32]) {
    let width = width as usize;
    let height = height as usize;
    let padded_row = padded_row as usize;

    for r in 0..height {
        let src = &bytes[r * padded_row..r * padded_row + width * BYTES_PER_PIXEL as usize];
        let dst_row = height - 1 - r;
        let dst = &mut out[dst_row * width..(dst_row + 1) * width];
        for (slot, texel) in dst.iter_mut().zip(src.chunks_exact(BYTES_PER_PIXEL as usize)) {
            let count = texel[0] as u32 + 256 * texel[1] as u32;
            *slot = count.min(MAX_ITER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<FloatBounds>(), 32);
        assert_eq!(std::mem::size_of::<DoubleBounds>(), 48);
    }

    #[test]
    fn row_padding() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(800), 3328);
    }

    #[test]
    fn decode_flips_rows_and_combines_channels() {
        let (w, h) = (2u32, 3u32);
        let pitch = padded_bytes_per_row(w);
        let mut bytes = vec![0u8; (pitch * h) as usize];
        // Framebuffer row 0, texel 1: 3 + 256 * 2 = 515.
        let t = 4;
        bytes[t] = 3;
        bytes[t + 1] = 2;
        // Framebuffer row 2, texel 0: 7.
        let t = 2 * pitch as usize;
        bytes[t] = 7;

        let mut out = vec![u32::MAX; (w * h) as usize];
        decode_readback(&bytes, w, h, pitch, &mut out);

        // Framebuffer row 0 is the last field row.
        assert_eq!(out[2 * 2 + 1], 515);
        assert_eq!(out[0], 7);
        assert_eq!(out.iter().filter(|&&v| v == 0).count(), 4);
    }

    #[test]
    fn decode_clamps_to_max_iter() {
        let pitch = padded_bytes_per_row(1);
        let mut bytes = vec![0u8; pitch as usize];
        bytes[0] = 255;
        bytes[1] = 255;
        let mut out = [0u32; 1];
        decode_readback(&bytes, 1, 1, pitch, &mut out);
        assert_eq!(out[0], MAX_ITER);
    }

    #[test]
    fn float_bounds_from_home_view() {
        let vp = Viewport::new(64, 48);
        let b = FloatBounds::from_viewport(&vp);
        assert_eq!(b.min_re, -2.5);
        assert_eq!(b.step_im, 0.0625);
        assert_eq!(b.height, 48);
        assert_eq!(b.max_iter, MAX_ITER);
    }
}
