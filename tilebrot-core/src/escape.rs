/// Iteration cap shared by every engine.
///
/// A stored value of exactly `MAX_ITER` means the orbit never escaped and the
/// point is presumed to be inside the set.
pub const MAX_ITER: u32 = 768;

/// Escape time of `c = x + iy` under `z ← z² + c`, starting from `z₀ = c`.
///
/// Returns the iteration at which `|z|² >= 4` first holds, or [`MAX_ITER`] if
/// the orbit stays bounded for the whole budget. Every CPU kernel uses this
/// exact operation order so their buffers match bit for bit.
#[inline]
pub fn escape_time(x: f64, y: f64) -> u32 {
    let mut r = x;
    let mut i = y;

    for iter in 0..MAX_ITER {
        let r2 = r * r;
        let i2 = i * i;
        if r2 + i2 >= 4.0 {
            return iter;
        }
        let ri = r * i;
        i = ri + ri + y;
        r = r2 - i2 + x;
    }

    MAX_ITER
}
