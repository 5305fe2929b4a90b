use crate::escape::MAX_ITER;

/// Per-pixel iteration counts for one computation unit.
///
/// Row-major, one `u32` per pixel. [`MAX_ITER`] marks pixels that never
/// escaped (or have not been computed yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageBuffer {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl StorageBuffer {
    /// Create a buffer with every pixel set to [`MAX_ITER`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![MAX_ITER; width as usize * height as usize],
        }
    }

    /// Restore every pixel to [`MAX_ITER`].
    pub fn reset(&mut self) {
        self.data.fill(MAX_ITER);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Value at pixel `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Copy a row-major `width × height` block into the buffer at `(x, y)`.
    ///
    /// Rows or columns that would fall outside the buffer are clipped.
    pub fn blit(&mut self, x: u32, y: u32, width: u32, height: u32, src: &[u32]) {
        debug_assert!(src.len() >= width as usize * height as usize);
        if x >= self.width {
            return;
        }
        let copy_w = width.min(self.width - x) as usize;
        for py in 0..height {
            let buf_y = y + py;
            if buf_y >= self.height {
                break;
            }
            let dst_start = buf_y as usize * self.width as usize + x as usize;
            let src_start = py as usize * width as usize;
            self.data[dst_start..dst_start + copy_w]
                .copy_from_slice(&src[src_start..src_start + copy_w]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_all_sentinel() {
        let buf = StorageBuffer::new(5, 3);
        assert_eq!(buf.len(), 15);
        assert!(buf.data().iter().all(|&v| v == MAX_ITER));
    }

    #[test]
    fn reset_restores_sentinel() {
        let mut buf = StorageBuffer::new(4, 4);
        buf.data_mut().fill(7);
        buf.reset();
        assert!(buf.data().iter().all(|&v| v == MAX_ITER));
    }

    #[test]
    fn blit_writes_correct_region() {
        let mut buf = StorageBuffer::new(8, 8);
        let block: Vec<u32> = (0..6).collect();
        buf.blit(2, 1, 3, 2, &block);

        assert_eq!(buf.get(2, 1), Some(0));
        assert_eq!(buf.get(4, 1), Some(2));
        assert_eq!(buf.get(2, 2), Some(3));
        assert_eq!(buf.get(4, 2), Some(5));
        // Outside the block is untouched.
        assert_eq!(buf.get(1, 1), Some(MAX_ITER));
        assert_eq!(buf.get(5, 2), Some(MAX_ITER));
        assert_eq!(buf.get(2, 3), Some(MAX_ITER));
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut buf = StorageBuffer::new(4, 4);
        let block = vec![1u32; 9];
        buf.blit(2, 2, 3, 3, &block);
        assert_eq!(buf.get(3, 3), Some(1));
        assert_eq!(buf.data().iter().filter(|&&v| v == 1).count(), 4);
    }

    #[test]
    fn get_out_of_bounds() {
        let buf = StorageBuffer::new(2, 2);
        assert_eq!(buf.get(2, 0), None);
        assert_eq!(buf.get(0, 2), None);
    }
}
