use tracing::trace;

use super::Kernel;
use crate::escape::escape_time;
use crate::storage::StorageBuffer;
use crate::viewport::Viewport;

/// The pixel's value has been computed (or filled) and stored.
const LOADED: u8 = 1;
/// The pixel has been pushed onto the work queue at some point.
const QUEUED: u8 = 2;

/// Dequeues between progress calls.
const PROGRESS_INTERVAL: u32 = 1000;

/// Boundary-tracing kernel.
///
/// Escape-time fields are made of large flat regions, so only pixels next to
/// a change in value need to be computed. Tracing starts from the tile
/// border and follows value discontinuities inwards through a work queue.
/// Regions enclosed by a uniform boundary are never visited and are filled
/// afterwards from their row-major predecessor. That fill assumes the
/// enclosed region really is uniform, which holds for typical views but is
/// not guaranteed.
#[derive(Debug, Clone)]
pub struct BorderKernel {
    viewport: Viewport,
    storage: StorageBuffer,
    speed_mode: bool,
    /// `LOADED` / `QUEUED` bits per pixel.
    done: Vec<u8>,
    /// Ring buffer one slot larger than the pixel count, so `head == tail`
    /// always means empty.
    queue: Vec<u32>,
    head: usize,
    tail: usize,
}

impl BorderKernel {
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            viewport: Viewport::new(width, height),
            storage: StorageBuffer::new(width, height),
            speed_mode: false,
            done: vec![0; pixel_count],
            queue: vec![0; pixel_count + 1],
            head: 0,
            tail: 0,
        }
    }

    /// Whether every pixel ended up with a value after the last compute.
    pub fn is_fully_loaded(&self) -> bool {
        self.done.iter().all(|&flags| flags & LOADED != 0)
    }

    fn clear_trace_state(&mut self) {
        self.done.fill(0);
        self.head = 0;
        self.tail = 0;
    }

    fn enqueue(&mut self, p: usize) {
        if self.done[p] & QUEUED != 0 {
            return;
        }
        self.done[p] |= QUEUED;
        self.queue[self.head] = p as u32;
        self.head += 1;
        if self.head == self.queue.len() {
            self.head = 0;
        }
    }

    /// Value at `p`, computing and memoising it on first access.
    fn load(&mut self, p: usize) -> u32 {
        if self.done[p] & LOADED != 0 {
            return self.storage.data()[p];
        }
        let width = self.viewport.width() as usize;
        let (x, y) = self
            .viewport
            .pixel_to_complex((p % width) as u32, (p / width) as u32);
        let value = escape_time(x, y);
        self.done[p] |= LOADED;
        self.storage.data_mut()[p] = value;
        value
    }

    /// Compare `p` with its neighbours and queue every neighbour that sits
    /// across a change in value.
    fn scan(&mut self, p: usize) {
        let width = self.viewport.width() as usize;
        let height = self.viewport.height() as usize;
        let x = p % width;
        let y = p / width;

        let center = self.load(p);

        let has_left = x >= 1;
        let has_right = x + 1 < width;
        let has_up = y >= 1;
        let has_down = y + 1 < height;

        let left = has_left && self.load(p - 1) != center;
        let right = has_right && self.load(p + 1) != center;
        let up = has_up && self.load(p - width) != center;
        let down = has_down && self.load(p + width) != center;

        if left {
            self.enqueue(p - 1);
        }
        if right {
            self.enqueue(p + 1);
        }
        if up {
            self.enqueue(p - width);
        }
        if down {
            self.enqueue(p + width);
        }

        // A diagonal is queued when one of the two edges meeting at that
        // corner changed value.
        if has_up && has_left && (left || up) {
            self.enqueue(p - width - 1);
        }
        if has_up && has_right && (right || up) {
            self.enqueue(p - width + 1);
        }
        if has_down && has_left && (left || down) {
            self.enqueue(p + width - 1);
        }
        if has_down && has_right && (right || down) {
            self.enqueue(p + width + 1);
        }
    }

    /// Take the next pixel off the queue.
    ///
    /// Normally FIFO from the tail, but every fourth pop (while the live
    /// region does not wrap) comes from the head instead. The mix only
    /// changes the order pixels appear during progressive display; the final
    /// buffer does not depend on it.
    fn dequeue(&mut self, flag: &mut u32) -> usize {
        let from_tail = if self.head <= self.tail {
            true
        } else {
            *flag = flag.wrapping_add(1);
            *flag & 3 != 0
        };

        if from_tail {
            let p = self.queue[self.tail];
            self.tail += 1;
            if self.tail == self.queue.len() {
                self.tail = 0;
            }
            p as usize
        } else {
            if self.head == 0 {
                self.head = self.queue.len();
            }
            self.head -= 1;
            self.queue[self.head] as usize
        }
    }

    /// Copy each loaded pixel's value into an unloaded successor.
    fn forward_fill(&mut self) {
        let data = self.storage.data_mut();
        for p in 0..self.done.len().saturating_sub(1) {
            if self.done[p] & LOADED != 0 && self.done[p + 1] & LOADED == 0 {
                data[p + 1] = data[p];
                self.done[p + 1] |= LOADED;
            }
        }
    }
}

impl Kernel for BorderKernel {
    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn compute(&mut self, on_progress: &mut dyn FnMut(&[u32])) {
        let width = self.viewport.width() as usize;
        let height = self.viewport.height() as usize;
        if width == 0 || height == 0 {
            return;
        }

        self.clear_trace_state();
        self.storage.reset();

        // Seed with the whole tile border.
        for y in 0..height {
            self.enqueue(y * width);
            self.enqueue(y * width + width - 1);
        }
        for x in 1..width - 1 {
            self.enqueue(x);
            self.enqueue((height - 1) * width + x);
        }

        let mut processed = 0u32;
        let mut flag = 0u32;
        while self.tail != self.head {
            let p = self.dequeue(&mut flag);
            self.scan(p);

            processed += 1;
            if !self.speed_mode && processed % PROGRESS_INTERVAL == 0 {
                on_progress(self.storage.data());
            }
        }

        self.forward_fill();

        trace!(
            width,
            height,
            traced = processed,
            "border kernel done"
        );
    }

    fn reset(&mut self) {
        self.storage.reset();
        self.clear_trace_state();
    }

    fn data(&self) -> &[u32] {
        self.storage.data()
    }

    fn engine_name(&self) -> &'static str {
        "border"
    }

    fn speed_mode(&self) -> bool {
        self.speed_mode
    }

    fn set_speed_mode(&mut self, speed_mode: bool) {
        self.speed_mode = speed_mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::MAX_ITER;
    use crate::kernel::StandardKernel;

    #[test]
    fn every_pixel_loaded_after_compute() {
        for (w, h) in [(64, 48), (1, 1), (1, 9), (9, 1), (2, 2), (17, 13)] {
            let mut kernel = BorderKernel::new(w, h);
            kernel.compute(&mut |_| {});
            assert!(kernel.is_fully_loaded(), "{w}×{h} left pixels unfilled");
        }
    }

    #[test]
    fn reset_clears_loaded_flags() {
        let mut kernel = BorderKernel::new(16, 16);
        kernel.compute(&mut |_| {});
        kernel.reset();
        assert!(!kernel.is_fully_loaded());
        assert!(kernel.data().iter().all(|&v| v == MAX_ITER));
    }

    #[test]
    fn compute_twice_without_reset_is_stable() {
        let mut kernel = BorderKernel::new(32, 24);
        kernel.compute(&mut |_| {});
        let first = kernel.data().to_vec();
        kernel.compute(&mut |_| {});
        assert_eq!(first, kernel.data());
    }

    #[test]
    fn progress_frames_show_unvisited_pixels_as_interior() {
        let mut kernel = BorderKernel::new(200, 200);
        let mut first_frame = None;
        kernel.compute(&mut |data| {
            if first_frame.is_none() {
                first_frame = Some(data.to_vec());
            }
        });
        let first_frame = first_frame.expect("200x200 home view reports progress");
        let last = kernel.data();

        let sentinel = |data: &[u32]| data.iter().filter(|&&v| v == MAX_ITER).count();
        assert!(sentinel(&first_frame) > sentinel(last));
        for (p, (&partial, &done)) in first_frame.iter().zip(last).enumerate() {
            assert!(
                partial == MAX_ITER || partial == done,
                "pixel {p} showed {partial} mid-trace but ends at {done}"
            );
        }
    }

    #[test]
    fn uniform_exterior_skips_the_interior() {
        // Far outside the set every pixel escapes at once, so tracing stops
        // at the border and the inside is filled.
        let mut kernel = BorderKernel::new(20, 20);
        kernel.update_bounds(10.0, 10.0, 1.0);
        let mut calls = 0;
        kernel.compute(&mut |_| calls += 1);
        assert_eq!(calls, 0, "a 76-pixel border never reaches the progress interval");
        assert!(kernel.data().iter().all(|&v| v == 0));
        assert!(kernel.is_fully_loaded());
    }

    #[test]
    fn matches_standard_on_tall_thin_tile() {
        let mut border = BorderKernel::new(7, 40);
        let mut standard = StandardKernel::new(7, 40);
        border.update_bounds_explicit(-0.9, -0.4, -0.7, 0.4);
        standard.update_bounds_explicit(-0.9, -0.4, -0.7, 0.4);
        border.compute(&mut |_| {});
        standard.compute(&mut |_| {});
        assert_eq!(border.data(), standard.data());
    }

    #[test]
    fn dequeue_interleaves_lifo_pops() {
        // Queue 0..6 without scanning, then drain through `dequeue` to pin
        // the FIFO/LIFO pattern: three pops from the tail, one from the head.
        let mut kernel = BorderKernel::new(3, 3);
        for p in 0..6 {
            kernel.enqueue(p);
        }
        let mut flag = 0;
        let mut order = Vec::new();
        while kernel.tail != kernel.head {
            order.push(kernel.dequeue(&mut flag));
        }
        assert_eq!(order, vec![0, 1, 2, 5, 3, 4]);
    }
}
