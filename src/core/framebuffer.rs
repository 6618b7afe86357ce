use atomic_float::AtomicF32;
use nalgebra::Vector4;
use rayon::prelude::*;
use std::cell::UnsafeCell;
use std::sync::Mutex;
use std::sync::atomic::Ordering;

const LOCK_STRIPES: usize = 1024;

/// Color + depth target with optional supersampling.
///
/// The internal buffers are `samples` times larger than the output in each
/// direction; `get_pixel` and `resolve` box-filter them back down.
/// Thread-safe for parallel rasterization: depth is an atomic float and color
/// writes go through striped locks.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub samples: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    /// RGBA color per sub-sample. Guarded by `locks`.
    color_buffer: UnsafeCell<Vec<Vector4<f32>>>,

    /// Depth per sub-sample, smaller is nearer.
    depth_buffer: Vec<AtomicF32>,

    locks: Vec<Mutex<()>>,
}

// Color access is serialised through `locks`, depth is atomic.
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, samples: usize) -> Self {
        let samples = samples.max(1);
        let buffer_width = width * samples;
        let buffer_height = height * samples;
        let size = buffer_width * buffer_height;

        Self {
            width,
            height,
            samples,
            buffer_width,
            buffer_height,
            color_buffer: UnsafeCell::new(vec![Vector4::new(0.0, 0.0, 0.0, 1.0); size]),
            depth_buffer: (0..size).map(|_| AtomicF32::new(f32::INFINITY)).collect(),
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Resets every sub-sample to `color` and `depth`.
    pub fn clear(&mut self, color: Vector4<f32>, depth: f32) {
        self.color_buffer.get_mut().fill(color);
        for d in &self.depth_buffer {
            d.store(depth, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Less-than depth test. On success the new depth is stored and `true` returned.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.depth_buffer[self.index(x, y)]
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |current| {
                (depth < current).then_some(depth)
            })
            .is_ok()
    }

    /// Depth stored at a sub-sample, `None` outside the buffer.
    #[cfg(test)]
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| self.depth_buffer[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Writes a sub-sample. Call only after `depth_test_and_update` passed.
    #[inline]
    pub fn set_pixel_safe(&self, x: usize, y: usize, color: Vector4<f32>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        let _guard = self.locks[idx % self.locks.len()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // SAFETY: the stripe lock for `idx` is held.
        let buffer = unsafe { &mut *self.color_buffer.get() };
        buffer[idx] = color;
    }

    /// Resolved color of an output pixel (mean of its sub-samples).
    ///
    /// Meant for reading back a finished frame; it does not take the stripe locks.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector4<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        // SAFETY: read-only access once rendering has finished.
        let buffer = unsafe { &*self.color_buffer.get() };

        if self.samples == 1 {
            return Some(buffer[self.index(x, y)]);
        }

        let mut sum = Vector4::zeros();
        let start_x = x * self.samples;
        let start_y = y * self.samples;
        for dy in 0..self.samples {
            for dx in 0..self.samples {
                sum += buffer[self.index(start_x + dx, start_y + dy)];
            }
        }
        Some(sum / (self.samples * self.samples) as f32)
    }

    /// Resolves the whole frame, row-major, `width * height` entries.
    pub fn resolve(&self) -> Vec<Vector4<f32>> {
        (0..self.width * self.height)
            .into_par_iter()
            .map(|i| {
                self.get_pixel(i % self.width, i / self.width)
                    .unwrap_or_else(Vector4::zeros)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn depth_test_keeps_nearest() {
        let fb = FrameBuffer::new(4, 4, 1);
        assert!(fb.depth_test_and_update(1, 1, 0.5));
        assert!(!fb.depth_test_and_update(1, 1, 0.7));
        assert!(!fb.depth_test_and_update(1, 1, 0.5));
        assert!(fb.depth_test_and_update(1, 1, 0.2));
        assert_eq!(fb.depth_at(1, 1), Some(0.2));
        assert!(!fb.depth_test_and_update(9, 9, 0.0));
    }

    #[test]
    fn clear_resets_color_and_depth() {
        let mut fb = FrameBuffer::new(2, 2, 1);
        fb.depth_test_and_update(0, 0, 0.1);
        fb.set_pixel_safe(0, 0, Vector4::new(1.0, 0.0, 0.0, 1.0));

        fb.clear(Vector4::new(0.2, 0.2, 0.2, 1.0), f32::INFINITY);
        assert_eq!(fb.depth_at(0, 0), Some(f32::INFINITY));
        assert_eq!(fb.get_pixel(0, 0), Some(Vector4::new(0.2, 0.2, 0.2, 1.0)));
    }

    #[test]
    fn parallel_writes_all_land() {
        let fb = FrameBuffer::new(16, 16, 1);
        (0..16usize).into_par_iter().for_each(|y| {
            for x in 0..16 {
                fb.set_pixel_safe(x, y, Vector4::new(x as f32, y as f32, 0.0, 1.0));
            }
        });
        assert_eq!(fb.get_pixel(3, 11), Some(Vector4::new(3.0, 11.0, 0.0, 1.0)));
        assert_eq!(fb.resolve().len(), 256);
    }

    #[test]
    fn supersampled_pixels_average() {
        let fb = FrameBuffer::new(1, 1, 2);
        assert_eq!((fb.buffer_width, fb.buffer_height), (2, 2));
        fb.set_pixel_safe(0, 0, Vector4::new(1.0, 1.0, 1.0, 1.0));
        fb.set_pixel_safe(1, 1, Vector4::new(1.0, 1.0, 1.0, 1.0));

        let resolved = fb.resolve();
        assert_eq!(resolved.len(), 1);
        assert_relative_eq!(resolved[0], Vector4::new(0.5, 0.5, 0.5, 1.0), epsilon = 1e-6);
    }
}
