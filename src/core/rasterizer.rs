use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{TriangleSetup, is_inside_triangle, perspective_correct};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::{Fragment, Interpolatable, Shader};
use nalgebra::{Point2, Vector3, Vector4};
use rayon::prelude::*;

/// Clip planes as (axis, sign): a point is inside when `sign * p[axis] <= p.w`.
const CLIP_PLANES: [(usize, f32); 6] = [
    (0, 1.0),  // right
    (0, -1.0), // left
    (1, 1.0),  // top
    (1, -1.0), // bottom
    (2, 1.0),  // far
    (2, -1.0), // near
];

/// Draws triangles into a `FrameBuffer`.
pub struct Rasterizer {
    pub cull_mode: CullMode,
}

/// Which winding to discard. Front faces run counter-clockwise in NDC.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum CullMode {
    Back,
    Front,
    #[default]
    None,
}

impl CullMode {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name.to_ascii_lowercase().as_str() {
            "back" => Ok(Self::Back),
            "front" => Ok(Self::Front),
            "none" => Ok(Self::None),
            other => Err(format!(
                "Unknown cull mode '{}' (expected back, front or none)",
                other
            )),
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

type ClipVertex<V> = (Vector4<f32>, V);

impl Rasterizer {
    /// Face culling is off by default, like a fresh GL context.
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::None,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Rasterizes one triangle given clip-space corners and their varyings.
    ///
    /// The triangle is clipped against the view volume in homogeneous clip
    /// space (Sutherland–Hodgman), the resulting convex polygon is fanned
    /// back into triangles and each is scan-converted.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        // A triangle clipped by six planes has at most nine corners.
        let mut polygon: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        let mut scratch: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        polygon.extend(clip_coords.iter().copied().zip(varyings.iter().copied()));

        for &(axis, sign) in &CLIP_PLANES {
            if polygon.is_empty() {
                return;
            }
            clip_against_plane(&polygon, &mut scratch, axis, sign);
            std::mem::swap(&mut polygon, &mut scratch);
        }

        if polygon.len() < 3 {
            return;
        }

        let (p0, v0) = polygon[0];
        for pair in polygon[1..].windows(2) {
            let (p1, v1) = pair[0];
            let (p2, v2) = pair[1];
            self.rasterize_clipped(framebuffer, shader, &[p0, p1, p2], &[v0, v1, v2]);
        }
    }

    /// Scan-converts a triangle that lies inside the view volume.
    fn rasterize_clipped<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        // 1. Perspective division & viewport transform
        let mut screen = [Point2::origin(); 3];
        let mut inv_w = Vector3::zeros();
        let mut ndc_z = Vector3::zeros();
        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
            inv_w[i] = 1.0 / clip_coords[i].w;
            ndc_z[i] = ndc.z;
        }

        let Some(setup) = TriangleSetup::new(screen[0], screen[1], screen[2]) else {
            return;
        };

        // 2. Face culling
        let area = setup.signed_area_x2();
        match self.cull_mode {
            CullMode::Back if area > 0.0 => return,
            CullMode::Front if area < 0.0 => return,
            _ => {}
        }

        // 3. Bounding box & scissor
        let (min_x, min_y, max_x, max_y) = bounding_box(&screen);
        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }
        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(framebuffer.buffer_width as i32 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(framebuffer.buffer_height as i32 - 1) as usize;

        // Derivatives are taken one *output* pixel away, so a supersampled
        // target still sees per-pixel rates of change.
        let step = framebuffer.samples as f32;
        let combine = |w: &Vector3<f32>| -> S::Varying {
            varyings[0] * w.x + varyings[1] * w.y + varyings[2] * w.z
        };
        let weights_at = |p: Point2<f32>| perspective_correct(&setup.barycentric(p), &inv_w);

        // 4. Pixel loop, rows in parallel
        (start_y..=end_y).into_par_iter().for_each(|y| {
            for x in start_x..=end_x {
                let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let bary = setup.barycentric(center);
                if !is_inside_triangle(&bary) {
                    continue;
                }

                // NDC depth is affine in screen space: no perspective correction.
                let depth = bary.dot(&ndc_z) * 0.5 + 0.5;
                if !framebuffer.depth_test_and_update(x, y, depth) {
                    continue;
                }

                let Some(weights) = perspective_correct(&bary, &inv_w) else {
                    continue;
                };
                let dx = weights_at(Point2::new(center.x + step, center.y))
                    .map_or_else(Vector3::zeros, |w| w - weights);
                let dy = weights_at(Point2::new(center.x, center.y + step))
                    .map_or_else(Vector3::zeros, |w| w - weights);

                let fragment = Fragment {
                    varying: combine(&weights),
                    ddx: combine(&dx),
                    ddy: combine(&dy),
                };
                framebuffer.set_pixel_safe(x, y, shader.fragment(&fragment));
            }
        });
    }
}

/// Clips a convex polygon against one plane, writing the result into `output`.
fn clip_against_plane<V: Interpolatable>(
    input: &[ClipVertex<V>],
    output: &mut Vec<ClipVertex<V>>,
    axis: usize,
    sign: f32,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

    let mut prev = last;
    let mut prev_inside = inside(&prev.0);
    for &curr in input {
        let curr_inside = inside(&curr.0);
        if curr_inside != prev_inside
            && let Some(hit) = intersect(prev, curr, axis, sign)
        {
            output.push(hit);
        }
        if curr_inside {
            output.push(curr);
        }
        prev = curr;
        prev_inside = curr_inside;
    }
}

/// Intersection of segment a-b with the plane `sign * p[axis] = p.w`,
/// interpolating position and varying alike.
#[inline(always)]
fn intersect<V: Interpolatable>(
    a: ClipVertex<V>,
    b: ClipVertex<V>,
    axis: usize,
    sign: f32,
) -> Option<ClipVertex<V>> {
    let da = a.0.w - sign * a.0[axis];
    let db = b.0.w - sign * b.0[axis];
    let denom = da - db;
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = da / denom;
    if !t.is_finite() {
        return None;
    }
    Some((a.0 + (b.0 - a.0) * t, a.1 * (1.0 - t) + b.1 * t))
}

fn bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}
