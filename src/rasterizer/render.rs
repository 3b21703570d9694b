//! Pixel and depth buffers plus the scanline draw primitives
//!
//! Everything lands in a flat, row-major `0xRRGGBB` pixel buffer with a
//! parallel depth buffer. Primitives take world-space points, push them
//! through the camera, and fill in screen space.

use super::camera::Camera;
use super::math::Vec3;

/// Cleared depth value, meaning "nothing drawn here this frame". A real
/// projected depth of zero would need a remapped NDC z of -1, which the
/// near limit rules out, so the sentinel cannot collide.
pub const DEPTH_CLEAR: f64 = 0.0;

/// Cleared pixel color.
pub const BACKGROUND: u32 = 0x000000;

/// Floor for the depth-overlay darkening factor.
const OVERLAY_FLOOR: f64 = 0.05;

/// Triangles whose projected plane normal has |z| below this are edge-on
/// and have no solvable depth plane.
const PLANE_EPSILON: f64 = 1e-9;

/// Remapped depth shrinks with distance (about 2.22 at the near plane,
/// 0.88 at the default far plane), so the larger value is the nearer
/// surface.
pub fn nearer(candidate: f64, stored: f64) -> bool {
    candidate > stored
}

/// Pack 8-bit channels into the buffer's 0xRRGGBB layout.
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Depth of a screen point on the plane through three projected
/// vertices, solved from the plane equation.
fn plane_depth(x: i32, y: i32, norm: Vec3, d: f64) -> f64 {
    (norm.x * x as f64 + norm.y * y as f64 + d) / -norm.z
}

/// Render target: fixed-size pixel and depth buffers.
pub struct Screen {
    pub width: usize,
    pub height: usize,
    /// Packed 0xRRGGBB, row-major, `x + y * width`.
    pub pixels: Vec<u32>,
    /// Parallel to `pixels`; `DEPTH_CLEAR` marks unwritten pixels.
    pub depth: Vec<f64>,
    depth_test: bool,
}

impl Screen {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
            depth: vec![DEPTH_CLEAR; width * height],
            depth_test: true,
        }
    }

    /// With depth testing off, every write lands regardless of what is
    /// already there; depth values are still recorded.
    pub fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    pub fn clear(&mut self) {
        self.pixels.fill(BACKGROUND);
        self.depth.fill(DEPTH_CLEAR);
    }

    /// Screen-fraction point to pixel coordinates; depth passes through.
    fn to_screen(&self, p: Vec3) -> Vec3 {
        Vec3::new(p.x * self.width as f64, p.y * self.height as f64, p.z)
    }

    pub fn draw_point(&mut self, camera: &Camera, p: Vec3, color: u32) {
        if let Some(v) = camera.project(p) {
            let v = self.to_screen(v);
            self.fill_pixel(v.x as i32, v.y as i32, v.z, color);
        }
    }

    /// Line between two world points. If either endpoint fails to
    /// project the whole line is skipped.
    pub fn draw_line(&mut self, camera: &Camera, a: Vec3, b: Vec3, color: u32) {
        if let (Some(pa), Some(pb)) = (camera.project(a), camera.project(b)) {
            let pa = self.to_screen(pa);
            let pb = self.to_screen(pb);
            self.fill_line(pa, pb, color);
        }
    }

    /// Filled triangle between three world points, depth interpolated
    /// across the projected plane. Skipped whole if any vertex fails to
    /// project.
    pub fn draw_triangle(&mut self, camera: &Camera, a: Vec3, b: Vec3, c: Vec3, color: u32) {
        if let (Some(pa), Some(pb), Some(pc)) =
            (camera.project(a), camera.project(b), camera.project(c))
        {
            let pa = self.to_screen(pa);
            let pb = self.to_screen(pb);
            let pc = self.to_screen(pc);
            self.fill_triangle(pa, pb, pc, color);
        }
    }

    /// Flat disc at a world point, sized by projected depth so it shrinks
    /// with distance. One depth decision at the center pixel gates the
    /// whole disc, and it applies even with depth testing toggled off.
    pub fn draw_circle(&mut self, camera: &Camera, center: Vec3, radius: f64, color: u32) {
        if let Some(v) = camera.project(center) {
            let v = self.to_screen(v);
            if v.x < 0.0 || v.x >= self.width as f64 || v.y < 0.0 || v.y >= self.height as f64 {
                return;
            }
            let i = v.x as usize + v.y as usize * self.width;
            if self.depth[i] == DEPTH_CLEAR || nearer(v.z, self.depth[i]) {
                let scaled = (radius * (v.z - 0.8) * 15.0).max(2.0);
                self.fill_circle(v, scaled, color);
            }
        }
    }

    /// Darken every written pixel by its distance: each channel scales by
    /// log10(depth * 100 - 80) clamped into [0.05, 1]; arguments at or
    /// below zero clamp straight to the floor.
    pub fn apply_depth_overlay(&mut self) {
        for i in 0..self.pixels.len() {
            let d = self.depth[i];
            if d == DEPTH_CLEAR {
                continue;
            }
            let arg = d * 100.0 - 80.0;
            let scale = if arg > 0.0 {
                arg.log10().clamp(OVERLAY_FLOOR, 1.0)
            } else {
                OVERLAY_FLOOR
            };
            let px = self.pixels[i];
            let r = (((px >> 16) & 0xFF) as f64 * scale) as u8;
            let g = (((px >> 8) & 0xFF) as f64 * scale) as u8;
            let b = ((px & 0xFF) as f64 * scale) as u8;
            self.pixels[i] = pack_rgb(r, g, b);
        }
    }

    /// Copy the frame into an RGBA byte buffer for texture upload; alpha
    /// is always opaque.
    pub fn write_rgba(&self, out: &mut [u8]) {
        for (i, px) in self.pixels.iter().enumerate() {
            let o = i * 4;
            out[o] = (px >> 16) as u8;
            out[o + 1] = (px >> 8) as u8;
            out[o + 2] = *px as u8;
            out[o + 3] = 0xFF;
        }
    }

    /// Depth-tested pixel write. Off-screen coordinates are dropped;
    /// the depth buffer records every write that lands.
    fn fill_pixel(&mut self, x: i32, y: i32, z: f64, color: u32) {
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return;
        }
        let i = x as usize + y as usize * self.width;
        if self.depth[i] == DEPTH_CLEAR || nearer(z, self.depth[i]) || !self.depth_test {
            self.depth[i] = z;
            self.pixels[i] = color;
        }
    }

    /// Scanline line fill in pixel space. Steep lines walk rows and
    /// interpolate x, shallow lines walk columns and interpolate y;
    /// depth interpolates along either axis. Interpolants are sampled
    /// before stepping, so both endpoints land exactly.
    fn fill_line(&mut self, a: Vec3, b: Vec3, color: u32) {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        if dx == 0.0 && dy == 0.0 {
            // zero-length line, a single pixel
            self.fill_pixel(a.x as i32, a.y as i32, a.z, color);
            return;
        }
        if dy.abs() > dx.abs() {
            let (a, b) = if a.y < b.y { (a, b) } else { (b, a) };
            let slope_x = (b.x - a.x) / (b.y - a.y);
            let slope_z = (b.z - a.z) / (b.y - a.y);
            let mut x = a.x;
            let mut z = a.z;
            let mut y = a.y as i32;
            while (y as f64) <= b.y {
                self.fill_pixel(x as i32, y, z, color);
                x += slope_x;
                z += slope_z;
                y += 1;
            }
        } else {
            let (a, b) = if a.x < b.x { (a, b) } else { (b, a) };
            let slope_y = (b.y - a.y) / (b.x - a.x);
            let slope_z = (b.z - a.z) / (b.x - a.x);
            let mut y = a.y;
            let mut z = a.z;
            let mut x = a.x as i32;
            while (x as f64) <= b.x {
                self.fill_pixel(x, y as i32, z, color);
                y += slope_y;
                z += slope_z;
                x += 1;
            }
        }
    }

    /// Disc fill in pixel space at a single depth.
    fn fill_circle(&mut self, center: Vec3, radius: f64, color: u32) {
        let rr = radius * radius;
        let mut y = (-radius) as i32;
        while (y as f64) < radius {
            let hw = (rr - (y * y) as f64).sqrt() as i32;
            for x in -hw..hw {
                self.fill_pixel(center.x as i32 + x, center.y as i32 + y, center.z, color);
            }
            y += 1;
        }
    }

    /// Scanline triangle fill in pixel space. Vertices sort by ascending
    /// screen y (ties order the later argument first), rows fill between
    /// the long edge and the split top/bottom edges, and every pixel's
    /// depth comes from the plane through the three vertices.
    fn fill_triangle(&mut self, v1: Vec3, v2: Vec3, v3: Vec3, color: u32) {
        let mut ordered = [(v1, 2u8), (v2, 1u8), (v3, 0u8)];
        ordered.sort_by(|l, r| l.0.y.total_cmp(&r.0.y).then(l.1.cmp(&r.1)));
        let (a, b, c) = (ordered[0].0, ordered[1].0, ordered[2].0);

        let norm = (c - a).cross(b - a);
        if norm.z.abs() < PLANE_EPSILON {
            // projected edge-on or collapsed to a line
            return;
        }
        let d = -norm.dot(a);

        // per-edge x slopes; flat edges pin to 0 instead of dividing by 0
        let d0 = if b.y != a.y { (b.x - a.x) / (b.y - a.y) } else { 0.0 };
        let d1 = if c.y != b.y { (c.x - b.x) / (c.y - b.y) } else { 0.0 };
        let d2 = if a.y != c.y { (a.x - c.x) / (a.y - c.y) } else { 0.0 };

        let min_x = a.x.min(b.x).min(c.x);
        let max_x = a.x.max(b.x).max(c.x);

        // top half: long edge against the top-to-mid edge
        let mut y = a.y as i32;
        while (y as f64) < b.y {
            let sx = (a.x + (y as f64 - a.y) * d2).clamp(min_x, max_x) as i32;
            let ex = (a.x + (y as f64 - a.y) * d0).clamp(min_x, max_x) as i32;
            self.fill_span(sx, ex, y, norm, d, color);
            y += 1;
        }

        // bottom half: long edge against the mid-to-bottom edge
        let mut y = b.y as i32;
        while (y as f64) < c.y {
            let sx = (a.x + (y as f64 - a.y) * d2).clamp(min_x, max_x) as i32;
            let ex = (b.x + (y as f64 - b.y) * d1).clamp(min_x, max_x) as i32;
            self.fill_span(sx, ex, y, norm, d, color);
            y += 1;
        }
    }

    /// One triangle row between two edge crossings, in either order.
    fn fill_span(&mut self, sx: i32, ex: i32, y: i32, norm: Vec3, d: f64, color: u32) {
        let (lo, hi) = if sx < ex { (sx, ex) } else { (ex, sx) };
        let hi = hi.min(self.width as i32 - 1);
        for x in lo.max(0)..=hi {
            let z = plane_depth(x, y, norm, d);
            self.fill_pixel(x, y, z, color);
        }
    }
}
