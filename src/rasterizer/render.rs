//! Core rendering functions
//! Clip test, z-buffered point/line/triangle rasterization, shading dispatch

use log::{debug, info, trace, warn};

use super::math::{aabb2d, interp, Matrix, Vector};
use super::shading::{IlluminationMode, Surface};
use super::transform::Transform;
use super::types::{Light, Primitive, Texcoord, Texture, Vertex};

/// Color and depth storage, row-major, one entry per pixel
pub struct Framebuffer {
    pixels: Vec<u32>,  // 0x00RRGGBB
    zbuffer: Vec<f32>, // 0.0 = near plane, 1.0 = far plane
    width: usize,
    height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            zbuffer: vec![1.0; width * height],
            width,
            height,
        }
    }

    /// Wrap caller-provided pixel storage. `None` if the length is not
    /// `width * height`.
    pub fn from_pixels(pixels: Vec<u32>, width: usize, height: usize) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            pixels,
            zbuffer: vec![1.0; width * height],
            width,
            height,
        })
    }

    /// Black pixels, depth 1.0 everywhere
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.zbuffer.fill(1.0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn depth(&self) -> &[f32] {
        &self.zbuffer
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.zbuffer[y * self.width + x])
        } else {
            None
        }
    }

    /// Depth-tested write. Out-of-bounds coordinates are dropped; the write
    /// loses only if the stored depth is strictly smaller than `z`.
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, z: f32, packed: u32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        let idx = y as usize * self.width + x as usize;
        if self.zbuffer[idx] < z {
            return false;
        }
        self.pixels[idx] = packed;
        self.zbuffer[idx] = z;
        true
    }

    /// Convert to RGBA bytes for presenting (alpha = 255)
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            bytes.push((p >> 16) as u8);
            bytes.push((p >> 8) as u8);
            bytes.push(p as u8);
            bytes.push(255);
        }
        bytes
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }
}

/// Outcode bits, one per violated view-volume plane
pub const CVV_NEAR: u8 = 1;
pub const CVV_FAR: u8 = 2;
pub const CVV_LEFT: u8 = 4;
pub const CVV_RIGHT: u8 = 8;
pub const CVV_BOTTOM: u8 = 16;
pub const CVV_TOP: u8 = 32;

/// Test a clip-space position against `0 <= z <= w`, `-w <= x <= w`,
/// `-w <= y <= w`. Returns 0 when inside.
pub fn cvv_outcode(pv: Vector) -> u8 {
    let w = pv.w;
    let mut code = 0;
    if pv.z < 0.0 {
        code |= CVV_NEAR;
    }
    if pv.z > w {
        code |= CVV_FAR;
    }
    if pv.x < -w {
        code |= CVV_LEFT;
    }
    if pv.x > w {
        code |= CVV_RIGHT;
    }
    if pv.y < -w {
        code |= CVV_BOTTOM;
    }
    if pv.y > w {
        code |= CVV_TOP;
    }
    code
}

pub fn is_outside_cvv(pv: Vector) -> bool {
    cvv_outcode(pv) != 0
}

/// Screen-space barycentric coordinates of `p` in `(v1, v2, v3)`.
///
/// Returns `(u, v)`, the weights of `v1` and `v2` (the weight of `v3` is
/// `1 - u - v`), only when `p` is inside: `u, v` in `[0, 1]` and
/// `u + v <= 1`. A zero-area triangle has no inside and always yields `None`.
pub fn barycentric(v1: Vector, v2: Vector, v3: Vector, p: Vector) -> Option<(f32, f32)> {
    let den_u = -(v1.x - v2.x) * (v3.y - v2.y) + (v1.y - v2.y) * (v3.x - v2.x);
    let den_v = -(v2.x - v3.x) * (v1.y - v3.y) + (v2.y - v3.y) * (v1.x - v3.x);
    if den_u == 0.0 || den_v == 0.0 {
        return None;
    }

    let u = (-(p.x - v2.x) * (v3.y - v2.y) + (p.y - v2.y) * (v3.x - v2.x)) / den_u;
    let v = (-(p.x - v3.x) * (v1.y - v3.y) + (p.y - v3.y) * (v1.x - v3.x)) / den_v;

    if u + v > 1.0 {
        return None;
    }
    if (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v) {
        Some((u, v))
    } else {
        None
    }
}

/// Rasterization device: framebuffer, transform, light and shading mode.
///
/// Built once; every frame starts with `clear`, which hands out the `Frame`
/// that all draw calls go through.
pub struct Device {
    framebuffer: Framebuffer,
    transform: Transform,
    light: Light,
    textures: Vec<Texture>,
    cam_eye: Vector,
    illumination: IlluminationMode,
}

impl Device {
    pub fn new(
        framebuffer: Framebuffer,
        transform: Transform,
        textures: Vec<Texture>,
        light: Light,
        illumination: IlluminationMode,
    ) -> Self {
        if transform.width() != framebuffer.width() || transform.height() != framebuffer.height() {
            warn!(
                "Transform viewport {}x{} differs from framebuffer {}x{}",
                transform.width(),
                transform.height(),
                framebuffer.width(),
                framebuffer.height()
            );
        }
        info!(
            "Device {}x{}, {} shading, {} textures",
            framebuffer.width(),
            framebuffer.height(),
            illumination.label(),
            textures.len()
        );
        Self {
            framebuffer,
            transform,
            light,
            textures,
            cam_eye: Vector::point(1.0, 0.0, 0.0),
            illumination,
        }
    }

    /// Look from `(x, y, z)` at the origin with +Z up, then recompose
    pub fn set_camera(&mut self, x: f32, y: f32, z: f32) {
        self.cam_eye = Vector::point(x, y, z);
        let view = Matrix::look_at(
            self.cam_eye,
            Vector::point(0.0, 0.0, 0.0),
            Vector::point(0.0, 0.0, 1.0),
        );
        self.transform = self.transform.set_view(view).update();
        debug!("Camera at ({}, {}, {})", x, y, z);
    }

    pub fn set_world(&mut self, m: Matrix) {
        self.transform = self.transform.set_world(m).update();
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut Light {
        &mut self.light
    }

    pub fn camera_eye(&self) -> Vector {
        self.cam_eye
    }

    pub fn illumination(&self) -> IlluminationMode {
        self.illumination
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height
    }

    /// Reset color to black and depth to 1.0, and start a frame
    pub fn clear(&mut self) -> Frame<'_> {
        self.framebuffer.clear();
        Frame { device: self }
    }

    /// Release the depth buffer and texture table; hand the pixels back
    pub fn close(self) -> Vec<u32> {
        info!(
            "Closing device {}x{}",
            self.framebuffer.width, self.framebuffer.height
        );
        self.framebuffer.into_pixels()
    }
}

/// One frame's worth of draw calls against a freshly cleared device
pub struct Frame<'a> {
    device: &'a mut Device,
}

impl Frame<'_> {
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.device.framebuffer
    }

    /// Draw every primitive in order
    pub fn submit(&mut self, primitives: &[Primitive]) {
        for prim in primitives {
            match prim {
                Primitive::Point(v) => self.draw_point2d(v),
                Primitive::Line(a, b) => self.draw_line3d(a, b),
                Primitive::Triangle(a, b, c) => self.draw_triangle3d(a, b, c),
            }
        }
    }

    /// Write one screen-space vertex through the depth test.
    ///
    /// x and y truncate toward zero, so coordinates in `(-1, 0)` land on
    /// column/row 0.
    pub fn draw_point2d(&mut self, sv: &Vertex) {
        let x = sv.pos.x as i32;
        let y = sv.pos.y as i32;
        self.device
            .framebuffer
            .set_pixel_with_depth(x, y, sv.pos.z, sv.color.to_packed());
    }

    /// World-space line. Both endpoints must be points (w == 1) and inside
    /// the view volume, or nothing is drawn.
    pub fn draw_line3d(&mut self, wv1: &Vertex, wv2: &Vertex) {
        if wv1.pos.w != 1.0 || wv2.pos.w != 1.0 {
            trace!("line dropped: endpoint is not a point");
            return;
        }

        let t = &self.device.transform;
        let pv1 = t.apply_wvp(wv1.pos);
        let pv2 = t.apply_wvp(wv2.pos);

        if is_outside_cvv(pv1) || is_outside_cvv(pv2) {
            trace!("line dropped: outside view volume");
            return;
        }

        let sv1 = Vertex { pos: t.homogenize(pv1), ..*wv1 };
        let sv2 = Vertex { pos: t.homogenize(pv2), ..*wv2 };
        self.draw_line2d(&sv1, pv1.w, &sv2, pv2.w);
    }

    /// Screen-space line between homogenized endpoints; `w1`/`w2` are their
    /// clip-space w. The far endpoint's pixel is not drawn.
    ///
    /// Endpoints are snapped to the pixel grid in x, y and z, so fragments
    /// of a line that stays inside the view volume all get depth 0. Endpoints
    /// that are not finite or lie beyond `LINE_COORD_LIMIT` draw nothing.
    pub fn draw_line2d(&mut self, sv1: &Vertex, w1: f32, sv2: &Vertex, w2: f32) {
        if !within_line_limit(sv1.pos) || !within_line_limit(sv2.pos) {
            trace!("line dropped: endpoint out of range");
            return;
        }

        let (x1, y1, z1) = (sv1.pos.x.floor(), sv1.pos.y.floor(), sv1.pos.z.floor());
        let (x2, y2, z2) = (sv2.pos.x.floor(), sv2.pos.y.floor(), sv2.pos.z.floor());

        if x1 == x2 && y1 == y2 && z1 == z2 {
            self.draw_point2d(sv1);
            return;
        }

        let end1 = Vertex { pos: Vector::new(x1, y1, z1, 1.0), ..*sv1 };
        let end2 = Vertex { pos: Vector::new(x2, y2, z2, 1.0), ..*sv2 };
        let sample = |sf: f32, x: i32, y: i32| line_sample(&end1, w1, &end2, w2, sf, x as f32, y as f32);

        if x1 == x2 {
            for i in steps(y1 as i32, y2 as i32) {
                let sf = (i as f32 - y1) / (y2 - y1);
                self.draw_point2d(&sample(sf, x1 as i32, i));
            }
        } else if y1 == y2 {
            for i in steps(x1 as i32, x2 as i32) {
                let sf = (i as f32 - x1) / (x2 - x1);
                self.draw_point2d(&sample(sf, i, y1 as i32));
            }
        } else {
            // Walk the major axis one pixel at a time; the minor axis advances
            // when the accumulated error reaches the major extent.
            let dx = (sv1.pos.x - sv2.pos.x).abs();
            let dy = (sv1.pos.y - sv2.pos.y).abs();
            let len = ((x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1)).sqrt();
            let mut diff = 0.0;

            if dx >= dy {
                let mut j = y1 as i32;
                let jstep = if y2 > y1 { 1 } else { -1 };
                for i in steps(x1 as i32, x2 as i32) {
                    let sf = screen_dist(i as f32 - x1, j as f32 - y1) / len;
                    self.draw_point2d(&sample(sf, i, j));

                    diff += dy;
                    if diff >= dx {
                        diff -= dx;
                        j += jstep;
                    }
                }
            } else {
                let mut j = x1 as i32;
                let jstep = if x2 > x1 { 1 } else { -1 };
                for i in steps(y1 as i32, y2 as i32) {
                    let sf = screen_dist(j as f32 - x1, i as f32 - y1) / len;
                    self.draw_point2d(&sample(sf, j, i));

                    diff += dx;
                    if diff >= dy {
                        diff -= dy;
                        j += jstep;
                    }
                }
            }
        }
    }

    /// World-space triangle, filled with perspective-correct color, texcoord
    /// and depth, lit per pixel by the device's illumination mode.
    ///
    /// Dropped when any vertex is not a point (w != 1), any vertex falls
    /// outside the view volume, or the screen-space winding faces away.
    pub fn draw_triangle3d(&mut self, wv1: &Vertex, wv2: &Vertex, wv3: &Vertex) {
        if wv1.pos.w != 1.0 || wv2.pos.w != 1.0 || wv3.pos.w != 1.0 {
            trace!("triangle dropped: vertex is not a point");
            return;
        }

        let t = &self.device.transform;
        let pv = [t.apply_wvp(wv1.pos), t.apply_wvp(wv2.pos), t.apply_wvp(wv3.pos)];
        if pv.iter().any(|&p| is_outside_cvv(p)) {
            trace!("triangle dropped: outside view volume");
            return;
        }
        let sv = pv.map(|p| t.homogenize(p));

        // Winding is judged after the divide, in screen space
        let v12 = sv[1] - sv[0];
        let v23 = sv[2] - sv[1];
        let face = v23.cross(v12).normalize();
        if Vector::direction(0.0, 0.0, -1.0).dot(face) < 0.0 {
            trace!("triangle culled: back-facing");
            return;
        }

        let (min, max) = aabb2d(sv[0], sv[1], sv[2]);
        let last_x = self.device.framebuffer.width as i32 - 1;
        let last_y = self.device.framebuffer.height as i32 - 1;
        let min_x = (min.x.floor() as i32).max(0);
        let min_y = (min.y.floor() as i32).max(0);
        let max_x = (max.x.ceil() as i32).min(last_x);
        let max_y = (max.y.ceil() as i32).min(last_y);

        let illumination = self.device.illumination;
        let eye = self.device.cam_eye;
        let light = self.device.light;
        let clip_w = [pv[0].w, pv[1].w, pv[2].w];

        for j in min_y..=max_y {
            for i in min_x..=max_x {
                let p = Vector::point(i as f32, j as f32, 0.0);
                let Some((u, v)) = barycentric(sv[0], sv[1], sv[2], p) else {
                    continue;
                };
                let w = 1.0 - u - v;

                let [wf1, wf2, wf3] = perspective_weights(u, v, clip_w);

                let color = wv1.color * wf1 + wv2.color * wf2 + wv3.color * wf3;
                let tex = Texcoord {
                    u: wv1.tex.u * wf1 + wv2.tex.u * wf2 + wv3.tex.u * wf3,
                    v: wv1.tex.v * wf1 + wv2.tex.v * wf2 + wv3.tex.v * wf3,
                };
                let z = sv[0].z * wf1 + sv[1].z * wf2 + sv[2].z * wf3;

                // Lighting geometry uses the plain screen-space weights
                let normal = (wv1.normal * u + wv2.normal * v + wv3.normal * w).normalize();
                let wp = wv1.pos * u + wv2.pos * v + wv3.pos * w;
                let position = Vector::point(wp.x, wp.y, wp.z);

                let surface = Surface { color, normal, position };
                let shaded = illumination.shade(&surface, eye, &light);

                self.draw_point2d(&Vertex {
                    pos: Vector::new(i as f32, j as f32, z, 1.0),
                    color: shaded,
                    tex,
                    normal,
                });
            }
        }
    }
}

/// Perspective-correct weights from the screen-space barycentrics `(u, v)`
/// and each vertex's clip-space w. The three weights sum to 1.
fn perspective_weights(u: f32, v: f32, clip_w: [f32; 3]) -> [f32; 3] {
    let r1 = u / clip_w[0];
    let r2 = v / clip_w[1];
    let r3 = (1.0 - u - v) / clip_w[2];
    let inv = 1.0 / (r1 + r2 + r3);
    let wf1 = r1 * inv;
    let wf2 = r2 * inv;
    [wf1, wf2, 1.0 - wf1 - wf2]
}

/// Largest |x| or |y| a screen-space line endpoint may have
pub const LINE_COORD_LIMIT: f32 = 1_048_576.0;

fn within_line_limit(p: Vector) -> bool {
    p.x.is_finite()
        && p.y.is_finite()
        && p.z.is_finite()
        && p.x.abs() <= LINE_COORD_LIMIT
        && p.y.abs() <= LINE_COORD_LIMIT
}

/// `from, from ± 1, ...` up to but excluding `to`
fn steps(from: i32, to: i32) -> impl Iterator<Item = i32> {
    let step = if to > from { 1 } else { -1 };
    (0..(to - from).abs()).map(move |k| from + k * step)
}

fn screen_dist(dx: f32, dy: f32) -> f32 {
    (dx * dx + dy * dy).sqrt()
}

/// Blend line endpoint attributes at screen-space fraction `sf`.
///
/// `wf = (sf/w1) / (sf/w1 + (1-sf)/w2)`; attributes mix as `(1-wf, wf)`.
fn line_sample(sv1: &Vertex, w1: f32, sv2: &Vertex, w2: f32, sf: f32, x: f32, y: f32) -> Vertex {
    let inv = 1.0 / (sf / w1 + (1.0 - sf) / w2);
    let wf = (sf / w1) * inv;

    let n = sv1.normal.lerp(sv2.normal, wf);

    Vertex {
        pos: Vector::new(x, y, interp(sv1.pos.z, sv2.pos.z, wf), 1.0),
        color: sv1.color.lerp(sv2.color, wf),
        tex: sv1.tex.lerp(sv2.tex, wf),
        normal: Vector::direction(n.x, n.y, n.z),
    }
}
