//! Fixed demo scene and light animation
//!
//! A small cross of screen-space points, four lines through the origin and
//! a fan of triangles in the x = 0 plane, all seen from +X.

use crate::rasterizer::{Color, Device, Matrix, Primitive, Texcoord, Vector, Vertex};

/// Light direction before the per-frame rotation
pub const LIGHT_BASE: Vector = Vector { x: -0.3, y: 1.0, z: -0.3, w: 0.0 };

fn vert(x: f32, y: f32, z: f32, color: Color) -> Vertex {
    Vertex::new(
        Vector::point(x, y, z),
        color,
        Texcoord::default(),
        Vector::direction(1.0, 0.0, 0.0),
    )
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::new(r, g, b)
}

/// The demo's primitive list, in draw order
pub fn demo_primitives() -> Vec<Primitive> {
    let red = rgb(1.0, 0.0, 0.0);
    let mut prims = Vec::new();

    // Screen-space cross centered on (300, 400)
    for (x, y) in [(300.0, 400.0), (301.0, 400.0), (299.0, 400.0), (300.0, 401.0), (300.0, 399.0)] {
        prims.push(Primitive::Point(vert(x, y, 0.0, red)));
    }

    prims.push(Primitive::Line(vert(0.0, 1.0, 1.0, red), vert(0.0, -1.0, -1.0, rgb(0.0, 1.0, 0.0))));
    prims.push(Primitive::Line(vert(0.0, -1.0, 1.0, red), vert(0.0, 1.0, -1.0, rgb(1.0, 0.0, 1.0))));
    prims.push(Primitive::Line(vert(0.0, 1.0, 0.0, red), vert(0.0, -1.0, 0.0, rgb(1.0, 1.0, 0.0))));
    prims.push(Primitive::Line(vert(0.0, 0.0, 1.0, red), vert(0.0, 0.0, -1.0, rgb(0.0, 1.0, 1.0))));

    prims.push(Primitive::Triangle(
        vert(0.0, -1.0, 0.0, red),
        vert(0.0, 0.0, -1.0, rgb(0.0, 1.0, 0.0)),
        vert(0.0, 1.0, 0.0, rgb(0.0, 0.0, 1.0)),
    ));
    prims.push(Primitive::Triangle(
        vert(0.0, -1.0, 1.0, red),
        vert(0.0, 0.0, 0.0, red),
        vert(0.0, 1.0, 1.0, red),
    ));
    prims.push(Primitive::Triangle(
        vert(0.0, -1.0, 0.0, red),
        vert(0.0, -1.0, -2.0, rgb(0.0, 0.0, 1.0)),
        vert(0.0, 0.0, -1.0, rgb(0.0, 1.0, 0.0)),
    ));
    prims.push(Primitive::Triangle(
        vert(0.0, 1.0, 0.0, rgb(0.0, 0.0, 1.0)),
        vert(0.0, 0.0, -1.0, rgb(0.0, 1.0, 0.0)),
        vert(0.0, 1.0, -2.0, red),
    ));
    prims.push(Primitive::Triangle(
        vert(0.0, 0.0, -1.0, rgb(0.0, 1.0, 0.0)),
        vert(0.0, -1.0, -2.0, rgb(0.0, 0.0, 1.0)),
        vert(0.0, 1.0, -2.0, red),
    ));

    prims
}

/// Spins the scene about +Z and drags the light along with it
#[derive(Debug, Clone, Copy)]
pub struct LightAnimation {
    pub theta: f32,
    pub speed: f32,
}

impl LightAnimation {
    pub fn new(speed: f32) -> Self {
        Self { theta: 0.0, speed }
    }

    pub fn rotation(&self) -> Matrix {
        Matrix::rotate(0.0, 0.0, 1.0, self.theta)
    }

    /// `LIGHT_BASE` rotated by the current angle, unit length, w = 0
    pub fn light_direction(&self) -> Vector {
        let d = self.rotation().apply(LIGHT_BASE).normalize();
        Vector::direction(d.x, d.y, d.z)
    }

    /// Advance one frame and push world matrix and light into the device
    pub fn step(&mut self, device: &mut Device) {
        self.theta += self.speed;
        device.set_world(self.rotation());
        device.light_mut().direction = self.light_direction();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Framebuffer, IlluminationMode, Light, Transform};

    #[test]
    fn test_demo_primitive_counts() {
        let prims = demo_primitives();
        let points = prims.iter().filter(|p| matches!(p, Primitive::Point(_))).count();
        let lines = prims.iter().filter(|p| matches!(p, Primitive::Line(..))).count();
        let tris = prims.iter().filter(|p| matches!(p, Primitive::Triangle(..))).count();
        assert_eq!((points, lines, tris), (5, 4, 5));

        for p in &prims {
            match p {
                Primitive::Line(a, b) => assert!(a.pos.w == 1.0 && b.pos.w == 1.0),
                Primitive::Triangle(a, b, c) => {
                    assert!(a.pos.w == 1.0 && b.pos.w == 1.0 && c.pos.w == 1.0)
                }
                Primitive::Point(_) => {}
            }
        }
    }

    #[test]
    fn test_demo_scene_renders() {
        let mut device = Device::new(
            Framebuffer::new(800, 600),
            Transform::new(800, 600),
            Vec::new(),
            Light::default(),
            IlluminationMode::BlinnPhong,
        );
        device.set_camera(5.0, 0.0, 0.0);
        let mut anim = LightAnimation::new(0.01);
        anim.step(&mut device);

        let mut frame = device.clear();
        frame.submit(&demo_primitives());
        let fb = frame.framebuffer();
        assert_eq!(fb.pixel(300, 400), Some(0xFF0000));
        assert_eq!(fb.pixel(301, 400), Some(0xFF0000));
        let lit = fb.pixels().iter().filter(|&&p| p != 0).count();
        assert!(lit > 1000, "only {} pixels lit", lit);
    }

    #[test]
    fn test_light_animation() {
        let mut anim = LightAnimation::new(std::f32::consts::FRAC_PI_2);
        let base = LIGHT_BASE.normalize();
        let d = anim.light_direction();
        assert!((d.x - base.x).abs() < 1e-5 && (d.y - base.y).abs() < 1e-5);

        let mut device = Device::new(
            Framebuffer::new(8, 8),
            Transform::new(8, 8),
            Vec::new(),
            Light::default(),
            IlluminationMode::Diffuse,
        );
        anim.step(&mut device);
        let d = device.light().direction;
        // quarter turn about +Z: (x, y) -> (-y, x)
        assert!((d.x + base.y).abs() < 1e-5 && (d.y - base.x).abs() < 1e-5);
        assert!((d.len() - 1.0).abs() < 1e-5);
        assert_eq!(d.w, 0.0);
        assert_eq!(*device.transform().world(), anim.rotation());
    }
}
