//! Core types for the rasterizer

use std::ops::{Add, Mul};

use super::math::Vector;

/// Floating-point RGB color, unclamped
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0 };
    pub const BLUE: Color = Color { r: 0.0, g: 0.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Blend `self` and `other` with weights `(1 - t, t)`
    pub fn lerp(self, other: Color, t: f32) -> Color {
        self * (1.0 - t) + other * t
    }

    /// Pack into `0x00RRGGBB`.
    ///
    /// Channels above 1.0 clamp to 255; everything else is `channel * 255`
    /// truncated toward zero. Negative channels are not clamped: the
    /// truncated value is shifted as a signed 32-bit integer and OR'd in, so
    /// its sign bits spill into the higher channels. NaN packs as 0.
    pub fn to_packed(self) -> u32 {
        let r = channel_bits(self.r);
        let g = channel_bits(self.g);
        let b = channel_bits(self.b);
        ((r << 16) | (g << 8) | b) as u32
    }
}

fn channel_bits(c: f32) -> i32 {
    if c > 1.0 {
        255
    } else {
        (c * 255.0) as i32
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    fn mul(self, s: f32) -> Color {
        Color {
            r: self.r * s,
            g: self.g * s,
            b: self.b * s,
        }
    }
}

impl Mul<Color> for Color {
    type Output = Color;
    fn mul(self, other: Color) -> Color {
        Color {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
        }
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, other: Color) -> Color {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

/// Texture coordinate. Interpolated but never sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Texcoord {
    pub u: f32,
    pub v: f32,
}

impl Texcoord {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    pub fn lerp(self, other: Texcoord, t: f32) -> Texcoord {
        Texcoord {
            u: self.u * (1.0 - t) + other.u * t,
            v: self.v * (1.0 - t) + other.v * t,
        }
    }
}

/// A vertex with position, color, texture coordinate, and normal.
///
/// Which space `pos` lives in (world, clip or screen) is up to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub pos: Vector,
    pub color: Color,
    pub tex: Texcoord,
    pub normal: Vector,
}

impl Vertex {
    pub fn new(pos: Vector, color: Color, tex: Texcoord, normal: Vector) -> Self {
        Self { pos, color, tex, normal }
    }

    /// World-space point with a color and a +X normal
    pub fn colored(x: f32, y: f32, z: f32, color: Color) -> Self {
        Self {
            pos: Vector::point(x, y, z),
            color,
            tex: Texcoord::default(),
            normal: Vector::direction(1.0, 0.0, 0.0),
        }
    }
}

/// Single directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Vector,
    pub color: Color,
}

impl Light {
    /// The direction is normalized; w is forced to 0
    pub fn new(direction: Vector, color: Color) -> Self {
        let d = direction.normalize();
        Self {
            direction: Vector::direction(d.x, d.y, d.z),
            color,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vector::direction(1.0, -1.0, -1.0), Color::WHITE)
    }
}

/// One entry of a frame's flat primitive list.
///
/// Points are already in screen space; lines and triangles are world-space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Point(Vertex),
    Line(Vertex, Vertex),
    Triangle(Vertex, Vertex, Vertex),
}

/// Error type for texture loading
#[derive(Debug)]
pub enum TextureError {
    IoError(std::io::Error),
    DecodeError(image::ImageError),
}

impl From<std::io::Error> for TextureError {
    fn from(e: std::io::Error) -> Self {
        TextureError::IoError(e)
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::DecodeError(e)
    }
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureError::IoError(e) => write!(f, "IO error: {}", e),
            TextureError::DecodeError(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for TextureError {}

/// Texture table entry: packed `0x00RRGGBB` pixels, row-major.
///
/// The device keeps a table of these for later sampling; nothing in the
/// rasterizer reads them yet.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
    pub name: String,
}

impl Texture {
    /// Load texture from an image file (any format the `image` features enable)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_bytes(&bytes, name)
    }

    /// Decode texture from encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels = rgb
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | (p[2] as u32))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_primaries() {
        assert_eq!(Color::RED.to_packed(), 0xFF0000);
        assert_eq!(Color::GREEN.to_packed(), 0x00FF00);
        assert_eq!(Color::BLUE.to_packed(), 0x0000FF);
        assert_eq!(Color::BLACK.to_packed(), 0);
    }

    #[test]
    fn test_packed_clamps_above_one_and_truncates() {
        assert_eq!(Color::new(3.0, 0.5, 1.0).to_packed(), 0xFF7FFF);
    }

    #[test]
    fn test_packed_negative_channel_is_defined() {
        // -255 in the blue slot sign-extends over red and green
        assert_eq!(Color::new(0.0, 0.0, -1.0).to_packed(), 0xFFFF_FF01);
        assert_eq!(Color::new(f32::NAN, 0.0, 0.0).to_packed(), 0);
    }

    #[test]
    fn test_color_ops() {
        let c = Color::new(0.5, 1.0, 2.0) * Color::new(2.0, 0.5, 0.25) + Color::WHITE * 0.5;
        assert_eq!(c, Color::new(1.5, 1.0, 1.0));
        assert_eq!(Color::RED.lerp(Color::BLUE, 0.0), Color::RED);
        assert_eq!(Color::RED.lerp(Color::BLUE, 1.0), Color::BLUE);
    }

    #[test]
    fn test_light_direction_is_normalized() {
        let l = Light::new(Vector::point(0.0, 3.0, 4.0), Color::WHITE);
        assert!((l.direction.len() - 1.0).abs() < 1e-5);
        assert_eq!(l.direction.w, 0.0);
    }

    #[test]
    fn test_texture_from_png_bytes() {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 128, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let tex = Texture::from_bytes(&bytes, "tiny".to_string()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.get_pixel(0, 0), Some(0xFF0000));
        assert_eq!(tex.get_pixel(1, 0), Some(0x0080FF));
        assert_eq!(tex.get_pixel(2, 0), None);
    }

    #[test]
    fn test_texture_rejects_garbage() {
        assert!(Texture::from_bytes(b"not an image", "bad".to_string()).is_err());
    }
}
