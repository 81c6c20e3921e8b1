//! Per-pixel illumination models

use serde::{Deserialize, Serialize};

use super::math::Vector;
use super::types::{Color, Light};

const DIFFUSE_KD: f32 = 0.5;
const SPECULAR_KD: f32 = 1.0;
const SPECULAR_KS: f32 = 1.5;
const SHININESS: f32 = 20.0;

/// How covered triangle pixels are lit. Chosen once per device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IlluminationMode {
    /// Interpolated vertex color, unlit
    #[default]
    Color,
    Diffuse,
    Phong,
    BlinnPhong,
}

/// Interpolated surface data for one pixel
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    /// Interpolated vertex color
    pub color: Color,
    /// Unit world-space normal
    pub normal: Vector,
    /// World-space position
    pub position: Vector,
}

impl IlluminationMode {
    pub const ALL: [IlluminationMode; 4] = [
        IlluminationMode::Color,
        IlluminationMode::Diffuse,
        IlluminationMode::Phong,
        IlluminationMode::BlinnPhong,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IlluminationMode::Color => "Color",
            IlluminationMode::Diffuse => "Diffuse",
            IlluminationMode::Phong => "Phong",
            IlluminationMode::BlinnPhong => "Blinn-Phong",
        }
    }

    pub fn shade(self, surface: &Surface, eye: Vector, light: &Light) -> Color {
        match self {
            IlluminationMode::Color => surface.color,
            IlluminationMode::Diffuse => diffuse(surface, light),
            IlluminationMode::Phong => phong(surface, eye, light),
            IlluminationMode::BlinnPhong => blinn_phong(surface, eye, light),
        }
    }
}

fn lambert(normal: Vector, light: &Light, kd: f32) -> Color {
    light.color * kd * (light.direction * -1.0).dot(normal).max(0.0)
}

/// `lightColor * 0.5 * max(0, -L.N) * base`
pub fn diffuse(surface: &Surface, light: &Light) -> Color {
    lambert(surface.normal, light, DIFFUSE_KD) * surface.color
}

pub fn phong(surface: &Surface, eye: Vector, light: &Light) -> Color {
    let diffuse = lambert(surface.normal, light, SPECULAR_KD);

    let reflect = light.direction.reflect(surface.normal).normalize();
    let view = (eye - surface.position).normalize();
    let specular = light.color * reflect.dot(view).max(0.0).powf(SHININESS) * SPECULAR_KS;

    (specular + diffuse) * surface.color
}

pub fn blinn_phong(surface: &Surface, eye: Vector, light: &Light) -> Color {
    let diffuse = lambert(surface.normal, light, SPECULAR_KD);

    let view = (eye - surface.position).normalize();
    let halfway = (view + light.direction * -1.0).normalize();
    let specular = light.color * halfway.dot(surface.normal).max(0.0).powf(SHININESS) * SPECULAR_KS;

    (specular + diffuse) * surface.color
}
