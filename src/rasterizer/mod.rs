//! Software rasterizer
//!
//! Features:
//! - World/view/projection pipeline with an explicit compose step
//! - Whole-primitive rejection against the canonical view volume
//! - Perspective-correct color/texcoord/depth interpolation
//! - Z-buffered points, lines and triangles
//! - Per-pixel diffuse, Phong and Blinn-Phong lighting

mod math;
mod types;
mod transform;
mod shading;
mod render;

pub use math::*;
pub use types::*;
pub use transform::*;
pub use shading::*;
pub use render::*;

/// Default screen dimensions
pub const WIDTH: usize = 800;
pub const HEIGHT: usize = 600;

/// Vertical field of view of the default projection (90 degrees)
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_2;
pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 500.0;
