//! softrender: a software 3D rasterizer
//!
//! The `rasterizer` module is the renderer itself. `config` and `scene`
//! back the windowed demo in `main.rs`.

pub mod config;
pub mod rasterizer;
pub mod scene;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
