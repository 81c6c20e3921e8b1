//! Demo configuration
//!
//! Uses RON (Rusty Object Notation) so the file stays hand-editable.
//! Every field is optional; missing ones take the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::rasterizer::{Color, IlluminationMode, Light, Vector, HEIGHT, WIDTH};

/// Default config file, looked up in the working directory
pub const CONFIG_PATH: &str = "softrender.ron";

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    InvalidDimensions { width: usize, height: usize },
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions: {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Directional light as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub direction: (f32, f32, f32),
    pub color: (f32, f32, f32),
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: (1.0, -1.0, -1.0),
            color: (1.0, 1.0, 1.0),
        }
    }
}

impl LightConfig {
    /// Direction gets normalized here
    pub fn to_light(&self) -> Light {
        let (x, y, z) = self.direction;
        let (r, g, b) = self.color;
        Light::new(Vector::direction(x, y, z), Color::new(r, g, b))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub illumination: IlluminationMode,
    /// Eye position; the camera always looks at the origin
    pub camera: (f32, f32, f32),
    pub light: LightConfig,
    /// Radians the scene and light turn per frame
    pub light_speed: f32,
    /// Texture table handed to the device
    pub textures: Vec<PathBuf>,
    pub screenshot_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            illumination: IlluminationMode::BlinnPhong,
            camera: (5.0, 0.0, 0.0),
            light: LightConfig::default(),
            light_speed: 0.01,
            textures: Vec::new(),
            screenshot_path: PathBuf::from("screenshot.png"),
        }
    }
}

impl RenderConfig {
    /// Load a config from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a config from a RON string
    pub fn load_from_str(s: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if the file is missing or bad
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save a config to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());

        let contents = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
