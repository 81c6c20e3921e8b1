//! softrender demo: spins a small scene under a moving light
//!
//! Renders into the software framebuffer every frame and blits it to the
//! window. `P` writes a screenshot, `Escape` quits.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{anyhow, Context};
use log::{error, info, warn};
use macroquad::prelude::{
    clear_background, draw_texture_ex, is_key_pressed, next_frame, screen_height, screen_width,
    vec2, Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D, BLACK, WHITE,
};

use softrender::config::{RenderConfig, CONFIG_PATH};
use softrender::rasterizer::{Device, Framebuffer, Texture, Transform};
use softrender::scene::{demo_primitives, LightAnimation};
use softrender::VERSION;

// Loaded once in `window_conf`, which macroquad calls before `main`
static CONFIG: OnceLock<RenderConfig> = OnceLock::new();

fn config() -> &'static RenderConfig {
    CONFIG.get_or_init(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        info!("=== softrender v{} ===", VERSION);
        RenderConfig::load_or_default(CONFIG_PATH)
    })
}

fn window_conf() -> Conf {
    let config = config();
    Conf {
        window_title: format!("softrender v{}", VERSION),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

fn load_textures(config: &RenderConfig) -> Vec<Texture> {
    let mut textures = Vec::with_capacity(config.textures.len());
    for path in &config.textures {
        match Texture::from_file(path) {
            Ok(tex) => {
                info!("Loaded texture: {} ({}x{})", tex.name, tex.width, tex.height);
                textures.push(tex);
            }
            Err(e) => warn!("Failed to load {}: {}", path.display(), e),
        }
    }
    textures
}

fn save_screenshot(fb: &Framebuffer, path: &Path) -> anyhow::Result<()> {
    let img = image::RgbaImage::from_raw(fb.width() as u32, fb.height() as u32, fb.to_rgba8())
        .ok_or_else(|| anyhow!("framebuffer size mismatch"))?;
    img.save(path)
        .with_context(|| format!("writing screenshot to {}", path.display()))?;
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = config();
    let (width, height) = (config.width, config.height);
    let (cx, cy, cz) = config.camera;

    let mut device = Device::new(
        Framebuffer::new(width, height),
        Transform::new(width, height),
        load_textures(config),
        config.light.to_light(),
        config.illumination,
    );
    device.set_camera(cx, cy, cz);

    let scene = demo_primitives();
    let mut animation = LightAnimation::new(config.light_speed);
    info!("Scene has {} primitives", scene.len());

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        animation.step(&mut device);
        device.clear().submit(&scene);

        if is_key_pressed(KeyCode::P) {
            match save_screenshot(device.framebuffer(), &config.screenshot_path) {
                Ok(()) => info!("Saved {}", config.screenshot_path.display()),
                Err(e) => error!("Screenshot failed: {:#}", e),
            }
        }

        let fb = device.framebuffer();
        let texture = Texture2D::from_rgba8(fb.width() as u16, fb.height() as u16, &fb.to_rgba8());
        texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }

    let pixels = device.close();
    info!("Exited after presenting {} pixels per frame", pixels.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_loaded_once() {
        let first = config();
        let second = config();
        assert!(std::ptr::eq(first, second));
        assert!(first.validate().is_ok());
    }
}
