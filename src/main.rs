//! Ember Projector: depth-buffered software 3D projector
//!
//! A first-person scene viewer rendered entirely in software:
//! - Scanline triangle, line, and point rasterization
//! - A shared depth buffer where larger projected depth means nearer
//! - A fire particle simulation on fixed-rate engine threads
//! - A grayscale depth overlay for inspecting the buffer

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use ember_projector::config::{self, EngineConfig};
use ember_projector::engine::{render_frame, Engine, FrameInput};
use ember_projector::input::MoveSample;
use ember_projector::rasterizer::{Camera, Screen, HEIGHT, WIDTH};
use macroquad::prelude::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Ember Projector v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: false,
        high_dpi: true,
        ..Default::default()
    }
}

/// Path to the config file, from `--config <path>` if given.
fn parse_args() -> PathBuf {
    let args: Vec<String> = std::env::args().collect();
    let mut path = PathBuf::from("engine.ron");
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                path = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            _ => i += 1,
        }
    }
    path
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config_path = parse_args();
    if !config_path.exists() {
        info!(path = %config_path.display(), "No config file, using defaults");
    }
    let config = match config::load_config_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %config_path.display(), "Config rejected: {}", e);
            EngineConfig::default()
        }
    };
    info!(
        near = config.near,
        far = config.far,
        depth_test = config.depth_test,
        depth_overlay = config.depth_overlay,
        "Starting engine"
    );

    let mut screen = Screen::new(WIDTH, HEIGHT);
    let mut camera = Camera::new(WIDTH, HEIGHT, config.near, config.far);
    let mut engine = Engine::start(&config);

    let mut rgba = vec![0u8; WIDTH * HEIGHT * 4];
    let mut grabbed = true;
    set_cursor_grab(true);
    show_mouse(false);
    let mut last_mouse = mouse_position();

    let mut frames = 0u32;
    let mut fps = 0u32;
    let mut fps_window = Instant::now();

    prevent_quit();
    loop {
        // keys and mouse feed the shared flags; the input thread
        // integrates them into the pose between frames
        let flags = &engine.flags;
        flags.store_moves(MoveSample {
            forward: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            back: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            rise: is_key_down(KeyCode::Space),
            sink: is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::LeftShift),
        });
        flags.set_emit(is_mouse_button_down(MouseButton::Left));

        let mouse = mouse_position();
        if grabbed {
            let dx = mouse.0 - last_mouse.0;
            let dy = mouse.1 - last_mouse.1;
            if dx != 0.0 || dy != 0.0 {
                flags.push_look(dx as f64, dy as f64);
            }
        }
        last_mouse = mouse;

        if is_key_pressed(KeyCode::Escape) {
            grabbed = !grabbed;
            set_cursor_grab(grabbed);
            show_mouse(!grabbed);
        }
        if is_key_pressed(KeyCode::Z) {
            let on = flags.toggle_depth_overlay();
            info!(on, "Depth overlay");
        }
        if is_key_pressed(KeyCode::X) {
            let on = flags.toggle_depth_test();
            info!(on, "Depth test");
        }

        let frame = FrameInput {
            pose: engine.pose.load(),
            depth_test: flags.depth_test(),
            depth_overlay: flags.depth_overlay(),
        };
        let particles = engine.particles.lock().unwrap();
        render_frame(&mut screen, &mut camera, &particles, frame);
        let particle_count = particles.particles.len();
        let fire_count = particles.fires.len();
        drop(particles);
        screen.write_rgba(&mut rgba);

        if is_key_pressed(KeyCode::F2) {
            save_screenshot(&rgba);
        }

        // Convert the frame to a texture and stretch it over the window
        let texture = Texture2D::from_rgba8(WIDTH as u16, HEIGHT as u16, &rgba);
        texture.set_filter(FilterMode::Nearest);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        frames += 1;
        if fps_window.elapsed() >= Duration::from_secs(1) {
            fps = frames;
            debug!(fps, "render rate");
            frames = 0;
            fps_window = Instant::now();
        }
        draw_hud(frame, fps, engine.tick_rate(), particle_count, fire_count);

        if is_quit_requested() {
            break;
        }
        next_frame().await;
    }

    engine.stop();
    info!("Engine stopped");
}

fn draw_hud(frame: FrameInput, fps: u32, tps: u32, particle_count: usize, fire_count: usize) {
    let eye = frame.pose.world_eye();
    draw_text(
        &format!(
            "{} fps | {} tps | {} particles | {} fires",
            fps, tps, particle_count, fire_count
        ),
        10.0,
        20.0,
        20.0,
        WHITE,
    );
    draw_text(
        &format!(
            "Eye: ({:.0}, {:.0}, {:.0}) | Look: ({:.2}, {:.2})",
            eye.x, eye.y, eye.z, frame.pose.pitch, frame.pose.yaw
        ),
        10.0,
        40.0,
        20.0,
        WHITE,
    );
    let overlay = if frame.depth_overlay { "on" } else { "off" };
    let test = if frame.depth_test { "on" } else { "off" };
    draw_text(
        &format!(
            "[Z] overlay: {} | [X] depth test: {} | [F2] screenshot | [Esc] release mouse",
            overlay, test
        ),
        10.0,
        60.0,
        20.0,
        WHITE,
    );
}

/// Dumps the current frame to screenshots/ with a timestamped name.
fn save_screenshot(rgba: &[u8]) {
    let dir = PathBuf::from("screenshots");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        error!("Screenshot dir failed: {}", e);
        return;
    }
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = dir.join(format!("frame-{}.png", stamp));
    match image::save_buffer(
        &path,
        rgba,
        WIDTH as u32,
        HEIGHT as u32,
        image::ExtendedColorType::Rgba8,
    ) {
        Ok(()) => info!(path = %path.display(), "Screenshot saved"),
        Err(e) => error!("Screenshot failed: {}", e),
    }
}
