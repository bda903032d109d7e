//! # Windowed
//!
//! Sparks chase the mouse cursor in a window. A spring pulls them toward the
//! cursor and a short-range magnet keeps them from collapsing onto it.
//!
//! Run with: `cargo run --example windowed --features window`

use std::f32::consts::TAU;

use drift::prelude::*;
use rand::Rng;
use tracing_subscriber::EnvFilter;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 640;

struct Glow;

impl SystemHooks for Glow {
    fn set_context(&mut self, surface: &mut dyn RenderSurface) {
        surface.set_blend_mode(BlendMode::Additive);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cursor = Anchor::new(Vector::xy(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0));

    let canvas = Canvas::new(WIDTH, HEIGHT)?;
    let mut controller = Controller::new(ControllerConfig::new().with_surface(canvas))?;
    controller.add_system(System::new(
        SystemConfig::new()
            .with_target_count(800)
            .with_hooks(Glow)
            .with_rules([
                Rule::attract(3.0, &cursor),
                Rule::magnet(-20_000.0, &cursor),
                Rule::resistance(0.5),
            ])
            .with_spawner(|_| {
                let mut rng = rand::thread_rng();
                let angle = rng.gen_range(0.0..TAU);
                let strength = rng.gen_range(20.0..150.0);
                ParticleConfig::new()
                    .with_position(Vector::xy(
                        rng.gen_range(0.0..=WIDTH as f32),
                        rng.gen_range(0.0..=HEIGHT as f32),
                    ))
                    .with_velocity(Vector::xy(angle.cos() * strength, angle.sin() * strength))
                    .with_color(Color::rgba(rng.gen_range(40..=120), rng.gen_range(120..=220), 255, 0.6))
                    .with_size(3.0)
                    .with_trail(6)
                    .build()
            }),
    ));

    let config = WindowConfig::new("drift")
        .with_background(Color::BLACK)
        .with_cursor(cursor);
    drift::window::run(controller, config)?;
    Ok(())
}
