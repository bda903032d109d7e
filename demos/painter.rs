//! # Painter
//!
//! A single wanderer bounces around the canvas, painting behind everything
//! already drawn. A thousand painters chase it, but they only tint pixels
//! that are already painted. The canvas is never cleared between frames.
//!
//! Run with: `cargo run --example painter [output-dir]`

mod common;

use std::f32::consts::TAU;

use drift::prelude::*;
use rand::Rng;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Selects a fixed blend mode for a system.
struct Blend(BlendMode);

impl SystemHooks for Blend {
    fn set_context(&mut self, surface: &mut dyn RenderSurface) {
        surface.set_blend_mode(self.0);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let dir = common::output_dir("painter")?;

    let canvas = Canvas::new(WIDTH, HEIGHT)?.with_background(Color::WHITE);
    let mut controller = Controller::new(ControllerConfig::new().with_surface(canvas).with_trace(true))?;

    let mut painters = System::new(
        SystemConfig::new()
            .with_target_count(1000)
            .with_hooks(Blend(BlendMode::SourceAtop))
            .with_spawner(|_| {
                let mut rng = rand::thread_rng();
                let angle = rng.gen_range(0.0..TAU);
                let strength = rng.gen_range(0.0..100.0);
                ParticleConfig::new()
                    .with_position(Vector::xy(
                        rng.gen_range(0.0..=WIDTH as f32),
                        rng.gen_range(0.0..=HEIGHT as f32),
                    ))
                    .with_velocity(Vector::xy(angle.cos() * strength, angle.sin() * strength))
                    .with_color(Color::rgb(rng.gen(), rng.gen(), rng.gen()))
                    .with_size(10.0)
                    .build()
            }),
    );

    let mut wanderer = System::new(
        SystemConfig::new()
            .with_target_count(1)
            .with_hooks(Blend(BlendMode::DestinationOver))
            .with_rules([
                Rule::wall_x(WIDTH as f32),
                Rule::wall_x(0.0),
                Rule::wall_y(HEIGHT as f32),
                Rule::wall_y(0.0),
            ])
            .with_spawner(|_| {
                let mut rng = rand::thread_rng();
                let angle = rng.gen_range(0.0..TAU);
                let strength = rng.gen_range(100.0..200.0);
                ParticleConfig::new()
                    .with_position(Vector::xy(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0))
                    .with_velocity(Vector::xy(angle.cos() * strength, angle.sin() * strength))
                    .with_size(20.0)
                    .with_trail(5)
                    .with_color(Color::rgb(255, 80, 80))
                    .build()
            }),
    );

    // Each painter is attracted to every wanderer.
    for particle in wanderer.particles_mut() {
        painters.add_rule(Rule::attract(1.0, &particle.anchor()));
    }

    controller.add_system(painters).add_system(wanderer);

    common::record(
        &mut controller,
        1200,
        60,
        |controller, frame| {
            if frame == 6 {
                controller.clear();
            }
        },
        common::save_canvas(&dir),
    )
}
