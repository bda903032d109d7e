//! # Simple
//!
//! 500 green particles falling between a floor and a ceiling. Each one
//! starts with a downward speed equal to the number of particles spawned
//! before it, so the column fans out into a wave.
//!
//! Run with: `cargo run --example simple [output-dir]`

mod common;

use drift::prelude::*;
use rand::Rng;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let dir = common::output_dir("simple")?;

    let canvas = Canvas::new(WIDTH, HEIGHT)?.with_background(Color::BLACK);
    let mut controller = Controller::new(ControllerConfig::new().with_surface(canvas))?;

    let mut rng = rand::thread_rng();
    controller.add_system(System::new(
        SystemConfig::new()
            .with_target_count(500)
            .with_rule(Rule::wall_y(HEIGHT as f32))
            .with_rule(Rule::wall_y(0.0))
            .with_spawner(move |count| {
                ParticleConfig::new()
                    .with_position(Vector::xy(rng.gen_range(0.0..=WIDTH as f32), 0.0))
                    .with_velocity(Vector::xy(0.0, count as f32))
                    .with_color(Color::GREEN)
                    .build()
            }),
    ));

    common::record(&mut controller, 600, 60, |_, _| {}, common::save_canvas(&dir))
}
