//! # Blue Blast
//!
//! 500 particles fall toward the center, held in orbit by a spring pull and a
//! short-range repulsive magnet. Every five seconds they are blasted outward;
//! one second later the system resets. A flickering blue dot marks the
//! center.
//!
//! Run with: `cargo run --example blue_blast [output-dir]`

mod common;

use drift::prelude::*;
use rand::Rng;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

const CENTER: Vector = Vector::xy(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Falling,
    Blasting,
}

struct Blast {
    phase: Phase,
    accumulator: f32,
}

impl SystemHooks for Blast {
    fn post_update(&mut self, system: &mut System, delta: f32) {
        self.accumulator += delta;

        match self.phase {
            Phase::Falling if self.accumulator >= 5.0 => {
                for particle in system.particles_mut() {
                    let mut velocity = particle.position;
                    velocity.subtract(CENTER).scale(3.0);
                    particle.velocity = velocity;
                }
                tracing::info!("blast");
                self.phase = Phase::Blasting;
                self.accumulator = 0.0;
            }
            Phase::Blasting if self.accumulator >= 1.0 => {
                system.reset();
                self.phase = Phase::Falling;
                self.accumulator = 0.0;
            }
            _ => {}
        }
    }

    fn post_draw(&mut self, _system: &System, surface: &mut dyn RenderSurface) {
        let blue = rand::thread_rng().gen();
        surface.fill_disc(CENTER, 20.0, Color::rgb(0, 0, blue));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let dir = common::output_dir("blue_blast")?;

    let canvas = Canvas::new(WIDTH, HEIGHT)?.with_background(Color::WHITE);
    let mut controller = Controller::new(ControllerConfig::new().with_surface(canvas))?;

    let mut rng = rand::thread_rng();
    controller.add_system(System::new(
        SystemConfig::new()
            .with_target_count(500)
            .with_rule(Rule::attract(2.0, CENTER))
            .with_rule(Rule::magnet(-100_000.0, CENTER))
            .with_spawner(move |count| {
                ParticleConfig::new()
                    .with_position(Vector::xy(rng.gen_range(0.0..=WIDTH as f32), 0.0))
                    .with_velocity(Vector::xy(0.0, count as f32))
                    .with_size(10.0)
                    .with_color(Color::rgb(rng.gen(), rng.gen(), 0))
                    .build()
            })
            .with_hooks(Blast {
                phase: Phase::Falling,
                accumulator: 0.0,
            }),
    ));

    common::record(&mut controller, 900, 30, |_, _| {}, common::save_canvas(&dir))
}
