//! # Fireworks
//!
//! Five bursts of 40 particles with fading trails, drawn additively. When
//! every particle of a burst has burned out, it relaunches somewhere else.
//!
//! Run with: `cargo run --example fireworks [output-dir]`

mod common;

use std::cell::Cell;
use std::f32::consts::TAU;
use std::rc::Rc;

use drift::prelude::*;
use rand::Rng;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const FIREWORKS: usize = 5;

/// A spark that fades out as it approaches its death time.
struct Spark {
    lifespan: f32,
    death: f32,
}

impl Behavior for Spark {
    fn pre_update(&mut self, _particle: &mut Particle, delta: f32) {
        self.lifespan += delta;
    }

    fn is_dead(&self, _particle: &Particle) -> bool {
        self.lifespan > self.death
    }

    fn draw(&self, particle: &Particle, surface: &mut dyn RenderSurface, opacity: f32, position: Vector) {
        let remaining = (1.0 - self.lifespan / self.death).max(0.0);
        particle.draw_disc(surface, opacity * remaining, position);
    }
}

/// Additive blending and relaunch on extinction.
struct Burst {
    center: Rc<Cell<Vector>>,
}

impl SystemHooks for Burst {
    fn set_context(&mut self, surface: &mut dyn RenderSurface) {
        surface.set_blend_mode(BlendMode::Additive);
    }

    fn on_death(&mut self, system: &mut System) {
        if system.is_empty() {
            self.center.set(random_point());
            system.reset();
        }
    }
}

fn random_point() -> Vector {
    let mut rng = rand::thread_rng();
    Vector::xy(rng.gen_range(0.0..=WIDTH as f32), rng.gen_range(0.0..=HEIGHT as f32))
}

fn firework() -> System {
    let center = Rc::new(Cell::new(random_point()));
    let spawn_center = center.clone();

    System::new(
        SystemConfig::new()
            .with_target_count(40)
            .with_rule(Rule::gravity(2.0))
            .with_rule(Rule::resistance(0.1))
            .with_spawner(move |_| {
                let mut rng = rand::thread_rng();
                let angle = rng.gen_range(0.0..TAU);
                let strength = rng.gen_range(0.0..30.0);

                ParticleConfig::new()
                    .with_position(spawn_center.get())
                    .with_velocity(Vector::xy(angle.cos() * strength, angle.sin() * strength))
                    .with_color(Color::rgb(rng.gen(), rng.gen(), rng.gen()))
                    .with_size(4.0)
                    .with_trail(10)
                    .with_behavior(Spark {
                        lifespan: 0.0,
                        death: rng.gen_range(25.0..=40.0),
                    })
                    .build()
            })
            .with_hooks(Burst { center }),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let dir = common::output_dir("fireworks")?;

    let canvas = Canvas::new(WIDTH, HEIGHT)?.with_background(Color::BLACK);
    let mut controller = Controller::new(ControllerConfig::new().with_surface(canvas).with_speed(5.0))?;

    for _ in 0..FIREWORKS {
        controller.add_system(firework());
    }

    common::record(&mut controller, 1200, 30, |_, _| {}, common::save_canvas(&dir))
}
