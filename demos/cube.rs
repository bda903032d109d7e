//! # Cube
//!
//! 5000 particles bounce inside a 1000-unit cube under inverted gravity,
//! viewed through a slowly orbiting perspective camera.
//!
//! The controller has no surface of its own. Its draw callback renders into
//! a shared canvas, back to front, so nearer particles cover farther ones.
//!
//! Run with: `cargo run --example cube [output-dir]`

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use drift::prelude::*;
use glam::Vec3;
use rand::Rng;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const HALF_EXTENT: f32 = 501.0;

fn random_direction(rng: &mut impl Rng) -> Vector {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let length = v.length();
        if length > 1e-3 && length <= 1.0 {
            return (v / length).into();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let dir = common::output_dir("cube")?;

    let mut camera = Camera::looking_at(Vec3::ZERO, 1800.0);
    camera.fov_y = 55f32.to_radians();
    camera.far = 4000.0;

    let canvas = Rc::new(RefCell::new(
        Canvas::new(WIDTH, HEIGHT)?
            .with_background(Color::BLACK)
            .with_camera(camera),
    ));

    let target = canvas.clone();
    let mut controller = Controller::<Canvas>::new(ControllerConfig::new().with_draw(
        move |systems: &mut [System], _surface: Option<&mut Canvas>| {
            let mut canvas = target.borrow_mut();
            canvas.clear();

            let Some(camera) = canvas.camera_mut() else {
                return;
            };
            camera.orbit(0.002, 0.0);
            let eye = camera.position();

            let mut order: Vec<(f32, &Particle)> = systems
                .iter()
                .flat_map(|system| system.particles())
                .map(|p| (eye.distance_squared(p.position.into()), p))
                .collect();
            order.sort_by(|a, b| b.0.total_cmp(&a.0));

            for (_, particle) in order {
                particle.draw_all(&mut *canvas);
            }
        },
    ))?;

    let mut rng = rand::thread_rng();
    controller.add_system(System::new(
        SystemConfig::new()
            .with_target_count(5000)
            .with_rules([
                Rule::gravity(-100.0),
                Rule::resistance(0.1),
                Rule::wall_x(HALF_EXTENT),
                Rule::wall_x(-HALF_EXTENT),
                Rule::wall_y(HALF_EXTENT),
                Rule::wall_y(-HALF_EXTENT),
                Rule::wall_z(HALF_EXTENT),
                Rule::wall_z(-HALF_EXTENT),
            ])
            .with_spawner(move |_| {
                let mut velocity = random_direction(&mut rng);
                velocity.scale(rng.gen_range(0.0..200.0));
                ParticleConfig::new()
                    .with_velocity(velocity)
                    .with_size(4.0)
                    .with_color(Color::rgb(rng.gen_range(120..=255), rng.gen_range(80..=200), 255))
                    .build()
            }),
    ));

    common::record(&mut controller, 900, 60, |_, _| {}, |_, frame| {
        canvas
            .borrow()
            .save_png(dir.join(format!("frame_{frame:04}.png")))?;
        Ok(())
    })
}
