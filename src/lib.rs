//! # drift
//!
//! A small, deterministic, time-stepped particle engine with composable
//! force rules and a pluggable render surface.
//!
//! drift handles the frame loop bookkeeping (deltas, stalls, pausing),
//! particle lifetimes and trails so you can describe a scene as systems of
//! particles and the rules that move them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use drift::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let canvas = Canvas::new(640, 480)?;
//!     let mut controller = Controller::new(ControllerConfig::new().with_surface(canvas))?;
//!
//!     controller.add_system(System::new(
//!         SystemConfig::new()
//!             .with_target_count(100)
//!             .with_spawner(|i| Particle::at(Vector::xy(6.0 * i as f32, 0.0), Vector::ZERO))
//!             .with_rule(Rule::gravity(100.0))
//!             .with_rule(Rule::wall_y(480.0)),
//!     ));
//!
//!     let mut clock = FrameClock::default();
//!     controller.start(&mut clock);
//!     while let Some(timestamp) = clock.next_frame() {
//!         controller.step(timestamp, &mut clock);
//!         if clock.frame() == 120 {
//!             controller.pause();
//!         }
//!     }
//!
//!     if let Some(canvas) = controller.surface() {
//!         canvas.save_png("frame.png")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`Particle`] has a position, a velocity, an origin, render attributes and
//! an optional bounded trail. Per-particle logic (lifespans, custom drawing)
//! goes in a [`Behavior`].
//!
//! ### Rules
//!
//! Rules mutate one particle's velocity or position. A system applies all of
//! its rules, in order, to each particle before integrating it:
//!
//! ```ignore
//! .with_rule(Rule::gravity(2.0))          // Apply forces
//! .with_rule(Rule::resistance(0.1))       // Damping
//! .with_rule(Rule::attract(2.0, center))  // Spring toward a point
//! .with_rule(Rule::wall_y(480.0))         // Boundary conditions
//! ```
//!
//! ### Systems and the controller
//!
//! A [`System`] owns particles, rules and a spawner; [`SystemHooks`] customize
//! it. The [`Controller`] updates and draws systems in insertion order each
//! time the host calls [`Controller::step`], and asks a [`FrameScheduler`]
//! for the next frame unless paused.
//!
//! ### Surfaces
//!
//! Drawing goes through the [`RenderSurface`] trait. [`Canvas`] is a software
//! rasterizer with PNG export; [`Recorder`] logs draw calls for tests. With
//! the `window` feature, [`window::run`] shows a canvas on screen.
//!
//! ## Feature Overview
//!
//! | Category | Rules |
//! |----------|-------|
//! | Physics | [`Rule::Gravity`], [`Rule::Resistance`] |
//! | Forces | [`Rule::Attract`], [`Rule::Magnet`] |
//! | Boundaries | [`Rule::Wall`] |
//! | Custom | [`Rule::Custom`] |

pub mod camera;
pub mod controller;
pub mod error;
pub mod particle;
pub mod raster;
pub mod rules;
pub mod surface;
pub mod system;
pub mod time;
pub mod vector;
pub mod visuals;
#[cfg(feature = "window")]
pub mod window;

pub use camera::Camera;
pub use controller::{Controller, ControllerConfig, LoopState};
pub use error::{CanvasError, ConfigError};
#[cfg(feature = "window")]
pub use error::WindowError;
pub use particle::{Anchor, Behavior, Particle, ParticleConfig};
pub use raster::Canvas;
pub use rules::{Rule, Target, MAGNET_DEAD_ZONE};
pub use surface::{DrawCommand, Recorder, RenderSurface};
pub use system::{System, SystemConfig, SystemHooks};
pub use time::{FrameClock, FrameScheduler, HostClock};
pub use vector::{Axis, Vector};
pub use visuals::{BlendMode, Color};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use drift::prelude::*;
/// ```
///
/// This imports:
/// - [`Controller`], [`System`], [`Particle`] and their config builders
/// - [`Rule`] and [`Target`]
/// - [`Behavior`], [`SystemHooks`] - customization traits
/// - [`Canvas`], [`RenderSurface`] - drawing
/// - [`FrameClock`], [`FrameScheduler`] - frame scheduling
/// - [`Vector`], [`Axis`], [`Color`], [`BlendMode`]
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::controller::{Controller, ControllerConfig, LoopState};
    pub use crate::particle::{Anchor, Behavior, Particle, ParticleConfig};
    pub use crate::raster::Canvas;
    pub use crate::rules::{Rule, Target};
    pub use crate::surface::RenderSurface;
    pub use crate::system::{System, SystemConfig, SystemHooks};
    pub use crate::time::{FrameClock, FrameScheduler, HostClock};
    pub use crate::vector::{Axis, Vector};
    pub use crate::visuals::{BlendMode, Color};
    #[cfg(feature = "window")]
    pub use crate::window::{run, WindowConfig};
}
