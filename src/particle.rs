//! Particles and their per-instance behavior.
//!
//! A [`Particle`] is a point-mass with a position, a velocity, the position
//! it started from ([`origin`](Particle::origin)), render attributes and an
//! optional trail of previous positions. Per-instance customization goes
//! through the [`Behavior`] trait, whose methods all default to no-ops, so a
//! particle with no behavior simply moves in a straight line forever.
//!
//! # Example
//!
//! ```ignore
//! struct Ember { age: f32, lifetime: f32 }
//!
//! impl Behavior for Ember {
//!     fn pre_update(&mut self, _particle: &mut Particle, delta: f32) {
//!         self.age += delta;
//!     }
//!
//!     fn is_dead(&self, _particle: &Particle) -> bool {
//!         self.age > self.lifetime
//!     }
//! }
//!
//! let spark = ParticleConfig::new()
//!     .with_position(Vector::xy(100.0, 50.0))
//!     .with_velocity(Vector::xy(0.0, -20.0))
//!     .with_trail(10)
//!     .with_behavior(Ember { age: 0.0, lifetime: 3.0 })
//!     .build();
//! ```

use crate::rules::Target;
use crate::surface::RenderSurface;
use crate::vector::Vector;
use crate::visuals::Color;
use std::cell::Cell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Per-particle customization hooks.
///
/// Every method has a default, so implementors override only what they need.
/// State the hooks need (age, lifetime, flags) lives in the implementing
/// type itself.
///
/// While `init`, `pre_update` or `post_update` runs, the behavior is detached
/// from the particle it receives: `particle.is_dead()` reports `false` and
/// `particle.draw(..)` falls back to [`Particle::draw_disc`]. Consult `self`
/// for the behavior's own state instead.
pub trait Behavior {
    /// Called once when the particle is built.
    fn init(&mut self, _particle: &mut Particle) {}

    /// Called at the start of [`Particle::update`], before integration.
    fn pre_update(&mut self, _particle: &mut Particle, _delta: f32) {}

    /// Called at the end of [`Particle::update`], after integration.
    fn post_update(&mut self, _particle: &mut Particle, _delta: f32) {}

    /// Whether the particle should be removed from its system.
    fn is_dead(&self, _particle: &Particle) -> bool {
        false
    }

    /// Draw the particle (or one of its trail segments) at `position`.
    ///
    /// `opacity` runs from 0.0 for the oldest trail entry to 1.0 for the
    /// current position. The default draws a disc through
    /// [`Particle::draw_disc`].
    fn draw(&self, particle: &Particle, surface: &mut dyn RenderSurface, opacity: f32, position: Vector) {
        particle.draw_disc(surface, opacity, position);
    }
}

/// Shared, externally readable position.
///
/// A particle can publish its position through an anchor so rules in other
/// systems can follow it (see [`Target::Anchor`]). Hosts can also create
/// free-standing anchors, e.g. for a mouse cursor, and move them with
/// [`set`](Anchor::set).
///
/// Rules hold only a weak reference: once every `Anchor` handle for a point
/// has been dropped, the rules that target it stop applying.
#[derive(Debug, Clone)]
pub struct Anchor {
    cell: Rc<Cell<Vector>>,
}

impl Anchor {
    pub fn new(position: Vector) -> Self {
        Self {
            cell: Rc::new(Cell::new(position)),
        }
    }

    #[inline]
    pub fn get(&self) -> Vector {
        self.cell.get()
    }

    #[inline]
    pub fn set(&self, position: Vector) {
        self.cell.set(position);
    }

    /// A non-owning rule target that reads this anchor on every use.
    pub fn target(&self) -> Target {
        Target::Anchor(Rc::downgrade(&self.cell))
    }
}

/// Construction options for a [`Particle`].
///
/// | Field | Default |
/// |-------|---------|
/// | `position` | `(0, 0, 0)` |
/// | `velocity` | `(0, 0, 0)` |
/// | `origin` | the position |
/// | `color` | opaque red `(255, 0, 0, 1.0)` |
/// | `size` | `2.0` |
/// | `trail_length` | `0` (no trail) |
/// | `behavior` | none |
pub struct ParticleConfig {
    pub position: Vector,
    pub velocity: Vector,
    /// Explicit origin; `None` uses the starting position.
    pub origin: Option<Vector>,
    pub color: Color,
    pub size: f32,
    pub trail_length: usize,
    pub behavior: Option<Box<dyn Behavior>>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            position: Vector::ZERO,
            velocity: Vector::ZERO,
            origin: None,
            color: Color::default(),
            size: 2.0,
            trail_length: 0,
            behavior: None,
        }
    }
}

impl ParticleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vector) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_origin(mut self, origin: Vector) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Radius used by the default draw.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Keep the last `length` positions for a fading trail.
    pub fn with_trail(mut self, length: usize) -> Self {
        self.trail_length = length;
        self
    }

    pub fn with_behavior<B: Behavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Build the particle and run its behavior's `init` hook.
    pub fn build(self) -> Particle {
        Particle::new(self)
    }
}

/// A point-mass driven by a [`System`](crate::System).
pub struct Particle {
    /// Current position.
    pub position: Vector,
    /// Current velocity in units per second.
    pub velocity: Vector,
    /// Starting position; the default target of attraction rules.
    pub origin: Vector,
    pub color: Color,
    /// Radius in surface units. Wall rules reflect on the edge, not the center.
    pub size: f32,
    trail_length: usize,
    history: VecDeque<Vector>,
    anchor: Option<Anchor>,
    behavior: Option<Box<dyn Behavior>>,
}

impl Particle {
    /// Create a particle from `config` and run the behavior's `init` hook.
    pub fn new(config: ParticleConfig) -> Self {
        let mut particle = Self {
            position: config.position,
            velocity: config.velocity,
            origin: config.origin.unwrap_or(config.position),
            color: config.color,
            size: config.size,
            trail_length: config.trail_length,
            history: VecDeque::with_capacity(config.trail_length),
            anchor: None,
            behavior: config.behavior,
        };
        particle.with_behavior(|behavior, p| behavior.init(p));
        particle
    }

    /// Create a default particle at `position` moving with `velocity`.
    pub fn at(position: Vector, velocity: Vector) -> Self {
        ParticleConfig::new()
            .with_position(position)
            .with_velocity(velocity)
            .build()
    }

    #[inline]
    pub fn trail_length(&self) -> usize {
        self.trail_length
    }

    /// Change the trail length, dropping the oldest entries that no longer fit.
    pub fn set_trail_length(&mut self, length: usize) {
        self.trail_length = length;
        while self.history.len() > length {
            self.history.pop_front();
        }
    }

    /// Previous positions, oldest first.
    pub fn history(&self) -> &VecDeque<Vector> {
        &self.history
    }

    /// Replace the behavior. The new behavior's `init` is not run.
    pub fn set_behavior<B: Behavior + 'static>(&mut self, behavior: B) {
        self.behavior = Some(Box::new(behavior));
    }

    /// Publish this particle's position through an [`Anchor`].
    ///
    /// The anchor is created on first call and refreshed at the start and
    /// end of every [`update`](Self::update), so moves made by hooks or by
    /// writing [`position`](Self::position) between frames are picked up.
    /// Use [`set_position`](Self::set_position) to publish a move at once.
    /// Subsequent calls return handles to the same anchor.
    pub fn anchor(&mut self) -> Anchor {
        let position = self.position;
        self.anchor
            .get_or_insert_with(|| Anchor::new(position))
            .clone()
    }

    /// Move the particle and publish the new position to its anchor.
    pub fn set_position(&mut self, position: Vector) {
        self.position = position;
        self.publish_anchor();
    }

    #[inline]
    fn publish_anchor(&self) {
        if let Some(anchor) = &self.anchor {
            anchor.set(self.position);
        }
    }

    /// Advance the particle by `delta` seconds.
    ///
    /// Runs `pre_update`, records the trail, integrates position with the
    /// current velocity, runs `post_update` and returns whether the particle
    /// is now dead. Velocity itself is left untouched; rules have already
    /// applied their forces to it for this frame.
    pub fn update(&mut self, delta: f32) -> bool {
        self.publish_anchor();
        self.with_behavior(|behavior, p| behavior.pre_update(p, delta));

        if self.trail_length > 0 {
            self.history.push_back(self.position);
            while self.history.len() > self.trail_length {
                self.history.pop_front();
            }
        }

        let mut step = self.velocity;
        step.scale(delta);
        self.position.add(step);

        self.with_behavior(|behavior, p| behavior.post_update(p, delta));
        self.publish_anchor();

        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.behavior
            .as_deref()
            .is_some_and(|behavior| behavior.is_dead(self))
    }

    /// Draw the trail, oldest entry most transparent, then the particle itself.
    pub fn draw_all(&self, surface: &mut dyn RenderSurface) {
        let trail = self.trail_length as f32;
        for (i, position) in self.history.iter().enumerate() {
            self.draw(surface, i as f32 / trail, *position);
        }
        self.draw(surface, 1.0, self.position);
    }

    /// Draw once at `position` through the behavior's draw hook.
    pub fn draw(&self, surface: &mut dyn RenderSurface, opacity: f32, position: Vector) {
        match self.behavior.as_deref() {
            Some(behavior) => behavior.draw(self, surface, opacity, position),
            None => self.draw_disc(surface, opacity, position),
        }
    }

    /// The default draw: a disc of radius `size` with the particle's color
    /// and its opacity scaled by `opacity`.
    pub fn draw_disc(&self, surface: &mut dyn RenderSurface, opacity: f32, position: Vector) {
        surface.fill_disc(position, self.size, self.color.faded(opacity));
    }

    /// Run `f` with the behavior temporarily detached so it can borrow the
    /// particle mutably. A behavior installed by the hook itself wins.
    fn with_behavior(&mut self, f: impl FnOnce(&mut Box<dyn Behavior>, &mut Particle)) {
        if let Some(mut behavior) = self.behavior.take() {
            f(&mut behavior, self);
            if self.behavior.is_none() {
                self.behavior = Some(behavior);
            }
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        ParticleConfig::default().build()
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("origin", &self.origin)
            .field("color", &self.color)
            .field("size", &self.size)
            .field("trail_length", &self.trail_length)
            .field("history", &self.history.len())
            .field("anchored", &self.anchor.is_some())
            .field("has_behavior", &self.behavior.is_some())
            .finish()
    }
}
