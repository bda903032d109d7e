//! Particle behavior rules.
//!
//! Rules define how particles move each frame. A [`System`](crate::System)
//! applies its rules to every particle in the order they were added, then
//! integrates: `position += velocity * delta`. Later rules therefore see
//! the velocity and position changes of earlier ones within the same step.
//!
//! # Rule Categories
//!
//! - **Basic Physics**: Gravity, Resistance
//! - **Point Forces**: Attract (spring-like), Magnet (inverse-square)
//! - **Boundaries**: Wall (swept reflection on one axis)
//! - **Custom**: any closure over `(particle, index, delta)`
//!
//! # Targets
//!
//! Point forces pull toward a [`Target`]: the particle's own origin, a fixed
//! point, or an [`Anchor`](crate::Anchor) that is read fresh on every call.
//! Anchors let one system follow a particle that lives in another system:
//!
//! ```ignore
//! let leader = wanderer.particles_mut()[0].anchor();
//! painters.add_rule(Rule::attract(1.0, &leader));
//! ```

use crate::particle::{Anchor, Particle};
use crate::vector::{Axis, Vector};
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Squared distance below which [`Rule::Magnet`] does nothing.
///
/// Without it the inverse-square force diverges as a particle reaches the
/// target.
pub const MAGNET_DEAD_ZONE: f32 = 0.01;

/// The point a force rule pulls toward (or pushes away from).
#[derive(Clone, Debug, Default)]
pub enum Target {
    /// The particle's own [`origin`](Particle::origin).
    #[default]
    Origin,

    /// A fixed point.
    Point(Vector),

    /// A shared point read on every application.
    ///
    /// Holds a weak reference; if the anchor is gone the rule is skipped.
    Anchor(Weak<Cell<Vector>>),
}

impl Target {
    /// The current target position for `particle`, if it still exists.
    pub fn resolve(&self, particle: &Particle) -> Option<Vector> {
        match self {
            Target::Origin => Some(particle.origin),
            Target::Point(point) => Some(*point),
            Target::Anchor(cell) => cell.upgrade().map(|cell| cell.get()),
        }
    }
}

impl From<Vector> for Target {
    fn from(point: Vector) -> Self {
        Target::Point(point)
    }
}

impl From<&Anchor> for Target {
    fn from(anchor: &Anchor) -> Self {
        anchor.target()
    }
}

/// Signature of a custom rule: particle, its index in the system, delta in seconds.
pub type RuleFn = dyn Fn(&mut Particle, usize, f32);

/// Rules that define particle behavior.
///
/// A rule touches only the particle it is given, and only its velocity or
/// position. Rules never hold particle state between frames.
///
/// # Example
///
/// ```ignore
/// SystemConfig::new()
///     .with_rule(Rule::gravity(2.0))
///     .with_rule(Rule::resistance(0.1))
///     .with_rule(Rule::wall_y(480.0))
///     .with_rule(Rule::wall_y(0.0));
/// ```
#[derive(Clone)]
pub enum Rule {
    /// Constant acceleration along +Y.
    ///
    /// Screen-space surfaces grow downward, so a positive strength pulls
    /// particles toward the bottom.
    ///
    /// # Parameters
    ///
    /// - `strength` - Acceleration in units per second squared
    Gravity(f32),

    /// Linear velocity damping: `velocity *= 1 - strength * delta`.
    ///
    /// Keep `strength * delta` below 1, otherwise velocity flips direction.
    Resistance(f32),

    /// Spring-like pull toward a target.
    ///
    /// Force grows linearly with distance: `velocity -= (position - target)
    /// * delta * strength`. Negative strength pushes away.
    Attract {
        /// Spring constant.
        strength: f32,
        /// Point to pull toward.
        target: Target,
    },

    /// Inverse-square pull toward a target.
    ///
    /// `velocity -= (position - target) * delta * strength / distance²`.
    /// Within [`MAGNET_DEAD_ZONE`] (squared distance) the rule does nothing.
    /// Negative strength repels.
    Magnet {
        /// Force constant.
        strength: f32,
        /// Point to pull toward.
        target: Target,
    },

    /// Axis-aligned wall that particles bounce off.
    ///
    /// The reflection is swept: the particle's projected position for this
    /// step is tested against the wall plane, offset by the particle's size
    /// toward the side it comes from. If the step would cross the plane, the
    /// projected position is mirrored across it and the velocity component
    /// on `axis` is negated, so fast particles cannot tunnel through.
    Wall {
        /// Wall coordinate on `axis`.
        boundary: f32,
        /// Axis the wall is perpendicular to.
        axis: Axis,
    },

    /// Arbitrary per-particle logic.
    Custom(Rc<RuleFn>),
}

impl Rule {
    pub fn gravity(strength: f32) -> Self {
        Rule::Gravity(strength)
    }

    pub fn resistance(strength: f32) -> Self {
        Rule::Resistance(strength)
    }

    /// Spring toward `target`; pass [`Target::Origin`] to pull each particle
    /// back to where it started.
    pub fn attract(strength: f32, target: impl Into<Target>) -> Self {
        Rule::Attract {
            strength,
            target: target.into(),
        }
    }

    /// Inverse-square force toward `target`.
    pub fn magnet(strength: f32, target: impl Into<Target>) -> Self {
        Rule::Magnet {
            strength,
            target: target.into(),
        }
    }

    pub fn wall(boundary: f32, axis: Axis) -> Self {
        Rule::Wall { boundary, axis }
    }

    pub fn wall_x(boundary: f32) -> Self {
        Rule::wall(boundary, Axis::X)
    }

    pub fn wall_y(boundary: f32) -> Self {
        Rule::wall(boundary, Axis::Y)
    }

    pub fn wall_z(boundary: f32) -> Self {
        Rule::wall(boundary, Axis::Z)
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut Particle, usize, f32) + 'static,
    {
        Rule::Custom(Rc::new(f))
    }

    /// Apply this rule to the particle at `index` for a step of `delta` seconds.
    pub fn apply(&self, particle: &mut Particle, index: usize, delta: f32) {
        match self {
            Rule::Gravity(strength) => {
                particle.velocity.y += strength * delta;
            }

            Rule::Resistance(strength) => {
                particle.velocity.scale(1.0 - strength * delta);
            }

            Rule::Attract { strength, target } => {
                let Some(target) = target.resolve(particle) else {
                    return;
                };
                let mut offset = particle.position;
                offset.subtract(target).scale(delta * strength);
                particle.velocity.subtract(offset);
            }

            Rule::Magnet { strength, target } => {
                let Some(target) = target.resolve(particle) else {
                    return;
                };
                let mut offset = particle.position;
                offset.subtract(target);
                let distance_sq = offset.length_squared();
                if distance_sq < MAGNET_DEAD_ZONE {
                    return;
                }
                offset.scale(delta * strength / distance_sq);
                particle.velocity.subtract(offset);
            }

            Rule::Wall { boundary, axis } => {
                let axis = *axis;
                let step = particle.velocity[axis] * delta;
                let current = particle.position[axis];
                let plane = if step > 0.0 {
                    boundary - particle.size
                } else {
                    boundary + particle.size
                };

                if (current > plane) != (current + step > plane) {
                    particle.position[axis] = 2.0 * plane - step - current;
                    particle.velocity[axis] = -particle.velocity[axis];
                }
            }

            Rule::Custom(f) => f(particle, index, delta),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Gravity(strength) => f.debug_tuple("Gravity").field(strength).finish(),
            Rule::Resistance(strength) => f.debug_tuple("Resistance").field(strength).finish(),
            Rule::Attract { strength, target } => f
                .debug_struct("Attract")
                .field("strength", strength)
                .field("target", target)
                .finish(),
            Rule::Magnet { strength, target } => f
                .debug_struct("Magnet")
                .field("strength", strength)
                .field("target", target)
                .finish(),
            Rule::Wall { boundary, axis } => f
                .debug_struct("Wall")
                .field("boundary", boundary)
                .field("axis", axis)
                .finish(),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleConfig;

    fn at(position: Vector, velocity: Vector) -> Particle {
        Particle::at(position, velocity)
    }

    #[test]
    fn test_gravity_accumulates_per_step() {
        let rule = Rule::gravity(9.0);
        let mut p = at(Vector::ZERO, Vector::ZERO);
        for _ in 0..4 {
            rule.apply(&mut p, 0, 0.5);
        }
        assert_eq!(p.velocity, Vector::new(0.0, 18.0, 0.0));
        // Rules never integrate.
        assert_eq!(p.position, Vector::ZERO);
    }

    #[test]
    fn test_resistance_damps_linearly() {
        let rule = Rule::resistance(0.5);
        let mut p = at(Vector::ZERO, Vector::new(8.0, -4.0, 2.0));
        rule.apply(&mut p, 0, 0.5);
        assert_eq!(p.velocity, Vector::new(6.0, -3.0, 1.5));
    }

    #[test]
    fn test_attract_defaults_to_origin() {
        let mut p = ParticleConfig::new()
            .with_position(Vector::xy(10.0, 0.0))
            .with_origin(Vector::xy(4.0, 0.0))
            .build();

        Rule::attract(2.0, Target::Origin).apply(&mut p, 0, 0.5);
        // displacement 6 * delta 0.5 * strength 2
        assert_eq!(p.velocity, Vector::xy(-6.0, 0.0));
        assert_eq!(p.position, Vector::xy(10.0, 0.0));
    }

    #[test]
    fn test_attract_reads_origin_fresh() {
        let rule = Rule::attract(1.0, Target::Origin);
        let mut p = at(Vector::xy(1.0, 0.0), Vector::ZERO);
        p.origin = Vector::xy(3.0, 0.0);
        rule.apply(&mut p, 0, 1.0);
        assert_eq!(p.velocity, Vector::xy(2.0, 0.0));
    }

    #[test]
    fn test_magnet_inverse_square() {
        let rule = Rule::magnet(8.0, Vector::ZERO);
        let mut p = at(Vector::xy(2.0, 0.0), Vector::ZERO);
        rule.apply(&mut p, 0, 1.0);
        // offset (2, 0) * 8 / 4
        assert_eq!(p.velocity, Vector::xy(-4.0, 0.0));
    }

    #[test]
    fn test_magnet_dead_zone_at_origin() {
        let rule = Rule::magnet(-100.0, Target::Origin);
        let mut p = at(Vector::xy(5.0, 5.0), Vector::xy(1.0, 2.0));
        rule.apply(&mut p, 0, 1.0 / 60.0);
        assert_eq!(p.velocity, Vector::xy(1.0, 2.0));
    }

    #[test]
    fn test_magnet_dead_zone_boundary() {
        let rule = Rule::magnet(1.0, Vector::ZERO);

        let mut inside = at(Vector::xy(0.09, 0.0), Vector::ZERO);
        rule.apply(&mut inside, 0, 1.0);
        assert_eq!(inside.velocity, Vector::ZERO);

        let mut outside = at(Vector::xy(0.2, 0.0), Vector::ZERO);
        rule.apply(&mut outside, 0, 1.0);
        assert!(outside.velocity.x < 0.0);
    }

    #[test]
    fn test_wall_reflects_crossing_particle() {
        let rule = Rule::wall_y(100.0);
        let mut p = at(Vector::xy(0.0, 95.0), Vector::xy(0.0, 10.0));
        p.size = 2.0;

        rule.apply(&mut p, 0, 1.0);

        // plane = 100 - 2, mirror = 2 * 98 - 10 - 95
        assert_eq!(p.position.y, 91.0);
        assert_eq!(p.velocity.y, -10.0);
    }

    #[test]
    fn test_wall_from_below_offsets_toward_incoming_side() {
        let rule = Rule::wall(0.0, Axis::X);
        let mut p = at(Vector::xy(4.0, 0.0), Vector::xy(-6.0, 3.0));
        p.size = 1.0;

        rule.apply(&mut p, 0, 1.0);

        // step = -6, plane = 0 + 1, mirror = 2 * 1 + 6 - 4
        assert_eq!(p.position.x, 4.0);
        assert_eq!(p.velocity, Vector::xy(6.0, 3.0));
    }

    #[test]
    fn test_wall_leaves_non_crossing_particle() {
        let rule = Rule::wall_z(50.0);
        let mut p = at(Vector::new(0.0, 0.0, 10.0), Vector::new(0.0, 0.0, 5.0));
        rule.apply(&mut p, 0, 1.0);
        assert_eq!(p.position.z, 10.0);
        assert_eq!(p.velocity.z, 5.0);
    }

    #[test]
    fn test_anchor_target_tracks_and_expires() {
        let anchor = Anchor::new(Vector::xy(10.0, 0.0));
        let rule = Rule::attract(1.0, &anchor);

        let mut p = at(Vector::ZERO, Vector::ZERO);
        rule.apply(&mut p, 0, 1.0);
        assert_eq!(p.velocity, Vector::xy(10.0, 0.0));

        anchor.set(Vector::xy(0.0, -5.0));
        let mut q = at(Vector::ZERO, Vector::ZERO);
        rule.apply(&mut q, 0, 1.0);
        assert_eq!(q.velocity, Vector::xy(0.0, -5.0));

        drop(anchor);
        let mut r = at(Vector::ZERO, Vector::ZERO);
        rule.apply(&mut r, 0, 1.0);
        assert_eq!(r.velocity, Vector::ZERO);
    }

    #[test]
    fn test_custom_receives_index_and_delta() {
        let rule = Rule::custom(|p, i, delta| {
            p.velocity.x = i as f32 * delta;
        });
        let mut p = at(Vector::ZERO, Vector::ZERO);
        rule.apply(&mut p, 3, 0.5);
        assert_eq!(p.velocity.x, 1.5);
    }

    #[test]
    fn test_rules_clone_and_debug() {
        let rule = Rule::custom(|_, _, _| {});
        let copy = rule.clone();
        assert_eq!(format!("{:?}", copy), "Custom(..)");
        assert_eq!(format!("{:?}", Rule::gravity(1.0)), "Gravity(1.0)");
    }
}
