//! Particle systems.
//!
//! A [`System`] owns an ordered collection of particles, the rules that act
//! on them and a spawner that creates new ones. Systems are updated and drawn
//! by a [`Controller`](crate::Controller), in the order they were added.
//!
//! # Update order
//!
//! For each call to [`System::update`]:
//!
//! 1. `pre_update` hook
//! 2. for each particle, in order: every rule in order, then
//!    [`Particle::update`]
//! 3. dead particles are removed, survivors keep their relative order
//! 4. `on_death` once per removed particle
//! 5. `post_update` hook
//!
//! # Example
//!
//! ```ignore
//! let system = System::new(
//!     SystemConfig::new()
//!         .with_target_count(100)
//!         .with_spawner(|i| Particle::at(Vector::xy(i as f32, 0.0), Vector::ZERO))
//!         .with_rule(Rule::gravity(10.0))
//!         .with_rule(Rule::wall_y(480.0)),
//! );
//! ```

use crate::particle::Particle;
use crate::rules::Rule;
use crate::surface::RenderSurface;
use std::fmt;

/// Creates a particle given the index it will occupy.
pub type Spawner = Box<dyn FnMut(usize) -> Particle>;

/// System-level customization hooks.
///
/// Every method defaults to a no-op. Hooks receive the system they belong to,
/// so they can add particles, add rules or reset it.
pub trait SystemHooks {
    /// Called once by [`System::new`], before the first reset.
    fn init(&mut self, _system: &mut System) {}

    fn pre_update(&mut self, _system: &mut System, _delta: f32) {}

    fn post_update(&mut self, _system: &mut System, _delta: f32) {}

    /// Called once for every particle removed during an update.
    fn on_death(&mut self, _system: &mut System) {}

    /// Configure the surface (blend mode) before this system draws.
    fn set_context(&mut self, _surface: &mut dyn RenderSurface) {}

    fn pre_draw(&mut self, _system: &System, _surface: &mut dyn RenderSurface) {}

    fn post_draw(&mut self, _system: &System, _surface: &mut dyn RenderSurface) {}
}

/// Construction options for a [`System`].
pub struct SystemConfig {
    /// Defaults to [`Particle::default`].
    pub spawner: Spawner,
    /// Number of particles created by [`System::reset`].
    pub target_count: usize,
    pub rules: Vec<Rule>,
    pub hooks: Option<Box<dyn SystemHooks>>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            spawner: Box::new(|_| Particle::default()),
            target_count: 0,
            rules: Vec::new(),
            hooks: None,
        }
    }
}

impl SystemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: FnMut(usize) -> Particle + 'static,
    {
        self.spawner = Box::new(spawner);
        self
    }

    pub fn with_target_count(mut self, count: usize) -> Self {
        self.target_count = count;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_hooks<H: SystemHooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }
}

/// An ordered collection of particles sharing rules and hooks.
pub struct System {
    particles: Vec<Particle>,
    rules: Vec<Rule>,
    spawner: Spawner,
    target_count: usize,
    hooks: Option<Box<dyn SystemHooks>>,
}

impl System {
    /// Create a system, run its `init` hook, then [`reset`](Self::reset) it.
    pub fn new(config: SystemConfig) -> Self {
        let mut system = Self {
            particles: Vec::with_capacity(config.target_count),
            rules: config.rules,
            spawner: config.spawner,
            target_count: config.target_count,
            hooks: config.hooks,
        };
        system.with_hooks(|hooks, s| hooks.init(s));
        system.reset();
        system
    }

    /// Discard all particles and spawn `target_count` fresh ones.
    pub fn reset(&mut self) {
        self.particles.clear();
        for i in 0..self.target_count {
            let particle = (self.spawner)(i);
            self.particles.push(particle);
        }
        tracing::debug!(count = self.particles.len(), "system reset");
    }

    /// Append `particle`, or one made by the spawner when `None`.
    ///
    /// The spawner receives the current particle count as the index.
    pub fn add_particle(&mut self, particle: Option<Particle>) {
        let particle = particle.unwrap_or_else(|| (self.spawner)(self.particles.len()));
        self.particles.push(particle);
    }

    /// Append a rule. It applies from the next update on.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Advance every particle by `delta` seconds and remove the dead.
    pub fn update(&mut self, delta: f32) {
        self.with_hooks(|hooks, s| hooks.pre_update(s, delta));

        let mut dead = Vec::with_capacity(self.particles.len());
        for (i, particle) in self.particles.iter_mut().enumerate() {
            for rule in &self.rules {
                rule.apply(particle, i, delta);
            }
            dead.push(particle.update(delta));
        }

        let removed = dead.iter().filter(|&&d| d).count();
        if removed > 0 {
            let mut flags = dead.into_iter();
            self.particles.retain(|_| !flags.next().unwrap_or(false));
            tracing::trace!(removed, remaining = self.particles.len(), "particles died");

            for _ in 0..removed {
                self.with_hooks(|hooks, s| hooks.on_death(s));
            }
        }

        self.with_hooks(|hooks, s| hooks.post_update(s, delta));
    }

    /// Draw every particle with its trail, wrapped in the draw hooks.
    ///
    /// The surface state is saved before `set_context` and restored at the
    /// end, so a blend mode chosen here does not leak into later systems.
    pub fn draw(&mut self, surface: &mut dyn RenderSurface) {
        surface.save();
        let hooks = self.hooks.take();

        if let Some(mut hooks) = hooks {
            hooks.set_context(surface);
            hooks.pre_draw(self, surface);
            self.draw_particles(surface);
            hooks.post_draw(self, surface);
            if self.hooks.is_none() {
                self.hooks = Some(hooks);
            }
        } else {
            self.draw_particles(surface);
        }

        surface.restore();
    }

    fn draw_particles(&self, surface: &mut dyn RenderSurface) {
        for particle in &self.particles {
            particle.draw_all(surface);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles created by [`reset`](Self::reset).
    #[inline]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Takes effect at the next reset.
    pub fn set_target_count(&mut self, count: usize) {
        self.target_count = count;
    }

    pub fn set_spawner<F>(&mut self, spawner: F)
    where
        F: FnMut(usize) -> Particle + 'static,
    {
        self.spawner = Box::new(spawner);
    }

    /// Run `f` with the hooks detached so they can borrow the system mutably.
    /// Hooks installed by the callback itself are kept.
    fn with_hooks(&mut self, f: impl FnOnce(&mut Box<dyn SystemHooks>, &mut System)) {
        if let Some(mut hooks) = self.hooks.take() {
            f(&mut hooks, self);
            if self.hooks.is_none() {
                self.hooks = Some(hooks);
            }
        }
    }

    /// Replace the hooks. The new hooks' `init` is not run.
    pub fn set_hooks<H: SystemHooks + 'static>(&mut self, hooks: H) {
        self.hooks = Some(Box::new(hooks));
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new(SystemConfig::default())
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("particles", &self.particles.len())
            .field("rules", &self.rules)
            .field("target_count", &self.target_count)
            .field("has_hooks", &self.hooks.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{Behavior, ParticleConfig};
    use crate::surface::{DrawCommand, Recorder};
    use crate::vector::Vector;
    use crate::visuals::BlendMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Dies once its x coordinate passes a threshold.
    struct DieAfter(f32);

    impl Behavior for DieAfter {
        fn is_dead(&self, particle: &Particle) -> bool {
            particle.position.x > self.0
        }
    }

    fn mortal(id: f32, threshold: f32) -> Particle {
        ParticleConfig::new()
            .with_position(Vector::xy(0.0, id))
            .with_velocity(Vector::xy(1.0, 0.0))
            .with_behavior(DieAfter(threshold))
            .build()
    }

    #[derive(Default)]
    struct Counts {
        deaths: usize,
        pre: usize,
        post: usize,
    }

    struct Counter(Rc<RefCell<Counts>>);

    impl SystemHooks for Counter {
        fn pre_update(&mut self, _system: &mut System, _delta: f32) {
            self.0.borrow_mut().pre += 1;
        }

        fn post_update(&mut self, _system: &mut System, _delta: f32) {
            self.0.borrow_mut().post += 1;
        }

        fn on_death(&mut self, _system: &mut System) {
            self.0.borrow_mut().deaths += 1;
        }
    }

    #[test]
    fn test_reset_spawns_target_count() {
        for n in [0, 1, 7, 250] {
            let mut system = System::new(SystemConfig::new().with_target_count(n));
            assert_eq!(system.len(), n);
            system.add_particle(None);
            system.reset();
            assert_eq!(system.len(), n);
        }
    }

    #[test]
    fn test_spawner_receives_index() {
        let system = System::new(
            SystemConfig::new()
                .with_target_count(4)
                .with_spawner(|i| Particle::at(Vector::xy(i as f32, 0.0), Vector::ZERO)),
        );
        let xs: Vec<f32> = system.particles().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_add_particle_uses_current_count() {
        let mut system = System::new(
            SystemConfig::new()
                .with_target_count(2)
                .with_spawner(|i| Particle::at(Vector::xy(i as f32 * 10.0, 0.0), Vector::ZERO)),
        );
        system.add_particle(None);
        system.add_particle(Some(Particle::at(Vector::xy(-1.0, 0.0), Vector::ZERO)));

        let xs: Vec<f32> = system.particles().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0, -1.0]);
    }

    #[test]
    fn test_gravity_scenario() {
        let mut system = System::new(
            SystemConfig::new()
                .with_target_count(1)
                .with_rule(Rule::gravity(10.0)),
        );
        for _ in 0..3 {
            system.update(1.0);
        }
        let p = &system.particles()[0];
        assert_eq!(p.velocity.y, 30.0);
        assert_eq!(p.position.y, 60.0);
    }

    #[test]
    fn test_rules_apply_in_order() {
        let mut system = System::new(
            SystemConfig::new()
                .with_target_count(1)
                .with_rule(Rule::custom(|p, _, _| p.velocity.x += 1.0))
                .with_rule(Rule::custom(|p, _, _| p.velocity.x *= 10.0)),
        );
        system.update(0.0);
        assert_eq!(system.particles()[0].velocity.x, 10.0);
    }

    #[test]
    fn test_rule_added_later_applies() {
        let mut system = System::new(SystemConfig::new().with_target_count(1));
        system.update(1.0);
        system.add_rule(Rule::gravity(5.0));
        system.update(1.0);
        assert_eq!(system.particles()[0].velocity.y, 5.0);
    }

    #[test]
    fn test_removal_keeps_survivor_order() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut system = System::new(SystemConfig::new().with_hooks(Counter(counts.clone())));

        // Adjacent deaths must not skip the particle that follows them.
        for (id, threshold) in [(0.0, 5.0), (1.0, 0.5), (2.0, 0.5), (3.0, 5.0), (4.0, 0.5)] {
            system.add_particle(Some(mortal(id, threshold)));
        }

        system.update(1.0);

        let ids: Vec<f32> = system.particles().iter().map(|p| p.position.y).collect();
        assert_eq!(ids, vec![0.0, 3.0]);
        // Survivors were integrated exactly once.
        assert!(system.particles().iter().all(|p| p.position.x == 1.0));

        let counts = counts.borrow();
        assert_eq!(counts.deaths, 3);
        assert_eq!(counts.pre, 1);
        assert_eq!(counts.post, 1);
    }

    #[test]
    fn test_on_death_can_respawn() {
        struct Respawn;
        impl SystemHooks for Respawn {
            fn on_death(&mut self, system: &mut System) {
                if system.is_empty() {
                    system.reset();
                }
            }
        }

        let mut system = System::new(
            SystemConfig::new()
                .with_target_count(2)
                .with_spawner(|i| mortal(i as f32, 0.5))
                .with_hooks(Respawn),
        );
        system.update(1.0);
        assert_eq!(system.len(), 2);
        assert!(system.particles().iter().all(|p| p.position.x == 0.0));
    }

    #[test]
    fn test_init_runs_before_reset() {
        struct Setup;
        impl SystemHooks for Setup {
            fn init(&mut self, system: &mut System) {
                system.set_target_count(3);
            }
        }

        let system = System::new(SystemConfig::new().with_hooks(Setup));
        assert_eq!(system.len(), 3);
    }

    #[test]
    fn test_draw_wraps_hooks_in_save_restore() {
        struct Glow;
        impl SystemHooks for Glow {
            fn set_context(&mut self, surface: &mut dyn RenderSurface) {
                surface.set_blend_mode(BlendMode::Additive);
            }

            fn post_draw(&mut self, system: &System, surface: &mut dyn RenderSurface) {
                surface.clear_rect(0.0, 0.0, system.len() as f32, 1.0);
            }
        }

        let mut system = System::new(SystemConfig::new().with_target_count(2).with_hooks(Glow));
        let mut recorder = Recorder::new();
        system.draw(&mut recorder);

        let commands = recorder.commands();
        assert_eq!(commands.first(), Some(&DrawCommand::Save));
        assert_eq!(commands[1], DrawCommand::SetBlendMode(BlendMode::Additive));
        assert_eq!(recorder.discs().count(), 2);
        assert!(matches!(
            commands[commands.len() - 2],
            DrawCommand::ClearRect { width, .. } if width == 2.0
        ));
        assert_eq!(commands.last(), Some(&DrawCommand::Restore));
        assert_eq!(recorder.blend_mode(), BlendMode::Alpha);
    }
}
