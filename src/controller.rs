//! The controller: drives systems through update and draw, one frame at a time.
//!
//! A [`Controller`] owns a list of [`System`]s and, usually, the
//! [`RenderSurface`] they draw on. It does not own a loop; the host calls
//! [`step`](Controller::step) whenever a frame requested through a
//! [`FrameScheduler`] comes due.
//!
//! # Tick
//!
//! Each step computes a delta from the previous timestamp. Frames that arrive
//! 100 ms or more after the previous one are treated as a stall (hidden
//! window, debugger break): neither update nor draw runs and no catch-up is
//! attempted. Otherwise every system is updated with `delta * speed` and the
//! frame is drawn. Finally, unless paused, the next frame is requested.
//!
//! # Example
//!
//! ```ignore
//! let canvas = Canvas::new(640, 480)?;
//! let mut controller = Controller::new(ControllerConfig::new().with_surface(canvas))?;
//! controller.add_system(System::new(config));
//!
//! let mut clock = FrameClock::default();
//! controller.start(&mut clock);
//! while let Some(timestamp) = clock.next_frame() {
//!     controller.step(timestamp, &mut clock);
//! }
//! ```

use crate::error::ConfigError;
use crate::surface::RenderSurface;
use crate::system::System;
use crate::time::FrameScheduler;
use std::fmt;

/// Frames at least this many seconds apart are skipped.
const STALL_THRESHOLD: f32 = 0.1;

/// Replacement for the default frame draw.
///
/// Receives every system and the surface, if one was configured.
pub type DrawFn<S> = Box<dyn FnMut(&mut [System], Option<&mut S>)>;

/// Controller-level draw hook.
pub type SurfaceFn = Box<dyn FnMut(&mut dyn RenderSurface)>;

/// Whether the controller will keep requesting frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// The next frame has been requested.
    Running,
    /// No further frame was requested.
    Paused,
}

/// Construction options for a [`Controller`].
///
/// At least one of `surface` and `draw` must be set.
pub struct ControllerConfig<S: RenderSurface = Box<dyn RenderSurface>> {
    pub surface: Option<S>,
    /// Replaces the default draw entirely when set.
    pub draw: Option<DrawFn<S>>,
    /// When true, the surface is not cleared between frames.
    pub trace: bool,
    /// Simulation speed multiplier applied to every delta.
    pub speed: f32,
    pub pre_draw: Option<SurfaceFn>,
    pub post_draw: Option<SurfaceFn>,
    pub set_context: Option<SurfaceFn>,
}

impl<S: RenderSurface> Default for ControllerConfig<S> {
    fn default() -> Self {
        Self {
            surface: None,
            draw: None,
            trace: false,
            speed: 1.0,
            pre_draw: None,
            post_draw: None,
            set_context: None,
        }
    }
}

impl<S: RenderSurface> ControllerConfig<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Replace the default draw.
    pub fn with_draw<F>(mut self, draw: F) -> Self
    where
        F: FnMut(&mut [System], Option<&mut S>) + 'static,
    {
        self.draw = Some(Box::new(draw));
        self
    }

    /// Keep previous frames on the surface instead of clearing.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_pre_draw<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut dyn RenderSurface) + 'static,
    {
        self.pre_draw = Some(Box::new(f));
        self
    }

    pub fn with_post_draw<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut dyn RenderSurface) + 'static,
    {
        self.post_draw = Some(Box::new(f));
        self
    }

    pub fn with_set_context<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut dyn RenderSurface) + 'static,
    {
        self.set_context = Some(Box::new(f));
        self
    }
}

/// Top-level driver of a particle scene.
pub struct Controller<S: RenderSurface = Box<dyn RenderSurface>> {
    systems: Vec<System>,
    surface: Option<S>,
    draw: Option<DrawFn<S>>,
    trace: bool,
    speed: f32,
    pre_draw: Option<SurfaceFn>,
    post_draw: Option<SurfaceFn>,
    set_context: Option<SurfaceFn>,
    paused: bool,
    /// Timestamp of the last non-zero step, in milliseconds.
    last_step: Option<f64>,
}

impl<S: RenderSurface> Controller<S> {
    /// Create a controller with no systems.
    ///
    /// Fails with [`ConfigError::MissingRenderTarget`] when the config has
    /// neither a surface nor a custom draw function.
    pub fn new(config: ControllerConfig<S>) -> Result<Self, ConfigError> {
        if config.surface.is_none() && config.draw.is_none() {
            return Err(ConfigError::MissingRenderTarget);
        }

        Ok(Self {
            systems: Vec::new(),
            surface: config.surface,
            draw: config.draw,
            trace: config.trace,
            speed: config.speed,
            pre_draw: config.pre_draw,
            post_draw: config.post_draw,
            set_context: config.set_context,
            paused: false,
            last_step: None,
        })
    }

    /// Append a system. Systems update and draw in insertion order.
    pub fn add_system(&mut self, system: System) -> &mut Self {
        self.systems.push(system);
        self
    }

    /// Begin or resume the simulation.
    ///
    /// Runs one step with a zero timestamp (no time passes) and requests the
    /// next frame.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> LoopState {
        tracing::debug!(systems = self.systems.len(), "controller started");
        self.paused = false;
        self.step(0.0, scheduler)
    }

    /// Stop requesting frames. A step already in progress completes.
    pub fn pause(&mut self) {
        tracing::debug!("controller paused");
        self.paused = true;
    }

    /// Reset every system in order.
    pub fn reset(&mut self) {
        tracing::debug!(systems = self.systems.len(), "controller reset");
        for system in &mut self.systems {
            system.reset();
        }
    }

    /// Erase the whole surface. Does nothing without a surface.
    pub fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
    }

    /// Run one tick at `timestamp_ms`.
    ///
    /// A zero timestamp means "no time information": delta is zero and the
    /// baseline is left alone. The first non-zero timestamp only establishes
    /// the baseline.
    pub fn step(&mut self, timestamp_ms: f64, scheduler: &mut dyn FrameScheduler) -> LoopState {
        let mut delta = 0.0;
        if timestamp_ms != 0.0 {
            if let Some(last) = self.last_step {
                delta = ((timestamp_ms - last) * 0.001) as f32;
            }
            self.last_step = Some(timestamp_ms);
        }

        if delta < STALL_THRESHOLD {
            tracing::trace!(delta, "tick");
            self.update(delta * self.speed);
            self.draw();
        } else {
            tracing::debug!(delta, "stalled frame skipped");
        }

        if self.paused {
            LoopState::Paused
        } else {
            scheduler.request_frame();
            LoopState::Running
        }
    }

    /// Update every system by `delta` seconds, in order.
    pub fn update(&mut self, delta: f32) {
        for system in &mut self.systems {
            system.update(delta);
        }
    }

    /// Draw one frame.
    ///
    /// Uses the custom draw function when configured. Otherwise saves the
    /// surface state, clears unless tracing, runs the controller's
    /// `set_context` and `pre_draw`, draws each system, runs `post_draw` and
    /// restores.
    pub fn draw(&mut self) {
        if let Some(draw) = self.draw.as_mut() {
            draw(self.systems.as_mut_slice(), self.surface.as_mut());
            return;
        }

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let surface: &mut dyn RenderSurface = surface;

        surface.save();
        if !self.trace {
            surface.clear();
        }
        if let Some(set_context) = self.set_context.as_mut() {
            set_context(surface);
        }
        if let Some(pre_draw) = self.pre_draw.as_mut() {
            pre_draw(surface);
        }
        for system in &mut self.systems {
            system.draw(surface);
        }
        if let Some(post_draw) = self.post_draw.as_mut() {
            post_draw(surface);
        }
        surface.restore();
    }

    pub fn systems(&self) -> &[System] {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut [System] {
        &mut self.systems
    }

    pub fn system(&self, index: usize) -> Option<&System> {
        self.systems.get(index)
    }

    pub fn system_mut(&mut self, index: usize) -> Option<&mut System> {
        self.systems.get_mut(index)
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Whether the controller is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> LoopState {
        if self.paused {
            LoopState::Paused
        } else {
            LoopState::Running
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    #[inline]
    pub fn trace(&self) -> bool {
        self.trace
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }
}

impl<S: RenderSurface> fmt::Debug for Controller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("systems", &self.systems)
            .field("has_surface", &self.surface.is_some())
            .field("custom_draw", &self.draw.is_some())
            .field("trace", &self.trace)
            .field("speed", &self.speed)
            .field("paused", &self.paused)
            .field("last_step", &self.last_step)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::surface::{DrawCommand, Recorder};
    use crate::system::SystemConfig;
    use crate::time::FrameClock;
    use crate::visuals::BlendMode;

    fn recorder_controller() -> Controller<Recorder> {
        Controller::new(ControllerConfig::new().with_surface(Recorder::new())).unwrap()
    }

    fn falling(count: usize) -> System {
        System::new(
            SystemConfig::new()
                .with_target_count(count)
                .with_rule(Rule::gravity(10.0)),
        )
    }

    #[test]
    fn test_requires_render_target() {
        let result = Controller::<Recorder>::new(ControllerConfig::new());
        assert_eq!(result.err(), Some(ConfigError::MissingRenderTarget));

        let custom = Controller::<Recorder>::new(ControllerConfig::new().with_draw(|_, _| {}));
        assert!(custom.is_ok());
    }

    #[test]
    fn test_defaults() {
        let controller = recorder_controller();
        assert!(!controller.trace());
        assert_eq!(controller.speed(), 1.0);
        assert!(!controller.is_paused());
        assert!(controller.systems().is_empty());
    }

    #[test]
    fn test_add_system_chains() {
        let mut controller = recorder_controller();
        controller.add_system(falling(1)).add_system(falling(2));
        assert_eq!(controller.systems().len(), 2);
        assert_eq!(controller.system(1).map(System::len), Some(2));
        assert!(controller.system(2).is_none());
    }

    #[test]
    fn test_first_steps_have_zero_delta() {
        let mut controller = recorder_controller();
        controller.add_system(falling(1));
        let mut clock = FrameClock::new(50.0);

        controller.start(&mut clock);
        // Baseline only.
        controller.step(50.0, &mut clock);
        assert_eq!(controller.systems()[0].particles()[0].velocity.y, 0.0);

        controller.step(100.0, &mut clock);
        let v = controller.systems()[0].particles()[0].velocity.y;
        assert!((v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_speed_scales_delta() {
        let mut controller = recorder_controller();
        controller.add_system(falling(1));
        controller.set_speed(4.0);
        let mut clock = FrameClock::new(50.0);

        controller.step(1000.0, &mut clock);
        controller.step(1050.0, &mut clock);
        let v = controller.systems()[0].particles()[0].velocity.y;
        assert!((v - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_stalled_frame_skips_update_and_draw() {
        let mut controller = recorder_controller();
        controller.add_system(falling(1));
        let mut clock = FrameClock::new(16.0);

        controller.step(1000.0, &mut clock);
        let drawn = controller.surface().map(|r| r.commands().len());
        assert!(clock.next_frame().is_some());

        let state = controller.step(1200.0, &mut clock);
        assert_eq!(state, LoopState::Running);
        assert!(clock.is_pending());
        assert_eq!(controller.systems()[0].particles()[0].velocity.y, 0.0);
        assert_eq!(controller.surface().map(|r| r.commands().len()), drawn);

        // The stalled timestamp becomes the new baseline; no catch-up.
        controller.step(1216.0, &mut clock);
        let v = controller.systems()[0].particles()[0].velocity.y;
        assert!((v - 0.16).abs() < 1e-5);
    }

    #[test]
    fn test_pause_stops_requesting_frames() {
        let mut controller = recorder_controller();
        let mut clock = FrameClock::new(16.0);

        assert_eq!(controller.start(&mut clock), LoopState::Running);
        let timestamp = clock.next_frame().unwrap();

        controller.pause();
        // The in-flight tick still runs.
        assert_eq!(controller.step(timestamp, &mut clock), LoopState::Paused);
        assert!(!clock.is_pending());
        assert_eq!(controller.state(), LoopState::Paused);

        assert_eq!(controller.start(&mut clock), LoopState::Running);
        assert!(clock.is_pending());
    }

    #[test]
    fn test_default_draw_sequence() {
        let config = ControllerConfig::new()
            .with_surface(Recorder::new())
            .with_set_context(|s| s.set_blend_mode(BlendMode::Additive))
            .with_post_draw(|s| s.clear_rect(1.0, 2.0, 3.0, 4.0));
        let mut controller = Controller::new(config).unwrap();
        controller.add_system(falling(1));
        controller.draw();

        let commands = controller.surface().map(Recorder::commands).unwrap_or_default();
        assert_eq!(commands[0], DrawCommand::Save);
        assert_eq!(commands[1], DrawCommand::Clear);
        assert_eq!(commands[2], DrawCommand::SetBlendMode(BlendMode::Additive));
        // System draw is nested in its own save/restore.
        assert_eq!(commands[3], DrawCommand::Save);
        assert!(matches!(commands[4], DrawCommand::FillDisc { blend: BlendMode::Additive, .. }));
        assert_eq!(commands[5], DrawCommand::Restore);
        assert!(matches!(commands[6], DrawCommand::ClearRect { .. }));
        assert_eq!(commands[7], DrawCommand::Restore);
        assert_eq!(commands.len(), 8);
    }

    #[test]
    fn test_trace_mode_does_not_clear() {
        let mut controller = recorder_controller();
        controller.set_trace(true);
        controller.add_system(falling(3));
        controller.draw();

        let commands = controller.surface().map(Recorder::commands).unwrap_or_default();
        assert!(!commands.contains(&DrawCommand::Clear));
        assert_eq!(controller.surface().map(|r| r.discs().count()), Some(3));
    }

    #[test]
    fn test_custom_draw_replaces_default() {
        let config = ControllerConfig::new()
            .with_surface(Recorder::new())
            .with_draw(|systems: &mut [System], surface: Option<&mut Recorder>| {
                if let Some(surface) = surface {
                    let count = systems.iter().map(System::len).sum::<usize>();
                    surface.clear_rect(0.0, 0.0, count as f32, 0.0);
                }
            });
        let mut controller = Controller::new(config).unwrap();
        controller.add_system(falling(4));
        controller.draw();

        let commands = controller.surface().map(Recorder::commands).unwrap_or_default();
        assert_eq!(
            commands,
            &[DrawCommand::ClearRect { x: 0.0, y: 0.0, width: 4.0, height: 0.0 }]
        );
    }

    #[test]
    fn test_clear_without_surface_is_noop() {
        let mut controller =
            Controller::<Recorder>::new(ControllerConfig::new().with_draw(|_, _| {}))
                .unwrap();
        controller.clear();
        assert!(controller.surface().is_none());
    }

    #[test]
    fn test_reset_resets_all_systems() {
        let mut controller = recorder_controller();
        controller.add_system(falling(2)).add_system(falling(5));
        for system in controller.systems_mut() {
            system.add_particle(None);
        }
        controller.reset();
        let counts: Vec<usize> = controller.systems().iter().map(System::len).collect();
        assert_eq!(counts, vec![2, 5]);
    }
}
