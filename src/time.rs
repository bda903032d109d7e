//! Frame scheduling and timestamps.
//!
//! The [`Controller`](crate::Controller) never owns a loop. After each tick it
//! asks a [`FrameScheduler`] for another frame, and the host calls
//! [`Controller::step`](crate::Controller::step) again with a millisecond
//! timestamp when that frame comes due. This module provides:
//!
//! - [`FrameClock`]: a headless, deterministic scheduler for tests, offline
//!   rendering and benchmarks.
//! - [`HostClock`]: wall-clock timestamps and FPS for real-time hosts.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new(1000.0 / 60.0);
//! controller.start(&mut clock);
//!
//! while let Some(timestamp) = clock.next_frame() {
//!     controller.step(timestamp, &mut clock);
//!     if clock.frame() == 600 {
//!         controller.pause();
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

/// Something that can schedule the next call to `Controller::step`.
///
/// Implementations must invoke the step once per request, before the next
/// display refresh, with a monotonically increasing timestamp in
/// milliseconds.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Deterministic scheduler that hands out evenly spaced timestamps.
///
/// Each [`request_frame`](FrameScheduler::request_frame) arms exactly one
/// frame; [`next_frame`](Self::next_frame) consumes it. Repeated requests
/// before a frame is consumed collapse into one, the way display-refresh
/// callbacks do.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Current timestamp in milliseconds.
    now_ms: f64,
    /// Milliseconds between frames.
    interval_ms: f64,
    /// Whether a frame has been requested and not yet delivered.
    pending: bool,
    /// Number of frames delivered so far.
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock that advances `interval_ms` per frame.
    ///
    /// The first delivered timestamp is `interval_ms`, never zero, so the
    /// controller can use it as its baseline.
    pub fn new(interval_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            interval_ms: interval_ms.max(0.0),
            pending: false,
            frame_count: 0,
        }
    }

    /// A clock ticking at `fps` frames per second.
    pub fn with_fps(fps: f64) -> Self {
        Self::new(if fps > 0.0 { 1000.0 / fps } else { 0.0 })
    }

    /// Deliver the requested frame, if any, and return its timestamp.
    pub fn next_frame(&mut self) -> Option<f64> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        self.now_ms += self.interval_ms;
        self.frame_count += 1;
        Some(self.now_ms)
    }

    /// Advance the clock without delivering a frame, simulating a host that
    /// stopped refreshing (a hidden tab, a blocked thread).
    pub fn stall(&mut self, ms: f64) {
        self.now_ms += ms.max(0.0);
    }

    /// Whether a frame has been requested and not yet delivered.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Current timestamp in milliseconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Frames delivered so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn interval(&self) -> f64 {
        self.interval_ms
    }

    pub fn set_interval(&mut self, interval_ms: f64) {
        self.interval_ms = interval_ms.max(0.0);
    }
}

impl Default for FrameClock {
    /// 60 frames per second.
    fn default() -> Self {
        Self::with_fps(60.0)
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&mut self) {
        self.pending = true;
    }
}

/// Wall-clock timestamps for real-time hosts.
///
/// Produces millisecond timestamps relative to creation and tracks frame
/// rate, updated twice a second.
#[derive(Debug)]
pub struct HostClock {
    /// When the clock was created.
    start: Instant,
    /// Total frames timed.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl HostClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Timestamp for the frame about to run, in milliseconds since creation.
    ///
    /// Call once per frame. Never returns zero, so the first frame already
    /// establishes a baseline.
    pub fn timestamp(&mut self) -> f64 {
        let now = Instant::now();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (now.duration_since(self.start).as_secs_f64() * 1000.0).max(f64::MIN_POSITIVE)
    }

    /// Total frames timed.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Elapsed time since creation.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}
