//! Shared plumbing for the headless demos: logging, output directory and a
//! fixed-rate frame loop that writes PNG snapshots.

#![allow(dead_code)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use drift::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (defaults to `info`).
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// First CLI argument, or `target/demos/<name>`. Created if missing.
pub fn output_dir(name: &str) -> std::io::Result<PathBuf> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new("target").join("demos").join(name));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Run `controller` at 60 fps for `frames` frames, saving every `every`th
/// frame through `snapshot`. `on_frame` runs after each step.
pub fn record<S, F, G>(
    controller: &mut Controller<S>,
    frames: u64,
    every: u64,
    mut on_frame: F,
    mut snapshot: G,
) -> Result<(), Box<dyn Error>>
where
    S: RenderSurface,
    F: FnMut(&mut Controller<S>, u64),
    G: FnMut(&Controller<S>, u64) -> Result<(), Box<dyn Error>>,
{
    let mut clock = FrameClock::with_fps(60.0);
    controller.start(&mut clock);

    while let Some(timestamp) = clock.next_frame() {
        controller.step(timestamp, &mut clock);
        let frame = clock.frame();
        on_frame(controller, frame);

        if every > 0 && frame % every == 0 {
            snapshot(controller, frame)?;
        }
        if frame >= frames {
            controller.pause();
        }
    }

    tracing::info!(frames = clock.frame(), "done");
    Ok(())
}

/// Snapshot writer for controllers that own their canvas.
pub fn save_canvas<'a>(dir: &'a Path) -> impl FnMut(&Controller<Canvas>, u64) -> Result<(), Box<dyn Error>> + 'a {
    move |controller, frame| {
        if let Some(canvas) = controller.surface() {
            canvas.save_png(dir.join(format!("frame_{frame:04}.png")))?;
        }
        Ok(())
    }
}
