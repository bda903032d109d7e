//! The render-surface capability the engine draws through.
//!
//! The engine never assumes a concrete graphics backend. Anything that can
//! clear, fill a disc, switch blend modes and save/restore that state can be
//! handed to a [`Controller`](crate::Controller). The crate ships two
//! implementations:
//!
//! - [`Canvas`](crate::raster::Canvas): a software rasterizer over an RGBA
//!   image, used by the demos and the window host.
//! - [`Recorder`]: keeps a log of every call, for tests and debugging.

use crate::vector::Vector;
use crate::visuals::{BlendMode, Color};

/// Drawing operations required by the engine.
///
/// The engine only writes; it never reads pixels back.
pub trait RenderSurface {
    /// Erase the entire surface.
    fn clear(&mut self);

    /// Erase an axis-aligned rectangle.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Fill a disc centered at `center` with `radius` and `color`.
    ///
    /// Surfaces that render in 2D use the `x` and `y` components only,
    /// unless they apply their own projection.
    fn fill_disc(&mut self, center: Vector, radius: f32, color: Color);

    /// Select how subsequent fills combine with existing content.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Push the current drawing state (blend mode) onto a stack.
    fn save(&mut self);

    /// Pop the drawing state pushed by the matching [`save`](Self::save).
    ///
    /// Unbalanced calls are ignored.
    fn restore(&mut self);
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        (**self).clear_rect(x, y, width, height)
    }

    fn fill_disc(&mut self, center: Vector, radius: f32, color: Color) {
        (**self).fill_disc(center, radius, color)
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        (**self).set_blend_mode(mode)
    }

    fn save(&mut self) {
        (**self).save()
    }

    fn restore(&mut self) {
        (**self).restore()
    }
}

/// A single call made against a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    ClearRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    FillDisc {
        center: Vector,
        radius: f32,
        color: Color,
        /// Blend mode in effect when the disc was filled.
        blend: BlendMode,
    },
    SetBlendMode(BlendMode),
    Save,
    Restore,
}

/// A surface that records every call instead of rasterizing.
#[derive(Debug, Default)]
pub struct Recorder {
    commands: Vec<DrawCommand>,
    blend: BlendMode,
    stack: Vec<BlendMode>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands recorded since creation or the last [`take`](Self::take).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Blend mode currently in effect.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Only the discs, in draw order.
    pub fn discs(&self) -> impl Iterator<Item = (Vector, f32, Color)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillDisc {
                center,
                radius,
                color,
                ..
            } => Some((*center, *radius, *color)),
            _ => None,
        })
    }
}

impl RenderSurface for Recorder {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_disc(&mut self, center: Vector, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillDisc {
            center,
            radius,
            color,
            blend: self.blend,
        });
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.commands.push(DrawCommand::SetBlendMode(mode));
    }

    fn save(&mut self) {
        self.stack.push(self.blend);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(mode) = self.stack.pop() {
            self.blend = mode;
        }
        self.commands.push(DrawCommand::Restore);
    }
}
