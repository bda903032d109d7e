//! Visual attributes shared by particles and render surfaces.
//!
//! This module holds the rendering vocabulary the engine speaks to a
//! [`RenderSurface`](crate::RenderSurface): particle colors and the blend
//! modes a system can select in its `set_context` hook.
//!
//! # Usage
//!
//! ```ignore
//! struct Glow;
//!
//! impl SystemHooks for Glow {
//!     fn set_context(&mut self, surface: &mut dyn RenderSurface) {
//!         surface.set_blend_mode(BlendMode::Additive);
//!     }
//! }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RGBA color.
///
/// Color channels use the 0–255 range, opacity uses 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity (0.0 = transparent, 1.0 = opaque).
    pub a: f32,
}

impl Color {
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque color from channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from channel values and opacity.
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its opacity multiplied by `opacity`.
    ///
    /// Used when drawing trail segments.
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            a: self.a * opacity,
            ..self
        }
    }

    /// Channels normalized to 0.0–1.0, opacity clamped to the same range.
    pub fn to_linear(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a.clamp(0.0, 1.0),
        ]
    }
}

impl Default for Color {
    /// Opaque red.
    fn default() -> Self {
        Self::RED
    }
}

/// Blend mode for particle rendering.
///
/// Controls how newly drawn shapes combine with what is already on the
/// surface. Names follow the Porter-Duff operators most 2D backends expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlendMode {
    /// Standard alpha blending (default).
    ///
    /// New shapes are painted over existing content according to their
    /// opacity.
    #[default]
    Alpha,

    /// Additive blending.
    ///
    /// Colors are added together, so overlapping particles become brighter.
    /// Good for fireworks, sparks and other glowing effects.
    Additive,

    /// Paint only where the surface already has content.
    ///
    /// Destination opacity is kept, so particles act as a brush that tints
    /// existing pixels without extending the painted area.
    SourceAtop,

    /// Paint behind existing content.
    ///
    /// New shapes only show through where the surface is transparent.
    DestinationOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_color_is_opaque_red() {
        let c = Color::default();
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_faded_scales_opacity_only() {
        let c = Color::rgba(10, 20, 30, 0.5).faded(0.5);
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
        assert_eq!(c.a, 0.25);
    }

    #[test]
    fn test_to_linear_clamps_opacity() {
        let [r, g, b, a] = Color::rgba(255, 0, 51, 3.0).to_linear();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0.2).abs() < 1e-6);
        assert_eq!(a, 1.0);
    }
}
