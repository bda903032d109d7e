//! Software render surface.
//!
//! [`Canvas`] rasterizes discs into an [`image::RgbaImage`] with simple edge
//! antialiasing. Blend modes are evaluated as Porter-Duff operators in
//! premultiplied floating point, so trace mode, additive glows and the
//! `SourceAtop`/`DestinationOver` painting tricks behave as they would on a
//! browser canvas. Frames can be written out as PNG files or uploaded to a
//! window by the `window` host.
//!
//! Pixels are stored with straight (non-premultiplied) alpha. A cleared
//! canvas is fully transparent; use [`Canvas::set_background`] to flatten
//! exported frames over an opaque color.

use crate::camera::Camera;
use crate::error::CanvasError;
use crate::surface::RenderSurface;
use crate::vector::Vector;
use crate::visuals::{BlendMode, Color};
use image::{ImageFormat, Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

/// A pixel buffer the engine can draw on.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    blend: BlendMode,
    stack: Vec<BlendMode>,
    camera: Option<Camera>,
    background: Option<Color>,
}

impl Canvas {
    /// Create a transparent canvas.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::ZeroSize { width, height });
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
            blend: BlendMode::default(),
            stack: Vec::new(),
            camera: None,
            background: None,
        })
    }

    /// Project every disc through `camera` before rasterizing.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Opaque color exported frames are flattened over.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    /// Blend mode currently in effect.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// The raw pixels, straight alpha.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// RGBA of one pixel, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// The frame composited over the background color, if one is set.
    pub fn flattened(&self) -> RgbaImage {
        let Some(background) = self.background else {
            return self.image.clone();
        };
        let [br, bg, bb, _] = background.to_linear();
        let mut out = self.image.clone();
        for pixel in out.pixels_mut() {
            let [r, g, b, a] = to_unit(pixel.0);
            *pixel = Rgba(to_bytes([
                r * a + br * (1.0 - a),
                g * a + bg * (1.0 - a),
                b * a + bb * (1.0 - a),
                1.0,
            ]));
        }
        out
    }

    /// Encode the (flattened) frame as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, CanvasError> {
        let mut bytes = Cursor::new(Vec::new());
        self.flattened().write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Write the (flattened) frame to `path` as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), CanvasError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.flattened().write_to(&mut writer, ImageFormat::Png)?;
        tracing::debug!(path = %path.as_ref().display(), "frame written");
        Ok(())
    }

    /// Composite `color` with `coverage` onto the pixel at (`x`, `y`).
    fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], coverage: f32) {
        let mode = self.blend;
        let pixel = self.image.get_pixel_mut(x, y);
        let [dr, dg, db, da] = to_unit(pixel.0);
        let [sr, sg, sb, sa] = color;
        let sa = sa * coverage;

        // Premultiplied source and destination.
        let s = [sr * sa, sg * sa, sb * sa];
        let d = [dr * da, dg * da, db * da];

        let (out, alpha) = match mode {
            BlendMode::Alpha => (
                [0, 1, 2].map(|i| s[i] + d[i] * (1.0 - sa)),
                sa + da * (1.0 - sa),
            ),
            BlendMode::Additive => (
                [0, 1, 2].map(|i| (s[i] + d[i]).min(1.0)),
                (sa + da).min(1.0),
            ),
            BlendMode::SourceAtop => ([0, 1, 2].map(|i| s[i] * da + d[i] * (1.0 - sa)), da),
            BlendMode::DestinationOver => (
                [0, 1, 2].map(|i| s[i] * (1.0 - da) + d[i]),
                sa * (1.0 - da) + da,
            ),
        };

        pixel.0 = if alpha > 0.0 {
            to_bytes([out[0] / alpha, out[1] / alpha, out[2] / alpha, alpha])
        } else {
            [0, 0, 0, 0]
        };
    }
}

impl RenderSurface for Canvas {
    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            pixel.0 = [0, 0, 0, 0];
        }
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let (x0, x1) = span(x, x + width, self.width());
        let (y0, y1) = span(y, y + height, self.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn fill_disc(&mut self, center: Vector, radius: f32, color: Color) {
        let (center, radius) = match &self.camera {
            Some(camera) => match camera.project(center, self.width(), self.height()) {
                Some(projected) => (projected.position, radius * projected.scale),
                None => return,
            },
            None => (center, radius),
        };
        if radius.is_nan() || radius <= 0.0 || !center.x.is_finite() || !center.y.is_finite() {
            return;
        }

        let color = color.to_linear();
        if color[3] <= 0.0 {
            return;
        }

        let (x0, x1) = span(center.x - radius - 1.0, center.x + radius + 1.0, self.width());
        let (y0, y1) = span(center.y - radius - 1.0, center.y + radius + 1.0, self.height());
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - center.x;
                let dy = py as f32 + 0.5 - center.y;
                let distance = (dx * dx + dy * dy).sqrt();
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color, coverage);
                }
            }
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn save(&mut self) {
        self.stack.push(self.blend);
    }

    fn restore(&mut self) {
        if let Some(mode) = self.stack.pop() {
            self.blend = mode;
        }
    }
}

/// Pixel range `[from, to)` covered by the coordinates `a..b`, clipped to `limit`.
fn span(a: f32, b: f32, limit: u32) -> (u32, u32) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let lo = lo.floor().max(0.0).min(limit as f32) as u32;
    let hi = hi.ceil().max(0.0).min(limit as f32) as u32;
    (lo, hi)
}

fn to_unit(bytes: [u8; 4]) -> [f32; 4] {
    bytes.map(|b| b as f32 / 255.0)
}

fn to_bytes(unit: [f32; 4]) -> [u8; 4] {
    unit.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn canvas() -> Canvas {
        Canvas::new(20, 20).unwrap()
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(matches!(
            Canvas::new(0, 5),
            Err(CanvasError::ZeroSize { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_disc_covers_center_not_corner() {
        let mut c = canvas();
        c.fill_disc(Vector::xy(10.0, 10.0), 3.0, Color::GREEN);
        assert_eq!(c.pixel(10, 10), Some([0, 255, 0, 255]));
        assert_eq!(c.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(c.pixel(19, 19), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_disc_off_canvas_is_clipped() {
        let mut c = canvas();
        c.fill_disc(Vector::xy(-50.0, 500.0), 4.0, Color::WHITE);
        c.fill_disc(Vector::xy(0.0, 0.0), 2.0, Color::WHITE);
        assert_eq!(c.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_degenerate_discs_draw_nothing() {
        let mut c = canvas();
        c.fill_disc(Vector::xy(5.0, 5.0), 0.0, Color::WHITE);
        c.fill_disc(Vector::xy(5.0, 5.0), f32::NAN, Color::WHITE);
        c.fill_disc(Vector::xy(f32::NAN, 5.0), 2.0, Color::WHITE);
        c.fill_disc(Vector::xy(5.0, 5.0), 2.0, Color::rgba(255, 255, 255, 0.0));
        assert!(c.image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_alpha_blends_over() {
        let mut c = canvas();
        c.fill_disc(Vector::xy(10.0, 10.0), 3.0, Color::BLUE);
        c.fill_disc(Vector::xy(10.0, 10.0), 3.0, Color::rgba(255, 0, 0, 0.5));
        let [r, g, b, a] = c.pixel(10, 10).unwrap();
        assert_eq!((r, g, a), (128, 0, 255));
        assert_eq!(b, 128);
    }

    #[test]
    fn test_additive_saturates() {
        let mut c = canvas();
        c.set_blend_mode(BlendMode::Additive);
        c.fill_disc(Vector::xy(10.0, 10.0), 3.0, Color::rgb(200, 100, 0));
        c.fill_disc(Vector::xy(10.0, 10.0), 3.0, Color::rgb(200, 100, 0));
        assert_eq!(c.pixel(10, 10), Some([255, 200, 0, 255]));
    }

    #[test]
    fn test_source_atop_paints_only_existing_content() {
        let mut c = canvas();
        c.fill_disc(Vector::xy(5.0, 5.0), 2.0, Color::BLUE);

        c.set_blend_mode(BlendMode::SourceAtop);
        c.fill_disc(Vector::xy(5.0, 5.0), 2.0, Color::RED);
        c.fill_disc(Vector::xy(15.0, 15.0), 2.0, Color::RED);

        assert_eq!(c.pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(c.pixel(15, 15), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_destination_over_paints_behind() {
        let mut c = canvas();
        c.fill_disc(Vector::xy(5.0, 5.0), 2.0, Color::BLUE);

        c.set_blend_mode(BlendMode::DestinationOver);
        c.fill_disc(Vector::xy(5.0, 5.0), 2.0, Color::RED);
        c.fill_disc(Vector::xy(15.0, 15.0), 2.0, Color::RED);

        assert_eq!(c.pixel(5, 5), Some([0, 0, 255, 255]));
        assert_eq!(c.pixel(15, 15), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_save_restore_blend_stack() {
        let mut c = canvas();
        c.save();
        c.set_blend_mode(BlendMode::Additive);
        c.save();
        c.set_blend_mode(BlendMode::SourceAtop);
        c.restore();
        assert_eq!(c.blend_mode(), BlendMode::Additive);
        c.restore();
        c.restore();
        assert_eq!(c.blend_mode(), BlendMode::Alpha);
    }

    #[test]
    fn test_clear_rect_accepts_negative_extent() {
        let mut c = canvas();
        c.fill_disc(Vector::xy(10.0, 10.0), 20.0, Color::WHITE);
        c.clear_rect(10.0, 10.0, -5.0, -5.0);

        assert_eq!(c.pixel(7, 7), Some([0, 0, 0, 0]));
        assert_eq!(c.pixel(12, 12), Some([255, 255, 255, 255]));

        c.clear();
        assert!(c.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_flattened_over_background() {
        let mut c = canvas().with_background(Color::BLACK);
        c.fill_disc(Vector::xy(10.0, 10.0), 3.0, Color::rgba(255, 255, 255, 0.5));
        let flat = c.flattened();
        assert_eq!(flat.get_pixel(10, 10).0, [128, 128, 128, 255]);
        assert_eq!(flat.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_encode_png_signature() {
        let bytes = canvas().encode_png().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_camera_projects_discs() {
        let mut camera = Camera::looking_at(Vec3::ZERO, 10.0);
        camera.pitch = 0.0;
        let mut c = canvas().with_camera(camera);
        c.fill_disc(Vector::ZERO, 1.0, Color::WHITE);

        assert_eq!(c.pixel(10, 10), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
