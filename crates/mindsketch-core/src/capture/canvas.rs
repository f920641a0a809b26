//! The drawing canvas raster.
//!
//! The canvas is always backed by an opaque white background so that
//! committed output is a flat raster, never relying on alpha compositing.
//! Imported or camera-captured stills become a backdrop layer; freehand
//! strokes are drawn over it and can be discarded independently when the
//! input modality switches.

use crate::error::{Result, SketchError};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Opaque background color (white).
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Freehand stroke settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    /// Stroke color as RGB.
    pub color: [u8; 3],
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for Brush {
    fn default() -> Self {
        // Dark slate, the default pen of the drawing board.
        Self {
            color: [30, 41, 59],
            width: 3.0,
        }
    }
}

/// An opaque-backed RGB raster with a backdrop layer and a stroke layer.
#[derive(Debug, Clone)]
pub struct DrawingCanvas {
    /// Background plus backdrop still, without strokes.
    base: RgbImage,
    /// Base plus freehand strokes; the layer that gets committed.
    work: RgbImage,
    brush: Brush,
    stroke_cursor: Option<Point>,
    stroked: bool,
    has_backdrop: bool,
}

impl DrawingCanvas {
    /// Creates a blank canvas filled with the opaque background.
    pub fn new(width: u32, height: u32) -> Self {
        let base = RgbImage::from_pixel(width.max(1), height.max(1), Rgb(BACKGROUND));
        Self {
            work: base.clone(),
            base,
            brush: Brush::default(),
            stroke_cursor: None,
            stroked: false,
            has_backdrop: false,
        }
    }

    /// Canvas dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.work.dimensions()
    }

    /// True if the canvas was never stroked and no still was installed.
    pub fn is_blank(&self) -> bool {
        !self.stroked && !self.has_backdrop
    }

    /// Starts a freehand stroke at `at` with the given brush.
    pub fn begin_stroke(&mut self, at: Point, brush: Brush) {
        self.brush = brush;
        self.stamp(at, brush.color, brush.width / 2.0);
        self.stroke_cursor = Some(at);
        self.stroked = true;
    }

    /// Extends the current stroke to `to`.
    ///
    /// Without a preceding `begin_stroke` the point starts a new stroke with
    /// the current brush.
    pub fn stroke_to(&mut self, to: Point) {
        let from = match self.stroke_cursor {
            Some(point) => point,
            None => {
                self.begin_stroke(to, self.brush);
                return;
            }
        };
        self.line(from, to, self.brush.color, self.brush.width / 2.0);
        self.stroke_cursor = Some(to);
        self.stroked = true;
    }

    /// Ends the current stroke.
    pub fn end_stroke(&mut self) {
        self.stroke_cursor = None;
    }

    /// Paints a background-colored disc over the stroke layer.
    pub fn erase_at(&mut self, at: Point, radius: f32) {
        self.stamp(at, BACKGROUND, radius.max(0.5));
        self.stroke_cursor = None;
    }

    /// Resets strokes and backdrop to the opaque background.
    pub fn clear(&mut self) {
        let (width, height) = self.work.dimensions();
        self.base = RgbImage::from_pixel(width, height, Rgb(BACKGROUND));
        self.work = self.base.clone();
        self.stroke_cursor = None;
        self.stroked = false;
        self.has_backdrop = false;
    }

    /// Discards uncommitted freehand strokes, keeping the backdrop.
    pub fn discard_strokes(&mut self) {
        self.work = self.base.clone();
        self.stroke_cursor = None;
        self.stroked = false;
    }

    /// Installs a still as the backdrop, scaled to fit the canvas bounds
    /// preserving aspect ratio and centered.
    ///
    /// Replaces any previous backdrop and discards strokes drawn over it.
    /// The placement is deterministic given (source dimensions, canvas
    /// dimensions).
    pub fn set_backdrop(&mut self, still: &DynamicImage) {
        let source = still.to_rgb8();
        let (src_w, src_h) = source.dimensions();
        let (canvas_w, canvas_h) = self.work.dimensions();
        let (target_w, target_h, offset_x, offset_y) = fit_rect(src_w, src_h, canvas_w, canvas_h);

        let mut base = RgbImage::from_pixel(canvas_w, canvas_h, Rgb(BACKGROUND));
        let scaled = image::imageops::resize(
            &source,
            target_w.max(1),
            target_h.max(1),
            FilterType::Triangle,
        );
        image::imageops::overlay(&mut base, &scaled, i64::from(offset_x), i64::from(offset_y));

        self.work = base.clone();
        self.base = base;
        self.stroke_cursor = None;
        self.stroked = false;
        self.has_backdrop = true;
    }

    /// Encodes the flat raster as PNG.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCanvas` when nothing was ever drawn or installed.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        if self.is_blank() {
            return Err(SketchError::EmptyCanvas);
        }
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(self.work.clone())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }

    fn line(&mut self, from: Point, to: Point, color: [u8; 3], radius: f32) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(
                Point::new(from.x + dx * t, from.y + dy * t),
                color,
                radius,
            );
        }
    }

    fn stamp(&mut self, center: Point, color: [u8; 3], radius: f32) {
        let radius = radius.max(0.5);
        let (width, height) = self.work.dimensions();
        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let max_x = (center.x + radius).ceil().min(width as f32 - 1.0) as u32;
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_y = (center.y + radius).ceil().min(height as f32 - 1.0) as u32;
        if center.x + radius < 0.0 || center.y + radius < 0.0 {
            return;
        }
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 - center.x;
                let dy = y as f32 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    self.work.put_pixel(x, y, Rgb(color));
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.work.get_pixel(x, y).0
    }
}

/// Computes the scale-to-fit placement of a source raster inside canvas
/// bounds: scaled dimensions plus the centering offset.
fn fit_rect(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (0, 0, 0, 0);
    }
    let ratio = (dst_w as f64 / src_w as f64).min(dst_h as f64 / src_h as f64);
    let target_w = ((src_w as f64) * ratio).floor() as u32;
    let target_h = ((src_h as f64) * ratio).floor() as u32;
    let offset_x = (dst_w.saturating_sub(target_w)) / 2;
    let offset_y = (dst_h.saturating_sub(target_h)) / 2;
    (target_w, target_h, offset_x, offset_y)
}
