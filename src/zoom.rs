//! Zoom transform: uniform scaling of position and size.
//!
//! Zoom is always computed from a stored original geometry, so applying the
//! same factor twice gives the same result instead of compounding.

use crate::error::{GtruthError, Result};
use crate::model::{Point, Rect, Size};

/// Anything that can be positioned and sized on the canvas.
pub trait Zoomable {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn set_width(&mut self, width: f64);
    fn set_height(&mut self, height: f64);
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);
}

impl Zoomable for Rect {
    fn width(&self) -> f64 {
        self.size.width
    }

    fn height(&self) -> f64 {
        self.size.height
    }

    fn set_width(&mut self, width: f64) {
        self.size.width = width;
    }

    fn set_height(&mut self, height: f64) {
        self.size.height = height;
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

/// Scale a position and size by `factor`.
pub fn apply_zoom(position: Point, size: Size, factor: f64) -> Result<(Point, Size)> {
    if factor < 0.0 || factor.is_nan() {
        return Err(GtruthError::InvalidFactor(factor));
    }
    Ok((
        Point::new(position.x * factor, position.y * factor),
        Size::new(size.width * factor, size.height * factor),
    ))
}

/// Remembers the original geometry of a [`Zoomable`] so it can be
/// re-projected at any factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoomer {
    original_position: Point,
    original_size: Size,
}

impl Zoomer {
    pub fn new(original_position: Point, original_size: Size) -> Self {
        Self {
            original_position,
            original_size,
        }
    }

    pub fn capture<Z: Zoomable + ?Sized>(target: &Z) -> Self {
        Self::new(target.position(), Size::new(target.width(), target.height()))
    }

    pub fn original_position(&self) -> Point {
        self.original_position
    }

    pub fn original_size(&self) -> Size {
        self.original_size
    }

    /// Set `target` to the original geometry scaled by `factor`. On error
    /// the target is left untouched.
    pub fn zoom<Z: Zoomable + ?Sized>(&self, target: &mut Z, factor: f64) -> Result<()> {
        let (position, size) = apply_zoom(self.original_position, self.original_size, factor)?;
        target.set_width(size.width);
        target.set_height(size.height);
        target.set_position(position);
        Ok(())
    }
}

/// The displayed bitmap: pinned at the canvas origin, only its extent scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageView {
    pub width: f64,
    pub height: f64,
}

impl Zoomable for ImageView {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn position(&self) -> Point {
        Point::default()
    }

    fn set_position(&mut self, _position: Point) {}
}

/// Cumulative display scale applied when drawing. Stored rectangles stay in
/// source pixels; only device coordinates are scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub sx: f64,
    pub sy: f64,
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self { sx: 1.0, sy: 1.0 }
    }
}

impl DisplayScale {
    /// Multiply the scale by `factor`. The scale has to stay invertible, so
    /// zero is refused along with negative factors.
    pub fn zoom(&mut self, factor: f64) -> Result<()> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(GtruthError::InvalidFactor(factor));
        }
        self.sx *= factor;
        self.sy *= factor;
        Ok(())
    }

    /// Device point → source-image point.
    pub fn to_source(&self, device: Point) -> Point {
        Point::new(device.x / self.sx, device.y / self.sy)
    }

    /// Source-image point → device point.
    pub fn to_device(&self, source: Point) -> Point {
        Point::new(source.x * self.sx, source.y * self.sy)
    }

    /// Project a stored rectangle into device space.
    pub fn project(&self, rect: &Rect) -> Rect {
        Rect::new(
            rect.position.x * self.sx,
            rect.position.y * self.sy,
            rect.size.width * self.sx,
            rect.size.height * self.sy,
        )
    }
}
