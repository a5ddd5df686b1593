//! Data model for the annotation boxes drawn over a scanned score.
//!
//! Coordinates are in source-image pixels with the origin at the upper-left
//! corner and y growing downwards.

use serde::{Deserialize, Serialize};

/// A point in source-image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Width and height of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<(f64, f64)> for Size {
    fn from((width, height): (f64, f64)) -> Self {
        Self { width, height }
    }
}

/// Which collection a box belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoxKind {
    /// Box bounding one measure.
    #[default]
    Bar,
    /// Box bounding one staff-system segment.
    Staff,
}

impl BoxKind {
    pub fn toggled(self) -> Self {
        match self {
            BoxKind::Bar => BoxKind::Staff,
            BoxKind::Staff => BoxKind::Bar,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BoxKind::Bar => "bar",
            BoxKind::Staff => "staff",
        }
    }
}

/// An axis-aligned rectangle with an optional identifying number.
///
/// `children` holds indices into the bar collection a staff was matched
/// against. It is scratch state filled during numbering and is not valid
/// after any geometry change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
    /// Assigned number; `None` until numbering runs.
    pub number: Option<u32>,
    #[serde(skip)]
    pub children: Vec<usize>,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Point::new(x, y),
            size: Size::new(width, height),
            number: None,
            children: Vec::new(),
        }
    }

    /// Build a rectangle from its upper-left and lower-right corners.
    pub fn from_corners(ulx: f64, uly: f64, lrx: f64, lry: f64) -> Self {
        Self::new(ulx, uly, lrx - ulx, lry - uly)
    }

    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: impl Into<Point>) {
        self.position = position.into();
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: impl Into<Size>) {
        self.size = size.into();
    }

    /// `(x, y, width, height)`
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        (
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    pub fn area(&self) -> f64 {
        self.size.width * self.size.height
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    pub fn set_number(&mut self, number: Option<u32>) {
        self.number = number;
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn set_children(&mut self, children: Vec<usize>) {
        self.children = children;
    }

    /// Fill `children` with every candidate lying fully inside this box.
    pub fn find_children(&mut self, candidates: &[Rect]) {
        self.children = crate::geometry::rects_in_bounds(self, candidates);
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Edge-inclusive point test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.y >= self.position.y
            && point.x <= self.right()
            && point.y <= self.bottom()
    }

    /// Whether `other` lies entirely inside this box, edges included.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.position.x >= self.position.x
            && other.right() <= self.right()
            && other.position.y >= self.position.y
            && other.bottom() <= self.bottom()
    }
}
