//! Geometry queries over collections of rectangles: area ordering,
//! click-to-select search, containment and bounding boxes.

use log::debug;

use crate::error::{GtruthError, Result};
use crate::model::{Point, Rect};

/// Rectangles ordered by increasing area. Equal areas keep input order.
pub fn sort_by_area(rects: &[Rect]) -> Vec<&Rect> {
    let mut sorted: Vec<&Rect> = rects.iter().collect();
    // sort_by is stable, so ties stay in insertion order
    sorted.sort_by(|a, b| a.area().total_cmp(&b.area()));
    sorted
}

/// Smallest rectangle enclosing `point`, edges included.
///
/// `sorted` must be in increasing area order (see [`sort_by_area`]). The
/// scan runs from the largest rectangle down and keeps overwriting the
/// match, so the last hit is the smallest.
pub fn find_smallest_enclosing_rect<'a>(sorted: &[&'a Rect], point: Point) -> Option<&'a Rect> {
    let mut current = None;
    for rect in sorted.iter().rev() {
        if rect.contains(point) {
            current = Some(*rect);
        }
    }
    current
}

/// Index into `rects` of the smallest rectangle enclosing `point`.
pub fn smallest_enclosing_index(rects: &[Rect], point: Point) -> Option<usize> {
    let sorted = sort_by_area(rects);
    let found = find_smallest_enclosing_rect(&sorted, point)?;
    let index = rects.iter().position(|r| std::ptr::eq(r, found));
    debug!("smallest box under ({}, {}): {:?}", point.x, point.y, index);
    index
}

/// Indices of every candidate lying entirely within `container`, ordered by
/// upper-left x.
pub fn rects_in_bounds(container: &Rect, candidates: &[Rect]) -> Vec<usize> {
    let mut inside: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, r)| container.encloses(r))
        .map(|(i, _)| i)
        .collect();
    inside.sort_by(|&a, &b| {
        candidates[a]
            .position
            .x
            .total_cmp(&candidates[b].position.x)
    });
    inside
}

/// The smallest axis-aligned rectangle covering every input rectangle.
pub fn bounding_rect<'a, I>(rects: I) -> Result<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut iter = rects.into_iter();
    let first = iter.next().ok_or(GtruthError::EmptyInput)?;

    let (mut x0, mut y0) = (first.position.x, first.position.y);
    let (mut x1, mut y1) = (first.right(), first.bottom());
    for r in iter {
        x0 = x0.min(r.position.x);
        y0 = y0.min(r.position.y);
        x1 = x1.max(r.right());
        y1 = y1.max(r.bottom());
    }

    Ok(Rect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Box spanned by `origin` and `point`, whichever way the drag went.
///
/// Each dimension is raised to at least `min_size`; the corner at `origin`
/// stays put, so a box dragged up or left grows away from the origin.
pub fn span_from_origin(origin: Point, point: Point, min_size: f64) -> Rect {
    let (x, width) = span_axis(origin.x, point.x, min_size);
    let (y, height) = span_axis(origin.y, point.y, min_size);
    Rect::new(x, y, width, height)
}

fn span_axis(origin: f64, to: f64, min_size: f64) -> (f64, f64) {
    let extent = (to - origin).abs();
    if extent >= min_size {
        (origin.min(to), extent)
    } else if to < origin {
        (origin - min_size, min_size)
    } else {
        (origin, min_size)
    }
}
