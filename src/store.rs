//! Annotation store: the bar and staff collections for one image plus the
//! interactive drawing state machine.
//!
//! Points handed to the store are in source-image space. Converting device
//! coordinates is the caller's job (see [`DisplayScale::to_source`]).

use log::{debug, warn};

use crate::constants::{DEFAULT_MIN_BOX_SIZE, MIN_BOX_SIZE_FLOOR};
use crate::error::Result;
use crate::geometry::{smallest_enclosing_index, span_from_origin};
use crate::model::{BoxKind, Point, Rect};
use crate::zoom::{DisplayScale, ImageView, Zoomer};

/// Which box, if any, is under interactive mutation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// A fresh box is being dragged out from `origin`.
    Drawing {
        origin: Point,
        kind: BoxKind,
        target: usize,
    },
    /// An existing box is being resized; `origin` is its upper-left corner.
    Resizing {
        origin: Point,
        kind: BoxKind,
        target: usize,
    },
}

impl Interaction {
    fn live(&self) -> Option<(Point, BoxKind, usize)> {
        match *self {
            Interaction::Idle => None,
            Interaction::Drawing {
                origin,
                kind,
                target,
            }
            | Interaction::Resizing {
                origin,
                kind,
                target,
            } => Some((origin, kind, target)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    bars: Vec<Rect>,
    staves: Vec<Rect>,
    mode: BoxKind,
    interaction: Interaction,
    min_box_size: f64,
    scale: DisplayScale,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_BOX_SIZE)
    }
}

impl AnnotationStore {
    pub fn new(min_box_size: f64) -> Self {
        Self {
            bars: Vec::new(),
            staves: Vec::new(),
            mode: BoxKind::Bar,
            interaction: Interaction::Idle,
            min_box_size: min_box_size.max(MIN_BOX_SIZE_FLOOR),
            scale: DisplayScale::default(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────

    pub fn bars(&self) -> &[Rect] {
        &self.bars
    }

    pub fn staves(&self) -> &[Rect] {
        &self.staves
    }

    pub fn rects(&self, kind: BoxKind) -> &[Rect] {
        match kind {
            BoxKind::Bar => &self.bars,
            BoxKind::Staff => &self.staves,
        }
    }

    fn rects_mut(&mut self, kind: BoxKind) -> &mut Vec<Rect> {
        match kind {
            BoxKind::Bar => &mut self.bars,
            BoxKind::Staff => &mut self.staves,
        }
    }

    /// Both collections at once, for numbering.
    pub(crate) fn split_mut(&mut self) -> (&mut Vec<Rect>, &mut Vec<Rect>) {
        (&mut self.bars, &mut self.staves)
    }

    pub fn mode(&self) -> BoxKind {
        self.mode
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// The box currently being drawn or resized.
    pub fn live_rect(&self) -> Option<&Rect> {
        let (_, kind, target) = self.interaction.live()?;
        self.rects(kind).get(target)
    }

    pub fn min_box_size(&self) -> f64 {
        self.min_box_size
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    /// Add a finished box to a collection.
    pub fn push(&mut self, kind: BoxKind, rect: Rect) {
        self.rects_mut(kind).push(rect);
    }

    pub fn extend(&mut self, kind: BoxKind, rects: impl IntoIterator<Item = Rect>) {
        self.rects_mut(kind).extend(rects);
    }

    // ─── Mouse interaction ───────────────────────────────────────────

    /// Mouse press. Without shift a new zero-size box starts at `point`;
    /// with shift the smallest box of the active kind under `point` is
    /// picked up for resizing. Returns whether an interaction started.
    pub fn begin(&mut self, point: Point, shift: bool) -> bool {
        if self.interaction != Interaction::Idle {
            debug!("press ignored, interaction already live");
            return false;
        }
        let kind = self.mode;
        if shift {
            let Some(target) = smallest_enclosing_index(self.rects(kind), point) else {
                debug!("shift-press at ({}, {}) hit no {} box", point.x, point.y, kind.label());
                return false;
            };
            let origin = self.rects(kind)[target].position;
            self.interaction = Interaction::Resizing {
                origin,
                kind,
                target,
            };
            debug!("resizing {} box {target}", kind.label());
        } else {
            let rects = self.rects_mut(kind);
            rects.push(Rect::new(point.x, point.y, 0.0, 0.0));
            let target = rects.len() - 1;
            self.interaction = Interaction::Drawing {
                origin: point,
                kind,
                target,
            };
            debug!("drawing new {} box {target}", kind.label());
        }
        true
    }

    /// Mouse motion: reshape the live box to span origin → `point`.
    pub fn update(&mut self, point: Point) -> bool {
        let Some((origin, kind, target)) = self.interaction.live() else {
            return false;
        };
        let min = self.effective_min_size();
        if let Some(rect) = self.rects_mut(kind).get_mut(target) {
            let spanned = span_from_origin(origin, point, min);
            rect.position = spanned.position;
            rect.size = spanned.size;
            true
        } else {
            self.interaction = Interaction::Idle;
            false
        }
    }

    /// Mouse release: final reshape, then back to idle.
    pub fn end(&mut self, point: Point) -> bool {
        let updated = self.update(point);
        self.interaction = Interaction::Idle;
        updated
    }

    /// Drop the live interaction. A box still being drawn is removed; a box
    /// being resized keeps its current shape.
    pub fn cancel(&mut self) {
        if let Interaction::Drawing { kind, target, .. } = self.interaction {
            let rects = self.rects_mut(kind);
            if target < rects.len() {
                rects.remove(target);
                debug!("discarded unfinished {} box {target}", kind.label());
            }
        }
        self.interaction = Interaction::Idle;
    }

    /// Remove the smallest active-kind box under `point`.
    pub fn delete_at(&mut self, point: Point) -> Option<Rect> {
        self.cancel();
        let kind = self.mode;
        let Some(index) = smallest_enclosing_index(self.rects(kind), point) else {
            warn!("nothing beneath ({}, {})", point.x, point.y);
            return None;
        };
        Some(self.rects_mut(kind).remove(index))
    }

    /// Remove every box of the active kind. Returns how many were removed.
    pub fn clear_active(&mut self) -> usize {
        self.cancel();
        let kind = self.mode;
        let rects = self.rects_mut(kind);
        let removed = rects.len();
        rects.clear();
        removed
    }

    /// Remove both collections, e.g. when a new image is opened.
    pub fn clear_all(&mut self) {
        self.cancel();
        self.bars.clear();
        self.staves.clear();
    }

    pub fn toggle_mode(&mut self) -> BoxKind {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn set_mode(&mut self, mode: BoxKind) {
        self.mode = mode;
    }

    // ─── Minimum box size ────────────────────────────────────────────

    pub fn increase_min_box_size(&mut self) -> f64 {
        self.min_box_size += 1.0;
        self.min_box_size
    }

    /// Decrease by one. Returns `None` when already at the floor.
    pub fn decrease_min_box_size(&mut self) -> Option<f64> {
        if self.min_box_size - 1.0 < MIN_BOX_SIZE_FLOOR {
            warn!("minimum box size already at {}", self.min_box_size);
            return None;
        }
        self.min_box_size -= 1.0;
        Some(self.min_box_size)
    }

    /// The minimum box size is measured in device pixels; convert it to
    /// source units for the current zoom.
    fn effective_min_size(&self) -> f64 {
        self.min_box_size / self.scale.sx.max(self.scale.sy)
    }

    // ─── Display zoom ────────────────────────────────────────────────

    /// Multiply the display scale. On error the scale is unchanged.
    pub fn zoom(&mut self, factor: f64) -> Result<DisplayScale> {
        self.scale.zoom(factor)?;
        debug!("display scale now ({}, {})", self.scale.sx, self.scale.sy);
        Ok(self.scale)
    }

    pub fn reset_zoom(&mut self) {
        self.scale = DisplayScale::default();
    }

    pub fn to_source(&self, device: Point) -> Point {
        self.scale.to_source(device)
    }

    /// Boxes of one kind in device space, for painting.
    pub fn projected(&self, kind: BoxKind) -> Vec<Rect> {
        self.rects(kind).iter().map(|r| self.scale.project(r)).collect()
    }

    /// Extent of the displayed bitmap at the current zoom.
    pub fn displayed_image(&self, original: ImageView) -> Result<ImageView> {
        let mut view = original;
        Zoomer::capture(&original).zoom(&mut view, self.scale.sx)?;
        Ok(view)
    }
}
