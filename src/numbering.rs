//! Measure numbering: matches bar boxes to the staff boxes that enclose
//! them and numbers bars top-to-bottom, left-to-right.
//!
//! Each staff is replaced by the tight bound of its bars. Staves are
//! ordered by the top of that bound, bars within a staff by their left
//! edge, and a single counter runs across all staves.

use log::{debug, warn};

use crate::geometry::{bounding_rect, rects_in_bounds};
use crate::model::Rect;

/// Something numbering wants the user to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberingWarning {
    /// The staff box at this index encloses no bar and was skipped.
    EmptyStaff { staff_index: usize },
    /// The bar box at this index lies inside no staff box.
    UnnumberedBar { bar_index: usize },
}

/// Result of one numbering pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Numbering {
    /// Numbered staff bounds in top-to-bottom order. Each carries its
    /// number and, in `children`, its bar indices sorted left to right.
    pub staves: Vec<Rect>,
    /// Numbered bar indices in numbering order.
    pub order: Vec<usize>,
    /// Bar indices that received no number, in insertion order.
    pub unnumbered: Vec<usize>,
    pub warnings: Vec<NumberingWarning>,
}

impl Numbering {
    pub fn is_complete(&self) -> bool {
        self.unnumbered.is_empty()
    }

    /// Numbered bars followed by unnumbered ones.
    pub fn export_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().chain(self.unnumbered.iter()).copied()
    }
}

/// Number `bars` against `staves`, overwriting any earlier numbers.
pub fn number_measures(bars: &mut [Rect], staves: &[Rect]) -> Numbering {
    for bar in bars.iter_mut() {
        bar.number = None;
    }

    let mut numbering = Numbering::default();

    for (staff_index, staff) in staves.iter().enumerate() {
        let children = rects_in_bounds(staff, bars);
        let mut bound = match bounding_rect(children.iter().map(|&i| &bars[i])) {
            Ok(bound) => bound,
            Err(_) => {
                warn!("staff box {staff_index} contains no bars, skipping it");
                numbering
                    .warnings
                    .push(NumberingWarning::EmptyStaff { staff_index });
                continue;
            }
        };
        bound.set_children(children);
        numbering.staves.push(bound);
    }

    numbering
        .staves
        .sort_by(|a, b| a.position.y.total_cmp(&b.position.y));

    let mut next_bar = 1u32;
    for (i, staff) in numbering.staves.iter_mut().enumerate() {
        staff.number = Some(i as u32 + 1);
        // rects_in_bounds already ordered the children by left edge
        for &bar_index in &staff.children {
            let bar = &mut bars[bar_index];
            if bar.number.is_some() {
                // already claimed by a staff higher up the page
                continue;
            }
            bar.number = Some(next_bar);
            numbering.order.push(bar_index);
            next_bar += 1;
        }
    }

    for (bar_index, bar) in bars.iter().enumerate() {
        if bar.number.is_none() {
            warn!("bar box {bar_index} was not numbered");
            numbering.unnumbered.push(bar_index);
            numbering
                .warnings
                .push(NumberingWarning::UnnumberedBar { bar_index });
        }
    }

    debug!(
        "numbered {} bars across {} staves ({} unnumbered)",
        numbering.order.len(),
        numbering.staves.len(),
        numbering.unnumbered.len()
    );
    numbering
}
