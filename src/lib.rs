//! gtruth: bar and staff annotation engine for scanned music scores.
//!
//! Boxes are drawn around the bars (measures) and staves of a TIFF scan.
//! On export every bar is matched to the staff box enclosing it, bars are
//! numbered top-to-bottom and left-to-right, and the result is written as
//! an MEI document with one zone/measure pair per bar.
//!
//! # Example
//! ```no_run
//! use gtruth::{export_file, Rect, Settings};
//!
//! let bars = vec![Rect::new(10.0, 10.0, 40.0, 80.0), Rect::new(50.0, 10.0, 40.0, 80.0)];
//! let staves = vec![Rect::new(0.0, 0.0, 200.0, 100.0)];
//! let report = export_file("scan.tif", &bars, &staves, "out.mei", "", &Settings::default(), false)
//!     .unwrap();
//! println!("{} measures written to {}", report.measures, report.mei_path.display());
//! ```

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod geometry;
pub mod mei;
pub mod model;
pub mod numbering;
pub mod parser;
pub mod scan;
pub mod store;
pub mod zoom;

use std::path::Path;

pub use app::{Application, Command, Outcome};
pub use config::Settings;
pub use error::{GtruthError, Result};
pub use export::{build_export, export_to_file, ExportPrompt, ExportReport, Lenient, Strict};
pub use geometry::{
    bounding_rect, find_smallest_enclosing_rect, rects_in_bounds, sort_by_area,
};
pub use mei::{MeiDocument, MeiElement};
pub use model::*;
pub use numbering::{number_measures, Numbering, NumberingWarning};
pub use parser::{parse_mei, parse_mei_file};
pub use scan::{read_image_info, ImageInfo};
pub use store::{AnnotationStore, Interaction};
pub use zoom::{apply_zoom, DisplayScale, Zoomable, Zoomer};

/// Number `bars` against `staves` and write the MEI file for the scan at
/// `image_path`, plus its notes file.
///
/// With `force` unset, any bar outside every staff box aborts the export.
pub fn export_file<P: AsRef<Path>, Q: AsRef<Path>>(
    image_path: P,
    bars: &[Rect],
    staves: &[Rect],
    mei_path: Q,
    notes: &str,
    settings: &Settings,
    force: bool,
) -> Result<ExportReport> {
    let info = read_image_info(image_path, settings.default_dpi)?;

    let mut store = AnnotationStore::new(settings.min_box_size);
    store.extend(BoxKind::Bar, bars.iter().cloned());
    store.extend(BoxKind::Staff, staves.iter().cloned());

    let mut prompt = |_: &[usize]| force;
    export_to_file(
        &mut store,
        Some(&info),
        settings,
        &mut prompt,
        mei_path.as_ref(),
        notes,
    )
}

/// Convert rectangles to a JSON string, e.g. for printing loaded boxes.
pub fn rects_to_json(rects: &[Rect]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rects)?)
}
