//! MEI reader: loads bar boxes back from a previously saved MEI file.
//!
//! Every `measure` points at a `zone` through `facs="#id"`; the zone holds
//! the pixel corners. A single bad measure fails the whole load so callers
//! never apply a partial set of boxes.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use roxmltree::{Document, Node};

use crate::constants::{MEI_EXTENSION, XML_NAMESPACE};
use crate::error::{GtruthError, Result};
use crate::model::Rect;

/// Read bar boxes from an `.mei` file. Other extensions are rejected
/// before the file is read.
pub fn parse_mei_file<P: AsRef<Path>>(path: P) -> Result<Vec<Rect>> {
    let path = path.as_ref();
    let is_mei = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(MEI_EXTENSION))
        .unwrap_or(false);
    if !is_mei {
        return Err(GtruthError::WrongFileType {
            path: path.to_path_buf(),
            expected: "MEI",
        });
    }
    let xml = std::fs::read_to_string(path).map_err(|e| GtruthError::io(path, e))?;
    let rects = parse_mei(&xml)?;
    info!("loaded {} bar boxes from {}", rects.len(), path.display());
    Ok(rects)
}

/// Parse MEI text into bar rectangles, in measure document order.
pub fn parse_mei(xml: &str) -> Result<Vec<Rect>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    if root.tag_name().name() != "mei" {
        return Err(GtruthError::malformed(format!(
            "unsupported root element '{}', expected 'mei'",
            root.tag_name().name()
        )));
    }

    // Index zones by id
    let zones: HashMap<&str, Node> = root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "zone")
        .filter_map(|n| element_id(&n).map(|id| (id, n)))
        .collect();

    root.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "measure")
        .map(|measure| parse_measure(&measure, &zones))
        .collect()
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(measure: &Node, zones: &HashMap<&str, Node>) -> Result<Rect> {
    let facs = measure
        .attribute("facs")
        .ok_or_else(|| GtruthError::malformed("measure without a facs reference"))?;
    let zone_id = facs.trim().trim_start_matches('#');
    let zone = zones
        .get(zone_id)
        .ok_or_else(|| GtruthError::malformed(format!("measure refers to missing zone '{zone_id}'")))?;

    let ulx = coordinate(zone, "ulx")?;
    let uly = coordinate(zone, "uly")?;
    let lrx = coordinate(zone, "lrx")?;
    let lry = coordinate(zone, "lry")?;

    let mut rect = Rect::from_corners(ulx, uly, lrx, lry);
    if rect.size.width < 0.0 || rect.size.height < 0.0 {
        return Err(GtruthError::malformed(format!(
            "zone '{zone_id}' has its lower-right corner above or left of its upper-left corner"
        )));
    }
    rect.number = measure
        .attribute("n")
        .and_then(|n| n.trim().parse::<u32>().ok());
    Ok(rect)
}

fn coordinate(zone: &Node, name: &str) -> Result<f64> {
    let raw = zone.attribute(name).ok_or_else(|| {
        GtruthError::malformed(format!("zone '{}' is missing '{name}'", element_id(zone).unwrap_or("?")))
    })?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GtruthError::malformed(format!("'{name}' is not a number: '{raw}'")))
}

/// `xml:id`, falling back to a plain `id` attribute.
fn element_id<'a>(node: &Node<'a, '_>) -> Option<&'a str> {
    node.attribute((XML_NAMESPACE, "id"))
        .or_else(|| node.attribute("id"))
}
