//! Scanned score images: opening, resolution lookup and binarization.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Luma};
use log::{debug, info};
use serde::Serialize;
use tiff::decoder::{ifd::Value, Decoder};
use tiff::tags::Tag;

use crate::constants::{SAVE_NAME_SUFFIX, TIFF_EXTENSIONS};
use crate::error::{GtruthError, Result};

/// What the export needs to know about the source scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Resolution in dots per inch.
    pub dpi: f64,
}

/// An opened scan: its metadata and the preprocessed pixels shown on screen.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub info: ImageInfo,
    pub pixels: GrayImage,
}

pub fn is_tiff_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TIFF_EXTENSIONS.iter().any(|t| e.eq_ignore_ascii_case(t)))
        .unwrap_or(false)
}

fn ensure_tiff(path: &Path) -> Result<()> {
    if is_tiff_path(path) {
        Ok(())
    } else {
        Err(GtruthError::WrongFileType {
            path: path.to_path_buf(),
            expected: "TIFF",
        })
    }
}

/// Read width, height and resolution without decoding the pixels.
pub fn read_image_info<P: AsRef<Path>>(path: P, default_dpi: f64) -> Result<ImageInfo> {
    let path = path.as_ref();
    ensure_tiff(path)?;
    let file = File::open(path).map_err(|e| GtruthError::io(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (width, height) = decoder.dimensions()?;
    let dpi = read_dpi(&mut decoder)?.unwrap_or(default_dpi);
    Ok(ImageInfo {
        path: path.to_path_buf(),
        width,
        height,
        dpi,
    })
}

/// Open a scan: check the extension, decode, convert to grayscale and
/// optionally binarize.
pub fn open_scan<P: AsRef<Path>>(path: P, default_dpi: f64, binarize_pixels: bool) -> Result<LoadedImage> {
    let path = path.as_ref();
    let info = read_image_info(path, default_dpi)?;
    let decoded = image::open(path)?;
    let pixels = if binarize_pixels {
        binarize(&decoded)
    } else {
        decoded.to_luma8()
    };
    info!(
        "opened {} ({}x{}, {} dpi)",
        path.display(),
        info.width,
        info.height,
        info.dpi
    );
    Ok(LoadedImage { info, pixels })
}

/// Suggested MEI file name for a scan: `<stem>_boxes.mei`.
pub fn suggested_save_name(image_path: &Path) -> String {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    format!("{stem}{SAVE_NAME_SUFFIX}")
}

// ─── Resolution ──────────────────────────────────────────────────────

const RESOLUTION_UNIT_INCH: u16 = 2;
const RESOLUTION_UNIT_CENTIMETER: u16 = 3;
const CM_PER_INCH: f64 = 2.54;

fn read_dpi<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>> {
    let Some(resolution) = decoder.find_tag(Tag::XResolution)? else {
        return Ok(None);
    };
    // TIFF defaults the unit to inches when the tag is absent
    let unit = match decoder.find_tag(Tag::ResolutionUnit)? {
        Some(value) => value_to_f64(&value).map(|v| v as u16),
        None => Some(RESOLUTION_UNIT_INCH),
    };
    let dpi = value_to_f64(&resolution).and_then(|value| dpi_from_tag(value, unit?));
    debug!("resolution tag {resolution:?}, unit {unit:?} -> {dpi:?} dpi");
    Ok(dpi)
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(n, d) if *d != 0 => Some(*n as f64 / *d as f64),
        Value::Short(v) => Some(*v as f64),
        Value::Unsigned(v) => Some(*v as f64),
        Value::Float(v) => Some(*v as f64),
        Value::Double(v) => Some(*v),
        Value::List(values) => values.first().and_then(value_to_f64),
        _ => None,
    }
}

/// Convert a resolution tag value to dots per inch. Unit-less values carry
/// no physical size and give `None`.
fn dpi_from_tag(value: f64, unit: u16) -> Option<f64> {
    if value <= 0.0 {
        return None;
    }
    match unit {
        RESOLUTION_UNIT_INCH => Some(value),
        RESOLUTION_UNIT_CENTIMETER => Some(value * CM_PER_INCH),
        _ => None,
    }
}

// ─── Binarization ────────────────────────────────────────────────────

/// Grayscale, then threshold at the Otsu level: ink becomes 0, paper 255.
pub fn binarize(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    let threshold = otsu_threshold(&gray);
    for Luma([v]) in gray.pixels_mut() {
        *v = if *v > threshold { 255 } else { 0 };
    }
    gray
}

/// Threshold maximizing between-class variance of the gray histogram.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for Luma([v]) in gray.pixels() {
        histogram[*v as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 127;
    }
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut best = (0u8, -1.0f64);
    let mut background = 0u64;
    let mut weighted_background = 0.0;
    for (level, &count) in histogram.iter().enumerate() {
        background += count;
        if background == 0 {
            continue;
        }
        let foreground = total - background;
        if foreground == 0 {
            break;
        }
        weighted_background += level as f64 * count as f64;
        let mean_b = weighted_background / background as f64;
        let mean_f = (weighted_total - weighted_background) / foreground as f64;
        let variance = background as f64 * foreground as f64 * (mean_b - mean_f).powi(2);
        if variance > best.1 {
            best = (level as u8, variance);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_units() {
        assert_eq!(dpi_from_tag(300.0, RESOLUTION_UNIT_INCH), Some(300.0));
        assert_eq!(dpi_from_tag(100.0, RESOLUTION_UNIT_CENTIMETER), Some(254.0));
        assert_eq!(dpi_from_tag(1.0, 1), None);
        assert_eq!(dpi_from_tag(0.0, RESOLUTION_UNIT_INCH), None);
    }

    #[test]
    fn otsu_splits_two_levels() {
        let mut img = GrayImage::new(4, 1);
        for (x, v) in [(0, 20u8), (1, 30), (2, 200), (3, 220)] {
            img.put_pixel(x, 0, Luma([v]));
        }
        let t = otsu_threshold(&img);
        assert!((30..200).contains(&t), "threshold {t}");

        let bin = binarize(&DynamicImage::ImageLuma8(img));
        let values: Vec<u8> = bin.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![0, 0, 255, 255]);
    }

    #[test]
    fn tiff_extension_check() {
        assert!(is_tiff_path(Path::new("a/score.tif")));
        assert!(is_tiff_path(Path::new("score.TIFF")));
        assert!(!is_tiff_path(Path::new("score.png")));
        assert!(!is_tiff_path(Path::new("score")));
    }

    #[test]
    fn save_name_uses_stem() {
        assert_eq!(suggested_save_name(Path::new("/scans/op12.tiff")), "op12_boxes.mei");
    }
}
