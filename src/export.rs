//! Export pipeline: number the bars, let the user veto an incomplete
//! numbering, build the MEI tree and write it next to the notes file.
//!
//! Nothing is written until every check has passed, so an aborted export
//! leaves no partial files behind.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{info, warn};

use crate::config::Settings;
use crate::constants::NOTES_EXTENSION;
use crate::error::{GtruthError, Result};
use crate::mei::{build_mei, MeiDocument};
use crate::numbering::{number_measures, Numbering};
use crate::scan::ImageInfo;
use crate::store::AnnotationStore;

/// Asked when some bars received no number. Return `true` to go on with
/// the export anyway.
pub trait ExportPrompt {
    fn proceed_with_unnumbered(&mut self, unnumbered: &[usize]) -> bool;
}

impl<F: FnMut(&[usize]) -> bool> ExportPrompt for F {
    fn proceed_with_unnumbered(&mut self, unnumbered: &[usize]) -> bool {
        self(unnumbered)
    }
}

/// Prompt that always refuses an incomplete numbering.
pub struct Strict;

impl ExportPrompt for Strict {
    fn proceed_with_unnumbered(&mut self, _unnumbered: &[usize]) -> bool {
        false
    }
}

/// Prompt that always proceeds.
pub struct Lenient;

impl ExportPrompt for Lenient {
    fn proceed_with_unnumbered(&mut self, _unnumbered: &[usize]) -> bool {
        true
    }
}

/// A built document plus the numbering it came from.
#[derive(Debug, Clone)]
pub struct Export {
    pub document: MeiDocument,
    pub numbering: Numbering,
}

/// Where an export ended up on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub mei_path: PathBuf,
    pub notes_path: PathBuf,
    pub measures: usize,
}

/// Number the store's bars and build the MEI document dated `date`.
pub fn build_export_on(
    store: &mut AnnotationStore,
    image: Option<&ImageInfo>,
    settings: &Settings,
    prompt: &mut dyn ExportPrompt,
    date: NaiveDate,
) -> Result<Export> {
    let image = image.ok_or_else(|| GtruthError::aborted("no image file loaded"))?;

    let (bars, staves) = store.split_mut();
    let numbering = number_measures(bars, staves);

    if !numbering.is_complete() {
        warn!("{} bar(s) were not numbered", numbering.unnumbered.len());
        if !prompt.proceed_with_unnumbered(&numbering.unnumbered) {
            return Err(GtruthError::aborted(format!(
                "{} bar(s) are not inside any staff box",
                numbering.unnumbered.len()
            )));
        }
    }

    let document = build_mei(bars, numbering.export_order(), image, settings, date);
    Ok(Export { document, numbering })
}

/// [`build_export_on`] dated today.
pub fn build_export(
    store: &mut AnnotationStore,
    image: Option<&ImageInfo>,
    settings: &Settings,
    prompt: &mut dyn ExportPrompt,
) -> Result<Export> {
    build_export_on(store, image, settings, prompt, Local::now().date_naive())
}

/// The notes file saved alongside an MEI file.
pub fn notes_path(mei_path: &Path) -> PathBuf {
    mei_path.with_extension(NOTES_EXTENSION)
}

/// Write the notes file, then the MEI document. If the MEI write fails the
/// fresh notes file is removed again, so a failed save leaves neither.
pub fn write_export(document: &MeiDocument, mei_path: &Path, notes: &str) -> Result<ExportReport> {
    let notes_path = notes_path(mei_path);
    std::fs::write(&notes_path, notes).map_err(|e| GtruthError::io(&notes_path, e))?;
    if let Err(e) = document.write_to_file(mei_path) {
        if let Err(cleanup) = std::fs::remove_file(&notes_path) {
            warn!("could not remove {}: {cleanup}", notes_path.display());
        }
        return Err(e);
    }
    info!("notes written to {}", notes_path.display());
    Ok(ExportReport {
        mei_path: mei_path.to_path_buf(),
        notes_path,
        measures: document.measures().len(),
    })
}

/// Build and write in one go.
pub fn export_to_file(
    store: &mut AnnotationStore,
    image: Option<&ImageInfo>,
    settings: &Settings,
    prompt: &mut dyn ExportPrompt,
    mei_path: &Path,
    notes: &str,
) -> Result<ExportReport> {
    let export = build_export(store, image, settings, prompt)?;
    write_export(&export.document, mei_path, notes)
}
