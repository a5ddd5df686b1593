//! Headless application shell.
//!
//! Holds everything a window would: the loaded scan, the annotation store,
//! the notes text and a status line. A GUI toolkit only has to forward
//! mouse events in device coordinates and map its menu entries onto
//! [`Command`]s.

use std::path::Path;

use log::{debug, info, warn};

use crate::config::Settings;
use crate::constants::{ABOUT_TEXT, HELP_TEXT};
use crate::error::{GtruthError, Result};
use crate::export::{build_export, write_export, ExportPrompt, ExportReport};
use crate::model::{BoxKind, Point};
use crate::parser::parse_mei_file;
use crate::scan::{open_scan, suggested_save_name, LoadedImage};
use crate::store::{AnnotationStore, Interaction};
use crate::zoom::ImageView;

/// Menu commands that take no file argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ClearActive,
    ToggleMode,
    ZoomIn,
    ZoomOut,
    IncreaseMinBox,
    DecreaseMinBox,
    Help,
    About,
    Exit,
}

/// What the window should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Repaint; the status line may have changed.
    Redraw,
    /// Show a text dialog.
    Show { title: &'static str, text: &'static str },
    Quit,
}

pub struct Application {
    settings: Settings,
    store: AnnotationStore,
    image: Option<LoadedImage>,
    notes: String,
    status: String,
}

impl Default for Application {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Application {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: AnnotationStore::new(settings.min_box_size),
            settings,
            image: None,
            notes: String::new(),
            status: String::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Menu label for the mode toggle: names the mode it switches to.
    pub fn mode_menu_label(&self) -> &'static str {
        match self.store.mode() {
            BoxKind::Bar => "Staff mode",
            BoxKind::Staff => "Bar mode",
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        info!("{}", self.status);
    }

    // ─── Mouse ───────────────────────────────────────────────────────

    /// Primary button pressed at a device point.
    pub fn mouse_down(&mut self, device: Point, shift: bool) {
        let point = self.store.to_source(device);
        if self.store.interaction() != Interaction::Idle {
            debug!("press at ({}, {}) ignored, a box is still being edited", point.x, point.y);
            return;
        }
        if !self.store.begin(point, shift) && shift {
            self.set_status(format!("Nothing to resize at ({}, {})", point.x, point.y));
        }
    }

    pub fn mouse_move(&mut self, device: Point) {
        let point = self.store.to_source(device);
        if self.store.update(point) {
            self.status = format!("mouse moved to ({}, {})", point.x, point.y);
        }
    }

    pub fn mouse_up(&mut self, device: Point) {
        let point = self.store.to_source(device);
        if self.store.end(point) {
            self.status = format!("mouse up at ({}, {})", point.x, point.y);
        }
    }

    /// Secondary click: delete the smallest box of the current kind.
    pub fn secondary_click(&mut self, device: Point) {
        let point = self.store.to_source(device);
        match self.store.delete_at(point) {
            Some(rect) => self.set_status(format!(
                "Deleted {} box at ({}, {})",
                self.store.mode().label(),
                rect.position.x,
                rect.position.y
            )),
            None => self.set_status(format!("Nothing beneath mouse at ({}, {})", point.x, point.y)),
        }
    }

    // ─── Menu ────────────────────────────────────────────────────────

    pub fn run(&mut self, command: Command) -> Outcome {
        match command {
            Command::ClearActive => {
                let removed = self.store.clear_active();
                self.set_status(format!(
                    "Cleared {removed} {} box(es)",
                    self.store.mode().label()
                ));
            }
            Command::ToggleMode => {
                let mode = self.store.toggle_mode();
                self.set_status(format!("Drawing {} boxes", mode.label()));
            }
            Command::ZoomIn => self.zoom(self.settings.zoom_in_step),
            Command::ZoomOut => self.zoom(self.settings.zoom_out_step),
            Command::IncreaseMinBox => {
                let size = self.store.increase_min_box_size();
                self.set_status(format!("Increased minimum box size to {size}."));
            }
            Command::DecreaseMinBox => match self.store.decrease_min_box_size() {
                Some(size) => self.set_status(format!("Decreased minimum box size to {size}.")),
                None => self.set_status(format!(
                    "Minimum box size at minimum: {}, cannot decrease.",
                    self.store.min_box_size()
                )),
            },
            Command::Help => {
                return Outcome::Show {
                    title: "How to use Gtruth",
                    text: HELP_TEXT,
                }
            }
            Command::About => {
                return Outcome::Show {
                    title: "About Gtruth",
                    text: ABOUT_TEXT,
                }
            }
            Command::Exit => return Outcome::Quit,
        }
        Outcome::Redraw
    }

    fn zoom(&mut self, factor: f64) {
        match self.store.zoom(factor) {
            Ok(scale) => self.set_status(format!("Zoom {:.0}%", scale.sx * 100.0)),
            Err(e) => {
                warn!("{e}");
                self.set_status(format!("Cannot zoom: {e}"));
            }
        }
    }

    /// Extent of the displayed bitmap at the current zoom.
    pub fn displayed_image(&self) -> Option<ImageView> {
        let image = self.image.as_ref()?;
        let original = ImageView {
            width: image.info.width as f64,
            height: image.info.height as f64,
        };
        self.store.displayed_image(original).ok()
    }

    // ─── Files ───────────────────────────────────────────────────────

    /// Open a scan. Existing boxes belong to the previous image and are
    /// dropped once the new one has loaded.
    pub fn open_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let loaded = match open_scan(path, self.settings.default_dpi, self.settings.binarize) {
            Ok(loaded) => loaded,
            Err(e) => {
                self.set_status(match &e {
                    GtruthError::WrongFileType { .. } => "Must be a TIFF file.".to_string(),
                    other => format!("Could not open image: {other}"),
                });
                return Err(e);
            }
        };
        self.set_status(format!(
            "File loaded: {}, resolution {} dpi",
            path.display(),
            loaded.info.dpi
        ));
        self.store.clear_all();
        self.store.reset_zoom();
        self.image = Some(loaded);
        Ok(())
    }

    /// Suggested file name for the save dialog.
    pub fn suggested_save_name(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|img| suggested_save_name(&img.info.path))
    }

    /// Number, confirm, build and write the MEI file plus the notes file.
    pub fn save<P: AsRef<Path>>(&mut self, mei_path: P, prompt: &mut dyn ExportPrompt) -> Result<ExportReport> {
        let mei_path = mei_path.as_ref();
        let info = self.image.as_ref().map(|img| &img.info);
        let export = match build_export(&mut self.store, info, &self.settings, prompt) {
            Ok(export) => export,
            Err(e) => {
                self.set_status(match &e {
                    GtruthError::ExportAborted(reason) if reason.contains("no image") => {
                        "No image file loaded, saving aborted.".to_string()
                    }
                    GtruthError::ExportAborted(_) => "Saving aborted.".to_string(),
                    other => format!("Saving failed: {other}"),
                });
                return Err(e);
            }
        };
        let report = match write_export(&export.document, mei_path, &self.notes) {
            Ok(report) => report,
            Err(e) => {
                warn!("{e}");
                self.set_status(format!("Saving failed: {e}"));
                return Err(e);
            }
        };
        self.set_status(format!(
            "MEI saved to: {}. Text saved to: {}",
            report.mei_path.display(),
            report.notes_path.display()
        ));
        Ok(report)
    }

    /// Load bar boxes from a saved MEI file and append them. Nothing is
    /// added if any measure is malformed.
    pub fn load_boxes<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        match parse_mei_file(path) {
            Ok(rects) => {
                let count = rects.len();
                self.store.extend(BoxKind::Bar, rects);
                self.set_status(format!("Loaded {count} bar box(es) from {}", path.display()));
                Ok(count)
            }
            Err(e) => {
                self.set_status(match &e {
                    GtruthError::WrongFileType { .. } => "Must be an MEI file.".to_string(),
                    other => format!("Could not load boxes: {other}"),
                });
                Err(e)
            }
        }
    }
}
