//! Settings: interaction defaults and the fixed MEI header strings.
//!
//! Every field has a default, so a settings file only needs the values it
//! changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{GtruthError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Smallest width/height a drawn box may have, in device pixels.
    pub min_box_size: f64,
    pub zoom_in_step: f64,
    pub zoom_out_step: f64,
    /// Resolution assumed when a scan carries no absolute resolution tag.
    pub default_dpi: f64,
    /// Binarize scans when they are opened.
    pub binarize: bool,
    pub corp_name: String,
    pub app_name: String,
    pub app_version: String,
    pub app_link: String,
    pub mei_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            zoom_in_step: ZOOM_IN_STEP,
            zoom_out_step: ZOOM_OUT_STEP,
            default_dpi: DEFAULT_DPI,
            binarize: true,
            corp_name: CORP_NAME.to_string(),
            app_name: APP_NAME.to_string(),
            app_version: APP_VERSION.to_string(),
            app_link: APP_LINK.to_string(),
            mei_version: MEI_VERSION.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| GtruthError::io(path, e))?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings)
    }
}
