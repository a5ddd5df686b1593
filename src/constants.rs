//! Fixed strings and defaults.

// ── Interaction ─────────────────────────────────────────────────────
pub const DEFAULT_MIN_BOX_SIZE: f64 = 20.0; // device pixels
pub const MIN_BOX_SIZE_FLOOR: f64 = 1.0;
pub const ZOOM_IN_STEP: f64 = 1.1;
pub const ZOOM_OUT_STEP: f64 = 0.9;

// ── Scans ───────────────────────────────────────────────────────────
pub const DEFAULT_DPI: f64 = 72.0;
pub const TIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];
pub const MEI_EXTENSION: &str = "mei";
pub const NOTES_EXTENSION: &str = "txt";
pub const SAVE_NAME_SUFFIX: &str = "_boxes.mei";

// ── MEI header ──────────────────────────────────────────────────────
pub const MEI_NAMESPACE: &str = "http://www.music-encoding.org/ns/mei";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const MEI_VERSION: &str = "2013";
pub const CORP_NAME: &str = "Distributed Digital Music Archives and Libraries Lab (DDMAL)";
pub const APP_NAME: &str = "gtruth_write_mei";
pub const APP_VERSION: &str = "0.1";
pub const APP_LINK: &str = "https://github.com/DDMAL/barlineFinder";

// ── Shell text ──────────────────────────────────────────────────────
pub const ABOUT_TEXT: &str = "This is the ground truth evaluation system for the barline finder.\n\n\
Draw boxes around the bars and staves of a scanned score and save them as MEI.";

pub const HELP_TEXT: &str = "\
To open a picture to draw boxes upon, go to File->Open and select a TIFF image.

To save the boxes you have drawn go to File->Save and choose a file path. A \
file name based on the image name is suggested.

To draw a box, click and hold the left mouse button, then release it once the \
box has the size you want.

To delete a box, right-click on it. If several boxes are beneath the cursor, \
the smallest is deleted.

To resize a box, hold down shift, then click and drag. Only the lower right \
corner moves; to change any other corner, delete the box and draw it again.

There are two kinds of boxes: bar boxes (red) and staff boxes (green). Toggle \
between them with File->(Bar mode | Staff mode). Delete and Clear only affect \
the kind of box of the current mode.

A minimum box size keeps you from saving stray boxes. Adjust it with Increase \
minimum and Decrease minimum.

On saving you may be warned that some measures have not been numbered. This \
usually means a bar box is not inside any staff box. Go back and make sure \
every bar box lies within a staff box to get an accurate MEI file.

The notes text is saved next to the MEI file, with the extension .txt.";
