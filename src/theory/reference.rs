//! Theory reference dataset.
//!
//! A small read-only lookup table loaded once at startup: for each of the 12
//! note classes, the pixel coordinate of its key on the keyboard graphic and
//! the image-file identifier used for the pressed-key overlay. The dataset is
//! optional: a missing file degrades rendering to flat-color overlays but
//! never crashes the app.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reference data mapping note classes (0-11) to rendering information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TheoryReference {
    /// Within-octave pixel coordinate for each note class.
    #[serde(default)]
    pub coordinates: Vec<f32>,
    /// Image-file identifier for each note class (e.g. "c.png", "cs.png").
    #[serde(default)]
    pub key_images: Vec<String>,
}

impl TheoryReference {
    /// Dataset matching the compiled-in keyboard layout.
    #[cfg(test)]
    pub(crate) fn builtin() -> Self {
        use crate::theory::note::NOTE_OFFSETS;

        let images = [
            "c.png", "cs.png", "d.png", "ds.png", "e.png", "f.png", "fs.png", "g.png", "gs.png",
            "a.png", "as.png", "b.png",
        ];
        Self {
            coordinates: NOTE_OFFSETS.to_vec(),
            key_images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// True when no usable data was loaded.
    pub fn is_empty(&self) -> bool {
        self.coordinates.len() < 12 || self.key_images.len() < 12
    }

    /// Pixel coordinate for a note class, if the dataset carries one.
    pub fn coordinate(&self, note_class: u8) -> Option<f32> {
        self.coordinates.get((note_class % 12) as usize).copied()
    }

    /// Overlay image name for a pressed key of the given color,
    /// e.g. `key_green_c.png`.
    pub fn key_image(&self, note_class: u8, color: &str) -> Option<String> {
        self.key_images
            .get((note_class % 12) as usize)
            .map(|stem| format!("key_{}_{}", color, stem))
    }
}

/// Error type for reference-data loading.
#[derive(Debug)]
pub enum ReferenceError {
    /// The dataset file does not exist.
    NotFound(std::path::PathBuf),
    /// File I/O error other than not-found.
    Io(std::io::Error),
    /// The file exists but is not valid JSON for this format.
    Malformed(serde_json::Error),
}

impl std::fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "reference data not found: {}", path.display()),
            Self::Io(e) => write!(f, "reference data read error: {}", e),
            Self::Malformed(e) => write!(f, "reference data malformed: {}", e),
        }
    }
}

impl std::error::Error for ReferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ReferenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err)
    }
}

/// Load the reference dataset from a JSON file.
pub fn load_from_file(path: &Path) -> Result<TheoryReference, ReferenceError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReferenceError::NotFound(path.to_path_buf())
        } else {
            ReferenceError::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Load the reference dataset, falling back to an empty dataset when the
/// file is absent or unreadable. Rendering degrades to flat-color key
/// overlays; nothing crashes.
pub fn load_or_default(path: &Path) -> TheoryReference {
    match load_from_file(path) {
        Ok(reference) => reference,
        Err(ReferenceError::NotFound(_)) => {
            log::warn!(
                "reference data missing at {}, using empty dataset",
                path.display()
            );
            TheoryReference::default()
        }
        Err(e) => {
            log::warn!("failed to load reference data: {}", e);
            TheoryReference::default()
        }
    }
}
