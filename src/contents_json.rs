//! Contents.json data model for an Xcode asset catalog `.appiconset`
//!
//! Only the keys Xcode writes for an iPhone app icon set are modelled.
//! Optional keys are skipped when unset so the output matches what Xcode
//! itself produces.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Root structure of a Contents.json file
#[derive(Serialize, Debug, Clone)]
pub struct ContentsFile {
    /// One entry per (file, idiom, size, scale) slot of the icon set
    pub images: Vec<ImageEntry>,

    /// Versioning and authorship information
    pub info: Info,
}

/// A single slot within the icon set
///
/// The same file may fill more than one slot, e.g. a 120px image serves both
/// 40pt@3x and 60pt@2x.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ImageEntry {
    /// The PNG file filling this slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// The device type (e.g. "iphone", "ios-marketing")
    pub idiom: String,

    /// The scale factor (e.g. "1x", "2x", "3x")
    pub scale: String,

    /// The size in points (e.g. "20x20", "60x60")
    pub size: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct Info {
    /// The format version of the asset catalog (always 1)
    pub version: u8,

    /// The tool that authored the catalog
    pub author: String,
}

impl ContentsFile {
    /// Creates an empty Contents.json structure with the specified author
    pub fn new(author: String) -> Self {
        Self {
            images: Vec::new(),
            info: Info { version: 1, author },
        }
    }

    pub fn add_image(&mut self, image: ImageEntry) {
        self.images.push(image);
    }
}

impl ImageEntry {
    /// Creates an app icon slot
    ///
    /// # Arguments
    /// * `filename` - The PNG filling the slot
    /// * `idiom` - The device idiom (e.g. "iphone")
    /// * `size` - The size in points (e.g. "60x60")
    /// * `scale` - The scale factor (e.g. "2x")
    pub fn new_app_icon(filename: &str, idiom: &str, size: &str, scale: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            idiom: idiom.to_string(),
            scale: scale.to_string(),
            size: size.to_string(),
        }
    }
}

/// Writes `Contents.json` into `dir` with the provided slots
///
/// # Errors
/// Returns an error if JSON serialization or the file write fails.
pub fn write_contents_json(dir: &Path, images: Vec<ImageEntry>) -> Result<()> {
    // Xcode's own authorship marker, so the catalog diffs cleanly when Xcode re-saves it
    let mut cf = ContentsFile::new("xcode".to_string());
    for image in images {
        cf.add_image(image);
    }
    let json = serde_json::to_string_pretty(&cf).context("Failed to serialize Contents.json")?;
    std::fs::write(dir.join("Contents.json"), json).context("Failed to write Contents.json file")
}
