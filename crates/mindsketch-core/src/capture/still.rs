//! Committed still-image types.

use serde::{Deserialize, Serialize};

/// The input method that produced a committed still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Modality {
    /// Drawn by hand on the canvas.
    Freehand,
    /// Imported from an existing image file.
    Imported,
    /// Captured from the live camera.
    Camera,
}

/// An opaque, losslessly encoded still image produced by one stage commit.
///
/// Immutable after creation; owned by the test run for the lifetime of one
/// exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    png: Vec<u8>,
    modality: Modality,
    width: u32,
    height: u32,
}

impl CapturedImage {
    /// Wraps an already-encoded PNG payload.
    pub fn new(png: Vec<u8>, modality: Modality, width: u32, height: u32) -> Self {
        Self {
            png,
            modality,
            width,
            height,
        }
    }

    /// The PNG-encoded pixel payload.
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// The input method that produced this still.
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Pixel dimensions of the committed raster.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
