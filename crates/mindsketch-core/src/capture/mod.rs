//! Multi-modal image capture.
//!
//! One capture surface serves one drawing stage and produces a single
//! rasterized still per invocation, from one of three modalities: freehand
//! drawing, file import, or a live camera still.
//!
//! # Module Structure
//!
//! - `still`: committed still types (`CapturedImage`, `Modality`)
//! - `canvas`: the opaque-backed raster (`DrawingCanvas`, `Brush`, `Point`)
//! - `camera`: the device seam (`CameraDevice`)
//! - `surface`: modality management and commit (`CaptureSurface`)

mod camera;
mod canvas;
mod still;
mod surface;

// Re-export public API
pub use camera::CameraDevice;
pub use canvas::{BACKGROUND, Brush, DrawingCanvas, Point};
pub use still::{CapturedImage, Modality};
pub use surface::CaptureSurface;
