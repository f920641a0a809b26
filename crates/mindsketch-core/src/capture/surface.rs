//! The multi-modal capture surface.
//!
//! One surface serves one capture stage: the user draws freehand, imports a
//! still, or photographs one, then commits. Exactly one modality is active at
//! a time; switching modality discards uncommitted freehand strokes but keeps
//! an already-installed backdrop.

use super::camera::CameraDevice;
use super::canvas::{Brush, DrawingCanvas, Point};
use super::still::{CapturedImage, Modality};
use crate::error::{Result, SketchError};
use std::sync::Arc;

/// Owns the drawing canvas plus the two alternate acquisition paths
/// (file import, live camera still). Produces one committed still per
/// invocation of [`CaptureSurface::commit`].
pub struct CaptureSurface {
    canvas: DrawingCanvas,
    camera: Arc<dyn CameraDevice>,
    camera_active: bool,
    backdrop_source: Option<Modality>,
}

impl CaptureSurface {
    /// Creates a surface with a blank canvas of the given dimensions.
    pub fn new(width: u32, height: u32, camera: Arc<dyn CameraDevice>) -> Self {
        Self {
            canvas: DrawingCanvas::new(width, height),
            camera,
            camera_active: false,
            backdrop_source: None,
        }
    }

    /// Canvas dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    /// True while the camera stream is held.
    pub fn camera_active(&self) -> bool {
        self.camera_active
    }

    /// Starts a freehand stroke. Switching into freehand releases the camera.
    pub fn begin_stroke(&mut self, at: Point, brush: Brush) {
        self.stop_camera();
        self.canvas.begin_stroke(at, brush);
    }

    /// Extends the current freehand stroke.
    pub fn stroke_to(&mut self, to: Point) {
        self.stop_camera();
        self.canvas.stroke_to(to);
    }

    /// Ends the current freehand stroke.
    pub fn end_stroke(&mut self) {
        self.canvas.end_stroke();
    }

    /// Erases a disc of the given radius.
    pub fn erase_at(&mut self, at: Point, radius: f32) {
        self.stop_camera();
        self.canvas.erase_at(at, radius);
    }

    /// Clears strokes and backdrop back to the blank canvas.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.backdrop_source = None;
    }

    /// Decodes an imported still and installs it as the canvas backdrop,
    /// scaled to fit and centered.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the bytes are not a decodable
    /// raster; the canvas is left unchanged in that case.
    pub fn import_still(&mut self, bytes: &[u8]) -> Result<()> {
        self.stop_camera();
        let still = image::load_from_memory(bytes)?;
        self.canvas.set_backdrop(&still);
        self.backdrop_source = Some(Modality::Imported);
        Ok(())
    }

    /// Acquires the camera stream and switches into camera modality.
    ///
    /// Uncommitted freehand strokes are discarded; an existing backdrop is
    /// kept. On denial the surface state is unchanged.
    ///
    /// # Errors
    ///
    /// Propagates `Permission` from the device.
    pub async fn start_camera(&mut self) -> Result<()> {
        if self.camera_active {
            return Ok(());
        }
        self.camera.acquire().await?;
        self.canvas.discard_strokes();
        self.camera_active = true;
        Ok(())
    }

    /// Grabs one still from the camera, installs it as the backdrop, and
    /// releases the camera.
    ///
    /// # Errors
    ///
    /// Fails with `Internal` when the camera is not active. Device and decode
    /// failures release the camera before propagating.
    pub async fn capture_still_from_camera(&mut self) -> Result<()> {
        if !self.camera_active {
            return Err(SketchError::internal("camera is not active"));
        }
        let bytes = match self.camera.capture_still().await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stop_camera();
                return Err(err);
            }
        };
        let still = match image::load_from_memory(&bytes) {
            Ok(still) => still,
            Err(err) => {
                self.stop_camera();
                return Err(err.into());
            }
        };
        self.canvas.set_backdrop(&still);
        self.backdrop_source = Some(Modality::Camera);
        self.stop_camera();
        Ok(())
    }

    /// Releases the camera stream. Safe to call when it is not held.
    pub fn stop_camera(&mut self) {
        if self.camera_active {
            self.camera.release();
            self.camera_active = false;
        }
    }

    /// Commits the canvas content as a flat PNG still and resets the surface
    /// for the next stage.
    ///
    /// The committed modality is the backdrop's source when a backdrop is
    /// present, `Freehand` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCanvas` when the canvas was never drawn to and no still
    /// was imported or captured.
    pub fn commit(&mut self) -> Result<CapturedImage> {
        self.stop_camera();
        let png = self.canvas.to_png()?;
        let (width, height) = self.canvas.dimensions();
        let modality = self.backdrop_source.unwrap_or(Modality::Freehand);
        self.canvas.clear();
        self.backdrop_source = None;
        Ok(CapturedImage::new(png, modality, width, height))
    }
}

impl Drop for CaptureSurface {
    fn drop(&mut self) {
        if self.camera_active {
            self.camera.release();
            tracing::debug!("camera released on capture surface teardown");
        }
    }
}
