//! Camera device abstraction.
//!
//! The live camera is an external collaborator; the engine only depends on
//! this seam. Acquisition follows a scoped discipline: `acquire` on start,
//! guaranteed `release` on stop, modality switch, or surface teardown, on
//! every exit path including errors.

use crate::error::Result;

/// Abstraction over the device camera.
#[async_trait::async_trait]
pub trait CameraDevice: Send + Sync {
    /// Acquires the camera stream.
    ///
    /// # Errors
    ///
    /// - `Permission` when device access is denied
    /// - `Internal` when the device is already held (busy)
    async fn acquire(&self) -> Result<()>;

    /// Grabs one encoded still frame from the acquired stream.
    async fn capture_still(&self) -> Result<Vec<u8>>;

    /// Releases the camera stream. Must be idempotent.
    fn release(&self);
}
