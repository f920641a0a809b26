//! Result archive repository trait.

use crate::analysis::AnalysisResult;
use crate::error::Result;

/// Maximum number of archived results kept; oldest entries are evicted first.
pub const ARCHIVE_CAPACITY: usize = 20;

/// Append-only, capacity-bounded log of completed analyses.
///
/// The archive is durable across process restarts within the same
/// device/profile and is independent of any in-flight test run.
#[async_trait::async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Prepends a result; entries beyond `ARCHIVE_CAPACITY` are dropped,
    /// oldest first.
    async fn save(&self, result: &AnalysisResult) -> Result<()>;

    /// Returns all archived results, most recent first.
    async fn list_all(&self) -> Result<Vec<AnalysisResult>>;

    /// Finds an archived result by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<AnalysisResult>>;

    /// Deletes by id. Deleting a non-existent id is a no-op, not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}
