//! Gateway traits for the external reasoning service.
//!
//! The engine consumes the service as two opaque operations: one analysis
//! call per completed test run, and one streamed chat turn per counselor
//! send. Concrete implementations live in the interaction crate; tests use
//! mock implementations of these traits.

use crate::analysis::AnalysisResult;
use crate::conversation::ChatTurn;
use crate::error::Result;
use crate::flow::TestRun;
use futures::stream::BoxStream;

/// An incremental sequence of assistant text chunks.
///
/// Chunks concatenate to the final assistant turn; an `Err` item terminates
/// the turn mid-delivery.
pub type ChatStream = BoxStream<'static, Result<String>>;

/// Packages the three captured drawings into one analysis request.
#[async_trait::async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Submits the captured drawings for interpretation.
    ///
    /// Exactly one outbound call per invocation; no automatic retry.
    ///
    /// # Errors
    ///
    /// - `MissingInput` if fewer than three drawings are populated (defensive
    ///   check; the sequencer should make this unreachable)
    /// - `Credential` for missing/invalid access credentials
    /// - `Quota` for rate/usage limits
    /// - `Schema` when the response does not parse into the result shape
    /// - `Upstream` for any other failure
    async fn analyze(&self, drawings: &TestRun) -> Result<AnalysisResult>;
}

/// Produces one streamed assistant turn per user message.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// Requests the next assistant turn.
    ///
    /// Every request carries the full prior turn history plus the system
    /// framing derived from the bound analysis result.
    async fn stream_turn(
        &self,
        framing: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<ChatStream>;
}
