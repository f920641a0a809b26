//! Test flow use case implementation.
//!
//! This module provides the `TestFlowUseCase` which orchestrates the stage
//! sequencer, the analysis gateway, and the result archive: one analysis call
//! per completed person commit, archival as a side effect of success, and a
//! return to idle with the error retained on failure.

use mindsketch_core::analysis::AnalysisResult;
use mindsketch_core::archive::ArchiveRepository;
use mindsketch_core::capture::CapturedImage;
use mindsketch_core::error::{Result, SketchError};
use mindsketch_core::flow::{Committed, Stage, StageSequencer};
use mindsketch_core::gateway::{AnalysisGateway, ChatGateway};
use mindsketch_interaction::CounselorSession;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Use case driving one HTP exercise from capture to result.
///
/// # Responsibilities
///
/// - Advancing the sequencer as stage captures are committed
/// - Invoking the analysis gateway exactly once per person commit
/// - Archiving each successful result
/// - Surfacing failures back at the idle screen with the error retained
/// - Opening counselor sessions for the result on display
///
/// # Thread Safety
///
/// The sequencer sits behind a `tokio::sync::RwLock`; the `Analyzing` state
/// is set before the gateway await begins, so a rapid repeated commit
/// observes `Analyzing` and fails instead of re-invoking the gateway.
pub struct TestFlowUseCase {
    sequencer: RwLock<StageSequencer>,
    /// Gateway for the analysis call
    analysis_gateway: Arc<dyn AnalysisGateway>,
    /// Repository for archived results
    archive: Arc<dyn ArchiveRepository>,
}

impl TestFlowUseCase {
    /// Creates a new `TestFlowUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `analysis_gateway` - Gateway for the analysis call
    /// * `archive` - Repository for archived results
    pub fn new(
        analysis_gateway: Arc<dyn AnalysisGateway>,
        archive: Arc<dyn ArchiveRepository>,
    ) -> Self {
        Self {
            sequencer: RwLock::new(StageSequencer::new()),
            analysis_gateway,
            archive,
        }
    }

    /// The authoritative current stage.
    pub async fn stage(&self) -> Stage {
        self.sequencer.read().await.stage()
    }

    /// The error retained from the last failed analysis, if any.
    pub async fn last_error(&self) -> Option<SketchError> {
        self.sequencer.read().await.last_error().cloned()
    }

    /// The result on display, when in the result stage.
    pub async fn current_result(&self) -> Option<AnalysisResult> {
        self.sequencer.read().await.current_result().cloned()
    }

    /// Starts a fresh run at the house stage, clearing any prior state.
    pub async fn start(&self) -> Result<Stage> {
        let mut sequencer = self.sequencer.write().await;
        sequencer.start()?;
        Ok(sequencer.stage())
    }

    /// Commits the captured image for the active stage.
    ///
    /// The first two commits advance the capture stage. The person commit
    /// submits the completed run to the analysis gateway; on success the
    /// result is archived and the flow lands on the result stage, on failure
    /// the flow returns to idle with the error retained (and propagated to
    /// the caller for display).
    pub async fn commit_drawing(&self, image: CapturedImage) -> Result<Stage> {
        let committed = {
            let mut sequencer = self.sequencer.write().await;
            sequencer.commit(image)?
        };

        let run = match committed {
            Committed::Advanced(stage) => return Ok(stage),
            Committed::ReadyForAnalysis(run) => run,
        };

        // The sequencer is already in Analyzing; the gateway call happens
        // without holding the lock.
        match self.analysis_gateway.analyze(&run).await {
            Ok(result) => {
                if let Err(err) = self.archive.save(&result).await {
                    tracing::warn!(%err, "failed to archive analysis result");
                }
                let mut sequencer = self.sequencer.write().await;
                sequencer.succeed(result)?;
                Ok(sequencer.stage())
            }
            Err(err) => {
                let mut sequencer = self.sequencer.write().await;
                sequencer.fail(err.clone())?;
                Err(err)
            }
        }
    }

    /// Explicit restart back to the idle stage.
    pub async fn restart(&self) -> Result<()> {
        self.sequencer.write().await.restart()
    }

    /// Enters the result stage with an archived result, bypassing capture.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no archived entry carries the id.
    pub async fn review_archived(&self, id: &str) -> Result<AnalysisResult> {
        let result = self
            .archive
            .find_by_id(id)
            .await?
            .ok_or_else(|| SketchError::not_found("analysis result", id))?;
        self.sequencer.write().await.view_archived(result.clone())?;
        Ok(result)
    }

    /// All archived results, most recent first.
    pub async fn history(&self) -> Result<Vec<AnalysisResult>> {
        self.archive.list_all().await
    }

    /// Deletes an archived result. Deleting a missing id is a no-op.
    pub async fn delete_history(&self, id: &str) -> Result<()> {
        self.archive.delete(id).await
    }

    /// Opens a counselor session bound to the result on display.
    ///
    /// # Errors
    ///
    /// Fails when no result is on display; the counselor is never invokable
    /// without a bound result.
    pub async fn open_counselor(&self, gateway: Arc<dyn ChatGateway>) -> Result<CounselorSession> {
        let result = self
            .current_result()
            .await
            .ok_or_else(|| SketchError::internal("no analysis result on display"))?;
        Ok(CounselorSession::open(result, gateway))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindsketch_core::analysis::{AnalysisReport, PersonalityTrait};
    use mindsketch_core::capture::Modality;
    use mindsketch_core::flow::TestRun;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn image(tag: u8) -> CapturedImage {
        CapturedImage::new(vec![tag], Modality::Freehand, 4, 4)
    }

    fn upstream_report() -> AnalysisReport {
        AnalysisReport {
            summary: "요약".to_string(),
            personality_traits: vec![PersonalityTrait {
                trait_name: "개방성".to_string(),
                score: 72.0,
                description: "desc".to_string(),
            }],
            emotional_state: "평온".to_string(),
            advice: "조언".to_string(),
            key_insights: vec!["통찰".to_string()],
        }
    }

    enum GatewayBehavior {
        Succeed,
        FailSchema,
        FailQuota,
    }

    /// Counting gateway double.
    struct MockGateway {
        behavior: GatewayBehavior,
        calls: AtomicU32,
    }

    impl MockGateway {
        fn new(behavior: GatewayBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl AnalysisGateway for MockGateway {
        async fn analyze(&self, drawings: &TestRun) -> Result<AnalysisResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            drawings.require_complete()?;
            match self.behavior {
                GatewayBehavior::Succeed => Ok(AnalysisResult::assign(upstream_report())),
                GatewayBehavior::FailSchema => {
                    Err(SketchError::schema("missing field `keyInsights`"))
                }
                GatewayBehavior::FailQuota => Err(SketchError::quota("RESOURCE_EXHAUSTED")),
            }
        }
    }

    /// In-memory archive double.
    #[derive(Default)]
    struct MockArchive {
        entries: Mutex<Vec<AnalysisResult>>,
    }

    #[async_trait::async_trait]
    impl ArchiveRepository for MockArchive {
        async fn save(&self, result: &AnalysisResult) -> Result<()> {
            self.entries.lock().unwrap().insert(0, result.clone());
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<AnalysisResult>> {
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<AnalysisResult>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|entry| entry.id == id)
                .cloned())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.entries.lock().unwrap().retain(|entry| entry.id != id);
            Ok(())
        }
    }

    fn flow(behavior: GatewayBehavior) -> (TestFlowUseCase, Arc<MockGateway>, Arc<MockArchive>) {
        let gateway = Arc::new(MockGateway::new(behavior));
        let archive = Arc::new(MockArchive::default());
        let use_case = TestFlowUseCase::new(gateway.clone(), archive.clone());
        (use_case, gateway, archive)
    }

    async fn capture_all_three(flow: &TestFlowUseCase) -> Result<Stage> {
        flow.start().await.unwrap();
        assert_eq!(flow.commit_drawing(image(1)).await.unwrap(), Stage::Tree);
        assert_eq!(flow.commit_drawing(image(2)).await.unwrap(), Stage::Person);
        flow.commit_drawing(image(3)).await
    }

    #[tokio::test]
    async fn test_full_flow_reaches_result_and_archives() {
        let (flow, gateway, archive) = flow(GatewayBehavior::Succeed);

        let stage = capture_all_three(&flow).await.unwrap();
        assert_eq!(stage, Stage::Result);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

        let result = flow.current_result().await.unwrap();
        assert_eq!(result.report, upstream_report());

        // Archived as a side effect of the success transition.
        let entries = archive.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], result);
    }

    #[tokio::test]
    async fn test_analyze_invoked_at_most_once_per_person_commit() {
        let (flow, gateway, _archive) = flow(GatewayBehavior::Succeed);
        capture_all_three(&flow).await.unwrap();

        // A rapid repeated commit finds no capture stage active.
        assert!(flow.commit_drawing(image(9)).await.is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_schema_failure_returns_to_idle_archive_unchanged() {
        let (flow, _gateway, archive) = flow(GatewayBehavior::FailSchema);

        let err = capture_all_three(&flow).await.unwrap_err();
        assert!(err.is_schema());
        assert_eq!(flow.stage().await, Stage::Idle);
        assert!(flow.last_error().await.unwrap().is_schema());
        assert!(archive.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quota_failure_is_distinct_with_distinct_guidance() {
        let (flow, _gateway, _archive) = flow(GatewayBehavior::FailQuota);

        let err = capture_all_three(&flow).await.unwrap_err();
        assert!(err.is_quota());
        let generic = SketchError::upstream(Some(500), "boom");
        assert_ne!(err.user_message(), generic.user_message());
    }

    #[tokio::test]
    async fn test_retry_after_failure_recaptures_all_stages() {
        let (flow, gateway, _archive) = flow(GatewayBehavior::FailSchema);
        capture_all_three(&flow).await.unwrap_err();

        // The run was discarded; commits start over from House.
        assert_eq!(flow.start().await.unwrap(), Stage::House);
        assert_eq!(flow.commit_drawing(image(4)).await.unwrap(), Stage::Tree);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_review_archived_bypasses_capture() {
        let (flow, _gateway, archive) = flow(GatewayBehavior::Succeed);
        let archived = AnalysisResult::assign(upstream_report());
        archive.save(&archived).await.unwrap();

        let reviewed = flow.review_archived(&archived.id).await.unwrap();
        assert_eq!(reviewed, archived);
        assert_eq!(flow.stage().await, Stage::Result);
        assert_eq!(flow.current_result().await, Some(archived));
    }

    #[tokio::test]
    async fn test_review_unknown_id_is_not_found() {
        let (flow, _gateway, _archive) = flow(GatewayBehavior::Succeed);
        assert!(flow.review_archived("missing").await.unwrap_err().is_not_found());
        assert_eq!(flow.stage().await, Stage::Idle);
    }

    #[tokio::test]
    async fn test_delete_history_is_idempotent_through_the_flow() {
        let (flow, _gateway, archive) = flow(GatewayBehavior::Succeed);
        let archived = AnalysisResult::assign(upstream_report());
        archive.save(&archived).await.unwrap();

        flow.delete_history("missing").await.unwrap();
        assert_eq!(flow.history().await.unwrap().len(), 1);
        flow.delete_history(&archived.id).await.unwrap();
        assert!(flow.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counselor_requires_a_result_on_display() {
        let (flow, _gateway, _archive) = flow(GatewayBehavior::Succeed);

        struct NoChatGateway;
        #[async_trait::async_trait]
        impl ChatGateway for NoChatGateway {
            async fn stream_turn(
                &self,
                _framing: &str,
                _history: &[mindsketch_core::conversation::ChatTurn],
                _message: &str,
            ) -> Result<mindsketch_core::gateway::ChatStream> {
                Err(SketchError::internal("not under test"))
            }
        }

        let chat: Arc<dyn ChatGateway> = Arc::new(NoChatGateway);
        assert!(flow.open_counselor(chat.clone()).await.is_err());

        capture_all_three(&flow).await.unwrap();
        let session = flow.open_counselor(chat).await.unwrap();
        assert_eq!(session.result().report, upstream_report());
    }
}
