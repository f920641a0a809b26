use mindsketch_application::TestFlowUseCase;
use mindsketch_core::analysis::{AnalysisReport, AnalysisResult, PersonalityTrait};
use mindsketch_core::archive::{ARCHIVE_CAPACITY, ArchiveRepository};
use mindsketch_core::capture::{CapturedImage, Modality};
use mindsketch_core::error::Result;
use mindsketch_core::flow::{Stage, TestRun};
use mindsketch_core::gateway::AnalysisGateway;
use mindsketch_infrastructure::JsonArchiveRepository;
use std::sync::Arc;
use tempfile::TempDir;

/// Gateway double returning a fresh well-formed result per call.
struct SequencedGateway;

#[async_trait::async_trait]
impl AnalysisGateway for SequencedGateway {
    async fn analyze(&self, drawings: &TestRun) -> Result<AnalysisResult> {
        drawings.require_complete()?;
        Ok(AnalysisResult::assign(AnalysisReport {
            summary: "요약".to_string(),
            personality_traits: vec![PersonalityTrait {
                trait_name: "안정성".to_string(),
                score: 64.0,
                description: "차분한 선".to_string(),
            }],
            emotional_state: "평온".to_string(),
            advice: "충분한 휴식을 취하세요.".to_string(),
            key_insights: vec!["창문이 없는 집".to_string()],
        }))
    }
}

fn image(tag: u8) -> CapturedImage {
    CapturedImage::new(vec![tag], Modality::Freehand, 4, 4)
}

async fn run_one_exercise(flow: &TestFlowUseCase) {
    flow.start().await.expect("Should start a run");
    flow.commit_drawing(image(1)).await.expect("Should commit house");
    flow.commit_drawing(image(2)).await.expect("Should commit tree");
    let stage = flow.commit_drawing(image(3)).await.expect("Should analyze");
    assert_eq!(stage, Stage::Result);
}

#[tokio::test]
async fn test_result_survives_restart_through_the_file_archive() {
    let temp_dir = TempDir::new().unwrap();
    let history_path = temp_dir.path().join("history.json");

    let first_id;
    {
        let archive = Arc::new(JsonArchiveRepository::new(&history_path).await.unwrap());
        let flow = TestFlowUseCase::new(Arc::new(SequencedGateway), archive);
        run_one_exercise(&flow).await;
        first_id = flow.current_result().await.unwrap().id;
    }

    // A fresh repository over the same file still sees the result.
    let archive = Arc::new(JsonArchiveRepository::new(&history_path).await.unwrap());
    let flow = TestFlowUseCase::new(Arc::new(SequencedGateway), archive);

    let history = flow.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, first_id);

    // And the archived entry is reviewable without re-capturing.
    let reviewed = flow.review_archived(&first_id).await.unwrap();
    assert_eq!(reviewed.report.summary, "요약");
    assert_eq!(flow.stage().await, Stage::Result);
}

#[tokio::test]
async fn test_archive_caps_at_capacity_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let archive = Arc::new(
        JsonArchiveRepository::new(temp_dir.path().join("history.json"))
            .await
            .unwrap(),
    );

    // Pre-seed one entry, then push a full capacity of newer ones.
    let oldest = AnalysisResult {
        id: "oldest".to_string(),
        date: "2024-01-01T00:00:00+00:00".to_string(),
        report: AnalysisReport {
            summary: "s".to_string(),
            personality_traits: vec![],
            emotional_state: "e".to_string(),
            advice: "a".to_string(),
            key_insights: vec![],
        },
    };
    archive.save(&oldest).await.unwrap();

    let flow = TestFlowUseCase::new(Arc::new(SequencedGateway), archive);
    for _ in 0..ARCHIVE_CAPACITY {
        run_one_exercise(&flow).await;
        flow.restart().await.unwrap();
    }

    let history = flow.history().await.unwrap();
    assert_eq!(history.len(), ARCHIVE_CAPACITY);
    assert!(history.iter().all(|entry| entry.id != "oldest"));
}
