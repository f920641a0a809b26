//! The sequential test-orchestration state machine.
//!
//! `Idle → House → Tree → Person → Analyzing → Result`, with
//! `Analyzing → Idle` on failure (carrying the error for display) and
//! `Result → Idle` on explicit restart. `Result` is also directly enterable
//! from an archived entry for review.
//!
//! The sequencer exposes only forward transitions plus restart and archived
//! review; `Analyzing` can never be re-entered without a fresh commit from
//! the person stage. Every logical state change is a synchronous field
//! update, atomic with respect to the single-threaded event order.

use super::run::TestRun;
use super::stage::{DrawingStage, Stage};
use crate::analysis::AnalysisResult;
use crate::capture::CapturedImage;
use crate::error::{Result, SketchError};

/// Outcome of a stage commit.
#[derive(Debug, Clone)]
pub enum Committed {
    /// The flow advanced to the next capture stage.
    Advanced(Stage),
    /// The third drawing landed; the flow entered `Analyzing` and the
    /// snapshot of the complete run is ready for the gateway.
    ReadyForAnalysis(TestRun),
}

/// Orders the three capture stages, collects one image per stage, and
/// transitions to analysis, then to a result or back to idle on failure.
///
/// A plain instantiable value; no ambient globals.
#[derive(Debug, Default)]
pub struct StageSequencer {
    stage: Stage,
    run: TestRun,
    result: Option<AnalysisResult>,
    last_error: Option<SketchError>,
}

impl StageSequencer {
    /// Creates a sequencer in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The authoritative current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The in-progress run.
    pub fn run(&self) -> &TestRun {
        &self.run
    }

    /// The result on display, when in the result stage.
    pub fn current_result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// The error retained from the last failed analysis.
    pub fn last_error(&self) -> Option<&SketchError> {
        self.last_error.as_ref()
    }

    /// Starts a fresh run: clears any prior run, result, and error, and
    /// enters the house stage.
    ///
    /// # Errors
    ///
    /// Fails while an analysis is in flight.
    pub fn start(&mut self) -> Result<()> {
        if self.stage == Stage::Analyzing {
            return Err(SketchError::internal("analysis in progress"));
        }
        self.stage = Stage::House;
        self.run = TestRun::new();
        self.result = None;
        self.last_error = None;
        Ok(())
    }

    /// Stores a committed image for the active capture stage and advances.
    ///
    /// The person commit stores the third image, transitions to `Analyzing`,
    /// and hands back the complete run snapshot. A repeated commit after
    /// that point fails (the flow is already analyzing), which is what keeps
    /// the gateway to at most one call per person commit.
    ///
    /// # Errors
    ///
    /// Fails when no capture stage is active.
    pub fn commit(&mut self, image: CapturedImage) -> Result<Committed> {
        let stage = self.stage.drawing_stage().ok_or_else(|| {
            SketchError::internal(format!("no capture stage is active (current: {})", self.stage))
        })?;

        self.run.insert(stage, image);
        match stage.next() {
            Some(next) => {
                self.stage = Stage::from(next);
                Ok(Committed::Advanced(self.stage))
            }
            None => {
                // Defensive: Analyzing is only entered with all three images.
                self.run.require_complete()?;
                self.stage = Stage::Analyzing;
                tracing::debug!(stage = %DrawingStage::Person, "run complete, entering analysis");
                Ok(Committed::ReadyForAnalysis(self.run.clone()))
            }
        }
    }

    /// Records a successful analysis and enters the result stage.
    ///
    /// # Errors
    ///
    /// Fails when no analysis is in flight.
    pub fn succeed(&mut self, result: AnalysisResult) -> Result<()> {
        if self.stage != Stage::Analyzing {
            return Err(SketchError::internal(format!(
                "no analysis in flight (current: {})",
                self.stage
            )));
        }
        self.stage = Stage::Result;
        self.result = Some(result);
        Ok(())
    }

    /// Records a failed analysis: back to idle, error retained for display,
    /// run discarded (restarting re-captures all three stages).
    ///
    /// # Errors
    ///
    /// Fails when no analysis is in flight.
    pub fn fail(&mut self, error: SketchError) -> Result<()> {
        if self.stage != Stage::Analyzing {
            return Err(SketchError::internal(format!(
                "no analysis in flight (current: {})",
                self.stage
            )));
        }
        tracing::warn!(%error, "analysis failed, returning to idle");
        self.stage = Stage::Idle;
        self.run = TestRun::new();
        self.last_error = Some(error);
        Ok(())
    }

    /// Explicit restart: back to idle with everything cleared.
    ///
    /// # Errors
    ///
    /// Fails while an analysis is in flight.
    pub fn restart(&mut self) -> Result<()> {
        if self.stage == Stage::Analyzing {
            return Err(SketchError::internal("analysis in progress"));
        }
        self.stage = Stage::Idle;
        self.run = TestRun::new();
        self.result = None;
        self.last_error = None;
        Ok(())
    }

    /// Enters the result stage with an archived result, bypassing capture.
    ///
    /// # Errors
    ///
    /// Fails while an analysis is in flight.
    pub fn view_archived(&mut self, result: AnalysisResult) -> Result<()> {
        if self.stage == Stage::Analyzing {
            return Err(SketchError::internal("analysis in progress"));
        }
        self.stage = Stage::Result;
        self.run = TestRun::new();
        self.result = Some(result);
        self.last_error = None;
        Ok(())
    }
}
