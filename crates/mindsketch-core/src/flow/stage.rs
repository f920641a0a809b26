//! Stage types for the test flow state machine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One of the three canonical capture steps.
///
/// Order is fixed: house, tree, person.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DrawingStage {
    House,
    Tree,
    Person,
}

impl DrawingStage {
    /// The stage that follows this one, if any.
    pub fn next(&self) -> Option<DrawingStage> {
        match self {
            DrawingStage::House => Some(DrawingStage::Tree),
            DrawingStage::Tree => Some(DrawingStage::Person),
            DrawingStage::Person => None,
        }
    }

    /// The stage key used in the analysis request.
    pub fn key(&self) -> &'static str {
        match self {
            DrawingStage::House => "house",
            DrawingStage::Tree => "tree",
            DrawingStage::Person => "person",
        }
    }

    /// User-facing title for the capture step.
    pub fn title(&self) -> &'static str {
        match self {
            DrawingStage::House => "집을 그려보세요",
            DrawingStage::Tree => "나무를 그려보세요",
            DrawingStage::Person => "사람을 그려보세요",
        }
    }

    /// User-facing instruction for the capture step.
    pub fn instruction(&self) -> &'static str {
        match self {
            DrawingStage::House => "가족 혹은 자신의 내면 세계를 상징하는 집을 그려주세요.",
            DrawingStage::Tree => "무의식적인 성격과 내면의 에너지를 상징하는 나무를 그려주세요.",
            DrawingStage::Person => "사회적 관계 속에서 비춰지는 전신 사람상을 그려주세요.",
        }
    }
}

/// The authoritative state of one test flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// No run in progress; the entry screen.
    Idle,
    /// Capturing the house drawing.
    House,
    /// Capturing the tree drawing.
    Tree,
    /// Capturing the person drawing.
    Person,
    /// The analysis call is in flight.
    Analyzing,
    /// A completed (or archived) result is on display.
    Result,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Idle
    }
}

impl From<DrawingStage> for Stage {
    fn from(stage: DrawingStage) -> Self {
        match stage {
            DrawingStage::House => Stage::House,
            DrawingStage::Tree => Stage::Tree,
            DrawingStage::Person => Stage::Person,
        }
    }
}

impl Stage {
    /// The capture stage this state corresponds to, if any.
    pub fn drawing_stage(&self) -> Option<DrawingStage> {
        match self {
            Stage::House => Some(DrawingStage::House),
            Stage::Tree => Some(DrawingStage::Tree),
            Stage::Person => Some(DrawingStage::Person),
            _ => None,
        }
    }
}
