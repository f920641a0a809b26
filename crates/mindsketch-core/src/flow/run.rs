//! The in-progress test run.

use super::stage::DrawingStage;
use crate::capture::CapturedImage;
use crate::error::{Result, SketchError};
use serde::{Deserialize, Serialize};

/// One slot per drawing stage, filled as the user commits each capture.
///
/// Mutated only by the stage sequencer; reset when a new run starts or the
/// flow returns to idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    house: Option<CapturedImage>,
    tree: Option<CapturedImage>,
    person: Option<CapturedImage>,
}

impl TestRun {
    /// Creates an empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a committed image under its stage key, replacing any prior one.
    pub fn insert(&mut self, stage: DrawingStage, image: CapturedImage) {
        match stage {
            DrawingStage::House => self.house = Some(image),
            DrawingStage::Tree => self.tree = Some(image),
            DrawingStage::Person => self.person = Some(image),
        }
    }

    /// The image captured for a stage, if committed.
    pub fn get(&self, stage: DrawingStage) -> Option<&CapturedImage> {
        match stage {
            DrawingStage::House => self.house.as_ref(),
            DrawingStage::Tree => self.tree.as_ref(),
            DrawingStage::Person => self.person.as_ref(),
        }
    }

    /// Number of stages captured so far.
    pub fn captured_count(&self) -> usize {
        [&self.house, &self.tree, &self.person]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// True when all three stages are captured.
    pub fn is_complete(&self) -> bool {
        self.captured_count() == 3
    }

    /// Borrows the complete drawing triple.
    ///
    /// # Errors
    ///
    /// Returns `MissingInput` when any stage is missing. This is the
    /// defensive completeness check the analysis gateway performs even
    /// though the sequencer makes an incomplete submission unreachable.
    pub fn require_complete(&self) -> Result<DrawingSet<'_>> {
        match (&self.house, &self.tree, &self.person) {
            (Some(house), Some(tree), Some(person)) => Ok(DrawingSet {
                house,
                tree,
                person,
            }),
            _ => Err(SketchError::missing_input(
                "모든 그림(집, 나무, 사람)을 그려주셔야 분석이 가능합니다.",
            )),
        }
    }
}

/// The complete {house, tree, person} triple, only obtainable from a
/// complete run.
#[derive(Debug, Clone, Copy)]
pub struct DrawingSet<'a> {
    pub house: &'a CapturedImage,
    pub tree: &'a CapturedImage,
    pub person: &'a CapturedImage,
}

impl<'a> DrawingSet<'a> {
    /// The drawings in stage order, paired with their stage keys.
    pub fn in_order(&self) -> [(&'static str, &'a CapturedImage); 3] {
        [
            (DrawingStage::House.key(), self.house),
            (DrawingStage::Tree.key(), self.tree),
            (DrawingStage::Person.key(), self.person),
        ]
    }
}
