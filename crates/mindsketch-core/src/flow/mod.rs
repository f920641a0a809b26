//! Test flow domain module.
//!
//! # Module Structure
//!
//! - `stage`: stage types (`Stage`, `DrawingStage`)
//! - `run`: the in-progress run (`TestRun`, `DrawingSet`)
//! - `sequencer`: the state machine (`StageSequencer`, `Committed`)

mod run;
mod sequencer;
mod stage;

// Re-export public API
pub use run::{DrawingSet, TestRun};
pub use sequencer::{Committed, StageSequencer};
pub use stage::{DrawingStage, Stage};
