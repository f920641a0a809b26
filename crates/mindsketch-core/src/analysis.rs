//! Analysis result domain model.
//!
//! These types mirror the JSON contract of the reasoning service exactly
//! (camelCase field names, `trait` key) so that an archived result
//! round-trips field-for-field with what the service returned.

use crate::error::{Result, SketchError};
use serde::{Deserialize, Serialize};

/// Lower bound of a personality trait score.
pub const TRAIT_SCORE_MIN: f64 = 0.0;
/// Upper bound of a personality trait score.
pub const TRAIT_SCORE_MAX: f64 = 100.0;

/// A single scored personality trait from the interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTrait {
    /// Trait name, chosen by the reasoning service from its own vocabulary.
    #[serde(rename = "trait")]
    pub trait_name: String,
    /// Numeric score within `TRAIT_SCORE_MIN..=TRAIT_SCORE_MAX`.
    pub score: f64,
    /// Free-text explanation of the score.
    pub description: String,
}

/// The upstream-shaped interpretation payload.
///
/// All fields are required; a response missing any of them must not parse
/// into this type (the gateway classifies that as a schema failure rather
/// than returning a partially-populated result).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub summary: String,
    pub personality_traits: Vec<PersonalityTrait>,
    pub emotional_state: String,
    pub advice: String,
    pub key_insights: Vec<String>,
}

impl AnalysisReport {
    /// Checks that every trait score falls within the bounded range the
    /// response schema requested.
    ///
    /// # Errors
    ///
    /// Returns `SketchError::Schema` for the first out-of-range score.
    pub fn validate_scores(&self) -> Result<()> {
        for trait_entry in &self.personality_traits {
            if !(TRAIT_SCORE_MIN..=TRAIT_SCORE_MAX).contains(&trait_entry.score)
                || !trait_entry.score.is_finite()
            {
                return Err(SketchError::schema(format!(
                    "trait '{}' score {} outside {}..={}",
                    trait_entry.trait_name, trait_entry.score, TRAIT_SCORE_MIN, TRAIT_SCORE_MAX
                )));
            }
        }
        Ok(())
    }
}

/// A completed analysis: identifier and creation timestamp plus the report.
///
/// `id` and `date` are assigned locally at creation time; they are never part
/// of the upstream response. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Millisecond-timestamp-derived identifier, unique within a session.
    pub id: String,
    /// RFC 3339 creation timestamp.
    pub date: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

impl AnalysisResult {
    /// Wraps a freshly parsed report with a locally assigned id and date.
    ///
    /// The id is derived from the millisecond timestamp and bumped past the
    /// previously assigned id when two results land in the same millisecond,
    /// keeping ids unique within a session.
    pub fn assign(report: AnalysisReport) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: next_id_millis(now.timestamp_millis()).to_string(),
            date: now.to_rfc3339(),
            report,
        }
    }
}

static LAST_ID_MILLIS: std::sync::atomic::AtomicI64 = std::sync::atomic::AtomicI64::new(0);

fn next_id_millis(now_millis: i64) -> i64 {
    use std::sync::atomic::Ordering;
    loop {
        let last = LAST_ID_MILLIS.load(Ordering::SeqCst);
        let candidate = now_millis.max(last + 1);
        if LAST_ID_MILLIS
            .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return candidate;
        }
    }
}
