//! Conversation turn types.
//!
//! A counselor session is an ordered list of turns bound to one completed
//! analysis. Assistant text may be filled incrementally while a streamed turn
//! is in flight.

use serde::{Deserialize, Serialize};

/// Represents the author of a turn in a counselor conversation.
///
/// Serialized as `"user"`/`"model"`, the role names the chat wire format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Turn authored by the user.
    User,
    /// Turn authored by the reasoning service.
    Model,
}

/// A single turn in a counselor conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Creates a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}
