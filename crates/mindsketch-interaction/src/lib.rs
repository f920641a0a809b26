//! Interaction layer for MindSketch.
//!
//! Concrete Gemini REST implementations of the domain's gateway seams (one
//! schema-constrained analysis call, one streamed chat turn) plus the
//! counselor conversation session that consumes them.

pub mod analysis_agent;
pub mod chat_agent;
pub mod counselor;
pub mod prompts;
mod wire;

pub use analysis_agent::GeminiAnalysisAgent;
pub use chat_agent::GeminiChatAgent;
pub use counselor::CounselorSession;
