//! Counselor conversation session.
//!
//! A session is bound to exactly one completed analysis result and holds the
//! ordered turn history behind shared interior mutability, so observers can
//! read the growing partial text of a streamed assistant turn. One send may
//! be outstanding at a time; an overlapping send is a silent no-op.

use crate::prompts::{COUNSELOR_FALLBACK, COUNSELOR_GREETING, counselor_framing};
use futures::StreamExt;
use mindsketch_core::analysis::AnalysisResult;
use mindsketch_core::conversation::ChatTurn;
use mindsketch_core::error::Result;
use mindsketch_core::gateway::ChatGateway;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Clears the pending flag on every exit path, including cancellation of an
/// in-flight send.
struct PendingGuard(Arc<AtomicBool>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A turn-taking exchange scoped to one completed analysis result.
///
/// Discarded when dropped; turns are not persisted.
pub struct CounselorSession {
    /// Session ID for this conversation instance
    id: String,
    /// Session creation timestamp
    created_at: String,
    /// The bound analysis result; read, never mutated.
    result: AnalysisResult,
    /// System framing derived from the bound result.
    framing: String,
    /// Ordered turn history; assistant text grows while a turn streams in.
    turns: Arc<RwLock<Vec<ChatTurn>>>,
    /// True while a send is outstanding.
    pending: Arc<AtomicBool>,
    gateway: Arc<dyn ChatGateway>,
}

impl CounselorSession {
    /// Opens a session bound to a completed analysis result, seeded with the
    /// counselor greeting.
    pub fn open(result: AnalysisResult, gateway: Arc<dyn ChatGateway>) -> Self {
        let framing = counselor_framing(&result);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            result,
            framing,
            turns: Arc::new(RwLock::new(vec![ChatTurn::model(COUNSELOR_GREETING)])),
            pending: Arc::new(AtomicBool::new(false)),
            gateway,
        }
    }

    /// Unique id of this session instance.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// RFC 3339 creation timestamp.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// The bound analysis result.
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    /// True while an assistant turn is streaming in.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Snapshot of the turn history, oldest first. While a send is pending
    /// the last model turn holds the partial text received so far.
    pub async fn turns(&self) -> Vec<ChatTurn> {
        self.turns.read().await.clone()
    }

    /// Appends a user turn and streams the assistant's reply into a new
    /// model turn.
    ///
    /// Overlapping sends and blank input are silent no-ops. Failures are
    /// recovered locally: the in-progress model turn is replaced by the
    /// fallback turn, the user turn stays, and the session remains usable.
    /// Nothing is retried automatically; the user must re-send.
    pub async fn send(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        if self.pending.swap(true, Ordering::SeqCst) {
            tracing::debug!("send ignored: an assistant turn is already pending");
            return Ok(());
        }
        let _guard = PendingGuard(self.pending.clone());

        let history = self.turns.read().await.clone();
        self.turns.write().await.push(ChatTurn::user(text));

        let mut stream = match self.gateway.stream_turn(&self.framing, &history, text).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(%err, "counselor turn failed before streaming");
                self.turns.write().await.push(ChatTurn::model(COUNSELOR_FALLBACK));
                return Ok(());
            }
        };

        self.turns.write().await.push(ChatTurn::model(""));
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    let mut turns = self.turns.write().await;
                    if let Some(last) = turns.last_mut() {
                        last.text.push_str(&chunk);
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "counselor turn interrupted mid-stream");
                    let mut turns = self.turns.write().await;
                    if let Some(last) = turns.last_mut() {
                        last.text = COUNSELOR_FALLBACK.to_string();
                    }
                    break;
                }
            }
        }

        Ok(())
    }
}
