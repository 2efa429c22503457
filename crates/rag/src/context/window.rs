//! Conversation window. Bounds how much chat history reaches the model.

use missionrag_core::message::Message;

/// Ten user/assistant exchanges.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// The last `limit` messages of `history`, in their original order.
///
/// Histories shorter than the limit come back whole.
pub fn window(history: &[Message], limit: usize) -> &[Message] {
    &history[history.len().saturating_sub(limit)..]
}
