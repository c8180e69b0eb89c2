use std::fmt;
use std::sync::Arc;

use fulfillment_dialect::RequestModel;
use serde_json::Value;

/// Bridge to a voice-assistant conversation object owned by another library.
///
/// The client never looks inside; it only asks for the serialized form when
/// the conversation is added as a reply.
pub trait Conversation: Send + Sync + fmt::Debug {
    /// `{"outputContexts": [...], "payload": {...}}`.
    fn serialize(&self) -> Value;
}

/// Builds a conversation for a voice-assistant request.
pub type ConversationFactory = Arc<dyn Fn(&RequestModel) -> Box<dyn Conversation> + Send + Sync>;
