use fulfillment_context::{Context, SessionPath};
use fulfillment_core::{Dialect, PlatformId};
use fulfillment_rich::ResponseItem;
use serde_json::{Map, Value};

use crate::console::SkippedMessage;

/// Format-independent view of one inbound webhook request.
///
/// Built once by an adapter and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestModel {
    pub dialect: Dialect,
    /// Matched intent display name.
    pub intent: Option<String>,
    pub action: Option<String>,
    pub parameters: Map<String, Value>,
    /// Inbound contexts with short names.
    pub contexts: Vec<Context>,
    /// v1 `sessionId` or v2 `session` path.
    pub session: Option<String>,
    pub locale: Option<String>,
    /// The user's raw query text.
    pub query: Option<String>,
    /// Integration the request came through; `Unspecified` when unknown.
    pub request_source: PlatformId,
    /// The integration's own request, passed through untouched (v1 `data`
    /// is exposed as `payload`).
    pub original_request: Option<Value>,
    /// Responses authored in the agent console, parsed into items.
    pub console_messages: Vec<ResponseItem>,
    /// Console messages that were dropped while parsing.
    pub skipped_messages: Vec<SkippedMessage>,
    pub response_id: Option<String>,
    /// v2 only.
    pub alternative_query_results: Option<Value>,
}

impl RequestModel {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            intent: None,
            action: None,
            parameters: Map::new(),
            contexts: Vec::new(),
            session: None,
            locale: None,
            query: None,
            request_source: PlatformId::Unspecified,
            original_request: None,
            console_messages: Vec::new(),
            skipped_messages: Vec::new(),
            response_id: None,
            alternative_query_results: None,
        }
    }

    /// Session path used to qualify v2 context names.
    pub fn session_path(&self) -> SessionPath {
        SessionPath::new(self.session.clone().unwrap_or_default())
    }
}

/// Read a string at a JSON pointer, e.g. `/queryResult/intent/displayName`.
pub(crate) fn str_at(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer).and_then(Value::as_str).map(String::from)
}

pub(crate) fn object_at(body: &Value, pointer: &str) -> Map<String, Value> {
    body.pointer(pointer)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
