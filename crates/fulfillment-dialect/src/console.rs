//! Shared plumbing for parsing console-authored messages.
//!
//! Each dialect keeps its own dispatch table of `(key, parser)` pairs; this
//! module owns the loop around it: skip what fails, merge suggestions.

use fulfillment_core::{PlatformId, Result};
use fulfillment_rich::{ResponseItem, RichResponse};
use serde_json::Value;
use tracing::warn;

/// Parses one console message into zero or more items.
pub type ConsoleParser = fn(&Value, Option<PlatformId>) -> Result<Vec<ResponseItem>>;

/// A console message that could not be turned into a response item.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMessage {
    /// Position in the inbound message list.
    pub index: usize,
    pub reason: String,
}

/// Run every message through the parser registered for its key.
///
/// Messages with an unknown key or that fail to parse are logged and skipped;
/// one malformed console entry never fails the request.
pub fn parse_all(
    messages: &[Value],
    table: &[(&str, ConsoleParser)],
    key_of: fn(&Value) -> Option<String>,
    platform_of: fn(&Value) -> Option<PlatformId>,
) -> (Vec<ResponseItem>, Vec<SkippedMessage>) {
    let mut items = Vec::new();
    let mut skipped = Vec::new();
    for (index, message) in messages.iter().enumerate() {
        let Some(key) = key_of(message) else {
            warn!(index, "console message has no recognizable type, skipping");
            skipped.push(SkippedMessage {
                index,
                reason: "no message type".into(),
            });
            continue;
        };
        let Some((_, parser)) = table.iter().find(|(k, _)| *k == key.as_str()) else {
            warn!(index, kind = %key, "unsupported console message type, skipping");
            skipped.push(SkippedMessage {
                index,
                reason: format!("unsupported type {key}"),
            });
            continue;
        };
        match parser(message, platform_of(message)) {
            Ok(parsed) => {
                for item in parsed {
                    push_merged(&mut items, item);
                }
            }
            Err(e) => {
                warn!(index, kind = %key, error = %e, "console message skipped");
                skipped.push(SkippedMessage {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    (items, skipped)
}

/// Append `item`, folding a suggestion into an earlier one with the same pin.
pub fn push_merged(items: &mut Vec<ResponseItem>, item: ResponseItem) {
    if let ResponseItem::Suggestion(incoming) = item {
        let pin = incoming.platform().cloned();
        let existing = items
            .iter_mut()
            .filter(|i| i.platform().cloned() == pin)
            .find_map(ResponseItem::as_suggestion_mut);
        match existing {
            Some(found) => found.merge(incoming),
            None => items.push(ResponseItem::Suggestion(incoming)),
        }
        return;
    }
    items.push(item);
}

/// Console payloads are often already wrapped as `{"google": {...}}`; strip
/// that so the response envelope does not double-wrap.
pub fn unwrap_envelope(platform: &PlatformId, payload: &Value) -> Value {
    match payload.as_object() {
        Some(obj) if obj.len() == 1 => match obj.get(platform.payload_key()) {
            Some(inner) => inner.clone(),
            None => payload.clone(),
        },
        _ => payload.clone(),
    }
}

/// Non-empty string field of a message.
pub fn field<'a>(message: &'a Value, key: &str) -> Option<&'a str> {
    message
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
