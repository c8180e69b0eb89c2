use std::sync::{Arc, Mutex};

use fulfillment_core::{FulfillmentError, Result};
use serde_json::Value;

/// The inbound side of the HTTP exchange: anything exposing a parsed body.
pub trait InboundRequest {
    /// Parsed JSON body, or `None` when there is no request at all.
    fn body(&self) -> Option<&Value>;
}

impl InboundRequest for Value {
    fn body(&self) -> Option<&Value> {
        (!self.is_null()).then_some(self)
    }
}

impl<T: InboundRequest> InboundRequest for Option<T> {
    fn body(&self) -> Option<&Value> {
        self.as_ref().and_then(InboundRequest::body)
    }
}

/// The outbound side of the HTTP exchange.
pub trait OutboundResponse: Send {
    /// Only used for the unmatched-intent path.
    fn set_status(&mut self, status: u16);

    /// Terminal: called exactly once per request.
    fn send_json(&mut self, body: Value) -> Result<()>;
}

/// What a [`MemoryResponse`] has received so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedResponse {
    pub status: Option<u16>,
    pub body: Option<Value>,
}

/// An [`OutboundResponse`] that records into shared memory.
///
/// Clones share the same record, so the caller keeps one handle while the
/// client owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryResponse {
    inner: Arc<Mutex<RecordedResponse>>,
}

impl MemoryResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RecordedResponse {
        self.inner.lock().expect("response record poisoned").clone()
    }

    /// Status to reply with; 200 unless something set it.
    pub fn status(&self) -> u16 {
        self.snapshot().status.unwrap_or(200)
    }

    pub fn body(&self) -> Option<Value> {
        self.snapshot().body
    }

    pub fn is_sent(&self) -> bool {
        self.snapshot().body.is_some()
    }
}

impl OutboundResponse for MemoryResponse {
    fn set_status(&mut self, status: u16) {
        self.inner.lock().expect("response record poisoned").status = Some(status);
    }

    fn send_json(&mut self, body: Value) -> Result<()> {
        let mut record = self.inner.lock().expect("response record poisoned");
        if record.body.is_some() {
            return Err(FulfillmentError::Transport("response body already written".into()));
        }
        record.body = Some(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_the_record() {
        let handle = MemoryResponse::new();
        let mut writer = handle.clone();
        writer.set_status(400);
        writer.send_json(json!({"ok": false})).unwrap();

        assert_eq!(handle.status(), 400);
        assert_eq!(handle.body(), Some(json!({"ok": false})));
        assert!(writer.send_json(json!({})).is_err());
    }

    #[test]
    fn null_body_counts_as_missing() {
        assert!(Value::Null.body().is_none());
        assert!(None::<Value>.body().is_none());
        assert!(Some(json!({"result": {}})).body().is_some());
    }
}
