use fulfillment_context::ContextStore;
use fulfillment_core::{Dialect, FollowupEvent, PlatformId, Result};
use fulfillment_rich::{ResponseItem, RichResponse};
use serde_json::Value;

use crate::request::RequestModel;
use crate::response::ResponseBody;
use crate::v1::V1Adapter;
use crate::v2::V2Adapter;

/// Everything an adapter needs to lay out one response.
#[derive(Debug, Clone, Copy)]
pub struct Outbound<'a> {
    pub body: &'a ResponseBody,
    pub contexts: &'a ContextStore,
    pub followup: Option<&'a FollowupEvent>,
    pub end_conversation: bool,
    pub request: &'a RequestModel,
}

/// One webhook format: how to read a request and how to write a response.
///
/// Implementations are stateless; a single instance serves any number of
/// requests.
pub trait DialectAdapter: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Parse a raw body into the format-independent request model.
    fn extract_request(&self, body: &Value) -> Result<RequestModel>;

    /// Lay out the final response JSON.
    fn build_response(&self, outbound: &Outbound<'_>) -> Result<Value>;

    /// Lay out the response and hand it to `send`, which owns the transport.
    fn build_and_send(
        &self,
        outbound: &Outbound<'_>,
        send: &mut dyn FnMut(Value) -> Result<()>,
    ) -> Result<()> {
        let body = self.build_response(outbound)?;
        send(body)
    }

    /// Whether the format can ask the platform to close the conversation.
    fn supports_end_conversation(&self) -> bool {
        false
    }

    /// Render one buffered item for `target` in this format.
    fn render(&self, item: &ResponseItem, target: &PlatformId) -> Option<Value> {
        item.render(self.dialect(), target)
    }
}

pub fn adapter_for(dialect: Dialect) -> Box<dyn DialectAdapter> {
    match dialect {
        Dialect::V1 => Box::new(V1Adapter),
        Dialect::V2 => Box::new(V2Adapter),
    }
}

/// Pick the adapter matching the shape of `body`.
pub fn detect_adapter(body: &Value) -> Result<Box<dyn DialectAdapter>> {
    Ok(adapter_for(Dialect::detect(body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detection_picks_the_right_adapter() {
        let v1 = detect_adapter(&json!({"result": {}})).unwrap();
        assert_eq!(v1.dialect(), Dialect::V1);
        assert!(!v1.supports_end_conversation());

        let v2 = detect_adapter(&json!({"queryResult": {}})).unwrap();
        assert_eq!(v2.dialect(), Dialect::V2);
        assert!(v2.supports_end_conversation());

        let err = detect_adapter(&json!({"foo": 1})).err().unwrap();
        assert_eq!(err.code(), "UNKNOWN_DIALECT");
    }

    #[test]
    fn build_and_send_hands_over_the_body() {
        let adapter = adapter_for(Dialect::V2);
        let request = RequestModel::new(Dialect::V2);
        let contexts = ContextStore::new();
        let body = ResponseBody::Text(fulfillment_rich::Text::new("hi").unwrap());
        let mut sent = None;
        adapter
            .build_and_send(
                &Outbound {
                    body: &body,
                    contexts: &contexts,
                    followup: None,
                    end_conversation: false,
                    request: &request,
                },
                &mut |json| {
                    sent = Some(json);
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(sent, Some(json!({"fulfillmentText": "hi", "outputContexts": []})));
    }

    #[test]
    fn build_failure_never_reaches_the_sink() {
        let adapter = adapter_for(Dialect::V1);
        let request = RequestModel::new(Dialect::V1);
        let contexts = ContextStore::new();
        let mut called = false;
        let err = adapter
            .build_and_send(
                &Outbound {
                    body: &ResponseBody::Empty,
                    contexts: &contexts,
                    followup: None,
                    end_conversation: true,
                    request: &request,
                },
                &mut |_| {
                    called = true;
                    Ok(())
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_OPERATION");
        assert!(!called);
    }
}
