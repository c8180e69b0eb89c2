use fulfillment_core::{Dialect, FulfillmentError, PlatformId, Result};
use fulfillment_rich::{ResponseItem, RichResponse, Text};
use serde_json::Value;

/// What the response carries besides contexts and events, before it is laid
/// out in a particular dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A lone text item; sent through the plain-text shortcut fields.
    Text(Text),
    /// Rendered message entries plus the merged payload envelope, if any.
    Rich {
        messages: Vec<Value>,
        payload: Option<Value>,
    },
    /// No messages at all. Only valid alongside a followup event.
    Empty,
}

impl ResponseBody {
    /// Decide the body for `target` from the buffered items.
    ///
    /// Fails with `NoResponsesDefined` when nothing applies to the target.
    pub fn compose(items: &[ResponseItem], dialect: Dialect, target: &PlatformId) -> Result<Self> {
        if let [ResponseItem::Text(text)] = items {
            if text.platform().map_or(true, |p| p == target) {
                return Ok(Self::Text(text.clone()));
            }
        }

        let messages: Vec<Value> = items
            .iter()
            .filter_map(|item| item.render(dialect, target))
            .collect();

        // At most one payload per platform is buffered; take the target's.
        let payload = items
            .iter()
            .filter_map(ResponseItem::as_payload)
            .find_map(|p| p.envelope(target));

        if messages.is_empty() && payload.is_none() {
            return Err(FulfillmentError::NoResponsesDefined {
                platform: target.to_string(),
            });
        }
        Ok(Self::Rich { messages, payload })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fulfillment_rich::{Card, Payload, Suggestion, TextOptions};
    use serde_json::json;

    #[test]
    fn single_text_takes_the_shortcut() {
        let items = vec![Text::new("hello").unwrap().into()];
        let body = ResponseBody::compose(&items, Dialect::V2, &PlatformId::Facebook).unwrap();
        assert_eq!(body, ResponseBody::Text(Text::new("hello").unwrap()));
    }

    #[test]
    fn single_text_for_another_platform_is_not_sent() {
        let text = Text::with_options(TextOptions {
            text: Some("hi".into()),
            platform: Some(PlatformId::Slack),
            ..Default::default()
        })
        .unwrap();
        let err = ResponseBody::compose(&[text.into()], Dialect::V1, &PlatformId::Facebook)
            .unwrap_err();
        assert_eq!(err.code(), "NO_RESPONSES_DEFINED");
    }

    #[test]
    fn payload_is_lifted_out_of_messages() {
        let items: Vec<ResponseItem> = vec![
            Card::new("title").unwrap().into(),
            Payload::new(PlatformId::Facebook, &json!({"attachment": {}}))
                .unwrap()
                .into(),
            Payload::new(PlatformId::Slack, &json!({"text": "x"})).unwrap().into(),
            Suggestion::new("yes").unwrap().into(),
        ];
        let ResponseBody::Rich { messages, payload } =
            ResponseBody::compose(&items, Dialect::V2, &PlatformId::Facebook).unwrap()
        else {
            panic!("expected rich body");
        };
        assert_eq!(messages.len(), 2);
        assert_eq!(payload, Some(json!({"facebook": {"attachment": {}}})));
    }

    #[test]
    fn nothing_for_target_fails() {
        let items: Vec<ResponseItem> =
            vec![Payload::new(PlatformId::Slack, &json!({})).unwrap().into()];
        assert!(ResponseBody::compose(&items, Dialect::V2, &PlatformId::Telegram).is_err());
        assert!(ResponseBody::compose(&[], Dialect::V1, &PlatformId::Unspecified).is_err());
    }
}
