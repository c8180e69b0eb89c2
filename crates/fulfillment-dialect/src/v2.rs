//! The v2 webhook format: `body.queryResult.*` in,
//! `fulfillmentText`/`fulfillmentMessages`/`outputContexts` out.

use fulfillment_context::{Context, SessionPath};
use fulfillment_core::{Dialect, FulfillmentError, PlatformId, Result};
use fulfillment_rich::{
    Card, CardOptions, Image, ImageOptions, Payload, ResponseItem, Text, TextOptions,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::adapter::{DialectAdapter, Outbound};
use crate::console::{self, field, unwrap_envelope, ConsoleParser};
use crate::request::{object_at, str_at, RequestModel};
use crate::response::ResponseBody;
use crate::v1::suggestion_from;

/// Console message parsers keyed by the message's content field.
const CONSOLE_PARSERS: &[(&str, ConsoleParser)] = &[
    ("text", parse_text),
    ("card", parse_card),
    ("image", parse_image),
    ("quickReplies", parse_quick_replies),
    ("simpleResponses", parse_simple_responses),
    ("basicCard", parse_basic_card),
    ("suggestions", parse_suggestions),
    ("payload", parse_payload),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct V2Adapter;

impl DialectAdapter for V2Adapter {
    fn dialect(&self) -> Dialect {
        Dialect::V2
    }

    fn extract_request(&self, body: &Value) -> Result<RequestModel> {
        if body.get("queryResult").is_none() {
            return Err(FulfillmentError::UnknownDialect);
        }

        let mut req = RequestModel::new(Dialect::V2);
        req.session = str_at(body, "/session");
        req.response_id = str_at(body, "/responseId");
        req.intent = str_at(body, "/queryResult/intent/displayName");
        req.action = str_at(body, "/queryResult/action");
        req.parameters = object_at(body, "/queryResult/parameters");
        req.query = str_at(body, "/queryResult/queryText");
        req.locale = str_at(body, "/queryResult/languageCode");
        req.alternative_query_results = body.get("alternativeQueryResults").cloned();

        let session = req.session_path();
        req.contexts = body
            .pointer("/queryResult/outputContexts")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|c| Context::from_v2(c, &session))
                    .collect()
            })
            .unwrap_or_default();

        req.request_source = ["/source", "/payload/source", "/payload/data/source"]
            .iter()
            .find_map(|p| str_at(body, &format!("/originalDetectIntentRequest{p}")))
            .map(|s| PlatformId::from_v1_name(&s))
            .unwrap_or_default();
        req.original_request = body.get("originalDetectIntentRequest").cloned();

        if let Some(messages) = body
            .pointer("/queryResult/fulfillmentMessages")
            .and_then(Value::as_array)
        {
            (req.console_messages, req.skipped_messages) =
                console::parse_all(messages, CONSOLE_PARSERS, message_key, message_platform);
        }

        debug!(
            intent = req.intent.as_deref().unwrap_or(""),
            session = %session,
            source = %req.request_source,
            contexts = req.contexts.len(),
            console_messages = req.console_messages.len(),
            "v2 request extracted"
        );
        Ok(req)
    }

    fn build_response(&self, out: &Outbound<'_>) -> Result<Value> {
        let mut response = Map::new();
        match out.body {
            ResponseBody::Text(text) => {
                response.insert("fulfillmentText".into(), json!(text.text()));
            }
            ResponseBody::Rich { messages, payload } => {
                if !messages.is_empty() {
                    response.insert("fulfillmentMessages".into(), Value::Array(messages.clone()));
                }
                if let Some(payload) = payload {
                    response.insert("payload".into(), payload.clone());
                    // The platform rejects a payload-only response without this field.
                    if messages.is_empty() {
                        response.insert("fulfillmentText".into(), json!(""));
                    }
                }
            }
            ResponseBody::Empty => {}
        }

        let session: SessionPath = out.request.session_path();
        response.insert(
            "outputContexts".into(),
            Value::Array(out.contexts.to_v2_array(&session)),
        );

        if let Some(event) = out.followup {
            event.validate()?;
            let mut followup = json!({ "name": event.name });
            if let Some(params) = &event.parameters {
                followup["parameters"] = Value::Object(params.clone());
            }
            if let Some(code) = event.language_code.as_ref().or(out.request.locale.as_ref()) {
                followup["languageCode"] = json!(code);
            }
            response.insert("followupEventInput".into(), followup);
        }

        if out.end_conversation {
            response.insert("triggerEndOfConversation".into(), json!(true));
        }
        Ok(Value::Object(response))
    }

    fn supports_end_conversation(&self) -> bool {
        true
    }
}

/// The content key of a message: the first key that is not `platform`.
fn message_key(message: &Value) -> Option<String> {
    message
        .as_object()?
        .keys()
        .find(|k| k.as_str() != "platform")
        .cloned()
}

fn message_platform(message: &Value) -> Option<PlatformId> {
    field(message, "platform")
        .map(PlatformId::from_v2_name)
        .filter(|p| !p.is_unspecified())
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(String::from)
}

fn strings<'a>(value: Option<&'a Value>) -> Vec<&'a str> {
    value
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn first_button(message: &Value) -> Option<&Value> {
    message
        .get("buttons")
        .and_then(Value::as_array)
        .and_then(|b| b.first())
}

fn parse_text(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    // Several strings are alternative variants; the first one is used.
    let variants = strings(message.pointer("/text/text"));
    let text = Text::with_options(TextOptions {
        text: owned(variants.first().copied()),
        platform,
        ..Default::default()
    })?;
    Ok(vec![text.into()])
}

fn parse_card(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let card = &message["card"];
    let (button_text, button_url) = match first_button(card) {
        Some(b) => match (field(b, "text"), field(b, "postback")) {
            (Some(text), Some(url)) => (Some(text.to_string()), Some(url.to_string())),
            _ => (None, None),
        },
        None => (None, None),
    };
    let card = Card::with_options(CardOptions {
        title: owned(field(card, "title")),
        text: owned(field(card, "subtitle")),
        image_url: owned(field(card, "imageUri")),
        button_text,
        button_url,
        platform,
    })?;
    Ok(vec![card.into()])
}

fn parse_image(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let image = &message["image"];
    let image = Image::with_options(ImageOptions {
        image_url: owned(field(image, "imageUri")),
        accessibility_text: owned(field(image, "accessibilityText")),
        platform,
    })?;
    Ok(vec![image.into()])
}

fn parse_quick_replies(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let titles = strings(message.pointer("/quickReplies/quickReplies"));
    Ok(vec![suggestion_from(&titles, platform)?.into()])
}

fn parse_simple_responses(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let platform = platform.unwrap_or(PlatformId::ActionsOnGoogle);
    let responses = message
        .pointer("/simpleResponses/simpleResponses")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut items = Vec::with_capacity(responses.len());
    for response in &responses {
        let display = field(response, "displayText");
        let spoken = field(response, "textToSpeech");
        let ssml = field(response, "ssml").or(match (display, spoken) {
            (Some(d), Some(s)) if d != s => Some(s),
            _ => None,
        });
        let text = Text::with_options(TextOptions {
            text: owned(display.or(spoken).or(ssml)),
            ssml: owned(ssml),
            platform: Some(platform.clone()),
        })?;
        items.push(text.into());
    }
    if items.is_empty() {
        return Err(FulfillmentError::Construction {
            kind: "Text",
            field: "text",
        });
    }
    Ok(items)
}

fn parse_basic_card(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let platform = Some(platform.unwrap_or(PlatformId::ActionsOnGoogle));
    let card = &message["basicCard"];
    let image_url = card.get("image").and_then(|i| field(i, "imageUri"));

    // The console stores a lone image as an untitled basic card.
    let Some(title) = field(card, "title") else {
        let image = Image::with_options(ImageOptions {
            image_url: owned(image_url),
            accessibility_text: owned(card.get("image").and_then(|i| field(i, "accessibilityText"))),
            platform,
        })?;
        return Ok(vec![image.into()]);
    };

    let (button_text, button_url) = match first_button(card) {
        Some(b) => match (field(b, "title"), b.get("openUriAction").and_then(|a| field(a, "uri"))) {
            (Some(text), Some(url)) => (Some(text.to_string()), Some(url.to_string())),
            _ => (None, None),
        },
        None => (None, None),
    };
    let card = Card::with_options(CardOptions {
        title: Some(title.to_string()),
        text: owned(field(card, "formattedText")),
        image_url: owned(image_url),
        button_text,
        button_url,
        platform,
    })?;
    Ok(vec![card.into()])
}

fn parse_suggestions(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let titles: Vec<&str> = message
        .pointer("/suggestions/suggestions")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(|s| field(s, "title")).collect())
        .unwrap_or_default();
    let platform = Some(platform.unwrap_or(PlatformId::ActionsOnGoogle));
    Ok(vec![suggestion_from(&titles, platform)?.into()])
}

fn parse_payload(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let platform = platform.unwrap_or_default();
    let payload = unwrap_envelope(&platform, &message["payload"]);
    Ok(vec![Payload::new(platform, &payload)?.into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use fulfillment_context::ContextStore;
    use fulfillment_core::FollowupEvent;
    use fulfillment_rich::{RichResponse, Suggestion};

    const SESSION: &str = "projects/agent-1/agent/sessions/1";

    fn request() -> Value {
        json!({
            "responseId": "r-1",
            "session": SESSION,
            "queryResult": {
                "queryText": "hi",
                "action": "input.welcome",
                "parameters": {"city": "Rome"},
                "languageCode": "en-gb",
                "intent": {"displayName": "Default Welcome Intent"},
                "outputContexts": [
                    {"name": format!("{SESSION}/contexts/weather"), "lifespanCount": 2}
                ],
                "fulfillmentMessages": [
                    {"text": {"text": ["Hello"]}},
                    {"quickReplies": {"quickReplies": ["a"]}, "platform": "FACEBOOK"},
                    {"carouselSelect": {"items": []}, "platform": "ACTIONS_ON_GOOGLE"},
                    {"quickReplies": {"quickReplies": ["b"]}, "platform": "FACEBOOK"},
                    {"simpleResponses": {"simpleResponses": [
                        {"textToSpeech": "one"}, {"textToSpeech": "two", "displayText": "Two"}
                    ]}, "platform": "ACTIONS_ON_GOOGLE"},
                    {"card": {"subtitle": "no title"}},
                    {"payload": {"facebook": {"attachment": {}}}, "platform": "FACEBOOK"}
                ]
            },
            "originalDetectIntentRequest": {"payload": {"data": {"source": "facebook"}}}
        })
    }

    fn outbound<'a>(
        body: &'a ResponseBody,
        contexts: &'a ContextStore,
        req: &'a RequestModel,
    ) -> Outbound<'a> {
        Outbound {
            body,
            contexts,
            followup: None,
            end_conversation: false,
            request: req,
        }
    }

    #[test]
    fn extracts_request_fields() {
        let req = V2Adapter.extract_request(&request()).unwrap();
        assert_eq!(req.intent.as_deref(), Some("Default Welcome Intent"));
        assert_eq!(req.action.as_deref(), Some("input.welcome"));
        assert_eq!(req.locale.as_deref(), Some("en-gb"));
        assert_eq!(req.session.as_deref(), Some(SESSION));
        assert_eq!(req.response_id.as_deref(), Some("r-1"));
        assert_eq!(req.contexts[0].name, "weather");
        assert_eq!(req.request_source, PlatformId::Facebook);
        assert!(req.original_request.is_some());
    }

    #[test]
    fn console_messages_parse_skip_and_merge() {
        let req = V2Adapter.extract_request(&request()).unwrap();
        let kinds: Vec<&str> = req.console_messages.iter().map(ResponseItem::kind).collect();
        assert_eq!(kinds, ["text", "suggestion", "text", "text", "payload"]);
        assert_eq!(req.skipped_messages.len(), 2);
        assert!(req.skipped_messages[0].reason.contains("carouselSelect"));

        let ResponseItem::Suggestion(s) = &req.console_messages[1] else {
            panic!("expected suggestion");
        };
        assert_eq!(s.replies(), ["a", "b"]);

        let two = req.console_messages[3].as_text().unwrap();
        assert_eq!(two.text(), "Two");
        assert_eq!(two.ssml(), Some("two"));
        assert_eq!(two.platform(), Some(&PlatformId::ActionsOnGoogle));

        let payload = req.console_messages[4].as_payload().unwrap();
        assert_eq!(payload.payload(), &json!({"attachment": {}}));
    }

    #[test]
    fn payload_only_response_carries_empty_text() {
        let req = V2Adapter.extract_request(&request()).unwrap();
        let body = ResponseBody::Rich {
            messages: vec![],
            payload: Some(json!({"facebook": {"x": 1}})),
        };
        let contexts = ContextStore::new();
        let out = V2Adapter.build_response(&outbound(&body, &contexts, &req)).unwrap();
        assert_eq!(
            out,
            json!({"fulfillmentText": "", "payload": {"facebook": {"x": 1}}, "outputContexts": []})
        );
    }

    #[test]
    fn followup_defaults_language_to_locale() {
        let req = V2Adapter.extract_request(&request()).unwrap();
        let contexts = ContextStore::new();
        let event = FollowupEvent::new("weather");
        let mut parts = outbound(&ResponseBody::Empty, &contexts, &req);
        parts.followup = Some(&event);
        parts.end_conversation = true;
        let out = V2Adapter.build_response(&parts).unwrap();
        assert_eq!(
            out["followupEventInput"],
            json!({"name": "weather", "languageCode": "en-gb"})
        );
        assert_eq!(out["triggerEndOfConversation"], true);
    }

    #[test]
    fn contexts_carry_session_prefix() {
        let req = V2Adapter.extract_request(&request()).unwrap();
        let mut contexts = ContextStore::from_inbound(req.contexts.clone());
        contexts.set("city", Some(1), None).unwrap();
        let body = ResponseBody::Rich {
            messages: vec![Suggestion::new("yes").unwrap().render_v2(&PlatformId::Unspecified).unwrap()],
            payload: None,
        };
        let out = V2Adapter.build_response(&outbound(&body, &contexts, &req)).unwrap();
        assert_eq!(
            out["outputContexts"],
            json!([{"name": format!("{SESSION}/contexts/city"), "lifespanCount": 1}])
        );
        assert_eq!(out["fulfillmentMessages"][0]["quickReplies"]["quickReplies"], json!(["yes"]));
    }
}
