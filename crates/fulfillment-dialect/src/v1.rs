//! The v1 webhook format: `body.result.*` in, `speech`/`messages`/`contextOut` out.

use fulfillment_context::Context;
use fulfillment_core::{Dialect, FulfillmentError, PlatformId, Result};
use fulfillment_rich::{
    Card, CardOptions, Image, ImageOptions, Payload, ResponseItem, Suggestion, Text, TextOptions,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::adapter::{DialectAdapter, Outbound};
use crate::console::{self, field, unwrap_envelope, ConsoleParser};
use crate::request::{object_at, str_at, RequestModel};
use crate::response::ResponseBody;

/// Console message parsers keyed by `type`. Integer codes are matched by
/// their decimal string.
const CONSOLE_PARSERS: &[(&str, ConsoleParser)] = &[
    ("0", parse_text),
    ("1", parse_card),
    ("2", parse_replies),
    ("3", parse_image),
    ("4", parse_payload),
    ("simple_response", parse_simple_response),
    ("basic_card", parse_basic_card),
    ("suggestion_chips", parse_suggestion_chips),
    ("custom_payload", parse_custom_payload),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct V1Adapter;

impl DialectAdapter for V1Adapter {
    fn dialect(&self) -> Dialect {
        Dialect::V1
    }

    fn extract_request(&self, body: &Value) -> Result<RequestModel> {
        if body.get("result").is_none() {
            return Err(FulfillmentError::UnknownDialect);
        }

        let mut req = RequestModel::new(Dialect::V1);
        req.intent = str_at(body, "/result/metadata/intentName");
        req.action = str_at(body, "/result/action");
        req.parameters = object_at(body, "/result/parameters");
        req.query = str_at(body, "/result/resolvedQuery");
        req.session = str_at(body, "/sessionId");
        req.locale = str_at(body, "/lang");
        req.response_id = str_at(body, "/id");
        req.contexts = body
            .pointer("/result/contexts")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Context::from_v1).collect())
            .unwrap_or_default();

        req.request_source = str_at(body, "/originalRequest/source")
            .or_else(|| str_at(body, "/originalRequest/data/source"))
            .map(|s| PlatformId::from_v1_name(&s))
            .unwrap_or_default();
        req.original_request = body.get("originalRequest").map(expose_payload);

        if let Some(messages) = body
            .pointer("/result/fulfillment/messages")
            .and_then(Value::as_array)
        {
            (req.console_messages, req.skipped_messages) =
                console::parse_all(messages, CONSOLE_PARSERS, message_type, message_platform);
        }

        debug!(
            intent = req.intent.as_deref().unwrap_or(""),
            source = %req.request_source,
            contexts = req.contexts.len(),
            console_messages = req.console_messages.len(),
            "v1 request extracted"
        );
        Ok(req)
    }

    fn build_response(&self, out: &Outbound<'_>) -> Result<Value> {
        if out.end_conversation {
            return Err(FulfillmentError::UnsupportedOperation(
                "ending the conversation is only supported by the v2 webhook format".into(),
            ));
        }

        let mut response = Map::new();
        match out.body {
            ResponseBody::Text(text) => {
                response.insert("speech".into(), json!(text.spoken()));
                response.insert("displayText".into(), json!(text.text()));
            }
            ResponseBody::Rich { messages, payload } => {
                if !messages.is_empty() {
                    response.insert("messages".into(), Value::Array(messages.clone()));
                }
                if let Some(payload) = payload {
                    response.insert("data".into(), payload.clone());
                }
            }
            ResponseBody::Empty => {}
        }
        response.insert("contextOut".into(), Value::Array(out.contexts.to_v1_array()));

        if let Some(event) = out.followup {
            event.validate()?;
            let mut followup = json!({ "name": event.name });
            if let Some(params) = &event.parameters {
                followup["data"] = Value::Object(params.clone());
            }
            response.insert("followupEvent".into(), followup);
        }
        Ok(Value::Object(response))
    }
}

/// The integration's request with `data` renamed to `payload`, matching v2.
fn expose_payload(original: &Value) -> Value {
    let mut exposed = original.clone();
    if let Some(obj) = exposed.as_object_mut() {
        if let Some(data) = obj.remove("data") {
            obj.insert("payload".into(), data);
        }
    }
    exposed
}

fn message_type(message: &Value) -> Option<String> {
    match message.get("type")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn message_platform(message: &Value) -> Option<PlatformId> {
    field(message, "platform").map(PlatformId::from_v1_name)
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(String::from)
}

fn parse_text(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    // `speech` is either one string or a list of variants.
    let speech = match message.get("speech") {
        Some(Value::Array(variants)) => variants.iter().find_map(Value::as_str),
        Some(other) => other.as_str(),
        None => None,
    };
    let text = Text::with_options(TextOptions {
        text: owned(speech),
        platform,
        ..Default::default()
    })?;
    Ok(vec![text.into()])
}

fn parse_card(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let button = message
        .get("buttons")
        .and_then(Value::as_array)
        .and_then(|b| b.first());
    let (button_text, button_url) = match button {
        Some(b) => match (field(b, "text"), field(b, "postback")) {
            (Some(text), Some(url)) => (Some(text.to_string()), Some(url.to_string())),
            _ => (None, None),
        },
        None => (None, None),
    };
    let card = Card::with_options(CardOptions {
        title: owned(field(message, "title")),
        text: owned(field(message, "subtitle")),
        image_url: owned(field(message, "imageUrl")),
        button_text,
        button_url,
        platform,
    })?;
    Ok(vec![card.into()])
}

fn parse_replies(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let titles = message
        .get("replies")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    Ok(vec![suggestion_from(&titles, platform)?.into()])
}

fn parse_image(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let image = Image::with_options(ImageOptions {
        image_url: owned(field(message, "imageUrl")),
        platform,
        ..Default::default()
    })?;
    Ok(vec![image.into()])
}

fn parse_payload(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let platform = platform.unwrap_or_default();
    let payload = message.get("payload").unwrap_or(&Value::Null);
    let payload = Payload::new(platform.clone(), &unwrap_envelope(&platform, payload))?;
    Ok(vec![payload.into()])
}

fn parse_simple_response(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let display = field(message, "displayText");
    let spoken = field(message, "textToSpeech");
    let ssml = match (display, spoken) {
        (Some(d), Some(s)) if d != s => Some(s.to_string()),
        _ => None,
    };
    let text = Text::with_options(TextOptions {
        text: owned(display.or(spoken)),
        ssml,
        platform: Some(platform.unwrap_or(PlatformId::ActionsOnGoogle)),
    })?;
    Ok(vec![text.into()])
}

fn parse_basic_card(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let platform = Some(platform.unwrap_or(PlatformId::ActionsOnGoogle));
    let image_url = message.get("image").and_then(|i| field(i, "url"));

    // An untitled basic card is how the console stores a lone image.
    let Some(title) = field(message, "title") else {
        let image = Image::with_options(ImageOptions {
            image_url: owned(image_url),
            accessibility_text: owned(message.get("image").and_then(|i| field(i, "accessibilityText"))),
            platform,
        })?;
        return Ok(vec![image.into()]);
    };

    let button = message
        .get("buttons")
        .and_then(Value::as_array)
        .and_then(|b| b.first());
    let (button_text, button_url) = match button {
        Some(b) => match (field(b, "title"), b.get("openUrlAction").and_then(|a| field(a, "url"))) {
            (Some(text), Some(url)) => (Some(text.to_string()), Some(url.to_string())),
            _ => (None, None),
        },
        None => (None, None),
    };
    let card = Card::with_options(CardOptions {
        title: Some(title.to_string()),
        text: owned(field(message, "formattedText")),
        image_url: owned(image_url),
        button_text,
        button_url,
        platform,
    })?;
    Ok(vec![card.into()])
}

fn parse_suggestion_chips(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let titles = message
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(|s| field(s, "title")).collect::<Vec<_>>())
        .unwrap_or_default();
    let platform = Some(platform.unwrap_or(PlatformId::ActionsOnGoogle));
    Ok(vec![suggestion_from(&titles, platform)?.into()])
}

fn parse_custom_payload(message: &Value, platform: Option<PlatformId>) -> Result<Vec<ResponseItem>> {
    let platform = platform.unwrap_or(PlatformId::ActionsOnGoogle);
    let payload = message.get("payload").unwrap_or(&Value::Null);
    let payload = Payload::new(platform.clone(), &unwrap_envelope(&platform, payload))?;
    Ok(vec![payload.into()])
}

pub(crate) fn suggestion_from(titles: &[&str], platform: Option<PlatformId>) -> Result<Suggestion> {
    let (first, rest) = titles.split_first().ok_or(FulfillmentError::Construction {
        kind: "Suggestion",
        field: "title",
    })?;
    let mut suggestion = match platform {
        Some(p) => Suggestion::for_platform(*first, p)?,
        None => Suggestion::new(*first)?,
    };
    for title in rest {
        suggestion.add_reply(*title)?;
    }
    Ok(suggestion)
}
