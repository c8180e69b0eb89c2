// The two adapters are structurally parallel; every check here runs against
// both so a fix applied to one format cannot silently miss the other.

use fulfillment_context::ContextStore;
use fulfillment_core::{Dialect, PlatformId};
use fulfillment_dialect::{adapter_for, DialectAdapter, Outbound, RequestModel, ResponseBody};
use fulfillment_rich::{Card, CardOptions, ResponseItem, Text};
use serde_json::{json, Value};

const SESSION: &str = "projects/parity/agent/sessions/42";

/// Build an equivalent inbound body in either format.
fn body(dialect: Dialect, source: &str, contexts: &[(&str, u32)], messages: Vec<Value>) -> Value {
    match dialect {
        Dialect::V1 => json!({
            "id": "r-42",
            "lang": "en",
            "sessionId": "42",
            "originalRequest": {"source": source, "data": {}},
            "result": {
                "resolvedQuery": "what's the weather",
                "action": "weather.get",
                "parameters": {"city": "Rome"},
                "metadata": {"intentName": "weather"},
                "contexts": contexts
                    .iter()
                    .map(|(name, lifespan)| json!({"name": name, "lifespan": lifespan}))
                    .collect::<Vec<_>>(),
                "fulfillment": {"messages": messages}
            }
        }),
        Dialect::V2 => json!({
            "responseId": "r-42",
            "session": SESSION,
            "queryResult": {
                "queryText": "what's the weather",
                "action": "weather.get",
                "parameters": {"city": "Rome"},
                "languageCode": "en",
                "intent": {"displayName": "weather"},
                "outputContexts": contexts
                    .iter()
                    .map(|(name, lifespan)| json!({
                        "name": format!("{SESSION}/contexts/{name}"),
                        "lifespanCount": lifespan
                    }))
                    .collect::<Vec<_>>(),
                "fulfillmentMessages": messages
            },
            "originalDetectIntentRequest": {"source": source, "payload": {}}
        }),
    }
}

/// A plain text console message and an unknown one, in either format.
fn console_messages(dialect: Dialect) -> Vec<Value> {
    match dialect {
        Dialect::V1 => vec![
            json!({"type": 0, "speech": "from the console"}),
            json!({"type": 99}),
        ],
        Dialect::V2 => vec![
            json!({"text": {"text": ["from the console"]}}),
            json!({"listSelect": {}}),
        ],
    }
}

fn both() -> [Box<dyn DialectAdapter>; 2] {
    [adapter_for(Dialect::V1), adapter_for(Dialect::V2)]
}

fn build(
    adapter: &dyn DialectAdapter,
    req: &RequestModel,
    body: &ResponseBody,
    contexts: &ContextStore,
) -> Value {
    adapter
        .build_response(&Outbound {
            body,
            contexts,
            followup: None,
            end_conversation: false,
            request: req,
        })
        .unwrap()
}

fn contexts_key(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::V1 => "contextOut",
        Dialect::V2 => "outputContexts",
    }
}

#[test]
fn extraction_is_format_independent() {
    for adapter in both() {
        let d = adapter.dialect();
        let req = adapter
            .extract_request(&body(d, "slack", &[("weather", 2)], vec![]))
            .unwrap();
        assert_eq!(req.dialect, d);
        assert_eq!(req.intent.as_deref(), Some("weather"), "{d}");
        assert_eq!(req.action.as_deref(), Some("weather.get"), "{d}");
        assert_eq!(req.query.as_deref(), Some("what's the weather"), "{d}");
        assert_eq!(req.locale.as_deref(), Some("en"), "{d}");
        assert_eq!(req.response_id.as_deref(), Some("r-42"), "{d}");
        assert_eq!(req.parameters["city"], "Rome", "{d}");
        assert_eq!(req.request_source, PlatformId::Slack, "{d}");
        assert_eq!(req.contexts.len(), 1, "{d}");
        assert_eq!(req.contexts[0].name, "weather", "{d}");
        assert_eq!(req.contexts[0].lifespan_count, 2, "{d}");
    }
}

#[test]
fn unknown_source_passes_through() {
    for adapter in both() {
        let d = adapter.dialect();
        let req = adapter.extract_request(&body(d, "twitter", &[], vec![])).unwrap();
        assert_eq!(req.request_source, PlatformId::Other("twitter".into()), "{d}");
    }
}

#[test]
fn unknown_console_messages_are_skipped() {
    for adapter in both() {
        let d = adapter.dialect();
        let req = adapter
            .extract_request(&body(d, "slack", &[], console_messages(d)))
            .unwrap();
        assert_eq!(req.console_messages.len(), 1, "{d}");
        assert_eq!(
            req.console_messages[0].as_text().map(Text::text),
            Some("from the console"),
            "{d}"
        );
    }
}

#[test]
fn unchanged_inbound_contexts_are_elided() {
    for adapter in both() {
        let d = adapter.dialect();
        let req = adapter
            .extract_request(&body(d, "slack", &[("weather", 2), ("city", 1)], vec![]))
            .unwrap();
        let mut contexts = ContextStore::from_inbound(req.contexts.clone());
        contexts.set("weather", Some(2), None).unwrap();
        contexts.delete("city").unwrap();

        let text = ResponseBody::Text(Text::new("ok").unwrap());
        let out = build(adapter.as_ref(), &req, &text, &contexts);
        let sent = out[contexts_key(d)].as_array().unwrap();
        assert_eq!(sent.len(), 1, "{d}: {out}");
        assert!(sent[0]["name"].as_str().unwrap().ends_with("city"), "{d}");
    }
}

#[test]
fn context_array_is_always_present() {
    for adapter in both() {
        let d = adapter.dialect();
        let req = adapter.extract_request(&body(d, "slack", &[], vec![])).unwrap();
        let text = ResponseBody::Text(Text::new("ok").unwrap());
        let out = build(adapter.as_ref(), &req, &text, &ContextStore::new());
        assert_eq!(out[contexts_key(d)], json!([]), "{d}");
    }
}

#[test]
fn single_text_shortcut_shapes() {
    for adapter in both() {
        let d = adapter.dialect();
        let req = adapter.extract_request(&body(d, "facebook", &[], vec![])).unwrap();
        let text = ResponseBody::Text(Text::new("Welcome!").unwrap());
        let out = build(adapter.as_ref(), &req, &text, &ContextStore::new());
        let expected = match d {
            Dialect::V1 => json!({"speech": "Welcome!", "displayText": "Welcome!", "contextOut": []}),
            Dialect::V2 => json!({"fulfillmentText": "Welcome!", "outputContexts": []}),
        };
        assert_eq!(out, expected);
    }
}

#[test]
fn card_buttons_match_across_formats() {
    let card: ResponseItem = Card::with_options(CardOptions {
        title: Some("t".into()),
        button_text: Some("open".into()),
        button_url: Some("https://example.com".into()),
        ..Default::default()
    })
    .unwrap()
    .into();

    for adapter in both() {
        let d = adapter.dialect();
        let generic = adapter.render(&card, &PlatformId::Facebook).unwrap();
        let google = adapter.render(&card, &PlatformId::ActionsOnGoogle).unwrap();
        match d {
            Dialect::V1 => {
                assert_eq!(generic["buttons"][0]["postback"], "https://example.com");
                assert_eq!(google["buttons"][0]["openUrlAction"]["url"], "https://example.com");
            }
            Dialect::V2 => {
                assert_eq!(generic["card"]["buttons"][0]["postback"], "https://example.com");
                assert_eq!(
                    google["basicCard"]["buttons"][0]["openUriAction"]["uri"],
                    "https://example.com"
                );
            }
        }
    }
}
