use fulfillment_core::{FulfillmentError, PlatformId, Result};
use serde_json::{json, Map, Value};

use crate::fields::{as_object, check_rich, opt_platform, opt_str, pin_matches, required, tag_v1, tag_v2};
use crate::image::DEFAULT_ACCESSIBILITY_TEXT;
use crate::item::RichResponse;

/// A link button attached to a card. Text and URL always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub url: String,
}

/// A card with a title and optional body text, image and button.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    title: String,
    text: Option<String>,
    image_url: Option<String>,
    button: Option<Button>,
    platform: Option<PlatformId>,
}

#[derive(Debug, Clone, Default)]
pub struct CardOptions {
    pub title: Option<String>,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
    pub platform: Option<PlatformId>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Result<Self> {
        Self::with_options(CardOptions {
            title: Some(title.into()),
            ..Default::default()
        })
    }

    pub fn with_options(opts: CardOptions) -> Result<Self> {
        Ok(Self {
            title: required(opts.title, "Card", "title")?,
            text: opts.text,
            image_url: opts.image_url,
            button: button_from(opts.button_text, opts.button_url)?,
            platform: check_rich(opts.platform)?,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn button(&self) -> Option<&Button> {
        self.button.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<&mut Self> {
        self.title = required(Some(title.into()), "Card", "title")?;
        Ok(self)
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    pub fn set_image(&mut self, image_url: impl Into<String>) -> &mut Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set or clear the button. Giving only one of text/url is an error.
    pub fn set_button(&mut self, text: Option<String>, url: Option<String>) -> Result<&mut Self> {
        self.button = button_from(text, url)?;
        Ok(self)
    }

    pub fn set_platform(&mut self, platform: PlatformId) -> Result<&mut Self> {
        self.platform = check_rich(Some(platform))?;
        Ok(self)
    }

    fn basic_card_v1(&self) -> Value {
        let mut card = Map::new();
        card.insert("type".into(), json!("basic_card"));
        card.insert("platform".into(), json!("google"));
        card.insert("title".into(), json!(self.title));
        if let Some(ref text) = self.text {
            card.insert("formattedText".into(), json!(text));
        }
        if let Some(ref url) = self.image_url {
            card.insert(
                "image".into(),
                json!({"url": url, "accessibilityText": DEFAULT_ACCESSIBILITY_TEXT}),
            );
        }
        // The assistant rejects a basic card with no visible body.
        if self.text.is_none() && self.image_url.is_none() {
            card.insert("formattedText".into(), json!(" "));
        }
        if let Some(ref b) = self.button {
            card.insert(
                "buttons".into(),
                json!([{"title": b.text, "openUrlAction": {"url": b.url}}]),
            );
        }
        Value::Object(card)
    }

    fn basic_card_v2(&self) -> Value {
        let mut card = Map::new();
        card.insert("title".into(), json!(self.title));
        if let Some(ref text) = self.text {
            card.insert("formattedText".into(), json!(text));
        }
        if let Some(ref url) = self.image_url {
            card.insert(
                "image".into(),
                json!({"imageUri": url, "accessibilityText": DEFAULT_ACCESSIBILITY_TEXT}),
            );
        }
        if self.text.is_none() && self.image_url.is_none() {
            card.insert("formattedText".into(), json!(" "));
        }
        if let Some(ref b) = self.button {
            card.insert(
                "buttons".into(),
                json!([{"title": b.text, "openUriAction": {"uri": b.url}}]),
            );
        }
        json!({"basicCard": card, "platform": "ACTIONS_ON_GOOGLE"})
    }

    /// Generic button list; Slack always wants the array, even empty.
    fn generic_buttons(&self, target: &PlatformId) -> Option<Value> {
        match self.button {
            Some(ref b) => Some(json!([{"text": b.text, "postback": b.url}])),
            None if *target == PlatformId::Slack => Some(json!([])),
            None => None,
        }
    }
}

fn button_from(text: Option<String>, url: Option<String>) -> Result<Option<Button>> {
    match (text, url) {
        (Some(text), Some(url)) => Ok(Some(Button { text, url })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(FulfillmentError::Construction {
            kind: "Card button",
            field: "button url",
        }),
        (None, Some(_)) => Err(FulfillmentError::Construction {
            kind: "Card button",
            field: "button text",
        }),
    }
}

impl TryFrom<&Value> for Card {
    type Error = FulfillmentError;

    /// `"title"` or `{"title", "text", "imageUrl", "buttonText", "buttonUrl", "platform"}`.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Self::with_options(CardOptions::default()),
            Value::String(s) => Self::new(s.as_str()),
            other => {
                let obj = as_object(other, "card")?;
                Self::with_options(CardOptions {
                    title: opt_str(obj, "title")?,
                    text: opt_str(obj, "text")?,
                    image_url: opt_str(obj, "imageUrl")?,
                    button_text: opt_str(obj, "buttonText")?,
                    button_url: opt_str(obj, "buttonUrl")?,
                    platform: opt_platform(obj)?,
                })
            }
        }
    }
}

impl RichResponse for Card {
    fn platform(&self) -> Option<&PlatformId> {
        self.platform.as_ref()
    }

    fn render_v1(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            return Some(self.basic_card_v1());
        }
        let mut card = Map::new();
        card.insert("type".into(), json!(1));
        card.insert("title".into(), json!(self.title));
        if let Some(ref text) = self.text {
            card.insert("subtitle".into(), json!(text));
        }
        if let Some(ref url) = self.image_url {
            card.insert("imageUrl".into(), json!(url));
        }
        if let Some(buttons) = self.generic_buttons(target) {
            card.insert("buttons".into(), buttons);
        }
        tag_v1(&mut card, target);
        Some(Value::Object(card))
    }

    fn render_v2(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            return Some(self.basic_card_v2());
        }
        let mut card = Map::new();
        card.insert("title".into(), json!(self.title));
        if let Some(ref text) = self.text {
            card.insert("subtitle".into(), json!(text));
        }
        if let Some(ref url) = self.image_url {
            card.insert("imageUri".into(), json!(url));
        }
        if let Some(buttons) = self.generic_buttons(target) {
            card.insert("buttons".into(), buttons);
        }
        let mut message = Map::new();
        message.insert("card".into(), Value::Object(card));
        tag_v2(&mut message, target);
        Some(Value::Object(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_with_button() -> Card {
        let mut card = Card::new("Weather").unwrap();
        card.set_text("Sunny all week")
            .set_button(Some("Forecast".into()), Some("https://example.com".into()))
            .unwrap();
        card
    }

    #[test]
    fn button_requires_both_text_and_url() {
        let mut card = Card::new("t").unwrap();
        assert!(card.set_button(Some("t".into()), None).is_err());
        assert!(card.set_button(None, Some("u".into())).is_err());
        assert!(card.set_button(Some("t".into()), Some("u".into())).is_ok());
        assert!(card.set_button(None, None).is_ok());
        assert!(card.button().is_none());
    }

    #[test]
    fn json_button_with_only_text_fails() {
        let err = Card::try_from(&json!({"title": "t", "buttonText": "go"})).unwrap_err();
        assert!(matches!(err, FulfillmentError::Construction { .. }));
    }

    #[test]
    fn missing_title_fails_in_both_forms() {
        assert!(Card::try_from(&Value::Null).is_err());
        assert!(Card::try_from(&json!({"text": "body"})).is_err());
    }

    #[test]
    fn button_fields_per_dialect_and_platform() {
        let card = card_with_button();

        let v1 = card.render_v1(&PlatformId::Facebook).unwrap();
        assert_eq!(v1["buttons"][0]["postback"], "https://example.com");
        assert_eq!(v1["buttons"][0]["text"], "Forecast");

        let v1_aog = card.render_v1(&PlatformId::ActionsOnGoogle).unwrap();
        assert_eq!(v1_aog["buttons"][0]["openUrlAction"]["url"], "https://example.com");
        assert_eq!(v1_aog["buttons"][0]["title"], "Forecast");

        let v2 = card.render_v2(&PlatformId::Facebook).unwrap();
        assert_eq!(v2["card"]["buttons"][0]["postback"], "https://example.com");

        let v2_aog = card.render_v2(&PlatformId::ActionsOnGoogle).unwrap();
        assert_eq!(
            v2_aog["basicCard"]["buttons"][0]["openUriAction"]["uri"],
            "https://example.com"
        );
    }

    #[test]
    fn generic_card_shapes() {
        let card = card_with_button();
        assert_eq!(
            card.render_v1(&PlatformId::Telegram).unwrap(),
            json!({
                "type": 1,
                "title": "Weather",
                "subtitle": "Sunny all week",
                "buttons": [{"text": "Forecast", "postback": "https://example.com"}],
                "platform": "telegram"
            })
        );
        assert_eq!(
            card.render_v2(&PlatformId::Unspecified).unwrap(),
            json!({
                "card": {
                    "title": "Weather",
                    "subtitle": "Sunny all week",
                    "buttons": [{"text": "Forecast", "postback": "https://example.com"}]
                }
            })
        );
    }

    #[test]
    fn slack_always_gets_buttons_array() {
        let card = Card::new("t").unwrap();
        assert_eq!(card.render_v1(&PlatformId::Slack).unwrap()["buttons"], json!([]));
        assert_eq!(card.render_v2(&PlatformId::Slack).unwrap()["card"]["buttons"], json!([]));
        assert!(card.render_v2(&PlatformId::Facebook).unwrap()["card"].get("buttons").is_none());
    }

    #[test]
    fn basic_card_without_body_gets_space_placeholder() {
        let card = Card::new("t").unwrap();
        assert_eq!(card.render_v1(&PlatformId::ActionsOnGoogle).unwrap()["formattedText"], " ");
        assert_eq!(
            card.render_v2(&PlatformId::ActionsOnGoogle).unwrap()["basicCard"]["formattedText"],
            " "
        );

        let mut with_image = Card::new("t").unwrap();
        with_image.set_image("https://example.com/a.png");
        let v1 = with_image.render_v1(&PlatformId::ActionsOnGoogle).unwrap();
        assert!(v1.get("formattedText").is_none());
        assert_eq!(v1["image"]["accessibilityText"], DEFAULT_ACCESSIBILITY_TEXT);
    }
}
