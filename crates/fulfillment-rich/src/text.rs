use fulfillment_core::{PlatformId, Result};
use serde_json::{json, Map, Value};

use crate::fields::{as_object, check_rich, opt_platform, opt_str, pin_matches, required, tag_v1, tag_v2};
use crate::item::RichResponse;

/// A plain text (or spoken) response.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    text: String,
    /// Spoken variant for the voice assistant; never replaces the displayed text.
    ssml: Option<String>,
    platform: Option<PlatformId>,
}

#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub text: Option<String>,
    pub ssml: Option<String>,
    pub platform: Option<PlatformId>,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        Self::with_options(TextOptions {
            text: Some(text.into()),
            ..Default::default()
        })
    }

    pub fn with_options(opts: TextOptions) -> Result<Self> {
        Ok(Self {
            text: required(opts.text, "Text", "text")?,
            ssml: opts.ssml,
            platform: check_rich(opts.platform)?,
        })
    }

    /// The single-space line the voice assistant needs before any other content.
    pub fn placeholder() -> Self {
        Self {
            text: " ".to_string(),
            ssml: None,
            platform: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ssml(&self) -> Option<&str> {
        self.ssml.as_deref()
    }

    /// What the voice assistant speaks: SSML when set, otherwise the text.
    pub fn spoken(&self) -> &str {
        self.ssml.as_deref().unwrap_or(&self.text)
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<&mut Self> {
        self.text = required(Some(text.into()), "Text", "text")?;
        Ok(self)
    }

    pub fn set_ssml(&mut self, ssml: impl Into<String>) -> &mut Self {
        self.ssml = Some(ssml.into());
        self
    }

    pub fn set_platform(&mut self, platform: PlatformId) -> Result<&mut Self> {
        self.platform = check_rich(Some(platform))?;
        Ok(self)
    }
}

impl TryFrom<&Value> for Text {
    type Error = fulfillment_core::FulfillmentError;

    /// `"hello"` or `{"text": "hello", "ssml": "<speak>…</speak>", "platform": "FACEBOOK"}`.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Self::with_options(TextOptions::default()),
            Value::String(s) => Self::new(s.as_str()),
            other => {
                let obj = as_object(other, "text")?;
                Self::with_options(TextOptions {
                    text: opt_str(obj, "text")?,
                    ssml: opt_str(obj, "ssml")?,
                    platform: opt_platform(obj)?,
                })
            }
        }
    }
}

impl RichResponse for Text {
    fn platform(&self) -> Option<&PlatformId> {
        self.platform.as_ref()
    }

    fn render_v1(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            return Some(json!({
                "type": "simple_response",
                "platform": "google",
                "textToSpeech": self.spoken(),
                "displayText": self.text,
            }));
        }
        let mut message = Map::new();
        message.insert("type".into(), json!(0));
        message.insert("speech".into(), json!(self.text));
        tag_v1(&mut message, target);
        Some(Value::Object(message))
    }

    fn render_v2(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            return Some(json!({
                "platform": "ACTIONS_ON_GOOGLE",
                "simpleResponses": {
                    "simpleResponses": [{
                        "textToSpeech": self.spoken(),
                        "displayText": self.text,
                    }]
                }
            }));
        }
        let mut message = Map::new();
        message.insert("text".into(), json!({ "text": [self.text] }));
        tag_v2(&mut message, target);
        Some(Value::Object(message))
    }
}
