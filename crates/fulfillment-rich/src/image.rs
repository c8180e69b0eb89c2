use fulfillment_core::{FulfillmentError, PlatformId, Result};
use serde_json::{json, Map, Value};

use crate::fields::{as_object, check_rich, opt_platform, opt_str, pin_matches, required, tag_v1, tag_v2};
use crate::item::RichResponse;

/// Accessibility text sent with voice-assistant images when none is set.
pub const DEFAULT_ACCESSIBILITY_TEXT: &str = "accessibility text";

/// A standalone image response.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    image_url: String,
    accessibility_text: Option<String>,
    platform: Option<PlatformId>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    pub image_url: Option<String>,
    pub accessibility_text: Option<String>,
    pub platform: Option<PlatformId>,
}

impl Image {
    pub fn new(image_url: impl Into<String>) -> Result<Self> {
        Self::with_options(ImageOptions {
            image_url: Some(image_url.into()),
            ..Default::default()
        })
    }

    pub fn with_options(opts: ImageOptions) -> Result<Self> {
        Ok(Self {
            image_url: required(opts.image_url, "Image", "imageUrl")?,
            accessibility_text: opts.accessibility_text,
            platform: check_rich(opts.platform)?,
        })
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn accessibility_text(&self) -> &str {
        self.accessibility_text
            .as_deref()
            .unwrap_or(DEFAULT_ACCESSIBILITY_TEXT)
    }

    pub fn set_image(&mut self, image_url: impl Into<String>) -> Result<&mut Self> {
        self.image_url = required(Some(image_url.into()), "Image", "imageUrl")?;
        Ok(self)
    }

    pub fn set_accessibility_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.accessibility_text = Some(text.into());
        self
    }

    pub fn set_platform(&mut self, platform: PlatformId) -> Result<&mut Self> {
        self.platform = check_rich(Some(platform))?;
        Ok(self)
    }
}

impl TryFrom<&Value> for Image {
    type Error = FulfillmentError;

    /// `"https://…"` or `{"imageUrl", "accessibilityText", "platform"}`.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Self::with_options(ImageOptions::default()),
            Value::String(s) => Self::new(s.as_str()),
            other => {
                let obj = as_object(other, "image")?;
                Self::with_options(ImageOptions {
                    image_url: opt_str(obj, "imageUrl")?,
                    accessibility_text: opt_str(obj, "accessibilityText")?,
                    platform: opt_platform(obj)?,
                })
            }
        }
    }
}

impl RichResponse for Image {
    fn platform(&self) -> Option<&PlatformId> {
        self.platform.as_ref()
    }

    fn render_v1(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            return Some(json!({
                "type": "basic_card",
                "platform": "google",
                "image": {
                    "url": self.image_url,
                    "accessibilityText": self.accessibility_text(),
                }
            }));
        }
        let mut message = Map::new();
        message.insert("type".into(), json!(3));
        message.insert("imageUrl".into(), json!(self.image_url));
        tag_v1(&mut message, target);
        Some(Value::Object(message))
    }

    fn render_v2(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            return Some(json!({
                "basicCard": {
                    "image": {
                        "imageUri": self.image_url,
                        "accessibilityText": self.accessibility_text(),
                    }
                },
                "platform": "ACTIONS_ON_GOOGLE"
            }));
        }
        let mut message = Map::new();
        message.insert("image".into(), json!({ "imageUri": self.image_url }));
        tag_v2(&mut message, target);
        Some(Value::Object(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/cat.png";

    #[test]
    fn missing_url_fails() {
        assert!(Image::try_from(&Value::Null).is_err());
        assert!(Image::try_from(&json!({"accessibilityText": "cat"})).is_err());
        assert!(Image::new("").is_err());
    }

    #[test]
    fn voice_assistant_image_is_basic_card_with_image_only() {
        let img = Image::new(URL).unwrap();
        assert_eq!(
            img.render_v1(&PlatformId::ActionsOnGoogle).unwrap(),
            json!({
                "type": "basic_card",
                "platform": "google",
                "image": {"url": URL, "accessibilityText": DEFAULT_ACCESSIBILITY_TEXT}
            })
        );
        let v2 = img.render_v2(&PlatformId::ActionsOnGoogle).unwrap();
        assert_eq!(v2["basicCard"]["image"]["imageUri"], URL);
        assert!(v2["basicCard"].get("title").is_none());
    }

    #[test]
    fn generic_image_shapes() {
        let img = Image::new(URL).unwrap();
        assert_eq!(
            img.render_v1(&PlatformId::Kik).unwrap(),
            json!({"type": 3, "imageUrl": URL, "platform": "kik"})
        );
        assert_eq!(
            img.render_v2(&PlatformId::Line).unwrap(),
            json!({"image": {"imageUri": URL}, "platform": "LINE"})
        );
    }

    #[test]
    fn custom_accessibility_text() {
        let mut img = Image::new(URL).unwrap();
        img.set_accessibility_text("a cat");
        let v1 = img.render_v1(&PlatformId::ActionsOnGoogle).unwrap();
        assert_eq!(v1["image"]["accessibilityText"], "a cat");
    }
}
