use fulfillment_core::{FulfillmentError, PlatformId, Result};
use serde_json::{json, Map, Value};

use crate::fields::{as_object, check_rich, opt_platform, opt_str, pin_matches, required, tag_v1, tag_v2};
use crate::item::RichResponse;

/// Suggestion chips / quick replies.
///
/// Holds an ordered list of replies because consecutive suggestions for the
/// same platform merge into a single item on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    replies: Vec<String>,
    platform: Option<PlatformId>,
}

impl Suggestion {
    pub fn new(title: impl Into<String>) -> Result<Self> {
        Self::build(Some(title.into()), None)
    }

    /// Suggestion pinned to one platform.
    pub fn for_platform(title: impl Into<String>, platform: PlatformId) -> Result<Self> {
        Self::build(Some(title.into()), Some(platform))
    }

    fn build(title: Option<String>, platform: Option<PlatformId>) -> Result<Self> {
        Ok(Self {
            replies: vec![required(title, "Suggestion", "title")?],
            platform: check_rich(platform)?,
        })
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    /// Replace all replies with a single one.
    pub fn set_reply(&mut self, title: impl Into<String>) -> Result<&mut Self> {
        self.replies = vec![required(Some(title.into()), "Suggestion", "title")?];
        Ok(self)
    }

    pub fn add_reply(&mut self, title: impl Into<String>) -> Result<&mut Self> {
        self.replies
            .push(required(Some(title.into()), "Suggestion", "title")?);
        Ok(self)
    }

    /// Append another suggestion's replies, keeping order.
    pub fn merge(&mut self, other: Suggestion) {
        self.replies.extend(other.replies);
    }

    pub fn set_platform(&mut self, platform: PlatformId) -> Result<&mut Self> {
        self.platform = check_rich(Some(platform))?;
        Ok(self)
    }
}

impl TryFrom<&Value> for Suggestion {
    type Error = FulfillmentError;

    /// `"reply"` or `{"title": "reply", "platform": "SLACK"}`.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Self::build(None, None),
            Value::String(s) => Self::new(s.as_str()),
            other => {
                let obj = as_object(other, "suggestion")?;
                Self::build(opt_str(obj, "title")?, opt_platform(obj)?)
            }
        }
    }
}

impl RichResponse for Suggestion {
    fn platform(&self) -> Option<&PlatformId> {
        self.platform.as_ref()
    }

    fn render_v1(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            let chips: Vec<Value> = self.replies.iter().map(|r| json!({"title": r})).collect();
            return Some(json!({
                "type": "suggestion_chips",
                "platform": "google",
                "suggestions": chips,
            }));
        }
        let mut message = Map::new();
        message.insert("type".into(), json!(2));
        message.insert("replies".into(), json!(self.replies));
        tag_v1(&mut message, target);
        Some(Value::Object(message))
    }

    fn render_v2(&self, target: &PlatformId) -> Option<Value> {
        if !pin_matches(self.platform.as_ref(), target) {
            return None;
        }
        if target.is_actions_on_google() {
            let chips: Vec<Value> = self.replies.iter().map(|r| json!({"title": r})).collect();
            return Some(json!({
                "suggestions": { "suggestions": chips },
                "platform": "ACTIONS_ON_GOOGLE",
            }));
        }
        let mut message = Map::new();
        message.insert("quickReplies".into(), json!({ "quickReplies": self.replies }));
        tag_v2(&mut message, target);
        Some(Value::Object(message))
    }
}
