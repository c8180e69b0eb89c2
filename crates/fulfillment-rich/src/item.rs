use fulfillment_core::{Dialect, PlatformId};
use serde_json::Value;

use crate::{Card, Image, Payload, Suggestion, Text};

/// Rendering capability shared by every response kind.
pub trait RichResponse {
    /// Platform this item is pinned to, if any.
    fn platform(&self) -> Option<&PlatformId>;

    /// v1 `messages[]` entry for `target`, or `None` when not applicable.
    fn render_v1(&self, target: &PlatformId) -> Option<Value>;

    /// v2 `fulfillmentMessages[]` entry for `target`, or `None` when not applicable.
    fn render_v2(&self, target: &PlatformId) -> Option<Value>;

    fn render(&self, dialect: Dialect, target: &PlatformId) -> Option<Value> {
        match dialect {
            Dialect::V1 => self.render_v1(target),
            Dialect::V2 => self.render_v2(target),
        }
    }
}

/// One buffered response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseItem {
    Text(Text),
    Card(Card),
    Image(Image),
    Suggestion(Suggestion),
    Payload(Payload),
}

impl ResponseItem {
    /// Short lowercase name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseItem::Text(_) => "text",
            ResponseItem::Card(_) => "card",
            ResponseItem::Image(_) => "image",
            ResponseItem::Suggestion(_) => "suggestion",
            ResponseItem::Payload(_) => "payload",
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            ResponseItem::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            ResponseItem::Payload(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_suggestion_mut(&mut self) -> Option<&mut Suggestion> {
        match self {
            ResponseItem::Suggestion(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ResponseItem::Text(_))
    }

    fn inner(&self) -> &dyn RichResponse {
        match self {
            ResponseItem::Text(t) => t,
            ResponseItem::Card(c) => c,
            ResponseItem::Image(i) => i,
            ResponseItem::Suggestion(s) => s,
            ResponseItem::Payload(p) => p,
        }
    }
}

impl RichResponse for ResponseItem {
    fn platform(&self) -> Option<&PlatformId> {
        self.inner().platform()
    }

    fn render_v1(&self, target: &PlatformId) -> Option<Value> {
        self.inner().render_v1(target)
    }

    fn render_v2(&self, target: &PlatformId) -> Option<Value> {
        self.inner().render_v2(target)
    }
}

impl From<Text> for ResponseItem {
    fn from(t: Text) -> Self {
        ResponseItem::Text(t)
    }
}

impl From<Card> for ResponseItem {
    fn from(c: Card) -> Self {
        ResponseItem::Card(c)
    }
}

impl From<Image> for ResponseItem {
    fn from(i: Image) -> Self {
        ResponseItem::Image(i)
    }
}

impl From<Suggestion> for ResponseItem {
    fn from(s: Suggestion) -> Self {
        ResponseItem::Suggestion(s)
    }
}

impl From<Payload> for ResponseItem {
    fn from(p: Payload) -> Self {
        ResponseItem::Payload(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pinned_items(platform: PlatformId) -> Vec<ResponseItem> {
        vec![
            Text::with_options(crate::TextOptions {
                text: Some("hi".into()),
                platform: Some(platform.clone()),
                ..Default::default()
            })
            .unwrap()
            .into(),
            Card::with_options(crate::CardOptions {
                title: Some("card".into()),
                platform: Some(platform.clone()),
                ..Default::default()
            })
            .unwrap()
            .into(),
            Image::with_options(crate::ImageOptions {
                image_url: Some("https://example.com/a.png".into()),
                platform: Some(platform.clone()),
                ..Default::default()
            })
            .unwrap()
            .into(),
            Suggestion::try_from(&json!({"title": "yes", "platform": platform.to_v2_name()}))
                .unwrap()
                .into(),
        ]
    }

    #[test]
    fn pinned_items_render_only_for_their_platform() {
        let pins = [PlatformId::Facebook, PlatformId::ActionsOnGoogle, PlatformId::Slack];
        for pin in &pins {
            for item in pinned_items(pin.clone()) {
                for target in &pins {
                    for dialect in [Dialect::V1, Dialect::V2] {
                        let rendered = item.render(dialect, target);
                        if target == pin {
                            assert!(rendered.is_some(), "{} {dialect} {target}", item.kind());
                        } else {
                            assert!(rendered.is_none(), "{} {dialect} {target}", item.kind());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn payload_never_renders_as_message() {
        let item: ResponseItem = Payload::new(PlatformId::Slack, &json!({"x": 1})).unwrap().into();
        assert!(item.render_v1(&PlatformId::Slack).is_none());
        assert!(item.render_v2(&PlatformId::Slack).is_none());
        assert_eq!(item.platform(), Some(&PlatformId::Slack));
    }
}
