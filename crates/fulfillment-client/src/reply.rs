use fulfillment_rich::{Card, Image, Payload, ResponseItem, Suggestion, Text};

use crate::conversation::Conversation;

/// Anything [`WebhookClient::add`](crate::WebhookClient::add) accepts.
#[derive(Debug)]
pub enum Reply {
    /// Becomes a [`Text`]; validated when added.
    Text(String),
    Item(ResponseItem),
    Many(Vec<Reply>),
    Conversation(Box<dyn Conversation>),
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<ResponseItem> for Reply {
    fn from(item: ResponseItem) -> Self {
        Reply::Item(item)
    }
}

macro_rules! reply_from_item {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Reply {
            fn from(item: $ty) -> Self {
                Reply::Item(item.into())
            }
        })*
    };
}

reply_from_item!(Text, Card, Image, Suggestion, Payload);

impl<T: Into<Reply>> From<Vec<T>> for Reply {
    fn from(items: Vec<T>) -> Self {
        Reply::Many(items.into_iter().map(Into::into).collect())
    }
}

impl From<Box<dyn Conversation>> for Reply {
    fn from(conv: Box<dyn Conversation>) -> Self {
        Reply::Conversation(conv)
    }
}
