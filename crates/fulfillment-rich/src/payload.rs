use fulfillment_core::{FulfillmentError, PlatformId, Result};
use serde_json::{Map, Value};

use crate::fields::{as_object, opt_str};
use crate::item::RichResponse;

/// A raw, platform-specific payload.
///
/// Never rendered into the message list: the client merges
/// [`Payload::envelope`] into the top level of the response instead. The
/// platform is mandatory and is not checked against the rich-capable set, so
/// passthrough integrations can receive payloads too.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    platform: PlatformId,
    payload: Value,
}

impl Payload {
    /// The payload is deep-copied; later changes to `payload` do not leak in.
    pub fn new(platform: PlatformId, payload: &Value) -> Result<Self> {
        Ok(Self {
            platform,
            payload: checked(payload)?,
        })
    }

    pub fn platform(&self) -> &PlatformId {
        &self.platform
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: &Value) -> Result<&mut Self> {
        self.payload = checked(payload)?;
        Ok(self)
    }

    pub fn set_platform(&mut self, platform: PlatformId) -> &mut Self {
        self.platform = platform;
        self
    }

    /// `{<platform key>: payload}` for `target`, or `None` for other platforms.
    pub fn envelope(&self, target: &PlatformId) -> Option<Value> {
        if &self.platform != target {
            return None;
        }
        let mut envelope = Map::new();
        envelope.insert(self.platform.payload_key().to_string(), self.payload.clone());
        Some(Value::Object(envelope))
    }
}

fn checked(payload: &Value) -> Result<Value> {
    if payload.is_null() {
        return Err(FulfillmentError::Construction {
            kind: "Payload",
            field: "payload",
        });
    }
    Ok(payload.clone())
}

impl TryFrom<&Value> for Payload {
    type Error = FulfillmentError;

    /// `{"platform": "FACEBOOK", "payload": {...}}`; both fields are required.
    fn try_from(value: &Value) -> Result<Self> {
        let obj = match value {
            Value::Null => {
                return Err(FulfillmentError::Construction {
                    kind: "Payload",
                    field: "platform",
                })
            }
            other => as_object(other, "payload")?,
        };
        let platform = opt_str(obj, "platform")?.ok_or(FulfillmentError::Construction {
            kind: "Payload",
            field: "platform",
        })?;
        let payload = obj.get("payload").unwrap_or(&Value::Null);
        Self::new(PlatformId::from(platform.as_str()), payload)
    }
}

impl RichResponse for Payload {
    fn platform(&self) -> Option<&PlatformId> {
        Some(&self.platform)
    }

    fn render_v1(&self, _target: &PlatformId) -> Option<Value> {
        None
    }

    fn render_v2(&self, _target: &PlatformId) -> Option<Value> {
        None
    }
}
