//! Shared helpers for the JSON construction path and platform tagging.

use fulfillment_core::{FulfillmentError, PlatformId, Result};
use serde_json::{Map, Value};

/// Read an optional string field; any non-string, non-null value is a type error.
pub(crate) fn opt_str(obj: &Map<String, Value>, field: &'static str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(FulfillmentError::InvalidFieldType {
            field,
            expected: "string",
        }),
    }
}

/// Read an optional `platform` field, accepting either naming convention.
pub(crate) fn opt_platform(obj: &Map<String, Value>) -> Result<Option<PlatformId>> {
    Ok(opt_str(obj, "platform")?.map(|s| PlatformId::from(s.as_str())))
}

/// Reject a platform pin that cannot carry rich messages.
pub(crate) fn check_rich(platform: Option<PlatformId>) -> Result<Option<PlatformId>> {
    match platform {
        Some(p) if !p.is_rich_capable() => Err(FulfillmentError::UnsupportedPlatform {
            platform: p.to_string(),
        }),
        other => Ok(other),
    }
}

/// Require a non-empty primary field.
pub(crate) fn required(
    value: Option<String>,
    kind: &'static str,
    field: &'static str,
) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(FulfillmentError::Construction { kind, field }),
    }
}

/// A pinned item only renders for its own platform.
pub(crate) fn pin_matches(pin: Option<&PlatformId>, target: &PlatformId) -> bool {
    pin.map_or(true, |p| p == target)
}

/// Tag a v1 message with the target's v1 name when the target is rich-capable.
pub(crate) fn tag_v1(message: &mut Map<String, Value>, target: &PlatformId) {
    if target.is_rich_capable() {
        if let Some(name) = target.to_v1_name() {
            message.insert("platform".into(), Value::String(name.to_string()));
        }
    }
}

/// Tag a v2 message with the target's v2 name when the target is rich-capable.
pub(crate) fn tag_v2(message: &mut Map<String, Value>, target: &PlatformId) {
    if target.is_rich_capable() {
        message.insert("platform".into(), Value::String(target.to_v2_name().to_string()));
    }
}

/// Object form of a construction input, or a type error naming the expected shape.
pub(crate) fn as_object<'a>(
    value: &'a Value,
    field: &'static str,
) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or(FulfillmentError::InvalidFieldType {
        field,
        expected: "string or object",
    })
}
