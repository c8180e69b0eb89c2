use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{FulfillmentError, Result};

/// Webhook format version, detected from the inbound body.
///
/// v1 carries `result`, v2 carries `queryResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    V1,
    V2,
}

impl Dialect {
    /// Detect the format from a raw webhook body.
    pub fn detect(body: &Value) -> Result<Self> {
        if body.get("result").is_some() {
            Ok(Dialect::V1)
        } else if body.get("queryResult").is_some() {
            Ok(Dialect::V2)
        } else {
            Err(FulfillmentError::UnknownDialect)
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::V1 => write!(f, "v1"),
            Dialect::V2 => write!(f, "v2"),
        }
    }
}

/// An event that makes the agent immediately trigger another intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowupEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    /// Required by v2; filled from the request locale when unset.
    #[serde(
        default,
        rename = "languageCode",
        skip_serializing_if = "Option::is_none"
    )]
    pub language_code: Option<String>,
}

impl FollowupEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: None,
            language_code: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }

    /// Reject events without a usable name.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FulfillmentError::InvalidFollowupEvent);
        }
        Ok(())
    }
}

impl From<&str> for FollowupEvent {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FollowupEvent {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl TryFrom<&Value> for FollowupEvent {
    type Error = FulfillmentError;

    /// Accepts `"name"` or `{"name": "...", "parameters": {...}, "languageCode": "..."}`.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => {
                let event = Self::new(name.as_str());
                event.validate()?;
                Ok(event)
            }
            Value::Object(obj) => {
                let name = obj
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or(FulfillmentError::InvalidFollowupEvent)?;
                let mut event = Self::new(name);
                event.validate()?;
                event.parameters = obj.get("parameters").and_then(Value::as_object).cloned();
                event.language_code = obj
                    .get("languageCode")
                    .and_then(Value::as_str)
                    .map(String::from);
                Ok(event)
            }
            _ => Err(FulfillmentError::InvalidFollowupEvent),
        }
    }
}
