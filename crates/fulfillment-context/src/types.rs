use fulfillment_core::{FulfillmentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::path::SessionPath;

/// Lifespan given to a context created without an explicit one.
pub const DEFAULT_LIFESPAN: u32 = 5;

/// A conversation context as seen by handler code.
///
/// `name` is always the short, format-independent name. A lifespan of zero
/// tells the platform to expire the context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub lifespan_count: u32,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Context {
    /// Parse a v1 `contexts[]` entry: `{name, lifespan, parameters}`.
    pub fn from_v1(value: &Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?;
        Some(Self {
            name: name.to_string(),
            lifespan_count: lifespan_of(value.get("lifespan")),
            parameters: parameters_of(value.get("parameters")),
        })
    }

    /// Parse a v2 `outputContexts[]` entry, stripping the session prefix.
    pub fn from_v2(value: &Value, session: &SessionPath) -> Option<Self> {
        let full = value.get("name")?.as_str()?;
        Some(Self {
            name: session.short_name(full).to_string(),
            lifespan_count: lifespan_of(value.get("lifespanCount")),
            parameters: parameters_of(value.get("parameters")),
        })
    }

    /// v1 `contextOut[]` entry.
    pub fn to_v1(&self) -> Value {
        let mut out = json!({ "name": self.name, "lifespan": self.lifespan_count });
        if !self.parameters.is_empty() {
            out["parameters"] = Value::Object(self.parameters.clone());
        }
        out
    }

    /// v2 `outputContexts[]` entry with the session-qualified name.
    pub fn to_v2(&self, session: &SessionPath) -> Value {
        let mut out = json!({
            "name": session.context_name(&self.name),
            "lifespanCount": self.lifespan_count,
        });
        if !self.parameters.is_empty() {
            out["parameters"] = Value::Object(self.parameters.clone());
        }
        out
    }
}

fn lifespan_of(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .map(|n| n.min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

fn parameters_of(value: Option<&Value>) -> Map<String, Value> {
    value.and_then(Value::as_object).cloned().unwrap_or_default()
}

/// Arguments to [`ContextStore::set_context`](crate::ContextStore::set_context).
///
/// `None` fields leave the stored value untouched on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextInput {
    pub name: String,
    pub lifespan: Option<u32>,
    pub parameters: Option<Map<String, Value>>,
}

impl ContextInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn lifespan(mut self, lifespan: u32) -> Self {
        self.lifespan = Some(lifespan);
        self
    }

    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

impl From<&str> for ContextInput {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl TryFrom<&Value> for ContextInput {
    type Error = FulfillmentError;

    /// `"name"` or `{"name", "lifespan" | "lifespanCount", "parameters"}`.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::new(name.as_str())),
            Value::Object(obj) => {
                let name = obj.get("name").and_then(Value::as_str).ok_or_else(|| {
                    FulfillmentError::InvalidContext("context name must be a string".into())
                })?;
                let lifespan = obj
                    .get("lifespan")
                    .or_else(|| obj.get("lifespanCount"))
                    .and_then(Value::as_u64)
                    .map(|n| n.min(u32::MAX as u64) as u32);
                Ok(Self {
                    name: name.to_string(),
                    lifespan,
                    parameters: obj.get("parameters").and_then(Value::as_object).cloned(),
                })
            }
            _ => Err(FulfillmentError::InvalidContext(
                "context must be a name or an object".into(),
            )),
        }
    }
}
