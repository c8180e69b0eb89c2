use fulfillment_core::{FulfillmentError, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::path::SessionPath;
use crate::types::{Context, ContextInput, DEFAULT_LIFESPAN};

/// Contexts for one request: seeded from the inbound payload, mutated by the
/// handler, serialized once when the response is sent.
///
/// Iteration follows insertion order. Entries still equal to their inbound
/// form are never re-sent, since some platforms treat a re-sent context as a
/// lifespan reset.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    entries: Vec<Context>,
    /// Snapshot of what the platform sent, for no-op elision.
    inbound: Vec<Context>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with the contexts that arrived on the request.
    pub fn from_inbound(contexts: Vec<Context>) -> Self {
        let mut store = Self::new();
        for ctx in contexts {
            // Later duplicates win, matching keyed-object semantics.
            store.entries.retain(|c| c.name != ctx.name);
            store.inbound.retain(|c| c.name != ctx.name);
            store.entries.push(ctx.clone());
            store.inbound.push(ctx);
        }
        store
    }

    /// Create or partially update a context.
    ///
    /// A new context gets [`DEFAULT_LIFESPAN`] and empty parameters unless
    /// given; an existing one keeps any field passed as `None`.
    pub fn set(
        &mut self,
        name: &str,
        lifespan: Option<u32>,
        parameters: Option<Map<String, Value>>,
    ) -> Result<()> {
        self.set_context(ContextInput {
            name: name.to_string(),
            lifespan,
            parameters,
        })
    }

    pub fn set_context(&mut self, input: ContextInput) -> Result<()> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(FulfillmentError::InvalidContext(
                "context name must be provided".into(),
            ));
        }

        match self.entries.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                if let Some(lifespan) = input.lifespan {
                    existing.lifespan_count = lifespan;
                }
                if let Some(parameters) = input.parameters {
                    existing.parameters = parameters;
                }
                debug!(context = %name, lifespan = existing.lifespan_count, "context updated");
            }
            None => {
                let ctx = Context {
                    name: name.to_string(),
                    lifespan_count: input.lifespan.unwrap_or(DEFAULT_LIFESPAN),
                    parameters: input.parameters.unwrap_or_default(),
                };
                debug!(context = %name, lifespan = ctx.lifespan_count, "context created");
                self.entries.push(ctx);
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Context> {
        self.entries.iter().find(|c| c.name == name)
    }

    /// Expire a context: it stays in the store with lifespan zero so the
    /// platform is told to drop it.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.set(name, Some(0), None)
    }

    /// Forget a context entirely so nothing is sent for it. Exact name match.
    pub fn clear(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|c| c.name != name);
        self.entries.len() < before
    }

    /// Forget every context; the response will carry none.
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The inbound context of the same name, if the request carried one.
    pub fn inbound(&self, name: &str) -> Option<&Context> {
        self.inbound.iter().find(|c| c.name == name)
    }

    /// Contexts that differ from what the platform sent.
    pub fn outgoing(&self) -> impl Iterator<Item = &Context> {
        self.entries
            .iter()
            .filter(move |c| self.inbound(&c.name) != Some(*c))
    }

    pub fn to_v1_array(&self) -> Vec<Value> {
        self.outgoing().map(Context::to_v1).collect()
    }

    pub fn to_v2_array(&self, session: &SessionPath) -> Vec<Value> {
        self.outgoing().map(|c| c.to_v2(session)).collect()
    }
}

impl<'a> IntoIterator for &'a ContextStore {
    type Item = &'a Context;
    type IntoIter = std::slice::Iter<'a, Context>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
