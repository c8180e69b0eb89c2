use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fulfillment_core::Result;
use futures_util::future::BoxFuture;

use crate::client::WebhookClient;

/// Developer code run for a matched intent.
///
/// Implement it on a struct, or wrap a closure with [`handler_fn`].
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(&self, client: &mut WebhookClient) -> Result<()>;
}

#[async_trait]
impl<F> IntentHandler for F
where
    F: for<'a> Fn(&'a mut WebhookClient) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    async fn handle(&self, client: &mut WebhookClient) -> Result<()> {
        (self)(client).await
    }
}

/// Pins the closure signature so `|c| async move { .. }.boxed()` infers.
pub fn handler_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a mut WebhookClient) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    f
}

/// Intent-name → handler table with an optional fallback.
#[derive(Clone, Default)]
pub struct HandlerMap {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
    fallback: Option<Arc<dyn IntentHandler>>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under an intent display name or an action name.
    pub fn on(mut self, name: impl Into<String>, handler: impl IntentHandler + 'static) -> Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Handler used when nothing else matches.
    pub fn fallback(mut self, handler: impl IntentHandler + 'static) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Intent first, then action, then the fallback.
    pub fn lookup(&self, intent: Option<&str>, action: Option<&str>) -> Option<Arc<dyn IntentHandler>> {
        intent
            .and_then(|i| self.handlers.get(i))
            .or_else(|| action.and_then(|a| self.handlers.get(a)))
            .or(self.fallback.as_ref())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len() + usize::from(self.fallback.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What [`WebhookClient::handle_request`] runs.
#[derive(Clone)]
pub enum Dispatch {
    Single(Arc<dyn IntentHandler>),
    Map(HandlerMap),
}

impl Dispatch {
    pub fn single(handler: impl IntentHandler + 'static) -> Self {
        Dispatch::Single(Arc::new(handler))
    }
}

impl From<HandlerMap> for Dispatch {
    fn from(map: HandlerMap) -> Self {
        Dispatch::Map(map)
    }
}
