use std::sync::Arc;

use fulfillment_context::{Context, ContextInput, ContextStore};
use fulfillment_core::{Dialect, FollowupEvent, FulfillmentError, PlatformId, Result};
use fulfillment_dialect::console::{push_merged, unwrap_envelope};
use fulfillment_dialect::{detect_adapter, DialectAdapter, Outbound, RequestModel, ResponseBody};
use fulfillment_rich::{Payload, ResponseItem, Text};
use serde_json::{Map, Value};
use tracing::debug;

use crate::conversation::{Conversation, ConversationFactory};
use crate::handler::Dispatch;
use crate::observer::{FulfillmentObserver, NoopObserver};
use crate::reply::Reply;
use crate::transport::{InboundRequest, OutboundResponse};

/// Lifecycle of one client. `Sent` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Request parsed, nothing buffered yet.
    Constructed,
    Responding,
    Sent,
}

/// Orchestrates one webhook exchange: parse, run the handler, send once.
pub struct WebhookClient {
    request: RequestModel,
    adapter: Box<dyn DialectAdapter>,
    response: Box<dyn OutboundResponse>,
    observer: Arc<dyn FulfillmentObserver>,
    conversation_factory: Option<ConversationFactory>,
    contexts: ContextStore,
    items: Vec<ResponseItem>,
    followup: Option<FollowupEvent>,
    end_conversation: bool,
    state: ClientState,
}

#[derive(Default)]
pub struct WebhookClientBuilder {
    body: Option<Value>,
    response: Option<Box<dyn OutboundResponse>>,
    observer: Option<Arc<dyn FulfillmentObserver>>,
    conversation_factory: Option<ConversationFactory>,
}

impl WebhookClientBuilder {
    pub fn request(mut self, request: impl InboundRequest) -> Self {
        self.body = request.body().cloned();
        self
    }

    pub fn response(mut self, response: impl OutboundResponse + 'static) -> Self {
        self.response = Some(Box::new(response));
        self
    }

    pub fn observer(mut self, observer: Arc<dyn FulfillmentObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn conversation_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&RequestModel) -> Box<dyn Conversation> + Send + Sync + 'static,
    {
        self.conversation_factory = Some(Arc::new(factory));
        self
    }

    pub fn build(self) -> Result<WebhookClient> {
        let body = self.body.ok_or(FulfillmentError::MissingRequest)?;
        let response = self.response.ok_or(FulfillmentError::MissingResponse)?;
        let observer = self
            .observer
            .unwrap_or_else(|| Arc::new(NoopObserver) as Arc<dyn FulfillmentObserver>);

        let adapter = detect_adapter(&body)?;
        let request = adapter.extract_request(&body)?;
        observer.on_request(&request);
        for skipped in &request.skipped_messages {
            observer.on_skipped_message(skipped);
        }

        Ok(WebhookClient {
            contexts: ContextStore::from_inbound(request.contexts.clone()),
            request,
            adapter,
            response,
            observer,
            conversation_factory: self.conversation_factory,
            items: Vec::new(),
            followup: None,
            end_conversation: false,
            state: ClientState::Constructed,
        })
    }
}

impl WebhookClient {
    pub fn builder() -> WebhookClientBuilder {
        WebhookClientBuilder::default()
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn dialect(&self) -> Dialect {
        self.adapter.dialect()
    }

    pub fn request(&self) -> &RequestModel {
        &self.request
    }

    pub fn intent(&self) -> Option<&str> {
        self.request.intent.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.request.action.as_deref()
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.request.parameters
    }

    pub fn session(&self) -> Option<&str> {
        self.request.session.as_deref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.request.locale.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.request.query.as_deref()
    }

    /// Platform the response is rendered for.
    pub fn request_source(&self) -> &PlatformId {
        &self.request.request_source
    }

    pub fn original_request(&self) -> Option<&Value> {
        self.request.original_request.as_ref()
    }

    pub fn console_messages(&self) -> &[ResponseItem] {
        &self.request.console_messages
    }

    /// Items buffered so far, in send order.
    pub fn responses(&self) -> &[ResponseItem] {
        &self.items
    }

    pub fn context(&self) -> &ContextStore {
        &self.contexts
    }

    pub fn context_mut(&mut self) -> Result<&mut ContextStore> {
        self.begin()?;
        Ok(&mut self.contexts)
    }

    pub fn set_context(&mut self, input: impl Into<ContextInput>) -> Result<()> {
        self.context_mut()?.set_context(input.into())
    }

    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    pub fn clear_context(&mut self, name: &str) -> Result<bool> {
        Ok(self.context_mut()?.clear(name))
    }

    /// Drop every context, so none is sent back.
    pub fn clear_outgoing_contexts(&mut self) -> Result<()> {
        self.context_mut()?.clear_all();
        Ok(())
    }

    /// Buffer one or more replies.
    ///
    /// Suggestions fold into an earlier suggestion with the same pin; a second
    /// payload for a platform fails with `DuplicatePayload`.
    pub fn add(&mut self, reply: impl Into<Reply>) -> Result<()> {
        self.begin()?;
        self.add_reply(reply.into())
    }

    fn add_reply(&mut self, reply: Reply) -> Result<()> {
        match reply {
            Reply::Text(text) => self.push_item(Text::new(text)?.into()),
            Reply::Item(item) => self.push_item(item),
            Reply::Many(replies) => replies.into_iter().try_for_each(|r| self.add_reply(r)),
            Reply::Conversation(conv) => self.fold_conversation(conv.as_ref()),
        }
    }

    fn push_item(&mut self, item: ResponseItem) -> Result<()> {
        if let ResponseItem::Payload(payload) = &item {
            if self.payload_for(payload.platform()).is_some() {
                return Err(FulfillmentError::DuplicatePayload {
                    platform: payload.platform().to_string(),
                });
            }
        }
        debug!(kind = item.kind(), buffered = self.items.len(), "response added");
        push_merged(&mut self.items, item);
        Ok(())
    }

    fn payload_for(&self, platform: &PlatformId) -> Option<&Payload> {
        self.items
            .iter()
            .filter_map(ResponseItem::as_payload)
            .find(|p| p.platform() == platform)
    }

    /// Merge a serialized conversation into the contexts and the buffer.
    fn fold_conversation(&mut self, conv: &dyn Conversation) -> Result<()> {
        let serialized = conv.serialize();
        let session = self.request.session_path();

        if let Some(contexts) = serialized.get("outputContexts").and_then(Value::as_array) {
            for raw in contexts {
                let mut input = ContextInput::try_from(raw)?;
                input.name = session.short_name(&input.name).to_string();
                self.contexts.set_context(input)?;
            }
        }

        match serialized.get("payload") {
            Some(payload) if !payload.is_null() => {
                let platform = PlatformId::ActionsOnGoogle;
                let inner = unwrap_envelope(&platform, payload);
                self.push_item(Payload::new(platform, &inner)?.into())
            }
            _ => Ok(()),
        }
    }

    /// Ask the agent to trigger another intent right after this response.
    pub fn set_followup_event(&mut self, event: impl Into<FollowupEvent>) -> Result<()> {
        self.begin()?;
        let event = event.into();
        event.validate()?;
        self.followup = Some(event);
        Ok(())
    }

    /// Close the conversation after this response. v2 only.
    pub fn end_conversation(&mut self) -> Result<()> {
        self.begin()?;
        if !self.adapter.supports_end_conversation() {
            return Err(FulfillmentError::UnsupportedOperation(format!(
                "ending the conversation is not supported by the {} webhook format",
                self.dialect()
            )));
        }
        self.end_conversation = true;
        Ok(())
    }

    /// A fresh voice-assistant conversation, when the request came from the
    /// voice assistant and a factory is installed.
    pub fn conv(&self) -> Option<Box<dyn Conversation>> {
        if !self.request.request_source.is_actions_on_google() {
            return None;
        }
        self.conversation_factory
            .as_ref()
            .map(|factory| factory(&self.request))
    }

    /// Run the matching handler, then send whatever it buffered.
    ///
    /// With a map and no match the transport gets status 400 and the call
    /// fails with `NoHandler`. A handler that already sent is not sent again.
    pub async fn handle_request(&mut self, dispatch: impl Into<Dispatch>) -> Result<()> {
        self.begin()?;
        let handler = match dispatch.into() {
            Dispatch::Single(handler) => handler,
            Dispatch::Map(map) => match map.lookup(self.intent(), self.action()) {
                Some(handler) => handler,
                None => {
                    self.response.set_status(400);
                    return Err(FulfillmentError::NoHandler {
                        intent: self.intent().unwrap_or_default().to_string(),
                    });
                }
            },
        };

        handler.handle(self).await?;
        if self.state == ClientState::Sent {
            return Ok(());
        }
        self.send()
    }

    /// Serialize the buffer for the request's platform and send it.
    pub fn send(&mut self) -> Result<()> {
        self.begin()?;
        let target = self.request.request_source.clone();

        // The voice assistant needs a spoken line before any rich content.
        if target.is_actions_on_google()
            && self.items.first().is_some_and(|i| !i.is_text())
            && self.payload_for(&target).is_none()
        {
            self.items.insert(0, Text::placeholder().into());
        }

        let body = if self.items.is_empty() && self.followup.is_some() {
            ResponseBody::Empty
        } else {
            ResponseBody::compose(&self.items, self.dialect(), &target)?
        };

        let dialect = self.dialect();
        let observer = &self.observer;
        let response = &mut self.response;
        self.adapter.build_and_send(
            &Outbound {
                body: &body,
                contexts: &self.contexts,
                followup: self.followup.as_ref(),
                end_conversation: self.end_conversation,
                request: &self.request,
            },
            &mut |json| {
                observer.on_response(dialect, &json);
                response.send_json(json)
            },
        )?;

        self.state = ClientState::Sent;
        debug!(platform = %target, %dialect, "response sent");
        Ok(())
    }

    /// Fail after the response went out; otherwise move to `Responding`.
    fn begin(&mut self) -> Result<()> {
        if self.state == ClientState::Sent {
            return Err(FulfillmentError::AlreadySent);
        }
        self.state = ClientState::Responding;
        Ok(())
    }
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookClient")
            .field("dialect", &self.dialect())
            .field("state", &self.state)
            .field("intent", &self.request.intent)
            .field("items", &self.items.len())
            .finish()
    }
}
