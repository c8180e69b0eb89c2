//! The per-request orchestrator.
//!
//! A [`WebhookClient`] is built from one inbound body and one outbound
//! transport, runs a handler against it and sends exactly one response.

pub mod client;
pub mod conversation;
pub mod handler;
pub mod observer;
pub mod reply;
pub mod transport;

pub use client::{ClientState, WebhookClient, WebhookClientBuilder};
pub use conversation::{Conversation, ConversationFactory};
pub use handler::{handler_fn, Dispatch, HandlerMap, IntentHandler};
pub use observer::{FulfillmentObserver, NoopObserver, TracingObserver};
pub use reply::Reply;
pub use transport::{InboundRequest, MemoryResponse, OutboundResponse, RecordedResponse};
