//! The two webhook formats behind one adapter trait.
//!
//! [`V1Adapter`] reads `body.result.*` and writes `speech`/`messages`/`contextOut`;
//! [`V2Adapter`] reads `body.queryResult.*` and writes
//! `fulfillmentText`/`fulfillmentMessages`/`outputContexts`. Everything above
//! this crate works with [`RequestModel`] and [`ResponseBody`] only.

pub mod adapter;
pub mod console;
pub mod request;
pub mod response;
pub mod v1;
pub mod v2;

pub use adapter::{adapter_for, detect_adapter, DialectAdapter, Outbound};
pub use console::SkippedMessage;
pub use request::RequestModel;
pub use response::ResponseBody;
pub use v1::V1Adapter;
pub use v2::V2Adapter;
