use fulfillment_core::Dialect;
use fulfillment_dialect::{RequestModel, SkippedMessage};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Hooks into the lifecycle of one request.
///
/// Injected through the builder; every method defaults to a no-op so
/// implementors only override what they care about.
pub trait FulfillmentObserver: Send + Sync {
    fn on_request(&self, _request: &RequestModel) {}

    fn on_response(&self, _dialect: Dialect, _body: &Value) {}

    fn on_skipped_message(&self, _skipped: &SkippedMessage) {}
}

/// Default observer: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FulfillmentObserver for NoopObserver {}

/// Logs each lifecycle point through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver {
    /// Also log full response bodies at debug level.
    pub trace_payloads: bool,
}

impl TracingObserver {
    pub fn new(trace_payloads: bool) -> Self {
        Self { trace_payloads }
    }
}

impl FulfillmentObserver for TracingObserver {
    fn on_request(&self, request: &RequestModel) {
        info!(
            dialect = %request.dialect,
            intent = request.intent.as_deref().unwrap_or(""),
            action = request.action.as_deref().unwrap_or(""),
            source = %request.request_source,
            "fulfillment request"
        );
    }

    fn on_response(&self, dialect: Dialect, body: &Value) {
        if self.trace_payloads {
            debug!(%dialect, body = %body, "fulfillment response");
        } else {
            info!(%dialect, "fulfillment response sent");
        }
    }

    fn on_skipped_message(&self, skipped: &SkippedMessage) {
        warn!(index = skipped.index, reason = %skipped.reason, "console message ignored");
    }
}
