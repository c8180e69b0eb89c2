use async_trait::async_trait;
use fulfillment_client::{Dispatch, HandlerMap, IntentHandler, WebhookClient};
use fulfillment_core::Result;
use fulfillment_rich::ResponseItem;

/// Replays what the agent console already defined for the matched intent, or
/// says which intent arrived when nothing is defined.
pub struct ConsoleReplay;

#[async_trait]
impl IntentHandler for ConsoleReplay {
    async fn handle(&self, client: &mut WebhookClient) -> Result<()> {
        let console: Vec<ResponseItem> = client.console_messages().to_vec();
        if !console.is_empty() {
            return client.add(console);
        }
        let intent = client.intent().unwrap_or("unknown").to_string();
        client.add(format!("Received intent {intent}, but no handler is configured for it."))
    }
}

/// Handlers served by the binary: everything falls through to [`ConsoleReplay`].
pub fn default_dispatch() -> Dispatch {
    HandlerMap::new().fallback(ConsoleReplay).into()
}
