use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use vc_chain_client::{AccountsListener, ProviderResult, Subscription};

/// Carries JSON-RPC requests to a node or an injected wallet.
#[async_trait(?Send)]
pub trait RpcTransport {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value>;

    /// Suspend between receipt polls, using the host's timer.
    async fn delay(&self, duration: Duration);

    fn subscribe_accounts(&self, _listener: AccountsListener) -> Subscription {
        Subscription::inert()
    }
}

/// How to wait for a submitted transaction to be included.
///
/// With no `timeout` the receipt is polled until it appears, leaving any
/// limit to the wallet or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

impl ConfirmationPolicy {
    /// `None` means poll without limit.
    pub fn max_polls(&self) -> Option<u32> {
        let timeout = self.timeout?;
        let interval = self.poll_interval.as_millis().max(1);
        let polls = timeout.as_millis().div_ceil(interval);
        Some(polls.clamp(1, u32::MAX as u128) as u32)
    }
}
