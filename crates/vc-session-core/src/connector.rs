use std::rc::Rc;
use tracing::{debug, warn};
use vc_api_types::Identity;
use vc_chain_client::WalletProvider;

use crate::error::ConnectError;

/// Requests account authorization from the injected provider, if any.
pub struct WalletConnector<P> {
    provider: Option<Rc<P>>,
}

impl<P: WalletProvider> WalletConnector<P> {
    pub fn new(provider: Option<Rc<P>>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Option<&Rc<P>> {
        self.provider.as_ref()
    }

    /// Returns the first authorized account. Safe to call again after a rejection.
    pub async fn connect(&self) -> Result<Identity, ConnectError> {
        let Some(provider) = &self.provider else {
            warn!("connect requested but no wallet provider is present");
            return Err(ConnectError::ProviderMissing);
        };

        let accounts = provider.request_accounts().await.map_err(|err| {
            debug!("account request failed: {err}");
            ConnectError::from(err)
        })?;

        accounts
            .into_iter()
            .next()
            .ok_or_else(|| ConnectError::Unknown("no accounts returned by provider".to_owned()))
    }
}
