use std::rc::Rc;
use tracing::{info, warn};
use vc_api_types::Identity;
use vc_chain_client::WalletProvider;

use crate::config::ContractConfig;
use crate::error::BindError;
use crate::session::ContractHandle;

/// Builds a signing-capable handle to the configured contract.
///
/// Binding never calls the contract. It only asks the provider which
/// network it is on when the configuration pins a chain id.
pub struct ContractBinder<P> {
    provider: Option<Rc<P>>,
}

impl<P: WalletProvider> ContractBinder<P> {
    pub fn new(provider: Option<Rc<P>>) -> Self {
        Self { provider }
    }

    pub async fn bind(
        &self,
        identity: &Identity,
        config: &ContractConfig,
    ) -> Result<ContractHandle, BindError> {
        let Some(provider) = &self.provider else {
            return Err(BindError::ConstructionFailed("no wallet provider".to_owned()));
        };

        if let Some(expected) = &config.chain_id {
            let actual = provider.chain_id().await.map_err(|err| {
                BindError::ConstructionFailed(format!(
                    "could not determine network: {}",
                    err.message
                ))
            })?;
            if !expected.same_chain(&actual) {
                warn!("provider is on chain {actual}, contract expects {expected}");
                return Err(BindError::ConstructionFailed(format!(
                    "network mismatch: wallet is on chain {actual}, contract is deployed on {expected}"
                )));
            }
        }

        let calls = provider
            .contract(identity, &config.address, &config.interface)
            .map_err(|err| BindError::ConstructionFailed(err.message))?;

        info!("bound contract {} for signer {identity}", config.address);
        Ok(ContractHandle::new(calls))
    }
}
