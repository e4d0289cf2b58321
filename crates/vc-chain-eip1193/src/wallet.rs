use async_trait::async_trait;
use serde_json::json;
use std::rc::Rc;
use tracing::debug;
use vc_api_types::{ChainId, ContractAddress, Identity, InterfaceDescriptor};
use vc_chain_client::{
    AccountsListener, ContractCalls, INVALID_PARAMS, ProviderError, ProviderResult, Subscription,
    WalletProvider,
};

use crate::contract::Eip1193Contract;
use crate::transport::{ConfirmationPolicy, RpcTransport};

pub struct Eip1193Wallet<T> {
    transport: Rc<T>,
    confirmation: ConfirmationPolicy,
}

impl<T: RpcTransport + 'static> Eip1193Wallet<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, ConfirmationPolicy::default())
    }

    pub fn with_policy(transport: T, confirmation: ConfirmationPolicy) -> Self {
        Self {
            transport: Rc::new(transport),
            confirmation,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport + 'static> WalletProvider for Eip1193Wallet<T> {
    async fn request_accounts(&self) -> ProviderResult<Vec<Identity>> {
        let result = self.transport.request("eth_requestAccounts", json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(result)
            .map_err(|err| ProviderError::internal(format!("eth_requestAccounts parse: {err}")))?;
        debug!("provider authorized {} account(s)", accounts.len());
        Ok(accounts.into_iter().map(Identity).collect())
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        let result = self.transport.request("eth_chainId", json!([])).await?;
        result
            .as_str()
            .map(|id| ChainId(id.to_owned()))
            .ok_or_else(|| ProviderError::internal(format!("eth_chainId returned {result}")))
    }

    fn contract(
        &self,
        signer: &Identity,
        address: &ContractAddress,
        interface: &InterfaceDescriptor,
    ) -> ProviderResult<Rc<dyn ContractCalls>> {
        if !address.is_well_formed() {
            return Err(ProviderError::new(
                INVALID_PARAMS,
                format!("invalid contract address '{address}'"),
            ));
        }
        if signer.as_str().trim().is_empty() {
            return Err(ProviderError::new(INVALID_PARAMS, "signer account is empty"));
        }

        Ok(Rc::new(Eip1193Contract::new(
            self.transport.clone(),
            signer.clone(),
            address.clone(),
            interface.clone(),
            self.confirmation,
        )))
    }

    fn subscribe_accounts(&self, listener: AccountsListener) -> Subscription {
        self.transport.subscribe_accounts(listener)
    }
}
