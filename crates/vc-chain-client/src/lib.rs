use async_trait::async_trait;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use vc_api_types::{ChainId, ChainValue, ContractAddress, Identity, InterfaceDescriptor};

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// EIP-1193: the provider is disconnected from all chains.
pub const DISCONNECTED: i64 = 4900;
/// JSON-RPC: a request of the same kind is already awaiting the user.
pub const REQUEST_PENDING: i64 = -32002;
/// JSON-RPC: invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC: internal error.
pub const INTERNAL_ERROR: i64 = -32603;

/// An error reported by (or on behalf of) the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::new(DISCONNECTED, message)
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == USER_REJECTED
    }

    pub fn is_request_pending(&self) -> bool {
        self.code == REQUEST_PENDING
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Calls against one contract, signed by one identity.
#[async_trait(?Send)]
pub trait ContractCalls {
    fn address(&self) -> &ContractAddress;
    fn signer(&self) -> &Identity;
    async fn read_value(&self) -> ProviderResult<ChainValue>;
    /// Resolves once the transaction is included, not when it is broadcast.
    async fn write_value(&self, value: ChainValue) -> ProviderResult<TxReceipt>;
}

pub type AccountsListener = Box<dyn Fn(Vec<Identity>)>;

/// An injected wallet: account authorization, signing, and chain access.
#[async_trait(?Send)]
pub trait WalletProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<Identity>>;
    async fn chain_id(&self) -> ProviderResult<ChainId>;

    /// Pure construction; must not call the contract.
    fn contract(
        &self,
        signer: &Identity,
        address: &ContractAddress,
        interface: &InterfaceDescriptor,
    ) -> ProviderResult<Rc<dyn ContractCalls>>;

    fn subscribe_accounts(&self, _listener: AccountsListener) -> Subscription {
        Subscription::inert()
    }
}

/// Handle to a provider event registration. Dropping it unregisters.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription for providers that never emit events.
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
