use thiserror::Error;
use vc_api_types::ValueParseError;
use vc_chain_client::ProviderError;

use crate::session::OperationStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("no wallet provider found in this environment")]
    ProviderMissing,
    #[error("wallet authorization rejected by the user")]
    UserRejected,
    #[error("a wallet authorization request is already pending")]
    RequestPending,
    #[error("wallet connection failed: {0}")]
    Unknown(String),
}

impl From<ProviderError> for ConnectError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejected() {
            ConnectError::UserRejected
        } else if err.is_request_pending() {
            ConnectError::RequestPending
        } else {
            ConnectError::Unknown(err.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("could not bind contract: {0}")]
    ConstructionFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("contract call failed: {0}. Check the contract address, interface, and network.")]
    CallFailed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<ValueParseError> for OpError {
    fn from(err: ValueParseError) -> Self {
        OpError::InvalidInput(err.to_string())
    }
}

/// Everything the controller can record as `Session::last_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Op(#[from] OpError),
    #[error("another operation is in progress ({0})")]
    Busy(OperationStatus),
    #[error("no wallet connected")]
    NotConnected,
    #[error("contract is not bound")]
    ContractUnbound,
}

impl SessionError {
    /// Text suitable for showing to the user as-is.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Connect(ConnectError::ProviderMissing) => {
                "MetaMask is not installed. Please install it to connect your wallet.".to_owned()
            }
            SessionError::Connect(ConnectError::UserRejected) => {
                "Please connect your wallet to continue.".to_owned()
            }
            SessionError::Connect(ConnectError::RequestPending) => {
                "Wallet connection request is already pending. Please check your wallet.".to_owned()
            }
            SessionError::Connect(ConnectError::Unknown(_)) => {
                "An unexpected error occurred. Please try again.".to_owned()
            }
            SessionError::Bind(BindError::ConstructionFailed(reason)) => {
                format!("Could not initialize the contract: {reason}")
            }
            SessionError::Op(OpError::CallFailed(reason)) => format!(
                "Error talking to the contract: {reason}. \
                 Check the contract address, ABI, and network."
            ),
            SessionError::Op(OpError::InvalidInput(reason)) => {
                format!("Please enter a whole number of zero or more ({reason}).")
            }
            SessionError::Busy(status) => {
                format!(
                    "Please wait for the current operation to finish ({})",
                    status.progress_label()
                )
            }
            SessionError::NotConnected | SessionError::ContractUnbound => {
                "Contract is not initialized. Please connect your wallet.".to_owned()
            }
        }
    }
}
