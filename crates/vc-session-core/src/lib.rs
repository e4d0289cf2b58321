//! Wallet & contract session controller.
//!
//! Authorizes a wallet, binds the configured contract under that identity,
//! and runs value reads and writes one at a time. The presentation layer
//! observes `Session` snapshots through `SessionController::subscribe`.

pub mod binder;
pub mod config;
pub mod connector;
pub mod controller;
pub mod error;
pub mod executor;
pub mod session;

#[cfg(test)]
mod testing;

pub use binder::ContractBinder;
pub use config::{ConfigError, ContractConfig};
pub use connector::WalletConnector;
pub use controller::SessionController;
pub use error::{BindError, ConnectError, OpError, SessionError};
pub use executor::OperationExecutor;
pub use session::{
    ContractHandle, OperationKind, OperationStatus, PendingOperation, Session, SessionSummary,
};
