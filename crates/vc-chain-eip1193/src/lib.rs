//! EIP-1193 wallet provider over a JSON-RPC transport.
//!
//! `Eip1193Wallet` implements `WalletProvider` for anything that can carry
//! JSON-RPC requests: an HTTP node endpoint (`http` feature) or an injected
//! browser wallet (see the `dapp-wasm` crate).

pub mod abi;
pub mod contract;
#[cfg(feature = "http")]
pub mod http;
pub mod transport;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use contract::Eip1193Contract;
#[cfg(feature = "http")]
pub use http::{DEFAULT_RPC_URL, HttpTransport};
pub use transport::{ConfirmationPolicy, RpcTransport};
pub use wallet::Eip1193Wallet;
