//! Session state observed by the presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use vc_api_types::{ChainValue, ContractAddress, Identity};
use vc_chain_client::ContractCalls;

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    #[default]
    Idle,
    Connecting,
    Binding,
    Reading,
    Writing,
}

impl OperationStatus {
    pub fn is_idle(self) -> bool {
        self == OperationStatus::Idle
    }

    /// Progress text shown while the operation runs.
    pub fn progress_label(self) -> &'static str {
        match self {
            OperationStatus::Idle => "",
            OperationStatus::Connecting => "Connecting Wallet...",
            OperationStatus::Binding => "Initializing Contract...",
            OperationStatus::Reading => "Fetching Number...",
            OperationStatus::Writing => "Setting Number...",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationStatus::Idle => "idle",
            OperationStatus::Connecting => "connecting",
            OperationStatus::Binding => "binding",
            OperationStatus::Reading => "reading",
            OperationStatus::Writing => "writing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Read,
    Write,
}

/// The one in-flight contract operation, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub input: Option<ChainValue>,
    pub started_at: DateTime<Utc>,
}

impl PendingOperation {
    pub fn read() -> Self {
        Self {
            kind: OperationKind::Read,
            input: None,
            started_at: Utc::now(),
        }
    }

    pub fn write(input: ChainValue) -> Self {
        Self {
            kind: OperationKind::Write,
            input: Some(input),
            started_at: Utc::now(),
        }
    }

    pub fn status(&self) -> OperationStatus {
        match self.kind {
            OperationKind::Read => OperationStatus::Reading,
            OperationKind::Write => OperationStatus::Writing,
        }
    }
}

/// Capability to call one contract as one signer.
#[derive(Clone)]
pub struct ContractHandle {
    calls: Rc<dyn ContractCalls>,
}

impl ContractHandle {
    pub fn new(calls: Rc<dyn ContractCalls>) -> Self {
        Self { calls }
    }

    pub fn address(&self) -> &ContractAddress {
        self.calls.address()
    }

    pub fn signer(&self) -> &Identity {
        self.calls.signer()
    }

    pub(crate) fn calls(&self) -> &dyn ContractCalls {
        self.calls.as_ref()
    }
}

impl fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", self.address())
            .field("signer", self.signer())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub wallet_address: Option<Identity>,
    pub contract: Option<ContractHandle>,
    pub current_value: Option<ChainValue>,
    pub status: OperationStatus,
    pub pending: Option<PendingOperation>,
    pub last_error: Option<SessionError>,
    /// Draft text for the next write, as typed by the user.
    pub input: String,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.wallet_address.is_some()
    }

    pub fn is_busy(&self) -> bool {
        !self.status.is_idle()
    }

    pub fn can_read(&self) -> bool {
        self.is_connected() && !self.is_busy()
    }

    pub fn can_write(&self) -> bool {
        self.can_read() && !self.input.trim().is_empty()
    }

    /// Checks the structural invariants between fields.
    pub fn is_consistent(&self) -> bool {
        let handle_matches_wallet = match (&self.contract, &self.wallet_address) {
            (Some(handle), Some(wallet)) => handle.signer() == wallet,
            (Some(_), None) => false,
            (None, _) => true,
        };
        let pending_matches_status = match &self.pending {
            Some(pending) => pending.status() == self.status,
            None => !matches!(self.status, OperationStatus::Reading | OperationStatus::Writing),
        };
        handle_matches_wallet && pending_matches_status
    }

    pub(crate) fn finish(&mut self) {
        self.status = OperationStatus::Idle;
        self.pending = None;
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            wallet_address: self.wallet_address.as_ref().map(|id| id.0.clone()),
            contract_address: self.contract.as_ref().map(|handle| handle.address().0.clone()),
            current_value: self.current_value,
            status: self.status,
            last_error: self.last_error.as_ref().map(SessionError::user_message),
        }
    }
}

/// Serializable view of a `Session` for logs and CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub wallet_address: Option<String>,
    pub contract_address: Option<String>,
    pub current_value: Option<ChainValue>,
    pub status: OperationStatus,
    pub last_error: Option<String>,
}
