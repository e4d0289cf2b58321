use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::Notify;
use vc_api_types::{ChainId, ChainValue, ContractAddress, Identity, InterfaceDescriptor};
use vc_chain_client::{
    AccountsListener, ContractCalls, ProviderError, ProviderResult, Subscription, TxReceipt,
    WalletProvider,
};

use crate::config::ContractConfig;

pub(crate) const STORAGE_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

const STORAGE_ABI: &str = r#"[
    {"inputs":[],"name":"getNumber","outputs":[{"name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
    {"inputs":[{"name":"_number","type":"uint256"}],"name":"setNumber","outputs":[],"stateMutability":"nonpayable","type":"function"}
]"#;

pub(crate) fn storage_config() -> ContractConfig {
    ContractConfig {
        address: ContractAddress(STORAGE_ADDRESS.to_owned()),
        chain_id: None,
        interface: InterfaceDescriptor::from_abi_json(STORAGE_ABI).unwrap(),
    }
}

/// On-chain state of the value contract, shared by every handle bound to it.
#[derive(Default)]
pub(crate) struct FakeContract {
    value: Cell<ChainValue>,
    read_failures: RefCell<VecDeque<ProviderError>>,
    write_failure: RefCell<Option<ProviderError>>,
    revert_writes: Cell<bool>,
    gate: RefCell<Option<Rc<Notify>>>,
    reads: Cell<usize>,
    writes: RefCell<Vec<(Identity, ChainValue)>>,
}

impl FakeContract {
    pub(crate) fn value(&self) -> ChainValue {
        self.value.get()
    }

    pub(crate) fn set_value(&self, value: ChainValue) {
        self.value.set(value);
    }

    pub(crate) fn fail_next_read(&self, err: ProviderError) {
        self.read_failures.borrow_mut().push_back(err);
    }

    pub(crate) fn fail_writes(&self, err: ProviderError) {
        *self.write_failure.borrow_mut() = Some(err);
    }

    pub(crate) fn revert_writes(&self, revert: bool) {
        self.revert_writes.set(revert);
    }

    /// Hold every call until the returned `Notify` is signalled.
    pub(crate) fn gate(&self) -> Rc<Notify> {
        let notify = Rc::new(Notify::new());
        *self.gate.borrow_mut() = Some(notify.clone());
        notify
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.get()
    }

    pub(crate) fn writes(&self) -> Vec<(Identity, ChainValue)> {
        self.writes.borrow().clone()
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

struct BoundFake {
    signer: Identity,
    address: ContractAddress,
    contract: Rc<FakeContract>,
}

#[async_trait(?Send)]
impl ContractCalls for BoundFake {
    fn address(&self) -> &ContractAddress {
        &self.address
    }

    fn signer(&self) -> &Identity {
        &self.signer
    }

    async fn read_value(&self) -> ProviderResult<ChainValue> {
        self.contract.reads.set(self.contract.reads.get() + 1);
        self.contract.wait_for_gate().await;
        if let Some(err) = self.contract.read_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        Ok(self.contract.value())
    }

    async fn write_value(&self, value: ChainValue) -> ProviderResult<TxReceipt> {
        self.contract.wait_for_gate().await;
        if let Some(err) = self.contract.write_failure.borrow().clone() {
            return Err(err);
        }
        self.contract
            .writes
            .borrow_mut()
            .push((self.signer.clone(), value));

        let success = !self.contract.revert_writes.get();
        if success {
            self.contract.set_value(value);
        }
        Ok(TxReceipt {
            tx_hash: format!("0xtx{}", self.contract.writes.borrow().len()),
            block_number: Some(1),
            success,
        })
    }
}

type ListenerSlots = Rc<RefCell<Vec<Option<AccountsListener>>>>;

pub(crate) struct FakeProvider {
    accounts: RefCell<ProviderResult<Vec<Identity>>>,
    chain: ChainId,
    bind_failure: Option<ProviderError>,
    contract: Rc<FakeContract>,
    account_requests: Cell<usize>,
    bindings: Cell<usize>,
    listeners: ListenerSlots,
    cancellations: Rc<Cell<usize>>,
}

impl FakeProvider {
    pub(crate) fn with_accounts(accounts: &[&str]) -> Self {
        Self::answering(Ok(accounts.iter().map(|a| Identity((*a).to_owned())).collect()))
    }

    pub(crate) fn rejecting(err: ProviderError) -> Self {
        Self::answering(Err(err))
    }

    fn answering(accounts: ProviderResult<Vec<Identity>>) -> Self {
        Self {
            accounts: RefCell::new(accounts),
            chain: ChainId("0x7a69".to_owned()),
            bind_failure: None,
            contract: Rc::new(FakeContract::default()),
            account_requests: Cell::new(0),
            bindings: Cell::new(0),
            listeners: Rc::new(RefCell::new(Vec::new())),
            cancellations: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn on_chain(mut self, chain: &str) -> Self {
        self.chain = ChainId(chain.to_owned());
        self
    }

    pub(crate) fn failing_bind(mut self, err: ProviderError) -> Self {
        self.bind_failure = Some(err);
        self
    }

    pub(crate) fn set_accounts(&self, accounts: ProviderResult<Vec<Identity>>) {
        *self.accounts.borrow_mut() = accounts;
    }

    pub(crate) fn contract_state(&self) -> &Rc<FakeContract> {
        &self.contract
    }

    pub(crate) fn account_requests(&self) -> usize {
        self.account_requests.get()
    }

    pub(crate) fn bindings(&self) -> usize {
        self.bindings.get()
    }

    pub(crate) fn active_listeners(&self) -> usize {
        self.listeners.borrow().iter().filter(|slot| slot.is_some()).count()
    }

    pub(crate) fn cancellations(&self) -> usize {
        self.cancellations.get()
    }

    /// Simulate the wallet's `accountsChanged` event.
    pub(crate) fn emit_accounts(&self, accounts: &[&str]) {
        let accounts: Vec<Identity> = accounts.iter().map(|a| Identity((*a).to_owned())).collect();
        for listener in self.listeners.borrow().iter().flatten() {
            listener(accounts.clone());
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for FakeProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<Identity>> {
        self.account_requests.set(self.account_requests.get() + 1);
        self.accounts.borrow().clone()
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        Ok(self.chain.clone())
    }

    fn contract(
        &self,
        signer: &Identity,
        address: &ContractAddress,
        _interface: &InterfaceDescriptor,
    ) -> ProviderResult<Rc<dyn ContractCalls>> {
        if let Some(err) = &self.bind_failure {
            return Err(err.clone());
        }
        self.bindings.set(self.bindings.get() + 1);
        Ok(Rc::new(BoundFake {
            signer: signer.clone(),
            address: address.clone(),
            contract: self.contract.clone(),
        }))
    }

    fn subscribe_accounts(&self, listener: AccountsListener) -> Subscription {
        let slot = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.push(Some(listener));
            listeners.len() - 1
        };
        let listeners = self.listeners.clone();
        let cancellations = self.cancellations.clone();
        Subscription::new(move || {
            listeners.borrow_mut()[slot] = None;
            cancellations.set(cancellations.get() + 1);
        })
    }
}
