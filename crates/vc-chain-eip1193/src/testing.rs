use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;
use vc_api_types::InterfaceDescriptor;
use vc_chain_client::{ProviderError, ProviderResult};

use crate::transport::RpcTransport;

pub(crate) const STORAGE_ABI: &str = r#"[
    {"inputs":[],"name":"getNumber","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
    {"inputs":[{"internalType":"uint256","name":"_number","type":"uint256"}],"name":"setNumber","outputs":[],"stateMutability":"nonpayable","type":"function"}
]"#;

pub(crate) fn storage_interface() -> InterfaceDescriptor {
    InterfaceDescriptor::from_abi_json(STORAGE_ABI).unwrap()
}

/// Replays canned responses in order, asserting each request's method.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: RefCell<VecDeque<(String, ProviderResult<Value>)>>,
    calls: RefCell<Vec<(String, Value)>>,
    delays: Cell<usize>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, method: &str, response: ProviderResult<Value>) -> Self {
        self.script.borrow_mut().push_back((method.to_owned(), response));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    pub(crate) fn delays(&self) -> usize {
        self.delays.get()
    }
}

#[async_trait(?Send)]
impl RpcTransport for ScriptedTransport {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        self.calls.borrow_mut().push((method.to_owned(), params));
        let Some((expected, response)) = self.script.borrow_mut().pop_front() else {
            return Err(ProviderError::internal(format!("unscripted request {method}")));
        };
        assert_eq!(expected, method, "unexpected request order");
        response
    }

    async fn delay(&self, _duration: Duration) {
        self.delays.set(self.delays.get() + 1);
    }
}
