//! JSON-RPC transport over the browser's injected `window.ethereum`.
//!
//! Requests go through the provider's `request({ method, params })`, so
//! signing and account selection stay inside the wallet extension.

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use serde_wasm_bindgen::Serializer;
use std::time::Duration;
use vc_api_types::Identity;
use vc_chain_client::{
    AccountsListener, INTERNAL_ERROR, INVALID_PARAMS, ProviderError, ProviderResult, Subscription,
};
use vc_chain_eip1193::RpcTransport;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

const ACCOUNTS_CHANGED: &str = "accountsChanged";

pub struct InjectedTransport {
    ethereum: JsValue,
}

impl InjectedTransport {
    /// `None` when no wallet extension injected a provider.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum })
    }

    fn method(&self, name: &str) -> ProviderResult<Function> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| {
                ProviderError::internal(format!("wallet provider has no `{name}` method"))
            })
    }
}

#[async_trait(?Send)]
impl RpcTransport for InjectedTransport {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let args = json!({ "method": method, "params": params })
            .serialize(&Serializer::json_compatible())
            .map_err(|e| ProviderError::new(INVALID_PARAMS, e.to_string()))?;

        let returned = self
            .method("request")?
            .call1(&self.ethereum, &args)
            .map_err(provider_error)?;
        let promise: Promise = returned
            .dyn_into()
            .map_err(|_| ProviderError::internal("wallet provider did not return a promise"))?;
        let result = JsFuture::from(promise).await.map_err(provider_error)?;

        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::internal(e.to_string()))
    }

    async fn delay(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }

    fn subscribe_accounts(&self, listener: AccountsListener) -> Subscription {
        let (Ok(on), Ok(remove)) = (self.method("on"), self.method("removeListener")) else {
            gloo_console::warn!("wallet provider does not emit accountsChanged");
            return Subscription::inert();
        };

        let handler = Closure::<dyn Fn(JsValue)>::new(move |accounts: JsValue| {
            let accounts = Array::from(&accounts)
                .iter()
                .filter_map(|account| account.as_string())
                .map(Identity)
                .collect();
            listener(accounts);
        });

        let event = JsValue::from_str(ACCOUNTS_CHANGED);
        if let Err(err) = on.call2(&self.ethereum, &event, handler.as_ref()) {
            gloo_console::warn!("could not listen for account changes:", err);
            return Subscription::inert();
        }

        let ethereum = self.ethereum.clone();
        Subscription::new(move || {
            let _ = remove.call2(&ethereum, &event, handler.as_ref());
        })
    }
}

/// Wallet errors are plain objects carrying an EIP-1193 `code` and `message`.
fn provider_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_f64())
        .map(|code| code as i64)
        .unwrap_or(INTERNAL_ERROR);
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown wallet error".to_owned());
    ProviderError::new(code, message)
}
