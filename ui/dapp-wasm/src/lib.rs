//! ValueCortex dApp WASM frontend.
//!
//! Connects the browser's injected wallet, then reads and writes the stored
//! number through a single `SessionController`.

pub mod dom;
pub mod events;
pub mod injected;
pub mod render;

use std::cell::Cell;
use std::rc::Rc;
use vc_chain_eip1193::Eip1193Wallet;
use vc_session_core::{ContractConfig, SessionController};
use wasm_bindgen::prelude::*;

use crate::injected::InjectedTransport;

const CONTRACT_CONFIG: &str = include_str!("../config/contract.json");

pub type InjectedWallet = Eip1193Wallet<InjectedTransport>;

pub struct App {
    pub controller: SessionController<InjectedWallet>,
    watching: Cell<bool>,
}

impl App {
    pub fn new(controller: SessionController<InjectedWallet>) -> Self {
        Self {
            controller,
            watching: Cell::new(false),
        }
    }
}

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    let els = dom::Elements::bind()?;
    let config = ContractConfig::from_json(CONTRACT_CONFIG)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let provider =
        InjectedTransport::detect().map(|transport| Rc::new(Eip1193Wallet::new(transport)));
    if provider.is_none() {
        gloo_console::warn!("no injected wallet provider found");
    }

    let app = Rc::new(App::new(SessionController::new(provider, config)));
    render::spawn_render_loop(els.clone(), app.controller.subscribe());
    events::bind_events(&els, &app)
}
