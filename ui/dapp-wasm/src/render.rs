//! Session → DOM.
//!
//! `View::of` is the whole presentation rule set; `apply` only copies it
//! into the elements.

use crate::dom::{self, Elements};
use tokio::sync::watch;
use vc_session_core::{OperationStatus, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub wallet_address: String,
    pub stored_number: String,
    pub connect_label: &'static str,
    pub connect_disabled: bool,
    pub input: String,
    pub input_disabled: bool,
    pub set_label: &'static str,
    pub set_disabled: bool,
    pub get_label: &'static str,
    pub get_disabled: bool,
    pub status: Option<&'static str>,
    pub error: Option<String>,
}

impl View {
    pub fn of(session: &Session) -> Self {
        let connected = session.is_connected();
        let busy = session.is_busy();
        Self {
            wallet_address: format!(
                "Wallet Address: {}",
                session
                    .wallet_address
                    .as_ref()
                    .map_or("Not connected", |id| id.as_str())
            ),
            stored_number: format!(
                "Stored Number: {}",
                session
                    .current_value
                    .map_or_else(|| "No number set".to_owned(), |value| value.to_string())
            ),
            connect_label: if connected { "Wallet Connected" } else { "Connect Wallet" },
            connect_disabled: connected || busy,
            input: session.input.clone(),
            input_disabled: !connected || busy,
            set_label: match session.status {
                OperationStatus::Writing => OperationStatus::Writing.progress_label(),
                _ => "Set Number",
            },
            set_disabled: !session.can_write(),
            get_label: match session.status {
                OperationStatus::Reading => OperationStatus::Reading.progress_label(),
                _ => "Get Number",
            },
            get_disabled: !session.can_read(),
            status: busy.then(|| session.status.progress_label()),
            error: session.last_error.as_ref().map(|err| err.user_message()),
        }
    }

    pub fn apply(&self, els: &Elements) {
        dom::set_text(&els.wallet_address, &self.wallet_address);
        dom::set_text(&els.stored_number, &self.stored_number);

        dom::set_text(&els.connect_btn, self.connect_label);
        els.connect_btn.set_disabled(self.connect_disabled);

        dom::set_input_value(&els.number_input, &self.input);
        els.number_input.set_disabled(self.input_disabled);

        dom::set_text(&els.set_number_btn, self.set_label);
        els.set_number_btn.set_disabled(self.set_disabled);
        dom::set_text(&els.get_number_btn, self.get_label);
        els.get_number_btn.set_disabled(self.get_disabled);

        dom::set_text(&els.status_line, self.status.unwrap_or_default());
        dom::toggle_class(&els.status_line, "hidden", self.status.is_none());

        dom::set_text(&els.error_banner, self.error.as_deref().unwrap_or_default());
        dom::toggle_class(&els.error_banner, "hidden", self.error.is_none());
    }
}

/// Re-render on every session change until the controller goes away.
pub fn spawn_render_loop(els: Elements, mut sessions: watch::Receiver<Session>) {
    wasm_bindgen_futures::spawn_local(async move {
        loop {
            let view = View::of(&sessions.borrow_and_update());
            view.apply(&els);
            if sessions.changed().await.is_err() {
                break;
            }
        }
    });
}
