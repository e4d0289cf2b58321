//! Event binding.
//!
//! Handlers only dispatch to the controller; the render loop picks up
//! every resulting state change.

use crate::App;
use crate::dom::{self, Elements};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Helper: attach async click handler to an HtmlElement.
macro_rules! on_click_async {
    ($el:expr, $app:expr, $handler:expr) => {{
        let app = $app.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let app2 = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&app2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements, app: &Rc<App>) -> Result<(), JsValue> {
    on_click_async!(els.connect_btn, app, on_connect);
    on_click_async!(els.get_number_btn, app, on_get_number);
    on_click_async!(els.set_number_btn, app, on_set_number);

    // ── Draft input ──
    {
        let app2 = app.clone();
        let input = els.number_input.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            app2.controller.set_input(&dom::get_input_value(&input));
        }) as Box<dyn FnMut(_)>);
        els.number_input
            .add_event_listener_with_callback("input", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // ── Teardown ──
    if let Some(window) = web_sys::window() {
        let app2 = app.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            if let Err(err) = app2.controller.end_session() {
                gloo_console::warn!("session not ended:", err.to_string());
            }
        }) as Box<dyn FnMut(_)>);
        window.add_event_listener_with_callback("pagehide", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    Ok(())
}

async fn on_connect(app: &Rc<App>) {
    if let Err(err) = app.controller.connect().await {
        gloo_console::warn!("connect failed:", err.to_string());
    }
    // a failed bind still leaves a connected wallet whose account changes matter
    if app.controller.snapshot().is_connected() {
        follow_accounts(app);
    }
}

async fn on_get_number(app: &Rc<App>) {
    match app.controller.read_value().await {
        Ok(value) => gloo_console::log!("fetched number:", value.to_string()),
        Err(err) => gloo_console::warn!("fetch failed:", err.to_string()),
    }
}

async fn on_set_number(app: &Rc<App>) {
    match app.controller.submit_input().await {
        Ok(value) => gloo_console::log!("number set to:", value.to_string()),
        Err(err) => gloo_console::warn!("set failed:", err.to_string()),
    }
}

fn follow_accounts(app: &Rc<App>) {
    if app.watching.replace(true) {
        return;
    }
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        app.controller.watch_accounts().await;
        app.watching.set(false);
    });
}
