//! DOM element bindings.
//!
//! All fields are resolved once at startup. A missing element fails `start`
//! with a message naming the id.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement};

// ── Helpers ──

fn doc() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    if el.text_content().as_deref() != Some(text) {
        el.set_text_content(Some(text));
    }
}

pub fn set_input_value(el: &HtmlInputElement, val: &str) {
    if el.value() != val {
        el.set_value(val);
    }
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value()
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

// ── Elements struct ──

/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    pub wallet_address: Element,
    pub stored_number: Element,
    pub connect_btn: HtmlButtonElement,
    pub number_input: HtmlInputElement,
    pub set_number_btn: HtmlButtonElement,
    pub get_number_btn: HtmlButtonElement,
    pub status_line: Element,
    pub error_banner: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id)))?
    };
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            wallet_address: get_el!("walletAddress"),
            stored_number: get_el!("storedNumber"),
            connect_btn: get_typed!(HtmlButtonElement, "connectWalletBtn"),
            number_input: get_typed!(HtmlInputElement, "numberInput"),
            set_number_btn: get_typed!(HtmlButtonElement, "setNumberBtn"),
            get_number_btn: get_typed!(HtmlButtonElement, "getNumberBtn"),
            status_line: get_el!("statusLine"),
            error_banner: get_el!("errorBanner"),
        })
    }
}
