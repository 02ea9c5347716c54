use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Session {
    pub(crate) inner: comet::Session,
}

impl Session {
    pub fn rs_new() -> Session {
        Session {
            inner: comet::Session::new(),
        }
    }
}
