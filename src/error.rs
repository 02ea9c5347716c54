use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}

fn new_obj() -> Object {
    Object::new()
}

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data {
        set_kv(&e, "data", &d);
    }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f32, max: f32, got: f32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min as f64));
    set_kv(&d, "max", &JsValue::from_f64(max as f64));
    set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_mode(got: u8) -> JsValue {
    let d = new_obj();
    set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err(
        "invalid_mode",
        "mode must be 0:Viewing, 1:Selecting, 2:BuildTail, 3:BuildHead",
        Some(d.into()),
    )
}

#[inline]
pub fn invalid_button(got: u8) -> JsValue {
    let d = new_obj();
    set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err(
        "invalid_button",
        "button must be 0:Primary or 1:Secondary",
        Some(d.into()),
    )
}

#[inline]
pub fn invalid_context(got: u8) -> JsValue {
    let d = new_obj();
    set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err(
        "invalid_context",
        "context must be 0:Freehand or 1:Comet",
        Some(d.into()),
    )
}
