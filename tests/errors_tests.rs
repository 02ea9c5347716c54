use comet_wasm::Session;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_err(v: &JsValue, code: &str) -> bool {
    if let Ok(ok) =
        Reflect::get(v, &JsValue::from_str("ok")).and_then(|x| x.as_bool().ok_or(JsValue::NULL))
    {
        if ok {
            return false;
        }
        if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
            if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
                return c.as_string().map_or(false, |s| s == code);
            }
        }
    }
    false
}

fn is_ok(v: &JsValue) -> bool {
    Reflect::get(v, &JsValue::from_str("ok"))
        .unwrap()
        .as_bool()
        .unwrap_or(false)
}

#[wasm_bindgen_test]
fn mode_button_and_context_codes() {
    let mut s = Session::new();
    assert!(is_err(&s.set_mode_res(9), "invalid_mode"));
    assert!(is_err(&s.pointer_down_res(0.0, 0.0, 7, false), "invalid_button"));
    assert!(is_err(&s.set_context_res(5), "invalid_context"));
    assert!(is_ok(&s.set_mode_res(2)));
    assert!(is_ok(&s.set_context_res(1)));
    assert_eq!(s.get_context(), 1);
}

#[wasm_bindgen_test]
fn non_finite_pointer_input_is_typed() {
    let mut s = Session::new();
    s.set_mode(2);
    assert!(is_err(&s.pointer_down_res(f32::NAN, 0.0, 0, false), "non_finite"));
    assert!(is_err(&s.pointer_move_res(0.0, f32::INFINITY), "non_finite"));
    assert!(is_err(&s.pointer_up_res(f32::NAN, f32::NAN), "non_finite"));
    assert_eq!(s.point_count(), 0, "state mutated on error");
}

#[wasm_bindgen_test]
fn view_ratio_validation() {
    let mut s = Session::new();
    assert!(is_err(&s.set_view_ratio_res(f32::NAN), "non_finite"));
    assert!(is_err(&s.set_view_ratio_res(0.0), "out_of_range"));
    assert!(is_err(&s.set_view_ratio_res(-2.0), "out_of_range"));
    assert!(is_ok(&s.set_view_ratio_res(1.5)));
    assert_eq!(s.view_ratio(), 1.5);
}

#[wasm_bindgen_test]
fn insert_without_request_is_typed() {
    let mut s = Session::new();
    assert!(is_err(&s.insert_requested_point_res(), "no_request"));
    // With a real request it succeeds
    s.set_mode(2);
    assert!(s.pointer_down(0.0, 0.0, 0, false));
    s.pointer_up(0.0, 0.0);
    assert!(s.pointer_down(100.0, 0.0, 0, false));
    s.pointer_up(100.0, 0.0);
    s.set_mode(1);
    assert!(s.pointer_down(50.0, 2.0, 1, false));
    assert!(is_ok(&s.insert_requested_point_res()));
    assert_eq!(s.point_count(), 3);
}
