use comet_wasm::Session;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_ok(v: &JsValue) -> bool {
    Reflect::get(v, &JsValue::from_str("ok"))
        .ok()
        .and_then(|x| x.as_bool())
        .unwrap_or(false)
}

#[wasm_bindgen_test]
fn fuzz_strict_methods_no_abort() {
    let mut s = Session::new();
    s.set_mode(2);
    s.pointer_down(0.0, 0.0, 0, false);
    s.pointer_up(0.0, 0.0);
    s.pointer_down(100.0, 0.0, 0, false);
    s.pointer_up(100.0, 0.0);

    // Simple LCG
    let mut seed: u64 = 0x1234_5678_ABCD_EF01;
    let mut rnd = || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        (seed >> 16) as u32
    };

    for _ in 0..500u32 {
        let op = rnd() % 8;
        let points_before = s.point_count();
        let res = match op {
            0 => s.pointer_down_res(f32::from_bits(rnd()), f32::from_bits(rnd()), (rnd() % 4) as u8, false),
            1 => s.pointer_move_res(f32::from_bits(rnd()), f32::from_bits(rnd())),
            2 => s.pointer_up_res(f32::from_bits(rnd()), f32::from_bits(rnd())),
            3 => s.set_mode_res((rnd() % 8) as u8),
            4 => s.set_context_res((rnd() % 4) as u8),
            5 => s.set_view_ratio_res(f32::from_bits(rnd())),
            6 => s.insert_requested_point_res(),
            7 => s.pointer_down_res(0.0, 0.0, 99, false),
            _ => unreachable!(),
        };
        // Error paths never mutate the graph
        if !is_ok(&res) {
            assert_eq!(s.point_count(), points_before);
        }
        let _ = s.drain_events();
    }

    // The session still answers queries after the storm
    let _ = s.get_point_data();
    let _ = s.to_json();
}
