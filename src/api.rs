use crate::error;
use crate::Session;
use comet::graph::EditContext;
use comet::machine::{Button, Mode};
use comet::model::{Comet, PointKind};
use comet::SessionEvent;
use js_sys::Array;
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn mode_from_u8(m: u8) -> Option<Mode> {
    match m {
        0 => Some(Mode::Viewing),
        1 => Some(Mode::Selecting),
        2 => Some(Mode::Building(PointKind::Tail)),
        3 => Some(Mode::Building(PointKind::Head)),
        _ => None,
    }
}

fn mode_to_u8(m: Mode) -> u8 {
    match m {
        Mode::Viewing => 0,
        Mode::Selecting => 1,
        Mode::Building(PointKind::Tail) => 2,
        Mode::Building(PointKind::Head) => 3,
    }
}

fn button_from_u8(b: u8) -> Option<Button> {
    match b {
        0 => Some(Button::Primary),
        1 => Some(Button::Secondary),
        _ => None,
    }
}

fn context_from_u8(c: u8) -> Option<EditContext> {
    match c {
        0 => Some(EditContext::Freehand),
        1 => Some(EditContext::Comet),
        _ => None,
    }
}

fn flatten_poly(poly: &[comet::model::Vec2]) -> js_sys::Float32Array {
    let mut flat = Vec::with_capacity(poly.len() * 2);
    for p in poly {
        flat.push(p.x);
        flat.push(p.y);
    }
    crate::interop::arr_f32(&flat)
}

fn comet_to_js(c: &Comet) -> JsValue {
    let obj = crate::interop::new_obj();
    crate::interop::set_kv(&obj, "tail", &flatten_poly(&c.tail).into());
    crate::interop::set_kv(&obj, "head", &flatten_poly(&c.head).into());
    obj.into()
}

fn event_to_js(ev: &SessionEvent) -> JsValue {
    let obj = crate::interop::new_obj();
    let tag = |name: &str| crate::interop::set_kv(&obj, "type", &JsValue::from_str(name));
    match ev {
        SessionEvent::Redraw => tag("redraw"),
        SessionEvent::PointsChanged => tag("points_changed"),
        SessionEvent::HistoryChanged {
            can_undo,
            can_redo,
            undo_label,
            redo_label,
        } => {
            tag("history");
            crate::interop::set_kv(&obj, "can_undo", &JsValue::from_bool(*can_undo));
            crate::interop::set_kv(&obj, "can_redo", &JsValue::from_bool(*can_redo));
            let lbl = |l: &Option<&'static str>| match l {
                Some(s) => JsValue::from_str(s),
                None => JsValue::NULL,
            };
            crate::interop::set_kv(&obj, "undo_label", &lbl(undo_label));
            crate::interop::set_kv(&obj, "redo_label", &lbl(redo_label));
        }
        SessionEvent::CometBuilt(comet) => {
            tag("comet_built");
            crate::interop::set_kv(&obj, "comet", &comet_to_js(comet));
        }
        SessionEvent::CometRetracted => tag("comet_retracted"),
        SessionEvent::ContextMenuRequested(pos) => {
            tag("context_menu");
            crate::interop::set_kv(&obj, "x", &JsValue::from_f64(pos.x as f64));
            crate::interop::set_kv(&obj, "y", &JsValue::from_f64(pos.y as f64));
        }
    }
    obj.into()
}

#[wasm_bindgen]
impl Session {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Session {
        crate::Session::rs_new()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    // Mode and context
    pub fn set_mode(&mut self, mode: u8) -> bool {
        match mode_from_u8(mode) {
            Some(m) => {
                self.inner.set_mode(m);
                true
            }
            None => false,
        }
    }
    pub fn set_mode_res(&mut self, mode: u8) -> JsValue {
        match mode_from_u8(mode) {
            Some(m) => {
                self.inner.set_mode(m);
                error::ok(JsValue::from_bool(true))
            }
            None => error::invalid_mode(mode),
        }
    }
    pub fn get_mode(&self) -> u8 {
        mode_to_u8(self.inner.mode())
    }
    pub fn set_context(&mut self, ctx: u8) -> bool {
        match context_from_u8(ctx) {
            Some(c) => {
                self.inner.set_context(c);
                true
            }
            None => false,
        }
    }
    pub fn set_context_res(&mut self, ctx: u8) -> JsValue {
        match context_from_u8(ctx) {
            Some(c) => {
                self.inner.set_context(c);
                error::ok(JsValue::from_bool(true))
            }
            None => error::invalid_context(ctx),
        }
    }
    pub fn get_context(&self) -> u8 {
        match self.inner.context() {
            EditContext::Freehand => 0,
            EditContext::Comet => 1,
        }
    }

    // View ratio
    pub fn view_ratio(&self) -> f32 {
        self.inner.view_ratio()
    }
    pub fn set_view_ratio(&mut self, ratio: f32) -> bool {
        self.inner.set_view_ratio(ratio)
    }
    pub fn set_view_ratio_res(&mut self, ratio: f32) -> JsValue {
        if !ratio.is_finite() {
            return error::non_finite("ratio");
        }
        if ratio <= 0.0 {
            return error::out_of_range("ratio", 0.0, f32::INFINITY, ratio);
        }
        error::ok(JsValue::from_bool(self.inner.set_view_ratio(ratio)))
    }

    // Pointer and keyboard input
    pub fn pointer_down(&mut self, x: f32, y: f32, button: u8, ctrl: bool) -> bool {
        match button_from_u8(button) {
            Some(b) => {
                self.inner.pointer_down(x, y, b, ctrl);
                true
            }
            None => false,
        }
    }
    pub fn pointer_down_res(&mut self, x: f32, y: f32, button: u8, ctrl: bool) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        match button_from_u8(button) {
            Some(b) => {
                self.inner.pointer_down(x, y, b, ctrl);
                error::ok(JsValue::from_bool(true))
            }
            None => error::invalid_button(button),
        }
    }
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.inner.pointer_move(x, y);
    }
    pub fn pointer_move_res(&mut self, x: f32, y: f32) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        self.inner.pointer_move(x, y);
        error::ok(JsValue::from_bool(true))
    }
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.inner.pointer_up(x, y);
    }
    pub fn pointer_up_res(&mut self, x: f32, y: f32) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        self.inner.pointer_up(x, y);
        error::ok(JsValue::from_bool(true))
    }
    pub fn delete_key(&mut self) {
        self.inner.delete_key();
    }
    pub fn insert_requested_point(&mut self) -> bool {
        self.inner.insert_requested_point()
    }
    pub fn insert_requested_point_res(&mut self) -> JsValue {
        if self.inner.requested_point().is_none() {
            return error::err("no_request", "no pending point-on-edge request", None);
        }
        error::ok(JsValue::from_bool(self.inner.insert_requested_point()))
    }

    // History
    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }
    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }
    pub fn undo_label(&self) -> JsValue {
        match self.inner.undo_label() {
            Some(s) => JsValue::from_str(s),
            None => JsValue::NULL,
        }
    }
    pub fn redo_label(&self) -> JsValue {
        match self.inner.redo_label() {
            Some(s) => JsValue::from_str(s),
            None => JsValue::NULL,
        }
    }

    // Typed array getters
    pub fn point_count(&self) -> u32 {
        self.inner.point_count() as u32
    }
    pub fn contour_count(&self) -> u32 {
        self.inner.contour_count() as u32
    }
    pub fn get_point_data(&self) -> JsValue {
        let (ids, pos, kinds) = self.inner.point_arrays();
        let obj = crate::interop::new_obj();
        crate::interop::set_kv(&obj, "ids", &crate::interop::arr_u32(&ids).into());
        crate::interop::set_kv(&obj, "positions", &crate::interop::arr_f32(&pos).into());
        crate::interop::set_kv(&obj, "kinds", &crate::interop::arr_u8(&kinds).into());
        obj.into()
    }
    pub fn get_edge_data(&self) -> JsValue {
        let (kinds, endpoints) = self.inner.edge_arrays();
        let obj = crate::interop::new_obj();
        crate::interop::set_kv(&obj, "kinds", &crate::interop::arr_u8(&kinds).into());
        crate::interop::set_kv(
            &obj,
            "endpoints",
            &crate::interop::arr_u32(&endpoints).into(),
        );
        obj.into()
    }
    pub fn get_contour_data(&self) -> JsValue {
        let (ids, kinds, closed) = self.inner.contour_arrays();
        let obj = crate::interop::new_obj();
        crate::interop::set_kv(&obj, "ids", &crate::interop::arr_u32(&ids).into());
        crate::interop::set_kv(&obj, "kinds", &crate::interop::arr_u8(&kinds).into());
        crate::interop::set_kv(&obj, "closed", &crate::interop::arr_u8(&closed).into());
        obj.into()
    }
    pub fn get_selected_ids(&self) -> js_sys::Uint32Array {
        crate::interop::arr_u32(&self.inner.selected_ids())
    }

    /// Current building anchor preview, or null.
    pub fn get_anchor(&self) -> JsValue {
        match self.inner.anchor() {
            Some(a) => {
                let obj = crate::interop::new_obj();
                crate::interop::set_kv(&obj, "kind", &JsValue::from_f64(a.kind as u8 as f64));
                crate::interop::set_kv(&obj, "point", &JsValue::from_f64(a.point as f64));
                crate::interop::set_kv(&obj, "x", &JsValue::from_f64(a.pos.x as f64));
                crate::interop::set_kv(&obj, "y", &JsValue::from_f64(a.pos.y as f64));
                obj.into()
            }
            None => JsValue::NULL,
        }
    }

    /// Drain queued events into an array of tagged objects.
    pub fn drain_events(&mut self) -> Array {
        let events = self.inner.drain_events();
        let arr = Array::new();
        for ev in &events {
            arr.push(&event_to_js(ev));
        }
        arr
    }

    // JSON introspection
    pub fn to_json(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.to_json_value()).unwrap()
    }
    pub fn log_state(&self) {
        if let Ok(s) = serde_json::to_string(&self.inner.to_json_value()) {
            web_sys::console::log_1(&JsValue::from_str(&s));
        }
    }
}
