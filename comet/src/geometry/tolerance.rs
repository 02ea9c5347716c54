// Centralized tolerances and interaction radii

pub const EPS_POS: f32 = 1e-4; // point coincidence threshold (px)
pub const EPS_LEN: f32 = 1e-6; // zero-length vector threshold
pub const EPS_DENOM: f32 = 1e-8; // denominator guard for projections/ratios

// Interaction radii, in canvas pixels at the current view ratio
pub const SNAP_POINT_TOL: f32 = 8.0; // anchoring radius around a point
pub const SNAP_EDGE_TOL: f32 = 5.0; // edge-hit radius for point insertion
pub const DRAG_THRESHOLD: f32 = 3.0; // motion before a press becomes a drag

#[inline]
pub fn clamp01(x: f32) -> f32 {
    x.max(0.0).min(1.0)
}
#[inline]
pub fn near_zero(x: f32, eps: f32) -> bool {
    x.abs() <= eps
}
#[inline]
pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
