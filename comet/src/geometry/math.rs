use super::tolerance::EPS_DENOM;

/// Squared distance from (px,py) to segment (x1,y1)-(x2,y2) and the clamped
/// projection parameter t in [0,1]. Degenerate segments collapse to the
/// first endpoint.
pub fn seg_distance_sq(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32) {
    let vx = x2 - x1;
    let vy = y2 - y1;
    let wx = px - x1;
    let wy = py - y1;
    let vv = vx * vx + vy * vy;
    let mut t = if vv > EPS_DENOM { (wx * vx + wy * vy) / vv } else { 0.0 };
    if t < 0.0 {
        t = 0.0;
    } else if t > 1.0 {
        t = 1.0;
    }
    let projx = x1 + t * vx;
    let projy = y1 + t * vy;
    let dx = px - projx;
    let dy = py - projy;
    (dx * dx + dy * dy, t)
}

pub fn dist_point_to_seg_sq(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let (d2, _) = seg_distance_sq(px, py, x1, y1, x2, y2);
    d2
}
