//! Cursor snapping: nearest connectable point per collection, and nearest
//! edge segment for the insert-point-on-edge request.

use crate::geometry::math::seg_distance_sq;
use crate::graph::ContourGraph;
use crate::model::{ContourId, PointId, PointKind, PointRef, Vec2};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub kind: PointKind,
    pub contour: ContourId,
    pub point: PointId,
    pub pos: Vec2,
    pub dist: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeHit {
    pub kind: PointKind,
    pub contour: ContourId,
    pub a: PointId,
    pub b: PointId,
    pub t: f32,
    pub dist: f32,
}

/// Scan both collections for the minimum-distance qualifying point under
/// `tol`, skipping the forbidden set (and closed contours when asked).
/// Returns the best tail candidate and the best head candidate; the
/// builder's tie-break rule picks between them.
pub fn nearest_anchors(
    g: &ContourGraph,
    pos: Vec2,
    forbidden: &HashSet<PointRef>,
    skip_closed: bool,
    tol: f32,
) -> (Option<Anchor>, Option<Anchor>) {
    (
        scan(g, PointKind::Tail, pos, forbidden, skip_closed, tol),
        scan(g, PointKind::Head, pos, forbidden, skip_closed, tol),
    )
}

fn scan(
    g: &ContourGraph,
    kind: PointKind,
    pos: Vec2,
    forbidden: &HashSet<PointRef>,
    skip_closed: bool,
    tol: f32,
) -> Option<Anchor> {
    let tol2 = tol * tol;
    let mut best: Option<(Anchor, f32)> = None;
    for c in g.active().collection(kind).values() {
        if skip_closed && c.closed {
            continue;
        }
        for p in c.points.values() {
            if forbidden.contains(&PointRef { kind, id: p.id }) {
                continue;
            }
            let d2 = p.pos.dist_sq(pos);
            if d2 <= tol2 && best.map_or(true, |(_, bd2)| d2 < bd2) {
                best = Some((
                    Anchor {
                        kind,
                        contour: c.id,
                        point: p.id,
                        pos: p.pos,
                        dist: d2.sqrt(),
                    },
                    d2,
                ));
            }
        }
    }
    best.map(|(a, _)| a)
}

/// Closest edge segment under `tol` across both collections, with the
/// clamped projection parameter. Backs the right-click point insertion.
pub fn nearest_edge(g: &ContourGraph, pos: Vec2, tol: f32) -> Option<EdgeHit> {
    let tol2 = tol * tol;
    let mut best: Option<(EdgeHit, f32)> = None;
    for kind in [PointKind::Tail, PointKind::Head] {
        for c in g.active().collection(kind).values() {
            for p in c.points.values() {
                for &n in &p.neighbors {
                    // Each adjacency pair appears twice; keep one orientation
                    if n <= p.id {
                        continue;
                    }
                    let q = match c.points.get(&n) {
                        Some(q) => q,
                        None => continue,
                    };
                    let (d2, t) = seg_distance_sq(pos.x, pos.y, p.pos.x, p.pos.y, q.pos.x, q.pos.y);
                    if d2 <= tol2 && best.map_or(true, |(_, bd2)| d2 < bd2) {
                        best = Some((
                            EdgeHit {
                                kind,
                                contour: c.id,
                                a: p.id,
                                b: n,
                                t,
                                dist: d2.sqrt(),
                            },
                            d2,
                        ));
                    }
                }
            }
        }
    }
    best.map(|(h, _)| h)
}
