//! Canvas interaction state machine: turns raw pointer/keyboard events into
//! graph and selection mutations depending on the active mode.
//!
//! One flat mode enum replaces the source's nested state-object hierarchy;
//! every handler is a free function over the session so the dispatch stays
//! in one place.

use crate::algorithms::anchoring::{nearest_anchors, nearest_edge, Anchor, EdgeHit};
use crate::builder::Builder;
use crate::geometry::tolerance::{DRAG_THRESHOLD, EPS_POS, SNAP_EDGE_TOL, SNAP_POINT_TOL};
use crate::history::{Command, ContourSnapshot, PointMove, PointSnapshot};
use crate::model::{Comet, ContourId, PointId, PointKind, PointRef, Roommate, Vec2};
use crate::selection::{rect_contains, SelectedPoint};
use crate::{Session, SessionEvent};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Selecting,
    Building(PointKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
}

/// A pending request to insert a point onto an existing edge: the clicked
/// coordinates plus the two neighbors defining that edge. One at a time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RequestedPoint {
    pub hit: EdgeHit,
    pub pos: Vec2,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct DragState {
    pub start: Vec2,
    pub moved: bool,
}

#[derive(Debug)]
pub(crate) struct Machine {
    pub mode: Mode,
    /// Chain root while building; always of the building kind.
    pub root: Option<PointId>,
    pub anchor: Option<Anchor>,
    pub requested: Option<RequestedPoint>,
    pub drag: Option<DragState>,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            mode: Mode::Viewing,
            root: None,
            anchor: None,
            requested: None,
            drag: None,
        }
    }

    pub fn reset_interaction(&mut self) {
        self.root = None;
        self.anchor = None;
        self.requested = None;
        self.drag = None;
    }
}

pub(crate) fn pointer_down_impl(s: &mut Session, pos: Vec2, button: Button, ctrl: bool) {
    match s.machine.mode {
        Mode::Viewing => match button {
            Button::Primary => viewing_select_shape(s, pos),
            Button::Secondary => s.events.push(SessionEvent::ContextMenuRequested(pos)),
        },
        Mode::Selecting => match button {
            Button::Primary => selecting_press(s, pos, ctrl),
            Button::Secondary => {
                if let Some(hit) = nearest_edge(&s.graph, pos, SNAP_EDGE_TOL) {
                    s.machine.requested = Some(RequestedPoint { hit, pos });
                    s.events.push(SessionEvent::ContextMenuRequested(pos));
                }
            }
        },
        Mode::Building(kind) => match button {
            Button::Primary => building_click(s, kind, pos),
            Button::Secondary => {
                // Abort the in-progress chain; placed points stay
                s.machine.root = None;
                s.machine.anchor = None;
                s.events.push(SessionEvent::Redraw);
            }
        },
    }
}

pub(crate) fn pointer_move_impl(s: &mut Session, pos: Vec2) {
    match s.machine.mode {
        Mode::Viewing => {}
        Mode::Selecting => selecting_drag(s, pos),
        Mode::Building(kind) => {
            update_building_anchor(s, kind, pos);
            s.events.push(SessionEvent::Redraw);
        }
    }
}

pub(crate) fn pointer_up_impl(s: &mut Session, _pos: Vec2) {
    if s.machine.mode != Mode::Selecting {
        return;
    }
    if s.machine.drag.take().is_none() {
        return;
    }
    if let Some((a, b)) = s.selection.take_band() {
        finish_band_select(s, a, b);
        return;
    }
    if s.selection.moved {
        commit_drag(s);
    }
    s.selection.moved = false;
    s.machine.anchor = None;
    s.events.push(SessionEvent::Redraw);
}

pub(crate) fn delete_key_impl(s: &mut Session) {
    match s.machine.mode {
        Mode::Viewing | Mode::Selecting => delete_selection(s),
        Mode::Building(_) => {}
    }
}

// ---- Viewing ----

fn viewing_select_shape(s: &mut Session, pos: Vec2) {
    let hit: Option<(PointKind, ContourId)> = {
        let (t, h) = nearest_anchors(&s.graph, pos, &HashSet::new(), false, SNAP_POINT_TOL);
        match closest(t, h) {
            Some(a) => Some((a.kind, a.contour)),
            None => nearest_edge(&s.graph, pos, SNAP_EDGE_TOL).map(|e| (e.kind, e.contour)),
        }
    };
    s.selection.clear();
    if let Some((kind, cid)) = hit {
        if let Some(c) = s.graph.contour(kind, cid) {
            let entries: Vec<SelectedPoint> = c
                .points
                .values()
                .map(|p| SelectedPoint {
                    id: p.id,
                    kind,
                    contour: cid,
                    origin: p.pos,
                })
                .collect();
            for sp in entries {
                s.selection.insert(sp);
            }
        }
    }
    s.events.push(SessionEvent::Redraw);
}

// ---- Selecting ----

fn selecting_press(s: &mut Session, pos: Vec2, ctrl: bool) {
    let (t, h) = nearest_anchors(&s.graph, pos, &HashSet::new(), false, SNAP_POINT_TOL);
    match closest(t, h) {
        Some(a) => {
            let sp = SelectedPoint {
                id: a.point,
                kind: a.kind,
                contour: a.contour,
                origin: a.pos,
            };
            if ctrl {
                s.selection.toggle(sp);
            } else if !s.selection.contains(a.point) {
                s.selection.replace_with(sp);
            }
            s.selection.pivot = if s.selection.contains(a.point) {
                Some(a.point)
            } else {
                None
            };
            let graph = &s.graph;
            s.selection
                .capture_origins(|k, id| graph.point(k, id).map(|p| p.pos));
            s.machine.drag = Some(DragState {
                start: pos,
                moved: false,
            });
            s.selection.moved = false;
        }
        None => {
            if !ctrl {
                s.selection.clear();
            }
            s.selection.begin_band(pos);
            s.machine.drag = Some(DragState {
                start: pos,
                moved: false,
            });
        }
    }
    s.events.push(SessionEvent::Redraw);
}

fn selecting_drag(s: &mut Session, pos: Vec2) {
    let mut drag = match s.machine.drag {
        Some(d) => d,
        None => return,
    };
    if s.selection.band.is_some() {
        s.selection.update_band(pos);
        s.events.push(SessionEvent::Redraw);
        return;
    }
    if s.selection.is_empty() {
        return;
    }
    let delta = pos - drag.start;
    if !drag.moved && delta.dist_sq(Vec2::default()) < DRAG_THRESHOLD * DRAG_THRESHOLD {
        return;
    }
    drag.moved = true;
    s.machine.drag = Some(drag);
    s.selection.moved = true;

    let entries: Vec<SelectedPoint> = s.selection.iter().copied().collect();
    for sp in &entries {
        s.graph.move_point(sp.kind, sp.id, sp.origin + delta);
    }

    // The pivot may snap onto an unpaired opposite-kind point, previewing a
    // roommate pairing that the drag commit will establish.
    s.machine.anchor = None;
    if let Some(pid) = s.selection.pivot {
        if let Some(psp) = s.selection.get(pid).copied() {
            let pivot_paired = s
                .graph
                .point(psp.kind, pid)
                .map_or(true, |p| p.roommate.is_some());
            if !pivot_paired {
                let forbidden: HashSet<PointRef> = entries
                    .iter()
                    .map(|sp| PointRef {
                        kind: sp.kind,
                        id: sp.id,
                    })
                    .collect();
                let (t, h) =
                    nearest_anchors(&s.graph, psp.origin + delta, &forbidden, false, SNAP_POINT_TOL);
                let opp = match psp.kind {
                    PointKind::Tail => h,
                    PointKind::Head => t,
                };
                if let Some(a) = opp {
                    let free = s
                        .graph
                        .point(a.kind, a.point)
                        .map_or(false, |p| p.roommate.is_none());
                    if free {
                        s.machine.anchor = Some(a);
                        s.graph.move_point(psp.kind, pid, a.pos);
                    }
                }
            }
        }
    }
    s.events.push(SessionEvent::Redraw);
}

fn finish_band_select(s: &mut Session, a: Vec2, b: Vec2) {
    let mut picked: Vec<SelectedPoint> = Vec::new();
    for kind in [PointKind::Tail, PointKind::Head] {
        for c in s.graph.active().collection(kind).values() {
            for p in c.points.values() {
                if rect_contains(a, b, p.pos) {
                    picked.push(SelectedPoint {
                        id: p.id,
                        kind,
                        contour: c.id,
                        origin: p.pos,
                    });
                }
            }
        }
    }
    for sp in picked {
        s.selection.insert(sp);
    }
    s.events.push(SessionEvent::Redraw);
}

fn commit_drag(s: &mut Session) {
    let mut moves: Vec<PointMove> = Vec::new();
    for sp in s.selection.iter() {
        let to = match s.graph.point(sp.kind, sp.id) {
            Some(p) => p.pos,
            None => continue,
        };
        moves.push(PointMove {
            kind: sp.kind,
            id: sp.id,
            from: sp.origin,
            to,
        });
    }
    if moves
        .iter()
        .all(|m| m.from.dist_sq(m.to) <= EPS_POS * EPS_POS)
    {
        return;
    }
    let paired = match (s.machine.anchor, s.selection.pivot) {
        (Some(a), Some(pid)) => {
            let pkind = s.selection.get(pid).map(|sp| sp.kind);
            match pkind {
                Some(k) if a.kind == k.other() => Some((
                    PointRef { kind: k, id: pid },
                    Roommate {
                        kind: a.kind,
                        contour: a.contour,
                        point: a.point,
                    },
                )),
                _ => None,
            }
        }
        _ => None,
    };
    let cmd = Command::MovePoints {
        moves,
        paired,
        ratio: s.ratio,
    };
    s.run(cmd);
}

fn delete_selection(s: &mut Session) {
    if s.selection.is_empty() {
        return;
    }
    let mut removed: Vec<PointSnapshot> = Vec::new();
    let mut contours: Vec<(PointKind, ContourId, bool)> = Vec::new();
    for sp in s.selection.iter() {
        if let Some(p) = s.graph.point(sp.kind, sp.id) {
            removed.push(PointSnapshot::of(p));
            if !contours.iter().any(|&(k, c, _)| k == sp.kind && c == p.contour) {
                let closed = s
                    .graph
                    .contour(sp.kind, p.contour)
                    .map_or(false, |c| c.closed);
                contours.push((sp.kind, p.contour, closed));
            }
        }
    }
    if removed.is_empty() {
        return;
    }
    let cmd = Command::DeletePoints {
        removed,
        contours,
        ratio: s.ratio,
    };
    s.run(cmd);
}

// ---- Building ----

fn building_forbidden(s: &Session, kind: PointKind) -> HashSet<PointRef> {
    let mut f = HashSet::new();
    if let Some(root) = s.machine.root {
        f.insert(PointRef { kind, id: root });
        if let Some(p) = s.graph.point(kind, root) {
            for &n in &p.neighbors {
                f.insert(PointRef { kind, id: n });
            }
        }
    }
    f
}

fn update_building_anchor(s: &mut Session, kind: PointKind, pos: Vec2) {
    let forbidden = building_forbidden(s, kind);
    let (t, h) = nearest_anchors(&s.graph, pos, &forbidden, true, SNAP_POINT_TOL);
    let (own, other) = match kind {
        PointKind::Tail => (t, h),
        PointKind::Head => (h, t),
    };
    s.machine.anchor = Builder::for_kind(kind).choose_anchor(own, other);
}

fn building_click(s: &mut Session, kind: PointKind, pos: Vec2) {
    update_building_anchor(s, kind, pos);
    match s.machine.anchor {
        Some(a) if a.kind == kind => match s.machine.root {
            None => {
                // Continue an existing open chain from the anchored point
                s.machine.root = Some(a.point);
                s.events.push(SessionEvent::Redraw);
            }
            Some(root) if root == a.point => {}
            Some(root) => connect_or_complete(s, kind, root, a),
        },
        Some(a) => {
            // Opposite-kind anchor: co-located own-kind point paired as
            // roommate, becoming the new chain root
            let rm = Roommate {
                kind: a.kind,
                contour: a.contour,
                point: a.point,
            };
            add_chain_point(s, kind, a.pos, Some(rm));
        }
        None => add_chain_point(s, kind, pos, None),
    }
}

fn add_chain_point(s: &mut Session, kind: PointKind, pos: Vec2, roommate: Option<Roommate>) {
    let root = s.machine.root;
    let id = s.graph.alloc_point_id();
    let contour = match root {
        Some(r) => s
            .graph
            .contour_of_point(kind, r)
            .expect("chain root lost its contour"),
        None => s.graph.alloc_contour_id(),
    };
    let cmd = Command::AddPoint {
        kind,
        id,
        contour,
        pos,
        root,
        roommate,
        ratio: s.ratio,
    };
    s.run(cmd);
    s.machine.root = Some(id);
    s.machine.anchor = None;
}

fn connect_or_complete(s: &mut Session, kind: PointKind, root: PointId, a: Anchor) {
    let cs = s
        .graph
        .contour_of_point(kind, root)
        .expect("chain root lost its contour");
    if cs != a.contour {
        // Different chains: union into a fresh contour and keep building
        // from the anchored point
        let merged = Some(s.graph.alloc_contour_id());
        let cmd = Command::ConnectPoints {
            kind,
            src: root,
            dst: a.point,
            src_contour: cs,
            dst_contour: a.contour,
            merged_into: merged,
        };
        s.run(cmd);
        s.machine.root = Some(a.point);
        s.machine.anchor = None;
        return;
    }

    // Probe the closing edge to run the closure check, then retract it; the
    // command's execute is the single real mutation path.
    s.graph.link(kind, root, a.point);
    let cycle = s.graph.check_contour_closed(kind, cs, root);
    let head_poly: Option<Vec<Vec2>> = match (&cycle, kind) {
        (Some(set), PointKind::Head) => {
            let ids = s.graph.cycle_polygon(kind, cs, set);
            Some(
                ids.iter()
                    .filter_map(|&id| s.graph.point(kind, id).map(|p| p.pos))
                    .collect(),
            )
        }
        _ => None,
    };
    s.graph.unlink(kind, root, a.point);

    let cycle = match cycle {
        None => {
            let cmd = Command::ConnectPoints {
                kind,
                src: root,
                dst: a.point,
                src_contour: cs,
                dst_contour: a.contour,
                merged_into: None,
            };
            s.run(cmd);
            s.machine.root = Some(a.point);
            s.machine.anchor = None;
            return;
        }
        Some(c) => c,
    };

    match kind {
        PointKind::Tail => {
            let pruned: Vec<PointSnapshot> = s
                .graph
                .contour(kind, cs)
                .map(|c| {
                    c.points
                        .values()
                        .filter(|p| !cycle.contains(&p.id))
                        .map(PointSnapshot::of)
                        .collect()
                })
                .unwrap_or_default();
            let cmd = Command::CloseContour {
                kind,
                src: root,
                dst: a.point,
                contour: cs,
                pruned,
                ratio: s.ratio,
            };
            s.run(cmd);
        }
        PointKind::Head => {
            let head_poly = head_poly.expect("head polygon captured during probe");
            let head_snap = ContourSnapshot::of(
                s.graph
                    .contour(kind, cs)
                    .expect("completing contour must exist"),
            );
            let nested_tail: Option<ContourId> = s
                .graph
                .active()
                .tails
                .values()
                .find(|c| c.closed && s.graph.contains_any((PointKind::Tail, c.id), &head_poly))
                .map(|c| c.id);
            let tail_snap = nested_tail
                .and_then(|t| s.graph.contour(PointKind::Tail, t))
                .map(ContourSnapshot::of);
            let tail_poly = nested_tail
                .map(|t| s.graph.contour_polygon(PointKind::Tail, t))
                .unwrap_or_default();

            let mut consumed: HashSet<PointId> =
                head_snap.points.iter().map(|p| p.id).collect();
            if let Some(t) = &tail_snap {
                consumed.extend(t.points.iter().map(|p| p.id));
            }
            let mut unpaired: Vec<(PointRef, Roommate)> = Vec::new();
            for snap in head_snap
                .points
                .iter()
                .chain(tail_snap.iter().flat_map(|t| t.points.iter()))
            {
                if let Some(rm) = snap.roommate {
                    if !consumed.contains(&rm.point) {
                        if let Some(partner) = s.graph.point(rm.kind, rm.point) {
                            if let Some(back) = partner.roommate {
                                unpaired.push((rm.point_ref(), back));
                            }
                        }
                    }
                }
            }

            let cmd = Command::CompleteComet {
                head: head_snap,
                tail: tail_snap,
                unpaired,
                comet: Comet {
                    tail: tail_poly,
                    head: head_poly,
                },
                ratio: s.ratio,
            };
            s.run(cmd);
        }
    }
    // Shape completed: editing resets
    s.machine.root = None;
    s.machine.anchor = None;
}

pub(crate) fn insert_requested_impl(s: &mut Session) -> bool {
    let req = match s.machine.requested.take() {
        Some(r) => r,
        None => return false,
    };
    let hit = req.hit;
    let still_adjacent = s
        .graph
        .point(hit.kind, hit.a)
        .map_or(false, |p| p.neighbors.contains(&hit.b));
    if !still_adjacent {
        return false;
    }
    let contour = match s.graph.contour_of_point(hit.kind, hit.a) {
        Some(c) => c,
        None => return false,
    };
    let was_closed = s
        .graph
        .contour(hit.kind, contour)
        .map_or(false, |c| c.closed);
    let id = s.graph.alloc_point_id();
    let cmd = Command::InsertPointOnEdge {
        kind: hit.kind,
        id,
        contour,
        a: hit.a,
        b: hit.b,
        was_closed,
        pos: req.pos,
        ratio: s.ratio,
    };
    s.run(cmd);
    true
}

fn closest(a: Option<Anchor>, b: Option<Anchor>) -> Option<Anchor> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if y.dist < x.dist { y } else { x }),
        (x, y) => x.or(y),
    }
}
