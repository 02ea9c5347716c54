use comet::builder::Builder;
use comet::graph::ContourGraph;
use comet::model::{PointId, PointKind, PointRef, Roommate, Vec2};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Clone, Debug)]
enum Op {
    Create { head: bool, x: i16, y: i16 },
    Chain { head: bool, idx: u16, x: i16, y: i16 },
    Connect { head: bool, a: u16, b: u16 },
    Move { head: bool, idx: u16, dx: i8, dy: i8 },
    Delete { head: bool, idx: u16 },
    Close { head: bool, idx: u16 },
    Pair { t: u16, h: u16 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), any::<i16>(), any::<i16>())
            .prop_map(|(head, x, y)| Op::Create { head, x, y }),
        (any::<bool>(), any::<u16>(), any::<i16>(), any::<i16>())
            .prop_map(|(head, idx, x, y)| Op::Chain { head, idx, x, y }),
        (any::<bool>(), any::<u16>(), any::<u16>())
            .prop_map(|(head, a, b)| Op::Connect { head, a, b }),
        (any::<bool>(), any::<u16>(), any::<i8>(), any::<i8>())
            .prop_map(|(head, idx, dx, dy)| Op::Move { head, idx, dx, dy }),
        (any::<bool>(), any::<u16>()).prop_map(|(head, idx)| Op::Delete { head, idx }),
        (any::<bool>(), any::<u16>()).prop_map(|(head, idx)| Op::Close { head, idx }),
        (any::<u16>(), any::<u16>()).prop_map(|(t, h)| Op::Pair { t, h }),
    ]
}

fn kind_of(head: bool) -> PointKind {
    if head {
        PointKind::Head
    } else {
        PointKind::Tail
    }
}

#[derive(Default)]
struct ModelState {
    tails: Vec<PointId>,
    heads: Vec<PointId>,
}

impl ModelState {
    fn of(&self, kind: PointKind) -> &Vec<PointId> {
        match kind {
            PointKind::Tail => &self.tails,
            PointKind::Head => &self.heads,
        }
    }
}

fn sync_state(g: &ContourGraph, state: &mut ModelState) {
    for (kind, out) in [
        (PointKind::Tail, &mut state.tails),
        (PointKind::Head, &mut state.heads),
    ] {
        let mut ids: Vec<PointId> = g
            .active()
            .collection(kind)
            .values()
            .flat_map(|c| c.points.keys().copied())
            .collect();
        ids.sort_unstable();
        *out = ids;
    }
}

fn apply_op(g: &mut ContourGraph, state: &ModelState, op: Op) {
    match op {
        Op::Create { head, x, y } => {
            let kind = kind_of(head);
            g.create_point(
                kind,
                Vec2::new(x as f32 * 0.1, y as f32 * 0.1),
                None,
                None,
                None,
            );
        }
        Op::Chain { head, idx, x, y } => {
            let kind = kind_of(head);
            let pool = state.of(kind);
            if pool.is_empty() {
                return;
            }
            let root = pool[(idx as usize) % pool.len()];
            let _ = Builder::for_kind(kind).create_and_connect(
                g,
                root,
                Vec2::new(x as f32 * 0.1, y as f32 * 0.1),
                None,
                None,
            );
        }
        Op::Connect { head, a, b } => {
            let kind = kind_of(head);
            let pool = state.of(kind);
            if pool.len() < 2 {
                return;
            }
            let aid = pool[(a as usize) % pool.len()];
            let bid = pool[(b as usize) % pool.len()];
            if aid == bid {
                return;
            }
            let _ = g.connect(kind, aid, bid, None);
        }
        Op::Move { head, idx, dx, dy } => {
            let kind = kind_of(head);
            let pool = state.of(kind);
            if pool.is_empty() {
                return;
            }
            let pid = pool[(idx as usize) % pool.len()];
            if let Some(p) = g.point(kind, pid) {
                let next = p.pos + Vec2::new(dx as f32 * 0.05, dy as f32 * 0.05);
                let _ = g.move_point(kind, pid, next);
            }
        }
        Op::Delete { head, idx } => {
            let kind = kind_of(head);
            let pool = state.of(kind);
            if pool.is_empty() {
                return;
            }
            let pid = pool[(idx as usize) % pool.len()];
            g.delete_points(&[PointRef { kind, id: pid }]);
        }
        Op::Close { head, idx } => {
            // Flag a contour closed only when a cycle actually exists,
            // the way completion does
            let kind = kind_of(head);
            let pool = state.of(kind);
            if pool.is_empty() {
                return;
            }
            let pid = pool[(idx as usize) % pool.len()];
            if let Some(cid) = g.contour_of_point(kind, pid) {
                if g.check_contour_closed(kind, cid, pid).is_some() {
                    g.set_closed(kind, cid, true);
                }
            }
        }
        Op::Pair { t, h } => {
            if state.tails.is_empty() || state.heads.is_empty() {
                return;
            }
            let tid = state.tails[(t as usize) % state.tails.len()];
            let hid = state.heads[(h as usize) % state.heads.len()];
            // Pairing is only ever offered between free points
            let t_free = g.point(PointKind::Tail, tid).map_or(false, |p| p.roommate.is_none());
            let h_free = g.point(PointKind::Head, hid).map_or(false, |p| p.roommate.is_none());
            if !t_free || !h_free {
                return;
            }
            let contour = match g.contour_of_point(PointKind::Head, hid) {
                Some(c) => c,
                None => return,
            };
            g.set_roommate_pair(
                PointRef {
                    kind: PointKind::Tail,
                    id: tid,
                },
                Roommate {
                    kind: PointKind::Head,
                    contour,
                    point: hid,
                },
            );
        }
    }
}

fn assert_invariants(g: &ContourGraph) {
    let mut all_ids: HashSet<PointId> = HashSet::new();
    for kind in [PointKind::Tail, PointKind::Head] {
        for (&cid, c) in g.active().collection(kind) {
            assert_eq!(c.id, cid, "contour key/id mismatch");
            assert_eq!(c.kind, kind, "contour in the wrong collection");
            assert!(!c.points.is_empty(), "empty contour record survived");
            if c.closed {
                let has_cycle = c
                    .points
                    .keys()
                    .any(|&p| g.check_contour_closed(kind, cid, p).is_some());
                assert!(has_cycle, "closed flag on acyclic contour {}", cid);
            }
            for p in c.points.values() {
                assert!(all_ids.insert(p.id), "duplicate point id {}", p.id);
                assert_eq!(p.contour, cid, "point {} names the wrong contour", p.id);
                assert_eq!(p.kind, kind, "point {} has the wrong kind", p.id);

                // Symmetric adjacency, inside the same contour, no dupes
                let mut seen = HashSet::new();
                for &n in &p.neighbors {
                    assert_ne!(n, p.id, "self loop on {}", p.id);
                    assert!(seen.insert(n), "duplicate neighbor {} on {}", n, p.id);
                    let q = c
                        .points
                        .get(&n)
                        .unwrap_or_else(|| panic!("neighbor {} of {} left the contour", n, p.id));
                    assert!(
                        q.neighbors.contains(&p.id),
                        "asymmetric edge {} -> {}",
                        p.id,
                        n
                    );
                }

                // Roommates are symmetric, cross-kind and name live contours
                if let Some(rm) = p.roommate {
                    assert_eq!(rm.kind, kind.other(), "same-kind roommate on {}", p.id);
                    let partner = g
                        .point(rm.kind, rm.point)
                        .unwrap_or_else(|| panic!("dangling roommate on {}", p.id));
                    assert_eq!(partner.contour, rm.contour, "stale roommate contour");
                    let back = partner
                        .roommate
                        .unwrap_or_else(|| panic!("one-sided roommate on {}", p.id));
                    assert_eq!(back.point, p.id, "roommate back-reference mismatch");
                    assert_eq!(back.contour, p.contour, "stale back-reference contour");
                }
            }
        }
    }
}

fn sequence_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 5..40)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 1_000, .. ProptestConfig::default() })]
    #[test]
    fn graph_edit_invariants(seq in sequence_strategy()) {
        let mut g = ContourGraph::new();
        let mut state = ModelState::default();
        for op in seq {
            sync_state(&g, &mut state);
            apply_op(&mut g, &state, op);
        }
        assert_invariants(&g);
    }
}
