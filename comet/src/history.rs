//! Command log: every externally visible mutation is a reversible unit.
//!
//! Commands are a sum type holding immutable payloads (snapshots and prior
//! ids captured when the gesture committed), so `execute` and `undo` are
//! pure functions of graph state + payload. Payload coordinates carry the
//! view ratio they were captured at and are rescaled to the current ratio
//! at replay, which keeps undo/redo geometrically exact across zooms.

use crate::graph::ContourGraph;
use crate::model::{Comet, Contour, ContourId, Point, PointId, PointKind, PointRef, Roommate, Vec2};
use crate::selection::Selection;
use crate::SessionEvent;

/// Mutable view over the session parts a replay may touch. The history
/// itself stays outside so commands can never re-enter the log.
pub(crate) struct Replay<'a> {
    pub graph: &'a mut ContourGraph,
    pub selection: &'a mut Selection,
    pub events: &'a mut Vec<SessionEvent>,
    pub ratio: f32,
}

impl Replay<'_> {
    #[inline]
    fn rescale(&self, v: Vec2, captured: f32) -> Vec2 {
        v.scaled(self.ratio / captured)
    }

    fn delete_points(&mut self, refs: &[PointRef]) {
        self.graph.delete_points(refs);
        for r in refs {
            self.selection.remove(r.id);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointSnapshot {
    pub id: PointId,
    pub kind: PointKind,
    pub contour: ContourId,
    pub pos: Vec2,
    pub neighbors: Vec<PointId>,
    pub roommate: Option<Roommate>,
}

impl PointSnapshot {
    pub(crate) fn of(p: &Point) -> Self {
        PointSnapshot {
            id: p.id,
            kind: p.kind,
            contour: p.contour,
            pos: p.pos,
            neighbors: p.neighbors.clone(),
            roommate: p.roommate,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContourSnapshot {
    pub id: ContourId,
    pub kind: PointKind,
    pub closed: bool,
    pub points: Vec<PointSnapshot>,
}

impl ContourSnapshot {
    pub(crate) fn of(c: &Contour) -> Self {
        ContourSnapshot {
            id: c.id,
            kind: c.kind,
            closed: c.closed,
            points: c.points.values().map(PointSnapshot::of).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMove {
    pub kind: PointKind,
    pub id: PointId,
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Clone, Debug)]
pub enum Command {
    /// Click-to-place: a new point, optionally chained to `root` and
    /// optionally roommate-paired (the opposite-kind anchor click).
    AddPoint {
        kind: PointKind,
        id: PointId,
        contour: ContourId,
        pos: Vec2,
        root: Option<PointId>,
        roommate: Option<Roommate>,
        ratio: f32,
    },
    /// Non-closing connect of two existing points, possibly unioning two
    /// contours into `merged_into` (pre-allocated for redo stability).
    ConnectPoints {
        kind: PointKind,
        src: PointId,
        dst: PointId,
        src_contour: ContourId,
        dst_contour: ContourId,
        merged_into: Option<ContourId>,
    },
    /// Closing connect on a tail contour: adjacency, closed flag, and the
    /// pruning of points left outside the closing cycle.
    CloseContour {
        kind: PointKind,
        src: PointId,
        dst: PointId,
        contour: ContourId,
        pruned: Vec<PointSnapshot>,
        ratio: f32,
    },
    /// Closing click on a head contour: the head (and, when nested, its
    /// enclosing closed tail) are consumed wholesale into a comet. The
    /// snapshots are the contours exactly as they stood before the click.
    CompleteComet {
        head: ContourSnapshot,
        tail: Option<ContourSnapshot>,
        /// Points outside the consumed contours whose roommate pointed in.
        unpaired: Vec<(PointRef, Roommate)>,
        comet: Comet,
        ratio: f32,
    },
    /// Drag commit: per-point origin -> destination offsets, plus the
    /// roommate pairing established when the pivot snapped onto an
    /// opposite-kind anchor.
    MovePoints {
        moves: Vec<PointMove>,
        paired: Option<(PointRef, Roommate)>,
        ratio: f32,
    },
    DeletePoints {
        removed: Vec<PointSnapshot>,
        /// Closed flags of every touched contour before the delete.
        contours: Vec<(PointKind, ContourId, bool)>,
        ratio: f32,
    },
    /// Requested-point insertion onto an existing edge.
    InsertPointOnEdge {
        kind: PointKind,
        id: PointId,
        contour: ContourId,
        a: PointId,
        b: PointId,
        was_closed: bool,
        pos: Vec2,
        ratio: f32,
    },
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::AddPoint { .. } => "add point",
            Command::ConnectPoints { .. } => "connect points",
            Command::CloseContour { .. } => "close contour",
            Command::CompleteComet { .. } => "complete comet",
            Command::MovePoints { .. } => "move selection",
            Command::DeletePoints { .. } => "delete points",
            Command::InsertPointOnEdge { .. } => "insert point",
        }
    }

    pub(crate) fn execute(&self, rp: &mut Replay) {
        match self {
            Command::AddPoint {
                kind,
                id,
                contour,
                pos,
                root,
                roommate,
                ratio,
            } => {
                let p = rp.rescale(*pos, *ratio);
                rp.graph
                    .create_point(*kind, p, Some(*id), Some(*contour), *roommate);
                if let Some(root) = root {
                    rp.graph
                        .connect(*kind, *root, *id, None)
                        .expect("chain root must exist");
                }
            }
            Command::ConnectPoints {
                kind,
                src,
                dst,
                merged_into,
                ..
            } => {
                let out = rp
                    .graph
                    .connect(*kind, *src, *dst, *merged_into)
                    .expect("connect endpoints must exist");
                debug_assert_eq!(out.merged_into, *merged_into);
            }
            Command::CloseContour {
                kind,
                src,
                dst,
                contour,
                pruned,
                ..
            } => {
                rp.graph.link(*kind, *src, *dst);
                let refs: Vec<PointRef> = pruned
                    .iter()
                    .map(|s| PointRef {
                        kind: s.kind,
                        id: s.id,
                    })
                    .collect();
                rp.delete_points(&refs);
                rp.graph.set_closed(*kind, *contour, true);
            }
            Command::CompleteComet {
                head,
                tail,
                unpaired,
                comet,
                ratio,
            } => {
                consume_contour(rp, head);
                if let Some(t) = tail {
                    consume_contour(rp, t);
                }
                for (pref, _) in unpaired {
                    rp.graph.set_roommate_raw(*pref, None);
                }
                let built = Comet {
                    tail: comet.tail.iter().map(|&v| rp.rescale(v, *ratio)).collect(),
                    head: comet.head.iter().map(|&v| rp.rescale(v, *ratio)).collect(),
                };
                rp.events.push(SessionEvent::CometBuilt(built));
            }
            Command::MovePoints {
                moves,
                paired,
                ratio,
            } => {
                for m in moves {
                    let to = rp.rescale(m.to, *ratio);
                    rp.graph.move_point(m.kind, m.id, to);
                }
                if let Some((pref, rm)) = paired {
                    rp.graph.set_roommate_pair(*pref, *rm);
                }
            }
            Command::DeletePoints { removed, .. } => {
                let refs: Vec<PointRef> = removed
                    .iter()
                    .map(|s| PointRef {
                        kind: s.kind,
                        id: s.id,
                    })
                    .collect();
                rp.delete_points(&refs);
            }
            Command::InsertPointOnEdge {
                kind,
                id,
                contour,
                a,
                b,
                pos,
                ratio,
                ..
            } => {
                let p = rp.rescale(*pos, *ratio);
                rp.graph.create_point(*kind, p, Some(*id), Some(*contour), None);
                rp.graph.link(*kind, *id, *a);
                rp.graph.link(*kind, *id, *b);
                rp.graph.unlink(*kind, *a, *b);
            }
        }
    }

    pub(crate) fn undo(&self, rp: &mut Replay) {
        match self {
            Command::AddPoint { kind, id, .. } => {
                rp.delete_points(&[PointRef {
                    kind: *kind,
                    id: *id,
                }]);
            }
            Command::ConnectPoints {
                kind,
                src,
                dst,
                src_contour,
                dst_contour,
                ..
            } => {
                rp.graph
                    .disconnect(*kind, *src, *dst, *src_contour, *dst_contour);
            }
            Command::CloseContour {
                kind,
                src,
                dst,
                contour,
                pruned,
                ratio,
            } => {
                rp.graph.set_closed(*kind, *contour, false);
                rp.graph.unlink(*kind, *src, *dst);
                restore_points(rp, pruned, *ratio);
            }
            Command::CompleteComet {
                head,
                tail,
                unpaired,
                ratio,
                ..
            } => {
                restore_contour(rp, head, *ratio);
                if let Some(t) = tail {
                    restore_contour(rp, t, *ratio);
                }
                for (pref, rm) in unpaired {
                    rp.graph.set_roommate_raw(*pref, Some(*rm));
                }
                rp.events.push(SessionEvent::CometRetracted);
            }
            Command::MovePoints {
                moves,
                paired,
                ratio,
            } => {
                if let Some((pref, _)) = paired {
                    rp.graph.clear_roommate_pair(*pref);
                }
                for m in moves {
                    let from = rp.rescale(m.from, *ratio);
                    rp.graph.move_point(m.kind, m.id, from);
                }
            }
            Command::DeletePoints {
                removed,
                contours,
                ratio,
            } => {
                restore_points(rp, removed, *ratio);
                for &(kind, cid, closed) in contours {
                    rp.graph.set_closed(kind, cid, closed);
                }
            }
            Command::InsertPointOnEdge {
                kind,
                id,
                contour,
                a,
                b,
                was_closed,
                ..
            } => {
                rp.graph.link(*kind, *a, *b);
                rp.delete_points(&[PointRef {
                    kind: *kind,
                    id: *id,
                }]);
                rp.graph.set_closed(*kind, *contour, *was_closed);
            }
        }
    }
}

/// Recreate deleted points exactly: identity, contour membership, adjacency
/// and roommate pairing, with positions rescaled to the current ratio.
fn restore_points(rp: &mut Replay, snaps: &[PointSnapshot], ratio: f32) {
    for s in snaps {
        let pos = rp.rescale(s.pos, ratio);
        rp.graph
            .create_point(s.kind, pos, Some(s.id), Some(s.contour), None);
    }
    for s in snaps {
        for &n in &s.neighbors {
            rp.graph.link(s.kind, s.id, n);
        }
        if let Some(rm) = s.roommate {
            rp.graph.set_roommate_pair(
                PointRef {
                    kind: s.kind,
                    id: s.id,
                },
                rm,
            );
        }
    }
}

fn consume_contour(rp: &mut Replay, snap: &ContourSnapshot) {
    rp.graph.remove_contour(snap.kind, snap.id);
    for s in &snap.points {
        rp.selection.remove(s.id);
    }
}

fn restore_contour(rp: &mut Replay, snap: &ContourSnapshot, ratio: f32) {
    let mut c = Contour::new(snap.id, snap.kind);
    c.closed = snap.closed;
    for s in &snap.points {
        c.points.insert(
            s.id,
            Point {
                id: s.id,
                pos: rp.rescale(s.pos, ratio),
                kind: snap.kind,
                contour: snap.id,
                neighbors: s.neighbors.clone(),
                roommate: s.roommate,
            },
        );
    }
    rp.graph.insert_contour(snap.kind, c);
}

/// Linear undo/redo stacks. Executing a new command clears the redo stack.
#[derive(Default)]
pub struct History {
    undo: Vec<Command>,
    redo: Vec<Command>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Record a command whose forward effect has already been applied.
    pub(crate) fn push_executed(&mut self, cmd: Command) {
        self.redo.clear();
        self.undo.push(cmd);
    }

    pub(crate) fn undo(&mut self, rp: &mut Replay) -> Option<&'static str> {
        let cmd = self.undo.pop()?;
        cmd.undo(rp);
        let label = cmd.label();
        self.redo.push(cmd);
        Some(label)
    }

    pub(crate) fn redo(&mut self, rp: &mut Replay) -> Option<&'static str> {
        let cmd = self.redo.pop()?;
        cmd.execute(rp);
        let label = cmd.label();
        self.undo.push(cmd);
        Some(label)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
    pub fn undo_label(&self) -> Option<&'static str> {
        self.undo.last().map(Command::label)
    }
    pub fn redo_label(&self) -> Option<&'static str> {
        self.redo.last().map(Command::label)
    }
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
