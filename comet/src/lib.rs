//! Interactive contour graph engine for manual comet delineation.
//!
//! A session owns the point/contour graph, the multi-point selection, the
//! canvas interaction state machine and the command log. The GUI host feeds
//! it pointer and keyboard events plus the current view ratio, and drains
//! the outbound event queue after every call.

pub mod model;
pub mod graph;
pub mod builder;
pub mod selection;
pub mod machine;
pub mod history;
pub mod geometry {
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod anchoring;
    pub mod winding;
}

use crate::algorithms::anchoring::Anchor;
use crate::graph::{ContourGraph, EditContext};
use crate::history::{History, Replay};
use crate::machine::{Button, Machine, Mode, RequestedPoint};
use crate::model::{Comet, PointKind, Vec2};
use crate::selection::Selection;

/// Outbound notifications for the host.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Repaint the canvas after any mutation.
    Redraw,
    /// The comet-in-progress geometry changed; host marks it dirty.
    PointsChanged,
    /// Undo/redo affordances changed.
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
        undo_label: Option<&'static str>,
        redo_label: Option<&'static str>,
    },
    /// A comet was assembled; host persists the polygons.
    CometBuilt(Comet),
    /// The assembling command was undone; host drops the last comet.
    CometRetracted,
    /// Secondary click the host should answer with a context menu.
    ContextMenuRequested(Vec2),
}

pub struct Session {
    pub(crate) graph: ContourGraph,
    pub(crate) selection: Selection,
    pub(crate) machine: Machine,
    pub(crate) history: History,
    pub(crate) ratio: f32,
    pub(crate) events: Vec<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            graph: ContourGraph::new(),
            selection: Selection::new(),
            machine: Machine::new(),
            history: History::new(),
            ratio: 1.0,
            events: Vec::new(),
        }
    }

    /// Back to a blank session (new project / restart).
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    pub fn graph(&self) -> &ContourGraph {
        &self.graph
    }
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
    pub fn mode(&self) -> Mode {
        self.machine.mode
    }
    pub fn anchor(&self) -> Option<Anchor> {
        self.machine.anchor
    }
    pub fn requested_point(&self) -> Option<RequestedPoint> {
        self.machine.requested
    }
    pub fn context(&self) -> EditContext {
        self.graph.context()
    }

    /// Switch editing context (free-hand vs. comet re-editing). Interaction
    /// state never survives the swap.
    pub fn set_context(&mut self, ctx: EditContext) {
        self.graph.set_context(ctx);
        self.machine.reset_interaction();
        self.selection.clear();
        self.events.push(SessionEvent::Redraw);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.machine.mode == mode {
            return;
        }
        self.machine.mode = mode;
        self.machine.reset_interaction();
        self.selection.clear();
        self.events.push(SessionEvent::Redraw);
    }

    pub fn view_ratio(&self) -> f32 {
        self.ratio
    }

    /// Host-driven zoom: live geometry is rescaled in place, and command
    /// payloads (which remember their capture ratio) rescale at replay.
    pub fn set_view_ratio(&mut self, ratio: f32) -> bool {
        if !ratio.is_finite() || ratio <= 0.0 {
            return false;
        }
        let factor = ratio / self.ratio;
        self.graph.rescale_all(factor);
        self.ratio = ratio;
        self.events.push(SessionEvent::Redraw);
        true
    }

    // ---- Input events ----

    pub fn pointer_down(&mut self, x: f32, y: f32, button: Button, ctrl: bool) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        machine::pointer_down_impl(self, Vec2::new(x, y), button, ctrl);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        machine::pointer_move_impl(self, Vec2::new(x, y));
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        machine::pointer_up_impl(self, Vec2::new(x, y));
    }

    pub fn delete_key(&mut self) {
        machine::delete_key_impl(self);
    }

    /// Complete a pending point-on-edge request (after the host's context
    /// menu). Returns false when no valid request is pending.
    pub fn insert_requested_point(&mut self) -> bool {
        machine::insert_requested_impl(self)
    }

    // ---- History ----

    pub fn undo(&mut self) -> bool {
        let done = {
            let mut rp = Replay {
                graph: &mut self.graph,
                selection: &mut self.selection,
                events: &mut self.events,
                ratio: self.ratio,
            };
            self.history.undo(&mut rp).is_some()
        };
        if done {
            self.after_mutation();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = {
            let mut rp = Replay {
                graph: &mut self.graph,
                selection: &mut self.selection,
                events: &mut self.events,
                ratio: self.ratio,
            };
            self.history.redo(&mut rp).is_some()
        };
        if done {
            self.after_mutation();
        }
        done
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
    pub fn undo_label(&self) -> Option<&'static str> {
        self.history.undo_label()
    }
    pub fn redo_label(&self) -> Option<&'static str> {
        self.history.redo_label()
    }

    /// Execute a freshly built command and record it.
    pub(crate) fn run(&mut self, cmd: history::Command) {
        {
            let mut rp = Replay {
                graph: &mut self.graph,
                selection: &mut self.selection,
                events: &mut self.events,
                ratio: self.ratio,
            };
            cmd.execute(&mut rp);
        }
        self.history.push_executed(cmd);
        self.after_mutation();
    }

    fn after_mutation(&mut self) {
        // A replay may have removed the current chain root
        if let Mode::Building(kind) = self.machine.mode {
            if let Some(root) = self.machine.root {
                if self.graph.point(kind, root).is_none() {
                    self.machine.root = None;
                    self.machine.anchor = None;
                }
            }
        }
        self.events.push(SessionEvent::PointsChanged);
        self.events.push(SessionEvent::Redraw);
        self.events.push(SessionEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            undo_label: self.history.undo_label(),
            redo_label: self.history.redo_label(),
        });
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- Snapshot getters for the renderer ----

    pub fn point_count(&self) -> usize {
        self.graph.point_count()
    }
    pub fn contour_count(&self) -> usize {
        self.graph.contour_count()
    }

    /// Flat point data: ids, interleaved xy positions, kind tags. Sorted by
    /// id for a stable wire layout.
    pub fn point_arrays(&self) -> (Vec<u32>, Vec<f32>, Vec<u8>) {
        let mut rows: Vec<(u32, Vec2, u8)> = Vec::new();
        for kind in [PointKind::Tail, PointKind::Head] {
            for c in self.graph.active().collection(kind).values() {
                for p in c.points.values() {
                    rows.push((p.id, p.pos, kind as u8));
                }
            }
        }
        rows.sort_by_key(|r| r.0);
        let mut ids = Vec::with_capacity(rows.len());
        let mut pos = Vec::with_capacity(rows.len() * 2);
        let mut kinds = Vec::with_capacity(rows.len());
        for (id, p, k) in rows {
            ids.push(id);
            pos.push(p.x);
            pos.push(p.y);
            kinds.push(k);
        }
        (ids, pos, kinds)
    }

    /// Flat edge data: kind tag per edge plus endpoint id pairs, each
    /// adjacency reported once.
    pub fn edge_arrays(&self) -> (Vec<u8>, Vec<u32>) {
        let mut rows: Vec<(u8, u32, u32)> = Vec::new();
        for kind in [PointKind::Tail, PointKind::Head] {
            for c in self.graph.active().collection(kind).values() {
                for p in c.points.values() {
                    for &n in &p.neighbors {
                        if n > p.id {
                            rows.push((kind as u8, p.id, n));
                        }
                    }
                }
            }
        }
        rows.sort_by_key(|r| (r.1, r.2));
        let mut kinds = Vec::with_capacity(rows.len());
        let mut endpoints = Vec::with_capacity(rows.len() * 2);
        for (k, a, b) in rows {
            kinds.push(k);
            endpoints.push(a);
            endpoints.push(b);
        }
        (kinds, endpoints)
    }

    /// Contour summary: ids, kind tags, closed flags.
    pub fn contour_arrays(&self) -> (Vec<u32>, Vec<u8>, Vec<u8>) {
        let mut rows: Vec<(u32, u8, u8)> = Vec::new();
        for kind in [PointKind::Tail, PointKind::Head] {
            for c in self.graph.active().collection(kind).values() {
                rows.push((c.id, kind as u8, c.closed as u8));
            }
        }
        rows.sort_by_key(|r| r.0);
        let mut ids = Vec::new();
        let mut kinds = Vec::new();
        let mut closed = Vec::new();
        for (id, k, cl) in rows {
            ids.push(id);
            kinds.push(k);
            closed.push(cl);
        }
        (ids, kinds, closed)
    }

    pub fn selected_ids(&self) -> Vec<u32> {
        let mut ids = self.selection.ids();
        ids.sort_unstable();
        ids
    }

    /// Introspection dump for the host's debug tooling.
    pub fn to_json_value(&self) -> serde_json::Value {
        let mode = match self.machine.mode {
            Mode::Viewing => "viewing",
            Mode::Selecting => "selecting",
            Mode::Building(PointKind::Tail) => "building_tail",
            Mode::Building(PointKind::Head) => "building_head",
        };
        serde_json::json!({
            "ratio": self.ratio,
            "mode": mode,
            "can_undo": self.history.can_undo(),
            "can_redo": self.history.can_redo(),
            "graph": serde_json::to_value(&self.graph).unwrap_or(serde_json::Value::Null),
        })
    }
}
