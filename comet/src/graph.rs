use crate::algorithms::winding::point_in_polygon_nonzero;
use crate::model::{Contour, ContourId, Point, PointId, PointKind, PointRef, Roommate, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which of the two parallel contour collections the graph operates on:
/// the free-hand editing set or the comet-being-edited set. Switching
/// context swaps the active set; the operations never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditContext {
    Freehand = 0,
    Comet = 1,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContourSet {
    pub tails: HashMap<ContourId, Contour>,
    pub heads: HashMap<ContourId, Contour>,
}

impl ContourSet {
    pub fn collection(&self, kind: PointKind) -> &HashMap<ContourId, Contour> {
        match kind {
            PointKind::Tail => &self.tails,
            PointKind::Head => &self.heads,
        }
    }
    pub fn collection_mut(&mut self, kind: PointKind) -> &mut HashMap<ContourId, Contour> {
        match kind {
            PointKind::Tail => &mut self.tails,
            PointKind::Head => &mut self.heads,
        }
    }
    pub fn point(&self, kind: PointKind, id: PointId) -> Option<&Point> {
        self.collection(kind)
            .values()
            .find_map(|c| c.points.get(&id))
    }
}

/// What a `connect` did, recorded by commands so undo can reverse it exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectOutcome {
    pub src_contour: ContourId,
    pub dst_contour: ContourId,
    /// Set when the endpoints lived in different contours and their point
    /// maps were unioned into this surviving contour.
    pub merged_into: Option<ContourId>,
}

/// The authoritative in-memory geometry: points, symmetric adjacency,
/// contour membership, closure flags and cross-kind roommate pairing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContourGraph {
    freehand: ContourSet,
    comet: ContourSet,
    context: EditContext,
    next_point_id: PointId,
    next_contour_id: ContourId,
}

impl Default for ContourGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ContourGraph {
    pub fn new() -> Self {
        ContourGraph {
            freehand: ContourSet::default(),
            comet: ContourSet::default(),
            context: EditContext::Freehand,
            next_point_id: 1,
            next_contour_id: 1,
        }
    }

    pub fn context(&self) -> EditContext {
        self.context
    }
    pub fn set_context(&mut self, ctx: EditContext) {
        self.context = ctx;
    }

    pub fn active(&self) -> &ContourSet {
        match self.context {
            EditContext::Freehand => &self.freehand,
            EditContext::Comet => &self.comet,
        }
    }
    pub fn active_mut(&mut self) -> &mut ContourSet {
        match self.context {
            EditContext::Freehand => &mut self.freehand,
            EditContext::Comet => &mut self.comet,
        }
    }

    /// Reserve a point id. Commands pre-allocate so redo reuses the same id.
    pub fn alloc_point_id(&mut self) -> PointId {
        let id = self.next_point_id;
        self.next_point_id += 1;
        id
    }
    /// Reserve a contour id. Same redo-stability contract as point ids.
    pub fn alloc_contour_id(&mut self) -> ContourId {
        let id = self.next_contour_id;
        self.next_contour_id += 1;
        id
    }

    pub fn contour(&self, kind: PointKind, id: ContourId) -> Option<&Contour> {
        self.active().collection(kind).get(&id)
    }
    pub fn contour_mut(&mut self, kind: PointKind, id: ContourId) -> Option<&mut Contour> {
        self.active_mut().collection_mut(kind).get_mut(&id)
    }

    pub fn point(&self, kind: PointKind, id: PointId) -> Option<&Point> {
        self.active().point(kind, id)
    }
    pub fn point_mut(&mut self, kind: PointKind, id: PointId) -> Option<&mut Point> {
        self.active_mut()
            .collection_mut(kind)
            .values_mut()
            .find_map(|c| c.points.get_mut(&id))
    }
    pub fn contour_of_point(&self, kind: PointKind, id: PointId) -> Option<ContourId> {
        self.point(kind, id).map(|p| p.contour)
    }

    pub fn point_count(&self) -> usize {
        let s = self.active();
        s.tails.values().map(|c| c.points.len()).sum::<usize>()
            + s.heads.values().map(|c| c.points.len()).sum::<usize>()
    }
    pub fn contour_count(&self) -> usize {
        self.active().tails.len() + self.active().heads.len()
    }

    /// Allocate a point. With no `contour` a fresh contour is created around
    /// it; with a known `contour` the point joins it; with an unknown
    /// `contour` the contour is recreated under that id (the undo path).
    /// `roommate`, when resolvable, is paired symmetrically.
    pub fn create_point(
        &mut self,
        kind: PointKind,
        pos: Vec2,
        id: Option<PointId>,
        contour: Option<ContourId>,
        roommate: Option<Roommate>,
    ) -> PointId {
        let pid = match id {
            Some(i) => {
                self.next_point_id = self.next_point_id.max(i + 1);
                i
            }
            None => self.alloc_point_id(),
        };
        let cid = match contour {
            Some(c) => {
                self.next_contour_id = self.next_contour_id.max(c + 1);
                c
            }
            None => self.alloc_contour_id(),
        };
        let coll = self.active_mut().collection_mut(kind);
        let entry = coll.entry(cid).or_insert_with(|| Contour::new(cid, kind));
        entry.points.insert(
            pid,
            Point {
                id: pid,
                pos,
                kind,
                contour: cid,
                neighbors: Vec::new(),
                roommate: None,
            },
        );
        if let Some(rm) = roommate {
            self.set_roommate_pair(PointRef { kind, id: pid }, rm);
        }
        pid
    }

    /// Establish the symmetric cross-kind pairing between `a` and the point
    /// named by `rm`. No-op when either side is unresolvable.
    pub fn set_roommate_pair(&mut self, a: PointRef, rm: Roommate) {
        debug_assert!(a.kind == rm.kind.other(), "roommate pairing must be cross-kind");
        let (a_contour, partner_exists) = {
            let pa = self.point(a.kind, a.id);
            let pb = self.point(rm.kind, rm.point);
            match (pa, pb) {
                (Some(pa), Some(_)) => (pa.contour, true),
                _ => (0, false),
            }
        };
        if !partner_exists {
            return;
        }
        let back = Roommate {
            kind: a.kind,
            contour: a_contour,
            point: a.id,
        };
        if let Some(p) = self.point_mut(a.kind, a.id) {
            p.roommate = Some(Roommate {
                kind: rm.kind,
                contour: rm.contour,
                point: rm.point,
            });
        }
        if let Some(p) = self.point_mut(rm.kind, rm.point) {
            p.roommate = Some(back);
        }
    }

    /// Overwrite one side of a pairing without touching the partner. Only
    /// the history uses this, to clear or restore dangling back-references
    /// around comet consumption.
    pub(crate) fn set_roommate_raw(&mut self, a: PointRef, rm: Option<Roommate>) {
        if let Some(p) = self.point_mut(a.kind, a.id) {
            p.roommate = rm;
        }
    }

    /// Drop the pairing on both sides, if present.
    pub fn clear_roommate_pair(&mut self, a: PointRef) {
        let rm = match self.point(a.kind, a.id).and_then(|p| p.roommate) {
            Some(rm) => rm,
            None => return,
        };
        if let Some(p) = self.point_mut(a.kind, a.id) {
            p.roommate = None;
        }
        if let Some(p) = self.point_mut(rm.kind, rm.point) {
            p.roommate = None;
        }
    }

    /// Raw symmetric adjacency insert. Both points must share a contour;
    /// callers that may cross contours go through `connect`.
    pub(crate) fn link(&mut self, kind: PointKind, a: PointId, b: PointId) {
        if a == b {
            return;
        }
        if let Some(p) = self.point_mut(kind, a) {
            if !p.neighbors.contains(&b) {
                p.neighbors.push(b);
            }
        }
        if let Some(p) = self.point_mut(kind, b) {
            if !p.neighbors.contains(&a) {
                p.neighbors.push(a);
            }
        }
    }

    /// Raw symmetric adjacency removal.
    pub(crate) fn unlink(&mut self, kind: PointKind, a: PointId, b: PointId) {
        if let Some(p) = self.point_mut(kind, a) {
            p.neighbors.retain(|&n| n != b);
        }
        if let Some(p) = self.point_mut(kind, b) {
            p.neighbors.retain(|&n| n != a);
        }
    }

    /// Make `src` and `dst` mutual neighbors. Endpoints in different
    /// contours have their point maps unioned into one surviving contour
    /// (`new_contour` when supplied, else a fresh id); the two sources are
    /// deleted and every migrated point's contour id is rewritten.
    pub fn connect(
        &mut self,
        kind: PointKind,
        src: PointId,
        dst: PointId,
        new_contour: Option<ContourId>,
    ) -> Option<ConnectOutcome> {
        let cs = self.contour_of_point(kind, src)?;
        let cd = self.contour_of_point(kind, dst)?;
        self.link(kind, src, dst);
        if cs == cd {
            return Some(ConnectOutcome {
                src_contour: cs,
                dst_contour: cd,
                merged_into: None,
            });
        }
        let target = match new_contour {
            Some(c) => {
                self.next_contour_id = self.next_contour_id.max(c + 1);
                c
            }
            None => self.alloc_contour_id(),
        };
        let coll = self.active_mut().collection_mut(kind);
        let a = coll.remove(&cs).expect("source contour must exist");
        let b = coll.remove(&cd).expect("destination contour must exist");
        let mut merged = Contour::new(target, kind);
        let mut migrated: Vec<PointId> = Vec::with_capacity(a.points.len() + b.points.len());
        for (pid, mut p) in a.points.into_iter().chain(b.points.into_iter()) {
            p.contour = target;
            migrated.push(pid);
            merged.points.insert(pid, p);
        }
        coll.insert(target, merged);
        self.refresh_roommate_backrefs(kind, &migrated, target);
        Some(ConnectOutcome {
            src_contour: cs,
            dst_contour: cd,
            merged_into: Some(target),
        })
    }

    /// Remove the mutual adjacency created by a prior connect. When the
    /// endpoints shared a contour before that connect the contour just
    /// reopens; otherwise the contour is torn back into two, rebuilt under
    /// the supplied prior ids from a reachability walk over the remaining
    /// edges. If another path still joins the endpoints the contour is left
    /// whole (and open).
    pub fn disconnect(
        &mut self,
        kind: PointKind,
        src: PointId,
        dst: PointId,
        prev_src_contour: ContourId,
        prev_dst_contour: ContourId,
    ) {
        self.unlink(kind, src, dst);
        let cid = match self.contour_of_point(kind, src) {
            Some(c) => c,
            None => return,
        };
        if prev_src_contour == prev_dst_contour {
            if let Some(c) = self.contour_mut(kind, cid) {
                c.closed = false;
            }
            return;
        }
        let src_side = self.reachable_from(kind, cid, src);
        if src_side.contains(&dst) {
            // Still connected through another path
            if let Some(c) = self.contour_mut(kind, cid) {
                c.closed = false;
            }
            return;
        }
        let coll = self.active_mut().collection_mut(kind);
        let old = coll.remove(&cid).expect("split source contour must exist");
        let mut a = Contour::new(prev_src_contour, kind);
        let mut b = Contour::new(prev_dst_contour, kind);
        let mut moved_a: Vec<PointId> = Vec::new();
        let mut moved_b: Vec<PointId> = Vec::new();
        for (pid, mut p) in old.points.into_iter() {
            if src_side.contains(&pid) {
                p.contour = prev_src_contour;
                moved_a.push(pid);
                a.points.insert(pid, p);
            } else {
                p.contour = prev_dst_contour;
                moved_b.push(pid);
                b.points.insert(pid, p);
            }
        }
        coll.insert(prev_src_contour, a);
        coll.insert(prev_dst_contour, b);
        self.next_contour_id = self
            .next_contour_id
            .max(prev_src_contour.max(prev_dst_contour) + 1);
        self.refresh_roommate_backrefs(kind, &moved_a, prev_src_contour);
        self.refresh_roommate_backrefs(kind, &moved_b, prev_dst_contour);
    }

    /// Delete points: strip them from neighbor adjacency, their contour and
    /// their roommate's back-reference. Touched contours reopen; emptied
    /// contour records are dropped.
    pub fn delete_points(&mut self, refs: &[PointRef]) {
        for &r in refs {
            let (cid, neighbors, roommate) = match self.point(r.kind, r.id) {
                Some(p) => (p.contour, p.neighbors.clone(), p.roommate),
                None => continue,
            };
            for n in neighbors {
                self.unlink(r.kind, r.id, n);
            }
            if let Some(rm) = roommate {
                if let Some(partner) = self.point_mut(rm.kind, rm.point) {
                    partner.roommate = None;
                }
            }
            let coll = self.active_mut().collection_mut(r.kind);
            if let Some(c) = coll.get_mut(&cid) {
                c.points.remove(&r.id);
                c.closed = false;
                if c.points.is_empty() {
                    coll.remove(&cid);
                }
            }
        }
    }

    pub fn move_point(&mut self, kind: PointKind, id: PointId, pos: Vec2) -> bool {
        if !pos.is_finite() {
            return false;
        }
        match self.point_mut(kind, id) {
            Some(p) => {
                p.pos = pos;
                true
            }
            None => false,
        }
    }

    pub fn set_closed(&mut self, kind: PointKind, id: ContourId, closed: bool) {
        if let Some(c) = self.contour_mut(kind, id) {
            c.closed = closed;
        }
    }

    /// Multiply every stored coordinate, in both contexts and both
    /// collections. Backs host-driven view ratio changes.
    pub fn rescale_all(&mut self, factor: f32) {
        for set in [&mut self.freehand, &mut self.comet] {
            for coll in [&mut set.tails, &mut set.heads] {
                for c in coll.values_mut() {
                    for p in c.points.values_mut() {
                        p.pos = p.pos.scaled(factor);
                    }
                }
            }
        }
    }

    /// Cycle detection from `root`: walk neighbors excluding the edge just
    /// traversed, treating any point of degree < 2 as a dead end. Returns
    /// the exact set of points participating in the closing cycle (dangling
    /// branches excluded), or `None` when the contour is open.
    pub fn check_contour_closed(
        &self,
        kind: PointKind,
        contour: ContourId,
        root: PointId,
    ) -> Option<HashSet<PointId>> {
        let c = self.contour(kind, contour)?;
        let rp = c.points.get(&root)?;
        if rp.neighbors.len() < 2 {
            return None;
        }
        let mut visited: HashSet<PointId> = HashSet::new();
        let mut acc: HashSet<PointId> = HashSet::new();
        for &n in &rp.neighbors {
            let sub = Self::cycle_walk(c, n, root, root, &mut visited);
            acc.extend(sub);
        }
        if acc.contains(&root) {
            acc.insert(root);
            Some(acc)
        } else {
            None
        }
    }

    fn cycle_walk(
        c: &Contour,
        pid: PointId,
        from: PointId,
        root: PointId,
        visited: &mut HashSet<PointId>,
    ) -> HashSet<PointId> {
        let mut out = HashSet::new();
        if !visited.insert(pid) {
            return out;
        }
        let p = match c.points.get(&pid) {
            Some(p) => p,
            None => return out,
        };
        if p.neighbors.len() < 2 {
            // Dangling end, contributes nothing to the cycle
            return out;
        }
        for &n in &p.neighbors {
            if n == from {
                continue;
            }
            if n == root {
                out.insert(root);
                out.insert(pid);
                continue;
            }
            let sub = Self::cycle_walk(c, n, pid, root, visited);
            if !sub.is_empty() {
                out.insert(pid);
                out.extend(sub);
            }
        }
        out
    }

    /// Points of `cycle` in ring order, starting from the smallest id and
    /// walking toward its smallest cycle neighbor for determinism.
    pub fn cycle_polygon(
        &self,
        kind: PointKind,
        contour: ContourId,
        cycle: &HashSet<PointId>,
    ) -> Vec<PointId> {
        let c = match self.contour(kind, contour) {
            Some(c) => c,
            None => return Vec::new(),
        };
        let start = match cycle.iter().min() {
            Some(&s) => s,
            None => return Vec::new(),
        };
        let mut order = vec![start];
        let first = match c.points.get(&start).and_then(|p| {
            p.neighbors
                .iter()
                .copied()
                .filter(|n| cycle.contains(n))
                .min()
        }) {
            Some(n) => n,
            None => return order,
        };
        let mut prev = start;
        let mut cur = first;
        while cur != start && order.len() < cycle.len() {
            order.push(cur);
            let next = c.points.get(&cur).and_then(|p| {
                p.neighbors
                    .iter()
                    .copied()
                    .find(|&n| n != prev && cycle.contains(&n))
            });
            match next {
                Some(n) => {
                    prev = cur;
                    cur = n;
                }
                None => break,
            }
        }
        order
    }

    /// Ring-ordered vertex positions of a closed contour.
    pub fn contour_polygon(&self, kind: PointKind, contour: ContourId) -> Vec<Vec2> {
        let c = match self.contour(kind, contour) {
            Some(c) => c,
            None => return Vec::new(),
        };
        let cycle: HashSet<PointId> = c
            .points
            .values()
            .filter(|p| p.neighbors.len() >= 2)
            .map(|p| p.id)
            .collect();
        self.cycle_polygon(kind, contour, &cycle)
            .into_iter()
            .filter_map(|id| c.points.get(&id).map(|p| p.pos))
            .collect()
    }

    /// True when any vertex of `inner` lies inside the polygon formed by
    /// `outer`'s ring. Decides head-inside-tail comet assembly.
    pub fn get_nested(&self, outer: (PointKind, ContourId), inner: (PointKind, ContourId)) -> bool {
        let poly = self.contour_polygon(outer.0, outer.1);
        if poly.len() < 3 {
            return false;
        }
        let c = match self.contour(inner.0, inner.1) {
            Some(c) => c,
            None => return false,
        };
        c.points
            .values()
            .any(|p| point_in_polygon_nonzero(p.pos.x, p.pos.y, &poly))
    }

    /// True when any of `vertices` lies inside the closed contour `outer`.
    pub fn contains_any(&self, outer: (PointKind, ContourId), vertices: &[Vec2]) -> bool {
        let poly = self.contour_polygon(outer.0, outer.1);
        if poly.len() < 3 {
            return false;
        }
        vertices
            .iter()
            .any(|v| point_in_polygon_nonzero(v.x, v.y, &poly))
    }

    /// Reinsert a fully built contour (the history's restore path), bumping
    /// the id counters past everything it contains.
    pub(crate) fn insert_contour(&mut self, kind: PointKind, c: Contour) {
        self.next_contour_id = self.next_contour_id.max(c.id + 1);
        for &pid in c.points.keys() {
            self.next_point_id = self.next_point_id.max(pid + 1);
        }
        self.active_mut().collection_mut(kind).insert(c.id, c);
    }

    /// Drop a whole contour record (comet consumption).
    pub(crate) fn remove_contour(&mut self, kind: PointKind, id: ContourId) -> Option<Contour> {
        self.active_mut().collection_mut(kind).remove(&id)
    }

    fn reachable_from(&self, kind: PointKind, contour: ContourId, start: PointId) -> HashSet<PointId> {
        let mut seen = HashSet::new();
        let c = match self.contour(kind, contour) {
            Some(c) => c,
            None => return seen,
        };
        let mut stack = vec![start];
        while let Some(pid) = stack.pop() {
            if !seen.insert(pid) {
                continue;
            }
            if let Some(p) = c.points.get(&pid) {
                for &n in &p.neighbors {
                    if !seen.contains(&n) {
                        stack.push(n);
                    }
                }
            }
        }
        seen
    }

    /// After contour migration, partners of migrated points still name the
    /// old contour in their back-reference; rewrite them.
    fn refresh_roommate_backrefs(&mut self, kind: PointKind, moved: &[PointId], target: ContourId) {
        for &pid in moved {
            let rm = match self.point(kind, pid).and_then(|p| p.roommate) {
                Some(rm) => rm,
                None => continue,
            };
            if let Some(partner) = self.point_mut(rm.kind, rm.point) {
                partner.roommate = Some(Roommate {
                    kind,
                    contour: target,
                    point: pid,
                });
            }
        }
    }
}
