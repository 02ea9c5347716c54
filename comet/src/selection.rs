//! Multi-point selection with per-point drag origins, a rubber-band
//! rectangle and a pivot point used to decide anchoring during a drag.

use crate::model::{ContourId, PointId, PointKind, Vec2};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedPoint {
    pub id: PointId,
    pub kind: PointKind,
    pub contour: ContourId,
    /// Position at drag start; move commits record origin -> destination.
    pub origin: Vec2,
}

#[derive(Clone, Debug, Default)]
pub struct Selection {
    points: HashMap<PointId, SelectedPoint>,
    pub moved: bool,
    pub band: Option<(Vec2, Vec2)>,
    pub pivot: Option<PointId>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn contains(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }
    pub fn get(&self, id: PointId) -> Option<&SelectedPoint> {
        self.points.get(&id)
    }
    pub fn iter(&self) -> impl Iterator<Item = &SelectedPoint> {
        self.points.values()
    }
    pub fn ids(&self) -> Vec<PointId> {
        self.points.keys().copied().collect()
    }

    pub fn insert(&mut self, sp: SelectedPoint) {
        self.points.insert(sp.id, sp);
    }
    pub fn replace_with(&mut self, sp: SelectedPoint) {
        self.points.clear();
        self.points.insert(sp.id, sp);
    }
    /// Ctrl-click behavior: flip membership.
    pub fn toggle(&mut self, sp: SelectedPoint) {
        if self.points.remove(&sp.id).is_none() {
            self.points.insert(sp.id, sp);
        }
    }
    pub fn remove(&mut self, id: PointId) {
        self.points.remove(&id);
        if self.pivot == Some(id) {
            self.pivot = None;
        }
    }
    pub fn clear(&mut self) {
        self.points.clear();
        self.moved = false;
        self.band = None;
        self.pivot = None;
    }

    /// Refresh every entry's drag origin from the live graph positions.
    pub fn capture_origins(&mut self, lookup: impl Fn(PointKind, PointId) -> Option<Vec2>) {
        for sp in self.points.values_mut() {
            if let Some(pos) = lookup(sp.kind, sp.id) {
                sp.origin = pos;
            }
        }
    }

    pub fn begin_band(&mut self, pos: Vec2) {
        self.band = Some((pos, pos));
    }
    pub fn update_band(&mut self, pos: Vec2) {
        if let Some((start, _)) = self.band {
            self.band = Some((start, pos));
        }
    }
    pub fn take_band(&mut self) -> Option<(Vec2, Vec2)> {
        self.band.take()
    }
}

/// Point-in-rectangle with unordered corners.
pub fn rect_contains(a: Vec2, b: Vec2, p: Vec2) -> bool {
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
    p.x >= x0 && p.x <= x1 && p.y >= y0 && p.y <= y1
}
