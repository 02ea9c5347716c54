use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type PointId = u32;
pub type ContourId = u32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
    #[inline]
    pub fn dist_sq(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
    #[inline]
    pub fn scaled(self, f: f32) -> Vec2 {
        Vec2 {
            x: self.x * f,
            y: self.y * f,
        }
    }
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + o.x,
            y: self.y + o.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - o.x,
            y: self.y - o.y,
        }
    }
}

/// Which shape family a point belongs to. Every contour collection,
/// builder and anchor candidate is parameterized over this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    Tail = 0,
    Head = 1,
}

impl PointKind {
    #[inline]
    pub fn other(self) -> PointKind {
        match self {
            PointKind::Tail => PointKind::Head,
            PointKind::Head => PointKind::Tail,
        }
    }
}

/// Id-based reference to a point of a known kind. Point ids are unique per
/// session across both kinds; the kind picks the collection to search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointRef {
    pub kind: PointKind,
    pub id: PointId,
}

/// Cross-kind pairing: a tail vertex and a head vertex standing on the same
/// anchored location. Always symmetric, always cross-kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roommate {
    pub kind: PointKind,
    pub contour: ContourId,
    pub point: PointId,
}

impl Roommate {
    #[inline]
    pub fn point_ref(self) -> PointRef {
        PointRef {
            kind: self.kind,
            id: self.point,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub pos: Vec2,
    pub kind: PointKind,
    pub contour: ContourId,
    /// Ordered symmetric adjacency, ids only (arena style, no back pointers).
    pub neighbors: Vec<PointId>,
    pub roommate: Option<Roommate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contour {
    pub id: ContourId,
    pub kind: PointKind,
    pub points: HashMap<PointId, Point>,
    pub closed: bool,
}

impl Contour {
    pub fn new(id: ContourId, kind: PointKind) -> Self {
        Contour {
            id,
            kind,
            points: HashMap::new(),
            closed: false,
        }
    }
}

/// A finished comet: the head polygon and, when the head closed inside a
/// closed tail, that tail polygon. Vertices are in ring order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comet {
    pub tail: Vec<Vec2>,
    pub head: Vec<Vec2>,
}
