use crate::algorithms::anchoring::Anchor;
use crate::graph::{ConnectOutcome, ContourGraph};
use crate::model::{ContourId, PointId, PointKind, Roommate, Vec2};

/// The per-family operation set over the graph. Tail and head builders run
/// the same algorithm; the kind tag selects the target collection and the
/// anchoring tie-break side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Builder {
    pub kind: PointKind,
}

impl Builder {
    pub fn tail() -> Self {
        Builder {
            kind: PointKind::Tail,
        }
    }
    pub fn head() -> Self {
        Builder {
            kind: PointKind::Head,
        }
    }
    pub fn for_kind(kind: PointKind) -> Self {
        Builder { kind }
    }

    pub fn create_point(
        &self,
        g: &mut ContourGraph,
        pos: Vec2,
        id: Option<PointId>,
        contour: Option<ContourId>,
        roommate: Option<Roommate>,
    ) -> PointId {
        g.create_point(self.kind, pos, id, contour, roommate)
    }

    pub fn connect(
        &self,
        g: &mut ContourGraph,
        src: PointId,
        dst: PointId,
        new_contour: Option<ContourId>,
    ) -> Option<ConnectOutcome> {
        g.connect(self.kind, src, dst, new_contour)
    }

    pub fn disconnect(
        &self,
        g: &mut ContourGraph,
        src: PointId,
        dst: PointId,
        prev_src_contour: ContourId,
        prev_dst_contour: ContourId,
    ) {
        g.disconnect(self.kind, src, dst, prev_src_contour, prev_dst_contour)
    }

    /// Create a point in `root`'s contour and connect it to `root` in one
    /// step: the click-to-extend-a-chain operation.
    pub fn create_and_connect(
        &self,
        g: &mut ContourGraph,
        root: PointId,
        pos: Vec2,
        id: Option<PointId>,
        roommate: Option<Roommate>,
    ) -> Option<PointId> {
        let cid = g.contour_of_point(self.kind, root)?;
        let pid = self.create_point(g, pos, id, Some(cid), roommate);
        self.connect(g, root, pid, None)?;
        Some(pid)
    }

    /// Tie-break between a candidate of this builder's own kind and one of
    /// the other kind: the strictly closer candidate wins, and an exact
    /// distance tie goes to the builder's own kind. The asymmetry biases
    /// shape growth toward same-kind continuation.
    pub fn choose_anchor(&self, own: Option<Anchor>, other: Option<Anchor>) -> Option<Anchor> {
        match (own, other) {
            (Some(a), Some(b)) => {
                debug_assert!(a.kind == self.kind && b.kind == self.kind.other());
                if b.dist < a.dist {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(a), None) => Some(a),
            (None, b) => b,
        }
    }
}
