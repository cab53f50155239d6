//! R-tree based spatial index over body footprints, using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Which footprint contains a point (drag hit testing)
//! - Which footprints' bounding boxes intersect (overlap candidates)

use rstar::{AABB, RTree, RTreeObject};

use crate::graph::BodyId;
use crate::layout::geometry::Ellipse;

/// An elliptical footprint in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintBox {
    /// The body identifier.
    pub id: BodyId,
    /// Center X.
    pub x: f64,
    /// Center Y.
    pub y: f64,
    /// Padded semi-axes.
    pub ellipse: Ellipse,
}

impl FootprintBox {
    /// Create a new FootprintBox.
    pub fn new(id: BodyId, x: f64, y: f64, ellipse: Ellipse) -> Self {
        Self { id, x, y, ellipse }
    }

    /// Exact ellipse containment.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.ellipse.contains(px - self.x, py - self.y)
    }
}

impl RTreeObject for FootprintBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.x - self.ellipse.w, self.y - self.ellipse.h],
            [self.x + self.ellipse.w, self.y + self.ellipse.h],
        )
    }
}

/// Spatial index for body footprints.
///
/// Uses an R*-tree; rebuilt in bulk from the current positions.
pub struct SpatialIndex {
    tree: RTree<FootprintBox>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Footprint that contains the point. When several do, the one with the
    /// highest id wins (it is drawn last, so it is on top).
    pub fn hit(&self, x: f64, y: f64) -> Option<BodyId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .filter(|f| f.contains(x, y))
            .map(|f| f.id)
            .max()
    }

    /// Pairs `(a, b)` with `a < b` whose bounding boxes intersect. Every
    /// overlapping pair of ellipses is among them.
    pub fn candidate_pairs(&self) -> Vec<(BodyId, BodyId)> {
        let mut pairs: Vec<(BodyId, BodyId)> = self
            .tree
            .iter()
            .flat_map(|f| {
                self.tree
                    .locate_in_envelope_intersecting(&f.envelope())
                    .filter(move |other| f.id < other.id)
                    .map(move |other| (f.id, other.id))
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Replace the contents of the index with `footprints`.
    pub fn rebuild(&mut self, footprints: Vec<FootprintBox>) {
        self.tree = RTree::bulk_load(footprints);
    }

    /// Get the number of footprints in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
