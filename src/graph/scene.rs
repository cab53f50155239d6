//! LabelScene - topology of anchors, labels and leader lines.
//!
//! The scene stores which bodies exist and how they are connected, using
//! petgraph's StableGraph, plus the leader-line edges and a spatial index over
//! footprints. Per-body physical state lives in [`Bodies`], which the
//! simulation owns; the scene only refers to bodies by [`BodyId`].

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};

use super::bodies::Bodies;
use super::body::{BodyId, BodyKind, GroupId};
use super::edge::{Edge, EdgeId};
use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::layout::geometry::{Ellipse, separation};
use crate::records::LabelRecord;
use crate::spatial::{FootprintBox, SpatialIndex};

/// Suffix appended to an anchor's key to form its label's key.
pub const LABEL_SUFFIX: &str = "_label";

/// A pair of footprints that overlap, and by how much.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub a: BodyId,
    pub b: BodyId,
    /// Negative gap between the two ellipses.
    pub gap: f64,
}

/// The anchor/label topology.
pub struct LabelScene {
    /// Nodes store their BodyId, edges store their EdgeId.
    graph: StableGraph<BodyId, EdgeId, Directed>,

    /// Map from body key to BodyId
    key_to_id: HashMap<String, BodyId>,

    /// Map from BodyId to petgraph NodeIndex
    id_to_index: HashMap<BodyId, NodeIndex>,

    /// Leader lines, indexed by EdgeId
    edges: Vec<Edge>,

    /// Spatial index over footprints
    spatial: SpatialIndex,
}

impl LabelScene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            key_to_id: HashMap::new(),
            id_to_index: HashMap::new(),
            edges: Vec::new(),
            spatial: SpatialIndex::new(),
        }
    }

    /// Create a scene with pre-allocated capacity.
    pub fn with_capacity(body_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(body_capacity, edge_capacity),
            key_to_id: HashMap::with_capacity(body_capacity),
            id_to_index: HashMap::with_capacity(body_capacity),
            edges: Vec::with_capacity(edge_capacity),
            spatial: SpatialIndex::new(),
        }
    }

    /// Build the scene and its bodies from input records: one anchor, one
    /// label and one edge per record.
    ///
    /// Each record is placed at the viewport center plus its offset. The
    /// label starts on top of its anchor.
    pub fn from_records(records: &[LabelRecord], config: &LayoutConfig) -> Result<(Self, Bodies)> {
        let mut scene = Self::with_capacity(records.len() * 2, records.len());
        let mut bodies = Bodies::with_capacity(records.len() * 2);

        for (i, record) in records.iter().enumerate() {
            let key = record.key();
            let label_key = format!("{key}{LABEL_SUFFIX}");
            let group = GroupId(i as u32);
            let x = config.width / 2.0 + record.offset_x;
            let y = config.height / 2.0 + record.offset_y;

            scene.add_body(&mut bodies, &key, &record.name, group, BodyKind::Anchor, x, y)?;
            scene.add_body(&mut bodies, &label_key, &record.name, group, BodyKind::Label, x, y)?;
            scene.connect(&key, &label_key, group)?;
        }

        tracing::info!(
            bodies = bodies.len(),
            edges = scene.edge_count(),
            "label scene built"
        );
        Ok((scene, bodies))
    }

    // =========================================================================
    // Body Operations
    // =========================================================================

    /// Add a body under a unique key.
    #[allow(clippy::too_many_arguments)]
    pub fn add_body(
        &mut self,
        bodies: &mut Bodies,
        key: &str,
        text: &str,
        group: GroupId,
        kind: BodyKind,
        x: f64,
        y: f64,
    ) -> Result<BodyId> {
        if self.key_to_id.contains_key(key) {
            return Err(LayoutError::DuplicateBody { key: key.to_string() });
        }
        let id = bodies.push(key, text, group, kind, x, y);
        let index = self.graph.add_node(id);
        self.key_to_id.insert(key.to_string(), id);
        self.id_to_index.insert(id, index);
        Ok(id)
    }

    /// Look a body up by key.
    pub fn body_by_key(&self, key: &str) -> Option<BodyId> {
        self.key_to_id.get(key).copied()
    }

    /// Get the number of bodies.
    pub fn body_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Connect the anchor `source_key` to the label `target_key`.
    ///
    /// Both keys must already exist.
    pub fn connect(&mut self, source_key: &str, target_key: &str, group: GroupId) -> Result<EdgeId> {
        let source = self.resolve(source_key)?;
        let target = self.resolve(target_key)?;
        let (si, ti) = (self.id_to_index[&source], self.id_to_index[&target]);

        let id = EdgeId(self.edges.len() as u32);
        self.graph.add_edge(si, ti, id);
        self.edges.push(Edge::new(id, source, target, group));
        Ok(id)
    }

    fn resolve(&self, key: &str) -> Result<BodyId> {
        self.body_by_key(key).ok_or_else(|| LayoutError::UnknownBody { key: key.to_string() })
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Source/target pairs for the link force.
    pub fn links(&self) -> Vec<(BodyId, BodyId)> {
        self.edges.iter().map(|e| (e.source, e.target)).collect()
    }

    /// The label an anchor points to.
    pub fn label_of(&self, anchor: BodyId) -> Option<BodyId> {
        let index = *self.id_to_index.get(&anchor)?;
        self.graph
            .neighbors_directed(index, Direction::Outgoing)
            .next()
            .and_then(|n| self.graph.node_weight(n).copied())
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Rebuild the spatial index from current label positions and footprints
    /// inflated by `padding`.
    pub fn rebuild_spatial_index(&mut self, bodies: &Bodies, padding: f64) {
        let footprints = bodies
            .labels()
            .map(|id| {
                let (x, y) = bodies.position(id);
                let (rx, ry) = bodies.semi_axes(id);
                FootprintBox::new(id, x, y, Ellipse::new(rx + padding, ry + padding))
            })
            .collect();
        self.spatial.rebuild(footprints);
    }

    /// Topmost label whose footprint contains the point, as of the last
    /// [`LabelScene::rebuild_spatial_index`].
    pub fn label_at(&self, x: f64, y: f64) -> Option<BodyId> {
        self.spatial.hit(x, y)
    }

    /// Every overlapping label/label pair (using the spatial index for
    /// candidates) and every label overlapping any anchor, measured on
    /// committed positions with footprints inflated by `padding`.
    pub fn overlaps(&mut self, bodies: &Bodies, padding: f64) -> Vec<Overlap> {
        self.rebuild_spatial_index(bodies, padding);

        let footprint = |id: BodyId| {
            let (rx, ry) = bodies.semi_axes(id);
            Ellipse::new(rx + padding, ry + padding)
        };
        let gap = |a: BodyId, b: BodyId| {
            let (ax, ay) = bodies.position(a);
            let (bx, by) = bodies.position(b);
            separation(footprint(a), footprint(b), ax - bx, ay - by).map_or(f64::NEG_INFINITY, |s| s.gap)
        };

        let mut overlaps: Vec<Overlap> = self
            .spatial
            .candidate_pairs()
            .into_iter()
            .filter_map(|(a, b)| {
                let g = gap(a, b);
                (g < 0.0).then_some(Overlap { a, b, gap: g })
            })
            .collect();

        for label in bodies.labels() {
            for anchor in bodies.anchors() {
                let g = gap(label, anchor);
                if g < 0.0 {
                    overlaps.push(Overlap { a: label, b: anchor, gap: g });
                }
            }
        }
        overlaps
    }
}

impl Default for LabelScene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<LabelRecord> {
        vec![
            LabelRecord::new("Label 1", -50.0, 20.0),
            LabelRecord::new("Label 2", 40.0, -10.0),
        ]
    }

    #[test]
    fn test_from_records_builds_pairs() {
        let (scene, bodies) = LabelScene::from_records(&records(), &LayoutConfig::default()).unwrap();

        assert_eq!(scene.body_count(), 4);
        assert_eq!(scene.edge_count(), 2);
        assert_eq!(bodies.len(), 4);

        let anchor = scene.body_by_key("label-1").unwrap();
        let label = scene.body_by_key("label-1_label").unwrap();
        assert_eq!(bodies.kind(anchor), BodyKind::Anchor);
        assert_eq!(bodies.kind(label), BodyKind::Label);
        assert_eq!(bodies.position(anchor), (250.0, 220.0));
        assert_eq!(bodies.position(label), (250.0, 220.0));
        assert_eq!(bodies.group(anchor), bodies.group(label));
    }

    #[test]
    fn test_every_label_has_exactly_one_anchor_and_edge() {
        let (scene, bodies) = LabelScene::from_records(&records(), &LayoutConfig::default()).unwrap();
        assert_eq!(bodies.labels().count(), 2);
        for anchor in bodies.anchors() {
            let label = scene.label_of(anchor).unwrap();
            assert_eq!(bodies.kind(label), BodyKind::Label);
            assert_eq!(bodies.group(anchor), bodies.group(label));
            let edges: Vec<_> = scene.edges().iter().filter(|e| e.target == label).collect();
            assert_eq!(edges.len(), 1);
            assert_eq!(edges[0].source, anchor);
        }
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let dupes = vec![
            LabelRecord::new("Same", 0.0, 0.0),
            LabelRecord::new("same", 10.0, 10.0),
        ];
        let err = LabelScene::from_records(&dupes, &LayoutConfig::default()).err();
        assert_eq!(err, Some(LayoutError::DuplicateBody { key: "same".to_string() }));
    }

    #[test]
    fn test_connect_unknown_body_fails() {
        let mut scene = LabelScene::new();
        let mut bodies = Bodies::new();
        scene
            .add_body(&mut bodies, "a", "A", GroupId(0), BodyKind::Anchor, 0.0, 0.0)
            .unwrap();
        let err = scene.connect("a", "missing", GroupId(0));
        assert_eq!(err, Err(LayoutError::UnknownBody { key: "missing".to_string() }));
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn test_label_at_after_rebuild() {
        let (mut scene, mut bodies) = LabelScene::from_records(&records(), &LayoutConfig::default()).unwrap();
        let label = scene.body_by_key("label-2_label").unwrap();
        bodies.set_semi_axes(label, 40.0, 15.0);

        scene.rebuild_spatial_index(&bodies, 0.0);
        assert_eq!(scene.label_at(340.0, 190.0), Some(label));
        assert_eq!(scene.label_at(0.0, 0.0), None);
    }

    #[test]
    fn test_overlaps_reports_label_pairs_and_anchors() {
        let (mut scene, mut bodies) = LabelScene::from_records(&records(), &LayoutConfig::default()).unwrap();
        for id in bodies.ids().collect::<Vec<_>>() {
            bodies.set_semi_axes(id, 10.0, 10.0);
        }
        // Labels sit on their anchors, so each overlaps its own anchor.
        let overlaps = scene.overlaps(&bodies, 0.0);
        assert_eq!(overlaps.len(), 2);
        assert!(overlaps.iter().all(|o| bodies.kind(o.a) == BodyKind::Label));
        assert!(overlaps.iter().all(|o| bodies.kind(o.b) == BodyKind::Anchor));
    }
}
