//! The label layout pipeline.
//!
//! [`LabelLayout`] wires records into a [`Simulation`], runs the per-tick
//! callback (lazy footprint sizing, the settle pass once the simulation has
//! cooled, leader-line routing) and produces a
//! [`Frame`] for the renderer. It also carries the interactive surface:
//! dragging, hit testing and group highlighting.

use serde::Serialize;

use super::ellipse_force::EllipseForce;
use super::footprint::{FootprintState, Footprints, TextMeasure};
use super::geometry::link_target_by_ellipse;
use super::placement;
use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::graph::{Bodies, BodyId, BodyKind, GroupId, LabelScene, Overlap};
use crate::records::LabelRecord;
use crate::simulation::forces::{LinkForce, ManyBodyForce, PositionForce};
use crate::simulation::{Cooling, Simulation};

/// Name the ellipse force is registered under once footprints are sized.
pub const ELLIPSE_FORCE: &str = "ellipse";

const DIMMED_OPACITY: f64 = 0.2;

fn opacity(dimmed: bool) -> f64 {
    if dimmed { DIMMED_OPACITY } else { 1.0 }
}

/// Where to draw a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelTransform {
    pub id: BodyId,
    pub group: GroupId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

/// Where to draw an anchor point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorMark {
    pub id: BodyId,
    pub group: GroupId,
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

/// A leader line from an anchor to the edge of its label's footprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub group: GroupId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub opacity: f64,
}

/// A body's footprint ellipse, for drawing the buffer outlines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footprint {
    pub id: BodyId,
    pub x: f64,
    pub y: f64,
    pub rx: f64,
    pub ry: f64,
}

/// Everything the renderer needs for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub labels: Vec<LabelTransform>,
    pub anchors: Vec<AnchorMark>,
    pub edges: Vec<Segment>,
    pub footprints: Vec<Footprint>,
    pub alpha: f64,
    pub active: bool,
}

/// A complete label layout: scene, simulation and tick state.
pub struct LabelLayout {
    config: LayoutConfig,
    scene: LabelScene,
    simulation: Simulation,
    footprints: Footprints,
    settled: bool,
}

impl LabelLayout {
    /// Build bodies and edges from `records` and register the generic forces.
    ///
    /// The ellipse force is deferred until the first tick has sized the
    /// footprints.
    pub fn new(records: &[LabelRecord], config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let (scene, bodies) = LabelScene::from_records(records, &config)?;

        let cooling = Cooling::new(config.alpha_min, config.velocity_decay);
        let mut simulation = Simulation::new(bodies, cooling, config.seed);
        simulation.add_force("x", Box::new(PositionForce::x(config.position_strength)));
        simulation.add_force("y", Box::new(PositionForce::y(config.position_strength)));
        simulation.add_force(
            "charge",
            Box::new(ManyBodyForce::new(config.label_charge, config.anchor_charge)),
        );
        simulation.add_force(
            "link",
            Box::new(
                LinkForce::new(scene.links())
                    .with_strength(config.link_strength)
                    .with_distance(config.link_distance),
            ),
        );

        let footprints = Footprints::new(config.label_padding, config.point_padding);
        Ok(Self {
            config,
            scene,
            simulation,
            footprints,
            settled: false,
        })
    }

    pub fn scene(&self) -> &LabelScene {
        &self.scene
    }

    pub fn bodies(&self) -> &Bodies {
        self.simulation.bodies()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn footprint_state(&self) -> FootprintState {
        self.footprints.state()
    }

    pub fn is_active(&self) -> bool {
        self.simulation.is_active()
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance one simulation step and run the tick callback.
    pub fn tick(&mut self, measure: &dyn TextMeasure) -> Frame {
        self.simulation.step();
        self.on_tick(measure);
        self.frame()
    }

    /// Tick until the simulation cools or `max_ticks` is reached. Returns the
    /// number of ticks taken.
    pub fn run(&mut self, measure: &dyn TextMeasure, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && (ticks == 0 || self.is_active()) {
            self.simulation.step();
            self.on_tick(measure);
            ticks += 1;
        }
        ticks
    }

    fn on_tick(&mut self, measure: &dyn TextMeasure) {
        if self.footprints.ensure_sized(self.simulation.bodies_mut(), measure) {
            let force = EllipseForce::new(
                self.config.ellipse_padding,
                self.config.inner_repulsion,
                self.config.outer_repulsion,
            );
            self.simulation.add_force(ELLIPSE_FORCE, Box::new(force));
        }
        if !self.settled && !self.simulation.is_active() {
            self.settle();
        }
        self.route_edges();
    }

    /// Move labels the cooled simulation left overlapping to the nearest
    /// clear spot around their anchors. Runs once per cool-down.
    fn settle(&mut self) {
        let moved = placement::settle(
            &mut self.scene,
            self.simulation.bodies_mut(),
            self.config.ellipse_padding,
        );
        self.settled = true;
        tracing::info!(moved, "layout settled");
    }

    /// Recompute where each leader line meets its label's footprint.
    fn route_edges(&mut self) {
        let bodies = self.simulation.bodies();
        for edge in self.scene.edges_mut() {
            let (rx, ry) = bodies.semi_axes(edge.target);
            edge.endpoint = link_target_by_ellipse(
                bodies.position(edge.source),
                bodies.position(edge.target),
                rx,
                ry,
            );
        }
    }

    /// The current state, as the renderer should draw it.
    pub fn frame(&self) -> Frame {
        let bodies = self.simulation.bodies();

        let labels = bodies
            .labels()
            .map(|id| {
                let (x, y) = bodies.position(id);
                LabelTransform {
                    id,
                    group: bodies.group(id),
                    text: bodies.text(id).to_string(),
                    x,
                    y,
                    opacity: opacity(bodies.states[id.index()].is_dimmed()),
                }
            })
            .collect();

        let anchors = bodies
            .anchors()
            .map(|id| {
                let (x, y) = bodies.position(id);
                AnchorMark {
                    id,
                    group: bodies.group(id),
                    x,
                    y,
                    opacity: opacity(bodies.states[id.index()].is_dimmed()),
                }
            })
            .collect();

        let edges = self
            .scene
            .edges()
            .iter()
            .map(|edge| {
                let (x1, y1) = bodies.position(edge.source);
                let (x2, y2) = edge.endpoint;
                Segment {
                    group: edge.group,
                    x1,
                    y1,
                    x2,
                    y2,
                    opacity: opacity(edge.state.is_dimmed()),
                }
            })
            .collect();

        let footprints = bodies
            .ids()
            .map(|id| {
                let (x, y) = bodies.position(id);
                let (rx, ry) = bodies.semi_axes(id);
                Footprint { id, x, y, rx, ry }
            })
            .collect();

        Frame {
            labels,
            anchors,
            edges,
            footprints,
            alpha: self.simulation.alpha(),
            active: self.simulation.is_active(),
        }
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Topmost label under the point.
    pub fn label_at(&mut self, x: f64, y: f64) -> Option<BodyId> {
        self.scene
            .rebuild_spatial_index(self.simulation.bodies(), self.config.ellipse_padding);
        self.scene.label_at(x, y)
    }

    /// Grab a body: reheat the simulation and pin the body where it is.
    pub fn drag_start(&mut self, id: BodyId) -> Result<()> {
        let bodies = self.simulation.bodies();
        if !bodies.contains(id) || bodies.kind(id) == BodyKind::Anchor {
            return Err(LayoutError::NotADragTarget { id });
        }
        let (x, y) = bodies.position(id);

        self.simulation.reheat(self.config.drag_alpha_target);
        self.settled = false;
        let bodies = self.simulation.bodies_mut();
        bodies.pin(id, x, y);
        bodies.states[id.index()].set_dragged(true);
        tracing::debug!(body = %id, x, y, "drag started");
        Ok(())
    }

    /// Move a grabbed body.
    pub fn drag_to(&mut self, id: BodyId, x: f64, y: f64) -> Result<()> {
        let bodies = self.simulation.bodies_mut();
        if !bodies.contains(id) || !bodies.states[id.index()].is_dragged() {
            return Err(LayoutError::NotADragTarget { id });
        }
        bodies.pin(id, x, y);
        Ok(())
    }

    /// Release a grabbed body and let the simulation cool down again.
    pub fn drag_end(&mut self, id: BodyId) -> Result<()> {
        let bodies = self.simulation.bodies_mut();
        if !bodies.contains(id) || !bodies.states[id.index()].is_dragged() {
            return Err(LayoutError::NotADragTarget { id });
        }
        bodies.release(id);
        bodies.states[id.index()].set_dragged(false);
        self.simulation.reheat(0.0);
        tracing::debug!(body = %id, "drag ended");
        Ok(())
    }

    /// Fade out everything outside `group`. `None` restores full opacity.
    pub fn highlight_group(&mut self, group: Option<GroupId>) {
        let bodies = self.simulation.bodies_mut();
        for id in bodies.ids().collect::<Vec<_>>() {
            let dimmed = group.is_some_and(|g| bodies.group(id) != g);
            bodies.states[id.index()].set_dimmed(dimmed);
        }
        for edge in self.scene.edges_mut() {
            let dimmed = group.is_some_and(|g| edge.group != g);
            edge.state.set_dimmed(dimmed);
        }
    }

    /// Overlapping footprints at the committed positions, inflated by the
    /// ellipse force padding.
    pub fn overlaps(&mut self) -> Vec<Overlap> {
        self.scene
            .overlaps(self.simulation.bodies(), self.config.ellipse_padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::footprint::FixedExtents;

    fn layout() -> LabelLayout {
        let records = vec![
            LabelRecord::new("Label 1", -40.0, 10.0),
            LabelRecord::new("Label 2", 35.0, -20.0),
            LabelRecord::new("Label 3", 10.0, 45.0),
        ];
        LabelLayout::new(&records, LayoutConfig::default()).unwrap()
    }

    fn measure() -> FixedExtents {
        FixedExtents::new(80.0, 20.0)
    }

    #[test]
    fn test_new_registers_generic_forces_only() {
        let layout = layout();
        assert_eq!(layout.simulation().force_names(), vec!["x", "y", "charge", "link"]);
        assert_eq!(layout.footprint_state(), FootprintState::Uninitialized);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LayoutConfig {
            width: f64::INFINITY,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            LabelLayout::new(&[], config),
            Err(LayoutError::InvalidConfig { field: "width", .. })
        ));
    }

    #[test]
    fn test_first_tick_sizes_and_registers_ellipse_force() {
        let mut layout = layout();
        for label in layout.bodies().labels() {
            assert_eq!(layout.bodies().semi_axes(label), (0.0, 0.0));
        }

        layout.tick(&measure());
        assert_eq!(layout.footprint_state(), FootprintState::Sized);
        assert_eq!(
            layout.simulation().force_names(),
            vec!["x", "y", "charge", "link", ELLIPSE_FORCE]
        );

        let sized: Vec<_> = layout
            .bodies()
            .labels()
            .map(|id| layout.bodies().semi_axes(id))
            .collect();
        assert!(sized.iter().all(|&axes| axes == (46.0, 16.0)));

        for _ in 0..20 {
            layout.tick(&FixedExtents::new(300.0, 300.0));
        }
        let later: Vec<_> = layout
            .bodies()
            .labels()
            .map(|id| layout.bodies().semi_axes(id))
            .collect();
        assert_eq!(sized, later);
    }

    #[test]
    fn test_frame_edges_end_on_label_footprint() {
        let mut layout = layout();
        for _ in 0..30 {
            layout.tick(&measure());
        }
        let frame = layout.frame();
        assert_eq!(frame.edges.len(), 3);
        assert_eq!(frame.labels.len(), 3);
        assert_eq!(frame.anchors.len(), 3);
        assert_eq!(frame.footprints.len(), 6);

        for (segment, label) in frame.edges.iter().zip(&frame.labels) {
            let dx = (segment.x2 - label.x) / 46.0;
            let dy = (segment.y2 - label.y) / 16.0;
            assert!((dx * dx + dy * dy - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_anchors_never_move() {
        let mut layout = layout();
        let before: Vec<_> = layout
            .bodies()
            .anchors()
            .map(|id| layout.bodies().position(id))
            .collect();
        layout.run(&measure(), 500);
        let after: Vec<_> = layout
            .bodies()
            .anchors()
            .map(|id| layout.bodies().position(id))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_run_stops_when_cool() {
        let mut layout = layout();
        let ticks = layout.run(&measure(), 10_000);
        assert!(ticks <= 301, "took {ticks} ticks");
        assert!(!layout.is_active());
    }

    #[test]
    fn test_drag_pins_label_and_reheats() {
        let mut layout = layout();
        layout.run(&measure(), 10_000);
        let label = layout.scene().body_by_key("label-1_label").unwrap();

        layout.drag_start(label).unwrap();
        assert_eq!(layout.simulation().alpha_target(), 0.3);
        layout.drag_to(label, 10.0, 20.0).unwrap();
        for _ in 0..5 {
            layout.tick(&measure());
        }
        assert_eq!(layout.bodies().position(label), (10.0, 20.0));
        assert!(layout.is_active());

        layout.drag_end(label).unwrap();
        assert_eq!(layout.simulation().alpha_target(), 0.0);
        layout.tick(&measure());
        assert_ne!(layout.bodies().position(label), (10.0, 20.0));
    }

    #[test]
    fn test_crowded_anchors_settle_clear_and_resettle_after_drag() {
        let records = vec![
            LabelRecord::new("Label 1", -5.0, 0.0),
            LabelRecord::new("Label 2", 5.0, 0.0),
            LabelRecord::new("Label 3", 0.0, 4.0),
        ];
        let mut layout = LabelLayout::new(&records, LayoutConfig::default()).unwrap();
        layout.run(&measure(), 10_000);
        assert!(!layout.is_active());
        assert_eq!(layout.overlaps(), Vec::new());

        let label = layout.scene().body_by_key("label-1_label").unwrap();
        let onto = layout.scene().body_by_key("label-2_label").unwrap();
        let (x, y) = layout.bodies().position(onto);
        layout.drag_start(label).unwrap();
        layout.drag_to(label, x, y).unwrap();
        layout.tick(&measure());
        layout.drag_end(label).unwrap();

        layout.run(&measure(), 10_000);
        assert!(!layout.is_active());
        assert_eq!(layout.overlaps(), Vec::new());
    }

    #[test]
    fn test_drag_rejects_anchors_and_unknown_ids() {
        let mut layout = layout();
        let anchor = layout.scene().body_by_key("label-1").unwrap();
        assert_eq!(
            layout.drag_start(anchor),
            Err(LayoutError::NotADragTarget { id: anchor })
        );
        assert!(layout.drag_start(BodyId(99)).is_err());
        assert!(layout.drag_to(BodyId(1), 0.0, 0.0).is_err());
    }

    #[test]
    fn test_label_at_finds_label_under_pointer() {
        let mut layout = layout();
        layout.run(&measure(), 10_000);
        let label = layout.scene().body_by_key("label-2_label").unwrap();
        let (x, y) = layout.bodies().position(label);
        assert_eq!(layout.label_at(x, y), Some(label));
        assert_eq!(layout.label_at(-1000.0, -1000.0), None);
    }

    #[test]
    fn test_highlight_group_dims_others() {
        let mut layout = layout();
        layout.tick(&measure());
        let group = GroupId(1);
        layout.highlight_group(Some(group));

        let frame = layout.frame();
        for label in &frame.labels {
            let expected = if label.group == group { 1.0 } else { 0.2 };
            assert_eq!(label.opacity, expected);
        }
        for edge in &frame.edges {
            let expected = if edge.group == group { 1.0 } else { 0.2 };
            assert_eq!(edge.opacity, expected);
        }

        layout.highlight_group(None);
        let frame = layout.frame();
        assert!(frame.labels.iter().all(|l| l.opacity == 1.0));
        assert!(frame.anchors.iter().all(|a| a.opacity == 1.0));
        assert!(frame.edges.iter().all(|e| e.opacity == 1.0));
    }
}
