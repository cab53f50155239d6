//! Column-wise (SoA) storage for simulated bodies.
//!
//! Positions, velocities, anchor targets and footprints each live in their
//! own `Vec<f64>`, indexed by [`BodyId::index`]. Forces walk these columns
//! directly and the wasm facade hands them to JavaScript without reshaping.

use super::body::{BodyId, BodyKind, BodyState, GroupId};

/// All bodies of a simulation.
#[derive(Debug, Clone, Default)]
pub struct Bodies {
    keys: Vec<String>,
    texts: Vec<String>,
    groups: Vec<GroupId>,
    kinds: Vec<BodyKind>,

    /// X positions
    pub x: Vec<f64>,
    /// Y positions
    pub y: Vec<f64>,
    /// X velocities
    pub vx: Vec<f64>,
    /// Y velocities
    pub vy: Vec<f64>,

    /// X of the position each body is pulled back to
    pub ix: Vec<f64>,
    /// Y of the position each body is pulled back to
    pub iy: Vec<f64>,

    /// Horizontal footprint semi-axes, padding included
    pub rx: Vec<f64>,
    /// Vertical footprint semi-axes, padding included
    pub ry: Vec<f64>,

    /// Fixed X position, if any
    pub fx: Vec<Option<f64>>,
    /// Fixed Y position, if any
    pub fy: Vec<Option<f64>>,

    pub states: Vec<BodyState>,
}

impl Bodies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            texts: Vec::with_capacity(capacity),
            groups: Vec::with_capacity(capacity),
            kinds: Vec::with_capacity(capacity),
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            vx: Vec::with_capacity(capacity),
            vy: Vec::with_capacity(capacity),
            ix: Vec::with_capacity(capacity),
            iy: Vec::with_capacity(capacity),
            rx: Vec::with_capacity(capacity),
            ry: Vec::with_capacity(capacity),
            fx: Vec::with_capacity(capacity),
            fy: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
        }
    }

    /// Append a body at rest at `(x, y)`, which also becomes its anchor
    /// target. Anchors are pinned there. Footprints start at zero.
    pub fn push(
        &mut self,
        key: impl Into<String>,
        text: impl Into<String>,
        group: GroupId,
        kind: BodyKind,
        x: f64,
        y: f64,
    ) -> BodyId {
        let id = BodyId(self.len() as u32);
        let pinned = kind == BodyKind::Anchor;

        self.keys.push(key.into());
        self.texts.push(text.into());
        self.groups.push(group);
        self.kinds.push(kind);
        self.x.push(x);
        self.y.push(y);
        self.vx.push(0.0);
        self.vy.push(0.0);
        self.ix.push(x);
        self.iy.push(y);
        self.rx.push(0.0);
        self.ry.push(0.0);
        self.fx.push(pinned.then_some(x));
        self.fy.push(pinned.then_some(y));

        let mut state = BodyState::new();
        state.set_pinned(pinned);
        self.states.push(state);

        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        (0..self.len() as u32).map(BodyId)
    }

    #[inline]
    pub fn contains(&self, id: BodyId) -> bool {
        id.index() < self.len()
    }

    pub fn key(&self, id: BodyId) -> &str {
        &self.keys[id.index()]
    }

    /// Text shown for this body (the record's display name).
    pub fn text(&self, id: BodyId) -> &str {
        &self.texts[id.index()]
    }

    #[inline]
    pub fn group(&self, id: BodyId) -> GroupId {
        self.groups[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: BodyId) -> BodyKind {
        self.kinds[id.index()]
    }

    #[inline]
    pub fn position(&self, id: BodyId) -> (f64, f64) {
        let i = id.index();
        (self.x[i], self.y[i])
    }

    #[inline]
    pub fn velocity(&self, id: BodyId) -> (f64, f64) {
        let i = id.index();
        (self.vx[i], self.vy[i])
    }

    /// Position after this tick's velocity is applied, without committing it.
    #[inline]
    pub fn predicted(&self, id: BodyId) -> (f64, f64) {
        let i = id.index();
        (self.x[i] + self.vx[i], self.y[i] + self.vy[i])
    }

    #[inline]
    pub fn semi_axes(&self, id: BodyId) -> (f64, f64) {
        let i = id.index();
        (self.rx[i], self.ry[i])
    }

    #[inline]
    pub fn set_semi_axes(&mut self, id: BodyId, rx: f64, ry: f64) {
        let i = id.index();
        self.rx[i] = rx;
        self.ry[i] = ry;
    }

    /// Fix a body at `(x, y)` until [`Bodies::release`] is called.
    pub fn pin(&mut self, id: BodyId, x: f64, y: f64) {
        let i = id.index();
        self.fx[i] = Some(x);
        self.fy[i] = Some(y);
        self.states[i].set_pinned(true);
    }

    /// Clear a body's fixed position. Anchors stay fixed at their target.
    pub fn release(&mut self, id: BodyId) {
        let i = id.index();
        if self.kinds[i] == BodyKind::Anchor {
            self.fx[i] = Some(self.ix[i]);
            self.fy[i] = Some(self.iy[i]);
            return;
        }
        self.fx[i] = None;
        self.fy[i] = None;
        self.states[i].set_pinned(false);
    }

    pub fn labels(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.ids().filter(|&id| self.kind(id).is_label())
    }

    pub fn anchors(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.ids().filter(|&id| !self.kind(id).is_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Bodies, BodyId, BodyId) {
        let mut bodies = Bodies::new();
        let anchor = bodies.push("a", "A", GroupId(0), BodyKind::Anchor, 10.0, 20.0);
        let label = bodies.push("a_label", "A", GroupId(0), BodyKind::Label, 10.0, 20.0);
        (bodies, anchor, label)
    }

    #[test]
    fn test_push_assigns_dense_ids() {
        let (bodies, anchor, label) = sample();
        assert_eq!(anchor, BodyId(0));
        assert_eq!(label, BodyId(1));
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies.key(label), "a_label");
        assert_eq!(bodies.text(label), "A");
    }

    #[test]
    fn test_anchors_start_pinned_labels_free() {
        let (bodies, anchor, label) = sample();
        assert_eq!(bodies.fx[anchor.index()], Some(10.0));
        assert!(bodies.states[anchor.index()].is_pinned());
        assert_eq!(bodies.fx[label.index()], None);
        assert!(!bodies.states[label.index()].is_pinned());
    }

    #[test]
    fn test_footprints_start_at_zero() {
        let (bodies, _, label) = sample();
        assert_eq!(bodies.semi_axes(label), (0.0, 0.0));
    }

    #[test]
    fn test_predicted_adds_velocity() {
        let (mut bodies, _, label) = sample();
        bodies.vx[label.index()] = 1.5;
        bodies.vy[label.index()] = -2.0;
        assert_eq!(bodies.predicted(label), (11.5, 18.0));
        assert_eq!(bodies.position(label), (10.0, 20.0));
    }

    #[test]
    fn test_release_keeps_anchor_fixed() {
        let (mut bodies, anchor, label) = sample();
        bodies.pin(anchor, 50.0, 50.0);
        bodies.release(anchor);
        assert_eq!(bodies.fx[anchor.index()], Some(10.0));
        assert!(bodies.states[anchor.index()].is_pinned());

        bodies.pin(label, 50.0, 50.0);
        assert!(bodies.states[label.index()].is_pinned());
        bodies.release(label);
        assert_eq!(bodies.fx[label.index()], None);
        assert!(!bodies.states[label.index()].is_pinned());
    }

    #[test]
    fn test_kind_filters() {
        let (bodies, anchor, label) = sample();
        assert_eq!(bodies.anchors().collect::<Vec<_>>(), vec![anchor]);
        assert_eq!(bodies.labels().collect::<Vec<_>>(), vec![label]);
    }
}
