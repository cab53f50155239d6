//! Elliptical collision force for bodies of heterogeneous sizes.
//!
//! Every ordered pair of bodies is compared using their *predicted*
//! positions (position + velocity). The pair's separation along the line
//! joining the centers decides between two regimes:
//!
//! - **Overlap** (`gap < 0`): a push that grows with overlap depth, clamped
//!   to `[1, 5]` so any overlap gets a minimum correction and deep overlaps
//!   cannot blow up the integration.
//! - **Clear** (`gap >= 0`): an inverse-distance push that fades with alpha
//!   and with the gap, capped at 20.
//!
//! Each body only receives its own half of the pair; the mirrored
//! contribution arrives when the loop visits the other body.

use std::fmt;

use rand::{Rng, RngCore};

use super::geometry::{Ellipse, separation};
use crate::graph::{Bodies, BodyId};
use crate::simulation::Force;

/// Scale applied to `outer_repulsion` in the clear regime.
const EASING_SCALE: f64 = 16.0;
const MIN_OVERLAP_PUSH: f64 = 1.0;
const MAX_OVERLAP_PUSH: f64 = 5.0;
const MAX_EASING_PUSH: f64 = 20.0;
/// Coincident bodies are nudged by up to this much on each axis.
const JITTER: f64 = 2.0;

/// Extra margin added to each body's semi-axes before comparing footprints.
pub enum Padding {
    Constant(f64),
    PerBody(Box<dyn Fn(&Bodies, BodyId) -> f64>),
}

impl Padding {
    /// Padding for one body.
    #[inline]
    pub fn resolve(&self, bodies: &Bodies, id: BodyId) -> f64 {
        match self {
            Padding::Constant(p) => *p,
            Padding::PerBody(f) => f(bodies, id),
        }
    }

    /// Wrap a per-body closure.
    pub fn per_body(f: impl Fn(&Bodies, BodyId) -> f64 + 'static) -> Self {
        Padding::PerBody(Box::new(f))
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Constant(4.0)
    }
}

impl From<f64> for Padding {
    fn from(p: f64) -> Self {
        Padding::Constant(p)
    }
}

impl fmt::Debug for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Padding::Constant(p) => f.debug_tuple("Constant").field(p).finish(),
            Padding::PerBody(_) => f.write_str("PerBody(..)"),
        }
    }
}

/// Push magnitude for a pair with the given signed `gap` and `force_ratio`.
pub fn repulsion_magnitude(gap: f64, force_ratio: f64, alpha: f64, inner: f64, outer: f64) -> f64 {
    if gap < 0.0 {
        (inner * force_ratio * -gap)
            .max(MIN_OVERLAP_PUSH)
            .min(MAX_OVERLAP_PUSH)
    } else {
        (force_ratio * outer * EASING_SCALE * alpha / gap).min(MAX_EASING_PUSH)
    }
}

/// Pairwise elliptical repulsion.
#[derive(Debug)]
pub struct EllipseForce {
    padding: Padding,
    inner_repulsion: f64,
    outer_repulsion: f64,
}

impl Default for EllipseForce {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            inner_repulsion: 0.5,
            outer_repulsion: 0.5,
        }
    }
}

impl EllipseForce {
    pub fn new(padding: impl Into<Padding>, inner_repulsion: f64, outer_repulsion: f64) -> Self {
        Self {
            padding: padding.into(),
            inner_repulsion,
            outer_repulsion,
        }
    }

    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn with_inner_repulsion(mut self, inner_repulsion: f64) -> Self {
        self.inner_repulsion = inner_repulsion;
        self
    }

    pub fn with_outer_repulsion(mut self, outer_repulsion: f64) -> Self {
        self.outer_repulsion = outer_repulsion;
        self
    }

    pub fn padding(&self) -> &Padding {
        &self.padding
    }

    pub fn set_padding(&mut self, padding: impl Into<Padding>) {
        self.padding = padding.into();
    }

    pub fn inner_repulsion(&self) -> f64 {
        self.inner_repulsion
    }

    pub fn set_inner_repulsion(&mut self, inner_repulsion: f64) {
        self.inner_repulsion = inner_repulsion;
    }

    pub fn outer_repulsion(&self) -> f64 {
        self.outer_repulsion
    }

    pub fn set_outer_repulsion(&mut self, outer_repulsion: f64) {
        self.outer_repulsion = outer_repulsion;
    }

    /// Padded footprint of a body.
    pub fn footprint(&self, bodies: &Bodies, id: BodyId) -> Ellipse {
        let padding = self.padding.resolve(bodies, id);
        let (rx, ry) = bodies.semi_axes(id);
        Ellipse::new(rx + padding, ry + padding)
    }

    /// Velocity change for every body, computed from one snapshot of
    /// `bodies`. Index `i` of the result belongs to `BodyId(i)`.
    ///
    /// Pairs involving a degenerate footprint are skipped.
    pub fn velocity_deltas(&self, bodies: &Bodies, alpha: f64, rng: &mut dyn RngCore) -> Vec<[f64; 2]> {
        let n = bodies.len();
        let footprints: Vec<Ellipse> = bodies.ids().map(|id| self.footprint(bodies, id)).collect();
        let predicted: Vec<(f64, f64)> = bodies.ids().map(|id| bodies.predicted(id)).collect();

        let mut deltas = vec![[0.0_f64; 2]; n];
        for i in 0..n {
            if footprints[i].is_degenerate() {
                continue;
            }
            let (my_x, my_y) = predicted[i];
            for j in 0..n {
                if i == j || footprints[j].is_degenerate() {
                    continue;
                }
                let (other_x, other_y) = predicted[j];
                let dx = my_x - other_x;
                let dy = my_y - other_y;

                let Some(sep) = separation(footprints[i], footprints[j], dx, dy) else {
                    deltas[i][0] += rng.random_range(-JITTER..=JITTER);
                    deltas[i][1] += rng.random_range(-JITTER..=JITTER);
                    continue;
                };

                let magnitude = repulsion_magnitude(
                    sep.gap,
                    sep.force_ratio,
                    alpha,
                    self.inner_repulsion,
                    self.outer_repulsion,
                );
                deltas[i][0] += magnitude * dx / sep.distance;
                deltas[i][1] += magnitude * dy / sep.distance;
            }
        }
        deltas
    }
}

impl Force for EllipseForce {
    fn apply(&mut self, bodies: &mut Bodies, alpha: f64, rng: &mut dyn RngCore) {
        let deltas = self.velocity_deltas(bodies, alpha, rng);
        for (i, [dvx, dvy]) in deltas.into_iter().enumerate() {
            bodies.vx[i] += dvx;
            bodies.vy[i] += dvy;
        }
    }
}
