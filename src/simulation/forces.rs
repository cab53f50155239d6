//! Generic forces: anchor pull, many-body charge and link springs.
//!
//! These run before the ellipse force each step and only read committed
//! state (positions, plus velocities for the link spring's look-ahead).

use rand::{Rng, RngCore};

use super::Force;
use crate::graph::{Bodies, BodyId, BodyKind};

/// A tiny random offset used when two coordinates coincide exactly.
fn jiggle(rng: &mut dyn RngCore) -> f64 {
    (rng.random::<f64>() - 0.5) * 1e-6
}

/// Which coordinate a [`PositionForce`] acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Pulls every body toward its anchor target (`ix` or `iy`) along one axis.
#[derive(Debug, Clone)]
pub struct PositionForce {
    axis: Axis,
    strength: f64,
}

impl PositionForce {
    pub fn new(axis: Axis, strength: f64) -> Self {
        Self { axis, strength }
    }

    pub fn x(strength: f64) -> Self {
        Self::new(Axis::X, strength)
    }

    pub fn y(strength: f64) -> Self {
        Self::new(Axis::Y, strength)
    }
}

impl Force for PositionForce {
    fn apply(&mut self, bodies: &mut Bodies, alpha: f64, _rng: &mut dyn RngCore) {
        let k = self.strength * alpha;
        let (pos, target, vel) = match self.axis {
            Axis::X => (&bodies.x, &bodies.ix, &mut bodies.vx),
            Axis::Y => (&bodies.y, &bodies.iy, &mut bodies.vy),
        };
        for ((v, p), t) in vel.iter_mut().zip(pos).zip(target) {
            *v += (t - p) * k;
        }
    }
}

/// Squared distance below which charge stops growing.
const DISTANCE_MIN2: f64 = 1.0;

/// Exact pairwise charge. Negative strength repels.
///
/// Strength depends on the body's kind, so anchors can be made inert while
/// labels push each other away.
#[derive(Debug, Clone)]
pub struct ManyBodyForce {
    label_strength: f64,
    anchor_strength: f64,
    strengths: Vec<f64>,
}

impl ManyBodyForce {
    pub fn new(label_strength: f64, anchor_strength: f64) -> Self {
        Self {
            label_strength,
            anchor_strength,
            strengths: Vec::new(),
        }
    }

    fn strength_of(&self, kind: BodyKind) -> f64 {
        match kind {
            BodyKind::Label => self.label_strength,
            BodyKind::Anchor => self.anchor_strength,
        }
    }
}

impl Force for ManyBodyForce {
    fn initialize(&mut self, bodies: &Bodies, _rng: &mut dyn RngCore) {
        let strengths: Vec<f64> = bodies.ids().map(|id| self.strength_of(bodies.kind(id))).collect();
        self.strengths = strengths;
    }

    fn apply(&mut self, bodies: &mut Bodies, alpha: f64, rng: &mut dyn RngCore) {
        let n = bodies.len().min(self.strengths.len());

        for i in 0..n {
            let mut dvx = 0.0;
            let mut dvy = 0.0;
            for j in 0..n {
                if i == j || self.strengths[j] == 0.0 {
                    continue;
                }
                let mut x = bodies.x[j] - bodies.x[i];
                let mut y = bodies.y[j] - bodies.y[i];
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = jiggle(rng);
                    l += x * x;
                }
                if y == 0.0 {
                    y = jiggle(rng);
                    l += y * y;
                }
                if l < DISTANCE_MIN2 {
                    l = (DISTANCE_MIN2 * l).sqrt();
                }
                let w = self.strengths[j] * alpha / l;
                dvx += x * w;
                dvy += y * w;
            }
            bodies.vx[i] += dvx;
            bodies.vy[i] += dvy;
        }
    }
}

/// Springs between linked bodies.
///
/// Each link is shortened or stretched toward `distance`. The correction is
/// split between the two ends in inverse proportion to their degree.
#[derive(Debug, Clone)]
pub struct LinkForce {
    links: Vec<(BodyId, BodyId)>,
    strength: f64,
    distance: f64,
    bias: Vec<f64>,
}

impl LinkForce {
    pub fn new(links: Vec<(BodyId, BodyId)>) -> Self {
        Self {
            links,
            strength: 1.0,
            distance: 30.0,
            bias: Vec::new(),
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }
}

impl Force for LinkForce {
    fn initialize(&mut self, bodies: &Bodies, _rng: &mut dyn RngCore) {
        let mut degree = vec![0u32; bodies.len()];
        for &(source, target) in &self.links {
            degree[source.index()] += 1;
            degree[target.index()] += 1;
        }
        self.bias = self
            .links
            .iter()
            .map(|&(source, target)| {
                let s = degree[source.index()] as f64;
                let t = degree[target.index()] as f64;
                s / (s + t)
            })
            .collect();
    }

    fn apply(&mut self, bodies: &mut Bodies, alpha: f64, rng: &mut dyn RngCore) {
        for (&(source, target), &bias) in self.links.iter().zip(&self.bias) {
            let (s, t) = (source.index(), target.index());
            let mut x = bodies.x[t] + bodies.vx[t] - bodies.x[s] - bodies.vx[s];
            let mut y = bodies.y[t] + bodies.vy[t] - bodies.y[s] - bodies.vy[s];
            if x == 0.0 {
                x = jiggle(rng);
            }
            if y == 0.0 {
                y = jiggle(rng);
            }
            let l = (x * x + y * y).sqrt();
            let k = (l - self.distance) / l * alpha * self.strength;
            x *= k;
            y *= k;

            bodies.vx[t] -= x * bias;
            bodies.vy[t] -= y * bias;
            bodies.vx[s] += x * (1.0 - bias);
            bodies.vy[s] += y * (1.0 - bias);
        }
    }
}
