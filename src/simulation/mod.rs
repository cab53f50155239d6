//! Damped-velocity force simulation with alpha cooling.
//!
//! A [`Simulation`] owns the [`Bodies`] and an ordered list of named
//! [`Force`]s. Each [`Simulation::step`]:
//!
//! 1. Moves `alpha` toward `alpha_target` by `alpha_decay`.
//! 2. Applies every force in registration order; forces add to velocities.
//! 3. Integrates: fixed bodies snap to their pin with zero velocity, free
//!    bodies lose `velocity_decay` of their velocity and then move by it.
//!
//! With the default decay, alpha falls from 1 below `alpha_min` in 300 steps.

pub mod forces;

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::graph::Bodies;

/// A force applied once per simulation step.
pub trait Force {
    /// Called when the force is registered, with the bodies it will act on.
    fn initialize(&mut self, _bodies: &Bodies, _rng: &mut dyn RngCore) {}

    /// Add this force's contribution to `bodies`' velocities.
    fn apply(&mut self, bodies: &mut Bodies, alpha: f64, rng: &mut dyn RngCore);
}

/// Cooling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooling {
    pub alpha: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    pub velocity_decay: f64,
}

impl Cooling {
    /// Decay that takes alpha from 1 to `alpha_min` in 300 steps.
    pub fn decay_for(alpha_min: f64) -> f64 {
        1.0 - alpha_min.powf(1.0 / 300.0)
    }

    pub fn new(alpha_min: f64, velocity_decay: f64) -> Self {
        Self {
            alpha: 1.0,
            alpha_min,
            alpha_decay: Self::decay_for(alpha_min),
            alpha_target: 0.0,
            velocity_decay,
        }
    }
}

impl Default for Cooling {
    fn default() -> Self {
        Self::new(0.001, 0.4)
    }
}

struct NamedForce {
    name: String,
    force: Box<dyn Force>,
}

/// The simulation engine.
pub struct Simulation {
    bodies: Bodies,
    forces: Vec<NamedForce>,
    cooling: Cooling,
    rng: SmallRng,
    steps: u64,
}

impl Simulation {
    pub fn new(bodies: Bodies, cooling: Cooling, seed: u64) -> Self {
        Self {
            bodies,
            forces: Vec::new(),
            cooling,
            rng: SmallRng::seed_from_u64(seed),
            steps: 0,
        }
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut Bodies {
        &mut self.bodies
    }

    pub fn alpha(&self) -> f64 {
        self.cooling.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.cooling.alpha_target
    }

    /// Whether the simulation is still warm enough to produce movement.
    pub fn is_active(&self) -> bool {
        self.cooling.alpha >= self.cooling.alpha_min
    }

    /// Set the temperature alpha decays toward. A target above `alpha_min`
    /// keeps the simulation running indefinitely.
    pub fn reheat(&mut self, alpha_target: f64) {
        self.cooling.alpha_target = alpha_target;
        tracing::debug!(alpha_target, alpha = self.cooling.alpha, "simulation reheated");
    }

    /// Register `force` under `name`, replacing any force with that name.
    /// Replacement keeps the force's slot in the application order.
    pub fn add_force(&mut self, name: impl Into<String>, mut force: Box<dyn Force>) {
        let name = name.into();
        force.initialize(&self.bodies, &mut self.rng);

        if let Some(slot) = self.forces.iter_mut().find(|f| f.name == name) {
            tracing::debug!(force = %name, "force replaced");
            slot.force = force;
        } else {
            tracing::debug!(force = %name, "force registered");
            self.forces.push(NamedForce { name, force });
        }
    }

    /// Unregister a force. Returns true if it existed.
    pub fn remove_force(&mut self, name: &str) -> bool {
        let before = self.forces.len();
        self.forces.retain(|f| f.name != name);
        before != self.forces.len()
    }

    /// Force names in application order.
    pub fn force_names(&self) -> Vec<&str> {
        self.forces.iter().map(|f| f.name.as_str()).collect()
    }

    /// Advance one step.
    pub fn step(&mut self) {
        let was_active = self.is_active();
        let cooling = &mut self.cooling;
        cooling.alpha += (cooling.alpha_target - cooling.alpha) * cooling.alpha_decay;
        let alpha = cooling.alpha;

        for named in &mut self.forces {
            named.force.apply(&mut self.bodies, alpha, &mut self.rng);
        }

        let keep = 1.0 - self.cooling.velocity_decay;
        let bodies = &mut self.bodies;
        for i in 0..bodies.len() {
            match bodies.fx[i] {
                Some(fx) => {
                    bodies.x[i] = fx;
                    bodies.vx[i] = 0.0;
                }
                None => {
                    bodies.vx[i] *= keep;
                    bodies.x[i] += bodies.vx[i];
                }
            }
            match bodies.fy[i] {
                Some(fy) => {
                    bodies.y[i] = fy;
                    bodies.vy[i] = 0.0;
                }
                None => {
                    bodies.vy[i] *= keep;
                    bodies.y[i] += bodies.vy[i];
                }
            }
        }

        self.steps += 1;
        tracing::trace!(step = self.steps, alpha, "simulation step");
        if was_active && !self.is_active() {
            tracing::debug!(steps = self.steps, alpha, "simulation cooled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BodyKind, GroupId};

    struct Constant(f64, f64);

    impl Force for Constant {
        fn apply(&mut self, bodies: &mut Bodies, _alpha: f64, _rng: &mut dyn RngCore) {
            for i in 0..bodies.len() {
                bodies.vx[i] += self.0;
                bodies.vy[i] += self.1;
            }
        }
    }

    fn one_anchor_one_label() -> Bodies {
        let mut bodies = Bodies::new();
        bodies.push("a", "A", GroupId(0), BodyKind::Anchor, 0.0, 0.0);
        bodies.push("a_label", "A", GroupId(0), BodyKind::Label, 0.0, 0.0);
        bodies
    }

    #[test]
    fn test_cools_below_alpha_min_in_300_steps() {
        let mut sim = Simulation::new(Bodies::new(), Cooling::default(), 1);
        let mut steps = 0;
        while sim.is_active() {
            sim.step();
            steps += 1;
            assert!(steps < 1000);
        }
        assert!((299..=301).contains(&steps), "took {steps} steps");
    }

    #[test]
    fn test_integration_decays_velocity_and_respects_pins() {
        let mut sim = Simulation::new(one_anchor_one_label(), Cooling::default(), 1);
        sim.add_force("push", Box::new(Constant(10.0, -5.0)));
        sim.step();

        let bodies = sim.bodies();
        // Anchor is fixed.
        assert_eq!(bodies.position(crate::graph::BodyId(0)), (0.0, 0.0));
        assert_eq!(bodies.velocity(crate::graph::BodyId(0)), (0.0, 0.0));
        // Label keeps 60% of its velocity and moves by it.
        assert!((bodies.x[1] - 6.0).abs() < 1e-12);
        assert!((bodies.y[1] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_force_replaces_in_place() {
        let mut sim = Simulation::new(Bodies::new(), Cooling::default(), 1);
        sim.add_force("a", Box::new(Constant(0.0, 0.0)));
        sim.add_force("b", Box::new(Constant(0.0, 0.0)));
        sim.add_force("a", Box::new(Constant(1.0, 0.0)));
        assert_eq!(sim.force_names(), vec!["a", "b"]);

        assert!(sim.remove_force("a"));
        assert!(!sim.remove_force("a"));
        assert_eq!(sim.force_names(), vec!["b"]);
    }

    #[test]
    fn test_reheat_keeps_simulation_active() {
        let mut sim = Simulation::new(Bodies::new(), Cooling::default(), 1);
        sim.reheat(0.3);
        for _ in 0..2000 {
            sim.step();
        }
        assert!(sim.is_active());
        assert!((sim.alpha() - 0.3).abs() < 1e-3);

        sim.reheat(0.0);
        for _ in 0..1000 {
            sim.step();
        }
        assert!(!sim.is_active());
    }
}
