//! Post-cooling placement repair.
//!
//! The ellipse force pushes overlapping footprints apart with a fixed
//! minimum impulse, so a label wedged between several anchors can oscillate
//! in place after the simulation has cooled. [`free_spot`] finds the nearest
//! clear position on rings around the label's anchor, and [`settle`] moves
//! every label still in an overlap to one.

use std::f64::consts::TAU;

use super::geometry::{Ellipse, separation};
use crate::graph::{Bodies, BodyId, LabelScene};

/// Distance between candidate rings.
pub const RING_STEP: f64 = 4.0;
/// Candidate positions per ring.
pub const RING_ANGLES: usize = 32;
/// Largest ring searched around an anchor.
pub const MAX_RADIUS: f64 = 400.0;
/// Minimum gap a relocated label keeps from every other footprint.
pub const CLEARANCE: f64 = 2.0;

fn padded(bodies: &Bodies, id: BodyId, padding: f64) -> Ellipse {
    let (rx, ry) = bodies.semi_axes(id);
    Ellipse::new(rx + padding, ry + padding)
}

/// Whether `id` centered at `(x, y)` keeps at least `CLEARANCE` from every
/// other body.
fn is_clear(bodies: &Bodies, id: BodyId, x: f64, y: f64, padding: f64) -> bool {
    let footprint = padded(bodies, id, padding);
    bodies.ids().filter(|&other| other != id).all(|other| {
        let (ox, oy) = bodies.position(other);
        separation(footprint, padded(bodies, other, padding), x - ox, y - oy)
            .is_some_and(|s| s.gap >= CLEARANCE)
    })
}

/// The clear position for label `id` closest to where it is now, searched
/// ring by ring outward from its anchor target. The first ring holding any
/// clear candidate wins. `None` when nothing within `MAX_RADIUS` is clear.
pub fn free_spot(bodies: &Bodies, id: BodyId, padding: f64) -> Option<(f64, f64)> {
    let i = id.index();
    let (ax, ay) = (bodies.ix[i], bodies.iy[i]);
    let (x, y) = bodies.position(id);

    let rings = (MAX_RADIUS / RING_STEP) as usize;
    (1..=rings).find_map(|ring| {
        let radius = ring as f64 * RING_STEP;
        (0..RING_ANGLES)
            .map(|k| {
                let theta = TAU * k as f64 / RING_ANGLES as f64;
                (ax + radius * theta.cos(), ay + radius * theta.sin())
            })
            .filter(|&(cx, cy)| is_clear(bodies, id, cx, cy, padding))
            .min_by(|a, b| {
                let da = (a.0 - x).hypot(a.1 - y);
                let db = (b.0 - x).hypot(b.1 - y);
                da.total_cmp(&db)
            })
    })
}

/// Relocate labels until no footprints overlap. Returns how many labels
/// moved.
///
/// A relocated label is clear of everything, and later moves keep clear of
/// it, so each label moves at most once. Label/label overlaps move the
/// higher id unless it is pinned; label/anchor overlaps move the label.
/// Pinned labels stay put. Every free label's velocity is zeroed so the
/// repaired layout holds.
pub fn settle(scene: &mut LabelScene, bodies: &mut Bodies, padding: f64) -> usize {
    let mut moved = 0;
    for _ in 0..bodies.len() {
        let Some(target) = scene
            .overlaps(bodies, padding)
            .into_iter()
            .flat_map(|o| [o.b, o.a])
            .find(|&id| bodies.kind(id).is_label() && bodies.fx[id.index()].is_none())
        else {
            break;
        };

        let Some((x, y)) = free_spot(bodies, target, padding) else {
            tracing::warn!(body = %target, "no clear position for label");
            break;
        };
        let i = target.index();
        bodies.x[i] = x;
        bodies.y[i] = y;
        moved += 1;
    }

    for id in bodies.labels().collect::<Vec<_>>() {
        let i = id.index();
        if bodies.fx[i].is_none() {
            bodies.vx[i] = 0.0;
            bodies.vy[i] = 0.0;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BodyKind, GroupId};

    /// A 40x10 label whose anchor sits between three neighbors' anchors.
    fn boxed_in() -> Bodies {
        let mut bodies = Bodies::new();
        bodies.push("a", "A", GroupId(0), BodyKind::Anchor, 0.0, 0.0);
        bodies.push("a_label", "A", GroupId(0), BodyKind::Label, 0.0, 0.0);
        for (i, &(x, y)) in [(-30.0, 0.0), (30.0, 0.0), (0.0, 20.0)].iter().enumerate() {
            bodies.push(format!("n{i}"), "N", GroupId(i as u32 + 1), BodyKind::Anchor, x, y);
        }
        for id in bodies.ids().collect::<Vec<_>>() {
            bodies.set_semi_axes(id, 10.0, 10.0);
        }
        bodies.set_semi_axes(BodyId(1), 26.0, 11.0);
        bodies
    }

    #[test]
    fn test_free_spot_is_clear_and_near_anchor() {
        let bodies = boxed_in();
        let label = BodyId(1);
        assert!(!is_clear(&bodies, label, 0.0, 0.0, 2.0));

        let (x, y) = free_spot(&bodies, label, 2.0).unwrap();
        assert!(is_clear(&bodies, label, x, y, 2.0));
        assert!(x.hypot(y) <= MAX_RADIUS);
        // Below the anchor is open; above is blocked by the third neighbor.
        assert!(y < 0.0, "placed at ({x}, {y})");
    }

    #[test]
    fn test_free_spot_none_when_everything_is_blocked() {
        let mut bodies = boxed_in();
        bodies.set_semi_axes(BodyId(2), 1000.0, 1000.0);
        assert_eq!(free_spot(&bodies, BodyId(1), 2.0), None);
    }

    #[test]
    fn test_settle_clears_every_overlap_and_stops_labels() {
        let mut scene = LabelScene::new();
        let mut bodies = Bodies::new();
        for (i, &(x, y)) in [(0.0, 0.0), (10.0, 5.0), (-8.0, 4.0)].iter().enumerate() {
            let key = format!("p{i}");
            scene
                .add_body(&mut bodies, &key, "P", GroupId(i as u32), BodyKind::Anchor, x, y)
                .unwrap();
            scene
                .add_body(&mut bodies, &format!("{key}_label"), "P", GroupId(i as u32), BodyKind::Label, x, y)
                .unwrap();
        }
        for id in bodies.ids().collect::<Vec<_>>() {
            let axes = if bodies.kind(id).is_label() { (46.0, 16.0) } else { (10.0, 10.0) };
            bodies.set_semi_axes(id, axes.0, axes.1);
            bodies.vx[id.index()] = 1.5;
        }
        assert!(!scene.overlaps(&bodies, 2.0).is_empty());

        let moved = settle(&mut scene, &mut bodies, 2.0);
        assert_eq!(moved, 3);
        assert!(scene.overlaps(&bodies, 2.0).is_empty());
        for label in bodies.labels() {
            assert_eq!(bodies.velocity(label), (0.0, 0.0));
        }
    }

    #[test]
    fn test_settle_leaves_pinned_labels() {
        let mut scene = LabelScene::new();
        let mut bodies = Bodies::new();
        scene
            .add_body(&mut bodies, "p", "P", GroupId(0), BodyKind::Anchor, 0.0, 0.0)
            .unwrap();
        let label = scene
            .add_body(&mut bodies, "p_label", "P", GroupId(0), BodyKind::Label, 0.0, 0.0)
            .unwrap();
        bodies.set_semi_axes(BodyId(0), 10.0, 10.0);
        bodies.set_semi_axes(label, 46.0, 16.0);
        bodies.pin(label, 0.0, 0.0);

        assert_eq!(settle(&mut scene, &mut bodies, 2.0), 0);
        assert_eq!(bodies.position(label), (0.0, 0.0));
    }
}
