//! Spatial indexing for O(log n) hit testing and overlap queries.
//!
//! This module provides an R-tree based spatial index over the elliptical
//! footprints of bodies.

mod rtree;

pub use rtree::{FootprintBox, SpatialIndex};
