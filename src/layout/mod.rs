//! Label placement.
//!
//! Geometry helpers for elliptical footprints, the ellipse repulsion force,
//! one-shot footprint sizing, post-cooling placement repair and the tick
//! pipeline that ties them to the simulation.

pub mod ellipse_force;
pub mod footprint;
pub mod geometry;
pub mod pipeline;
pub mod placement;

pub use ellipse_force::{EllipseForce, Padding};
pub use footprint::{FixedExtents, FootprintState, Footprints, MonospaceMeasure, TextMeasure};
pub use geometry::{Ellipse, Separation, link_target_by_ellipse};
pub use pipeline::{AnchorMark, Footprint, Frame, LabelLayout, LabelTransform, Segment};
