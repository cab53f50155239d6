//! Scene data structures.
//!
//! Topology lives in a petgraph `StableGraph` (anchor -> label edges), while
//! per-body simulation state is kept column-wise in [`Bodies`] so forces can
//! sweep positions and velocities without chasing pointers.

mod bodies;
mod body;
mod edge;
mod scene;

pub use bodies::Bodies;
pub use body::{BodyId, BodyKind, BodyState, GroupId};
pub use edge::{Edge, EdgeId, EdgeState};
pub use scene::{LABEL_SUFFIX, LabelScene, Overlap};
