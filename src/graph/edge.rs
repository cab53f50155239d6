//! Leader-line edges.
//!
//! An edge is the leader line from an anchor to its label. Each edge has:
//! - A stable id, also its index in the scene's edge list
//! - Source (anchor) and target (label) body IDs
//! - The endpoint on the label's footprint, recomputed every tick

use std::fmt;

use super::body::{BodyId, GroupId};

/// Stable edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// Edge state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    flags: u8,
}

impl EdgeState {
    const DIMMED: u8 = 0b0000_0001;

    /// Create a new default edge state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the edge is faded out by a group highlight.
    #[inline]
    pub fn is_dimmed(self) -> bool {
        self.flags & Self::DIMMED != 0
    }

    /// Set the dimmed state.
    #[inline]
    pub fn set_dimmed(&mut self, dimmed: bool) {
        if dimmed {
            self.flags |= Self::DIMMED;
        } else {
            self.flags &= !Self::DIMMED;
        }
    }
}

/// A leader line from an anchor to its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    /// The anchor the line starts at.
    pub source: BodyId,
    /// The label the line points to.
    pub target: BodyId,
    pub group: GroupId,
    /// Where the line meets the target's footprint. Only valid for the
    /// current tick.
    pub endpoint: (f64, f64),
    pub state: EdgeState,
}

impl Edge {
    pub fn new(id: EdgeId, source: BodyId, target: BodyId, group: GroupId) -> Self {
        Self {
            id,
            source,
            target,
            group,
            endpoint: (0.0, 0.0),
            state: EdgeState::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Edge(42)");
    }

    #[test]
    fn test_edge_state() {
        let mut state = EdgeState::new();
        assert!(!state.is_dimmed());

        state.set_dimmed(true);
        assert!(state.is_dimmed());

        state.set_dimmed(false);
        assert!(!state.is_dimmed());
    }

    #[test]
    fn test_new_edge_starts_undimmed() {
        let edge = Edge::new(EdgeId(0), BodyId(0), BodyId(1), GroupId(0));
        assert!(!edge.state.is_dimmed());
        assert_eq!(edge.endpoint, (0.0, 0.0));
    }
}
