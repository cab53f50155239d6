//! Body type and related structures.
//!
//! Bodies are the particles of the simulation. Each body has:
//! - A stable unique identifier (dense, assigned at scene construction)
//! - A group shared with its partner (an anchor and its label)
//! - A kind: pinned anchor or free label
//! - State flags for interaction (pinned, dragged, dimmed)

use std::fmt;

use serde::Serialize;

/// Stable body identifier.
///
/// Bodies are never removed, so the id doubles as the column index into
/// [`Bodies`](super::Bodies). It wraps a u32 for WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Create a new BodyId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Column index into the body buffers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

impl From<u32> for BodyId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<BodyId> for u32 {
    #[inline]
    fn from(id: BodyId) -> Self {
        id.0
    }
}

/// Identifier shared by an anchor, its label and the edge between them.
///
/// Only used for highlighting; the physics never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group({})", self.0)
    }
}

/// What a body represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// A data point. Its position is fixed every tick.
    Anchor,
    /// A text annotation, free to move.
    Label,
}

impl BodyKind {
    #[inline]
    pub fn is_label(self) -> bool {
        matches!(self, BodyKind::Label)
    }
}

/// Body state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyState {
    flags: u8,
}

impl BodyState {
    const PINNED: u8 = 0b0000_0001;
    const DRAGGED: u8 = 0b0000_0010;
    const DIMMED: u8 = 0b0000_0100;

    /// Create a new default body state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the body is pinned to its fixed position.
    #[inline]
    pub fn is_pinned(self) -> bool {
        self.flags & Self::PINNED != 0
    }

    /// Set the pinned state.
    #[inline]
    pub fn set_pinned(&mut self, pinned: bool) {
        self.set(Self::PINNED, pinned);
    }

    /// Check if the body is held by a drag gesture.
    #[inline]
    pub fn is_dragged(self) -> bool {
        self.flags & Self::DRAGGED != 0
    }

    /// Set the dragged state.
    #[inline]
    pub fn set_dragged(&mut self, dragged: bool) {
        self.set(Self::DRAGGED, dragged);
    }

    /// Check if the body is faded out by a group highlight.
    #[inline]
    pub fn is_dimmed(self) -> bool {
        self.flags & Self::DIMMED != 0
    }

    /// Set the dimmed state.
    #[inline]
    pub fn set_dimmed(&mut self, dimmed: bool) {
        self.set(Self::DIMMED, dimmed);
    }

    #[inline]
    fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }
}
