//! Lazy footprint sizing.
//!
//! Label footprints depend on the rendered size of their text, which can only
//! be measured once the renderer has drawn the label. Sizing therefore runs
//! inside the first tick callback, exactly once, and the ellipse force is only
//! registered after it: the force needs real semi-axes to work with.

use crate::graph::{Bodies, BodyId, BodyKind};

/// Measures rendered text. Returns the bounding box `(width, height)`, or
/// `None` if the renderer cannot measure this body.
pub trait TextMeasure {
    fn measure(&self, id: BodyId, text: &str) -> Option<(f64, f64)>;
}

/// Estimates text size from a fixed advance per character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for MonospaceMeasure {
    /// Roughly a 12px sans-serif label.
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, _id: BodyId, text: &str) -> Option<(f64, f64)> {
        Some((text.chars().count() as f64 * self.char_width, self.line_height))
    }
}

/// Every label has the same box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedExtents {
    pub width: f64,
    pub height: f64,
}

impl FixedExtents {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl TextMeasure for FixedExtents {
    fn measure(&self, _id: BodyId, _text: &str) -> Option<(f64, f64)> {
        Some((self.width, self.height))
    }
}

impl<F> TextMeasure for F
where
    F: Fn(BodyId, &str) -> Option<(f64, f64)>,
{
    fn measure(&self, id: BodyId, text: &str) -> Option<(f64, f64)> {
        self(id, text)
    }
}

/// Whether footprints have been measured yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FootprintState {
    #[default]
    Uninitialized,
    Sized,
}

/// One-shot sizing of every body's footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprints {
    state: FootprintState,
    label_padding: f64,
    point_padding: f64,
}

impl Footprints {
    pub fn new(label_padding: f64, point_padding: f64) -> Self {
        Self {
            state: FootprintState::Uninitialized,
            label_padding,
            point_padding,
        }
    }

    pub fn state(&self) -> FootprintState {
        self.state
    }

    /// Size every footprint if that has not happened yet.
    ///
    /// Labels get half their measured box plus `label_padding`; anchors get
    /// `point_padding` on both axes. Returns true only on the call that
    /// performed the sizing.
    pub fn ensure_sized(&mut self, bodies: &mut Bodies, measure: &dyn TextMeasure) -> bool {
        if self.state == FootprintState::Sized {
            return false;
        }

        let mut unmeasured = 0usize;
        for id in bodies.ids().collect::<Vec<_>>() {
            match bodies.kind(id) {
                BodyKind::Anchor => bodies.set_semi_axes(id, self.point_padding, self.point_padding),
                BodyKind::Label => {
                    let (width, height) = match measure.measure(id, bodies.text(id)) {
                        Some(extent) => extent,
                        None => {
                            tracing::warn!(body = %id, key = bodies.key(id), "label could not be measured");
                            unmeasured += 1;
                            (0.0, 0.0)
                        }
                    };
                    bodies.set_semi_axes(
                        id,
                        width / 2.0 + self.label_padding,
                        height / 2.0 + self.label_padding,
                    );
                }
            }
        }

        self.state = FootprintState::Sized;
        tracing::info!(bodies = bodies.len(), unmeasured, "footprints sized");
        true
    }
}
