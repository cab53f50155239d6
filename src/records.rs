//! Input records: one per labelled point.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A point to label, positioned relative to the layout's center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    /// Text shown in the label. Also the source of the body key.
    pub name: String,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl LabelRecord {
    pub fn new(name: impl Into<String>, offset_x: f64, offset_y: f64) -> Self {
        Self {
            name: name.into(),
            offset_x,
            offset_y,
        }
    }

    /// Body key derived from the name: trimmed, lowercased, spaces as dashes.
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase().replace(' ', "-")
    }
}

/// `count` demo records named `Label 1..=count`, scattered up to 100 units
/// horizontally and 60 vertically from the center.
pub fn sample_records(count: usize, rng: &mut dyn RngCore) -> Vec<LabelRecord> {
    (1..=count)
        .map(|i| {
            let offset_x = random_offset(rng, 100);
            let offset_y = random_offset(rng, 60);
            LabelRecord::new(format!("Label {i}"), offset_x, offset_y)
        })
        .collect()
}

/// A nonzero integer offset in `[-max, -1] ∪ [1, max]`.
fn random_offset(rng: &mut dyn RngCore, max: u32) -> f64 {
    let magnitude = rng.random_range(1..=max) as f64;
    if rng.random::<bool>() { magnitude } else { -magnitude }
}
