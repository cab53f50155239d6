//! Layout configuration.
//!
//! Every field has a default, so JavaScript callers may pass a partial object
//! (or nothing at all) and get the stock label layout.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Configuration for building and simulating a label layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Viewport width; record offsets are relative to its center (default: 600).
    pub width: f64,
    /// Viewport height (default: 400).
    pub height: f64,
    /// Footprint radius of every anchor point (default: 10).
    pub point_padding: f64,
    /// Margin added around each label's measured text box (default: 6).
    pub label_padding: f64,
    /// Extra margin the ellipse force adds to every footprint (default: 2).
    pub ellipse_padding: f64,
    /// Ellipse force multiplier for overlapping footprints (default: 0.05).
    pub inner_repulsion: f64,
    /// Ellipse force multiplier for separated footprints (default: 0.05).
    pub outer_repulsion: f64,
    /// Strength of the pull back toward each body's anchor position (default: 0.1).
    pub position_strength: f64,
    /// Many-body charge of a label; negative repels (default: -60).
    pub label_charge: f64,
    /// Many-body charge of an anchor (default: 0).
    pub anchor_charge: f64,
    /// Link spring strength (default: 0.25).
    pub link_strength: f64,
    /// Link rest length (default: 30).
    pub link_distance: f64,
    /// Fraction of velocity lost per tick (default: 0.4).
    pub velocity_decay: f64,
    /// The simulation stops once alpha falls below this (default: 0.001).
    pub alpha_min: f64,
    /// Alpha target while a body is being dragged (default: 0.3).
    pub drag_alpha_target: f64,
    /// Seed for the simulation's random source.
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            point_padding: 10.0,
            label_padding: 6.0,
            ellipse_padding: 2.0,
            inner_repulsion: 0.05,
            outer_repulsion: 0.05,
            position_strength: 0.1,
            label_charge: -60.0,
            anchor_charge: 0.0,
            link_strength: 0.25,
            link_distance: 30.0,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            drag_alpha_target: 0.3,
            seed: 0x5eed,
        }
    }
}

impl LayoutConfig {
    /// Check that every numeric field is finite and within its legal range.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("width", self.width),
            ("height", self.height),
            ("pointPadding", self.point_padding),
            ("labelPadding", self.label_padding),
            ("ellipsePadding", self.ellipse_padding),
            ("innerRepulsion", self.inner_repulsion),
            ("outerRepulsion", self.outer_repulsion),
            ("positionStrength", self.position_strength),
            ("labelCharge", self.label_charge),
            ("anchorCharge", self.anchor_charge),
            ("linkStrength", self.link_strength),
            ("linkDistance", self.link_distance),
            ("velocityDecay", self.velocity_decay),
            ("alphaMin", self.alpha_min),
            ("dragAlphaTarget", self.drag_alpha_target),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(LayoutError::InvalidConfig { field, value });
            }
        }

        let non_negative = [
            ("width", self.width),
            ("height", self.height),
            ("pointPadding", self.point_padding),
            ("labelPadding", self.label_padding),
            ("ellipsePadding", self.ellipse_padding),
            ("linkDistance", self.link_distance),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(LayoutError::InvalidConfig { field, value });
            }
        }

        // An unmeasured label or any anchor is sized from padding alone and
        // must still have a positive footprint.
        let footprint_padding = [
            ("pointPadding", self.point_padding),
            ("labelPadding", self.label_padding),
        ];
        for (field, value) in footprint_padding {
            if value + self.ellipse_padding <= 0.0 {
                return Err(LayoutError::InvalidConfig { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(LayoutError::InvalidConfig {
                field: "velocityDecay",
                value: self.velocity_decay,
            });
        }
        if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
            return Err(LayoutError::InvalidConfig {
                field: "alphaMin",
                value: self.alpha_min,
            });
        }
        Ok(())
    }
}
