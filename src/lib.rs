//! Label Layout - WASM Module
//!
//! Places text labels next to the points they annotate. Each point becomes a
//! fixed anchor body with a free label body tied to it by a link; a force
//! simulation pulls labels toward their anchors while an elliptical repulsion
//! force keeps label footprints from overlapping each other and the anchors.
//! Leader lines are clipped to the edge of each label's ellipse.
//!
//! # Architecture
//!
//! - `graph`: Scene topology (petgraph StableGraph) and column-wise body state
//! - `simulation`: Alpha-cooled force simulation and the generic forces
//! - `layout`: Ellipse geometry, ellipse repulsion, footprint sizing, tick pipeline
//! - `spatial`: R-tree spatial indexing for hit testing and overlap queries
//! - `records`: Input records and demo data

use js_sys::{Float64Array, Function};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod records;
pub mod simulation;
pub mod spatial;

pub use config::LayoutConfig;
pub use error::LayoutError;

use graph::{BodyId, GroupId};
use layout::{LabelLayout, TextMeasure};
use records::{LabelRecord, sample_records};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&JsValue::from_str(concat!(
        "label-layout-wasm ",
        env!("CARGO_PKG_VERSION")
    )));
}

/// Measures labels through a JavaScript callback `(text, id) => [width, height]`.
///
/// Anything other than a two-number array (a throw, `null`, a bad shape)
/// counts as unmeasurable.
struct JsMeasure<'a> {
    callback: &'a Function,
}

impl TextMeasure for JsMeasure<'_> {
    fn measure(&self, id: BodyId, text: &str) -> Option<(f64, f64)> {
        let value = self
            .callback
            .call2(&JsValue::NULL, &JsValue::from_str(text), &JsValue::from(id.raw()))
            .ok()?;
        serde_wasm_bindgen::from_value::<(f64, f64)>(value).ok()
    }
}

fn config_from_js(config: JsValue) -> Result<LayoutConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(LayoutConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))
}

/// Main entry point for the label layout.
///
/// Wraps [`LabelLayout`] and exposes it to JavaScript.
#[wasm_bindgen]
pub struct LabelLayoutWasm {
    layout: LabelLayout,
}

#[wasm_bindgen]
impl LabelLayoutWasm {
    /// Create a layout from an array of `{ name, offsetX, offsetY }` records.
    ///
    /// `config` may be omitted; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(records: JsValue, config: JsValue) -> Result<LabelLayoutWasm, JsError> {
        let records: Vec<LabelRecord> =
            serde_wasm_bindgen::from_value(records).map_err(|e| JsError::new(&e.to_string()))?;
        let config = config_from_js(config)?;
        Ok(Self {
            layout: LabelLayout::new(&records, config)?,
        })
    }

    /// Create a layout over `count` randomly scattered demo labels.
    pub fn sample(count: usize, config: JsValue) -> Result<LabelLayoutWasm, JsError> {
        let config = config_from_js(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let records = sample_records(count, &mut rng);
        Ok(Self {
            layout: LabelLayout::new(&records, config)?,
        })
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance one step. `measure` is called once per label on the first tick.
    pub fn tick(&mut self, measure: &Function) {
        self.layout.tick(&JsMeasure { callback: measure });
    }

    /// Tick until cool or `max_ticks`. Returns the number of ticks taken.
    pub fn run(&mut self, measure: &Function, max_ticks: usize) -> usize {
        self.layout.run(&JsMeasure { callback: measure }, max_ticks)
    }

    /// The full frame as a plain object.
    pub fn frame(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.layout.frame()).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Current simulation temperature.
    pub fn alpha(&self) -> f64 {
        self.layout.simulation().alpha()
    }

    /// Whether the simulation is still moving labels.
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.layout.is_active()
    }

    /// Anchors plus labels.
    #[wasm_bindgen(js_name = bodyCount)]
    pub fn body_count(&self) -> usize {
        self.layout.bodies().len()
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Label positions as `[x0, y0, x1, y1, ...]`, in record order.
    #[wasm_bindgen(js_name = labelPositions)]
    pub fn label_positions(&self) -> Float64Array {
        let bodies = self.layout.bodies();
        let flat: Vec<f64> = bodies
            .labels()
            .flat_map(|id| {
                let (x, y) = bodies.position(id);
                [x, y]
            })
            .collect();
        Float64Array::from(flat.as_slice())
    }

    /// Leader lines as `[x1, y1, x2, y2, ...]`, one per edge.
    #[wasm_bindgen(js_name = edgeSegments)]
    pub fn edge_segments(&self) -> Float64Array {
        let bodies = self.layout.bodies();
        let flat: Vec<f64> = self
            .layout
            .scene()
            .edges()
            .iter()
            .flat_map(|edge| {
                let (x1, y1) = bodies.position(edge.source);
                let (x2, y2) = edge.endpoint;
                [x1, y1, x2, y2]
            })
            .collect();
        Float64Array::from(flat.as_slice())
    }

    /// Footprint ellipses as `[x, y, rx, ry, ...]`, one per body.
    #[wasm_bindgen(js_name = footprints)]
    pub fn footprints(&self) -> Float64Array {
        let bodies = self.layout.bodies();
        let flat: Vec<f64> = bodies
            .ids()
            .flat_map(|id| {
                let (x, y) = bodies.position(id);
                let (rx, ry) = bodies.semi_axes(id);
                [x, y, rx, ry]
            })
            .collect();
        Float64Array::from(flat.as_slice())
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Topmost label under the point.
    #[wasm_bindgen(js_name = labelAt)]
    pub fn label_at(&mut self, x: f64, y: f64) -> Option<u32> {
        self.layout.label_at(x, y).map(BodyId::raw)
    }

    /// Grab a label: pin it in place and reheat the simulation. Anchors and
    /// unknown ids are rejected.
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.layout.drag_start(BodyId(id))?)
    }

    /// Move the grabbed label to `(x, y)`.
    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, id: u32, x: f64, y: f64) -> Result<(), JsError> {
        Ok(self.layout.drag_to(BodyId(id), x, y)?)
    }

    /// Release the grabbed label and let the simulation cool.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.layout.drag_end(BodyId(id))?)
    }

    /// Dim everything outside `group`. Pass `undefined` to clear.
    #[wasm_bindgen(js_name = highlightGroup)]
    pub fn highlight_group(&mut self, group: Option<u32>) {
        self.layout.highlight_group(group.map(GroupId));
    }

    /// Number of overlapping footprint pairs at the current positions.
    #[wasm_bindgen(js_name = overlapCount)]
    pub fn overlap_count(&mut self) -> usize {
        self.layout.overlaps().len()
    }
}
