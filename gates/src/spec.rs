//! Gate specification records (C3): the immutable description of a gate
//! class, independent of any particular instance's mutable pin state.

use std::collections::BTreeMap;

use n2t_hdl_core::{PinSpec, Word};

/// A mapping from pin name to value for one row of stimulus or truth-table
/// data. Kept as a `BTreeMap` so rows serialize and compare deterministically
/// regardless of insertion order.
pub type Row = BTreeMap<String, Word>;

/// The immutable description of a gate class: its name, documentation,
/// declared pins, and (for combinational primitives) its canonical truth
/// table.
#[derive(Debug, Clone)]
pub struct GateSpec {
    pub name: String,
    pub description: String,
    pub input_pins: Vec<PinSpec>,
    pub output_pins: Vec<PinSpec>,
    /// Canonical for combinational primitives; absent for sequential ones
    /// and for composites (whose behavior depends on their parts).
    pub truth_table: Option<Vec<Row>>,
}

impl GateSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_pins: Vec<PinSpec>,
        output_pins: Vec<PinSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_pins,
            output_pins,
            truth_table: None,
        }
    }

    pub fn input_width(&self, name: &str) -> Option<u32> {
        self.input_pins.iter().find(|p| p.name == name).map(|p| p.size)
    }

    pub fn output_width(&self, name: &str) -> Option<u32> {
        self.output_pins.iter().find(|p| p.name == name).map(|p| p.size)
    }

    pub fn is_input(&self, name: &str) -> bool {
        self.input_pins.iter().any(|p| p.name == name)
    }

    pub fn is_output(&self, name: &str) -> bool {
        self.output_pins.iter().any(|p| p.name == name)
    }

    pub fn total_input_bits(&self) -> u32 {
        self.input_pins.iter().map(|p| p.size).sum()
    }
}
