//! The linked, immutable shape of a composite gate (§3 "Composite gate"):
//! external pins, internal nets, and an ordered list of bound parts. Built
//! once by [`crate::link::link`]; evaluated repeatedly (possibly many
//! times, possibly nested inside another composite) by wrapping it in a
//! fresh [`crate::instance::CompositeInstance`].

use std::rc::Rc;

use n2t_hdl_core::PinSpec;
use n2t_hdl_gates::{GateClass, GateSpec};

/// Where one side of an argument binding lives, with the bit range it
/// addresses already resolved to concrete bounds (a whole-pin reference is
/// `from: 0, to: size - 1`).
#[derive(Debug, Clone)]
pub enum Signal {
    /// One of this composite's own external input pins.
    Input { name: String, from: u32, to: u32 },
    /// One of this composite's own external output pins.
    Output { name: String, from: u32, to: u32 },
    /// An internal net, private to this composite.
    Internal { name: String, from: u32, to: u32 },
    /// The `true`/`false` literal, already widened to the part-side width.
    Constant { value: bool, width: u32 },
}

impl Signal {
    pub fn width(&self) -> u32 {
        match self {
            Signal::Input { from, to, .. }
            | Signal::Output { from, to, .. }
            | Signal::Internal { from, to, .. } => to - from + 1,
            Signal::Constant { width, .. } => *width,
        }
    }
}

/// One `name = pinRef` argument of a part, fully resolved: which of the
/// part's own pins it binds, in which direction, and to what signal.
#[derive(Debug, Clone)]
pub struct ArgBinding {
    /// The pin name on the *part's* side of the binding.
    pub part_pin: String,
    pub part_pin_width: u32,
    /// `true` if `part_pin` is an input of the part (so `signal` is read
    /// from and copied in); `false` if it is an output (so `signal` is
    /// written from the part's output pin after `evaluate()`).
    pub is_part_input: bool,
    pub signal: Signal,
}

/// One `PARTS` entry after resolution: which gate class it instantiates,
/// plus its fully resolved argument bindings.
#[derive(Debug, Clone)]
pub struct PartPlan {
    /// The gate name as written in the HDL (for diagnostics); not
    /// necessarily unique across parts.
    pub gate_name: String,
    pub class: Rc<GateClass>,
    pub bindings: Vec<ArgBinding>,
}

/// The linked shape of one `CHIP`: its own interface (as a [`GateSpec`]),
/// its internal nets, and its parts in an order that is safe to evaluate
/// top-to-bottom (§4.7 point 5).
#[derive(Debug, Clone)]
pub struct Composite {
    pub spec: GateSpec,
    pub internal_nets: Vec<PinSpec>,
    pub parts: Vec<PartPlan>,
}
