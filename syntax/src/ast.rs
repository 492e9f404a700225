//! The HDL abstract syntax tree (§3 of the design). Every `parse` call
//! builds a fresh tree from a small builder threaded through the recursive
//! descent parser — nothing here is accumulated in module-level state.

use n2t_hdl_core::{PinRef, PinSpec};

/// A parsed `CHIP` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub name: String,
    pub inputs: Vec<PinSpec>,
    pub outputs: Vec<PinSpec>,
    pub parts: Vec<ChipCall>,
}

/// One `PARTS` entry: an instantiation of another gate, wired by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipCall {
    pub name: String,
    pub arguments: Vec<Argument>,
}

/// A single `name = pinRef` binding inside a part's argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub value: PinRef,
}
