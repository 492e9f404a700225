//! Pin and sub-bus model (C2): pin identity, declared bit width, and the
//! tagged `PinRef` algebra used everywhere a chip or part argument names a
//! signal.

use crate::word::Word;

/// Declares a named pin and its bit width. `size` defaults to 1 when a chip
/// header omits it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinSpec {
    pub name: String,
    pub size: u32,
}

impl PinSpec {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self { name: name.into(), size }
    }
}

/// A reference to a signal in argument position: the whole pin, a sub-bus
/// slice, or a widened constant literal. Slices and constants are
/// first-class here rather than encoded as strings, so every consumer
/// (parser, linker, evaluator) shares one width-checked representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinRef {
    /// The whole named pin.
    Simple(String),
    /// Bits `[from, to]` (inclusive) of the named pin.
    Slice { name: String, from: u32, to: u32 },
    /// The literal `true`/`false`, widened to the target width at bind time.
    Constant(bool),
}

impl PinRef {
    /// The pin name this reference reads from, if any (constants have none).
    pub fn name(&self) -> Option<&str> {
        match self {
            PinRef::Simple(name) => Some(name),
            PinRef::Slice { name, .. } => Some(name),
            PinRef::Constant(_) => None,
        }
    }

    /// Bit width implied by the reference alone; `declared_size` is the
    /// width of the named pin and is required to resolve `Simple`.
    pub fn width(&self, declared_size: u32) -> u32 {
        match self {
            PinRef::Simple(_) => declared_size,
            PinRef::Slice { from, to, .. } => to - from + 1,
            PinRef::Constant(_) => 1,
        }
    }

    /// Net-equality: same pin name and, for slices, an identical bit range.
    /// Scope (which composite's namespace a name lives in) is the caller's
    /// responsibility to have already factored in, e.g. by comparing within
    /// one composite's binding table.
    pub fn is_net_equal(&self, other: &PinRef) -> bool {
        match (self, other) {
            (PinRef::Simple(a), PinRef::Simple(b)) => a == b,
            (
                PinRef::Slice { name: an, from: af, to: at },
                PinRef::Slice { name: bn, from: bf, to: bt },
            ) => an == bn && af == bf && at == bt,
            (PinRef::Constant(a), PinRef::Constant(b)) => a == b,
            _ => false,
        }
    }
}

/// A single named signal carrying a value and an optional declared width.
/// Writes go through [`Pin::set_value`], which masks to `size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub spec: PinSpec,
    value: Word,
}

impl Pin {
    pub fn new(spec: PinSpec) -> Self {
        Self { spec, value: Word::ZERO }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn size(&self) -> u32 {
        self.spec.size
    }

    pub fn value(&self) -> Word {
        self.value
    }

    /// Masks `w` to this pin's declared width before storing it.
    pub fn set_value(&mut self, w: Word) {
        let size = self.spec.size;
        self.value = if size >= 16 { w } else { w.slice(0, size.saturating_sub(1)) };
    }

    /// Reads a sub-range of this pin's current value.
    pub fn read_slice(&self, from: u32, to: u32) -> Word {
        self.value.slice(from, to)
    }

    /// Writes a sub-range of this pin's current value, preserving the rest.
    pub fn write_slice(&mut self, from: u32, to: u32, value: Word) {
        self.value = self.value.set_slice(from, to, value);
    }
}
