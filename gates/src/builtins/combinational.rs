//! Combinational built-ins (C4): pure functions of current input values.
//! Each gate owns an input and an output [`PinBank`] and implements
//! `evaluate()` via an inherent `eval` method wired up by
//! [`super::impl_combinational_gate`].

use n2t_hdl_core::{PinSpec, Word};

use super::impl_combinational_gate;
use crate::instance::PinBank;

fn select_index(sel: Word, bits: u32) -> usize {
    (sel.bits() as usize) & ((1usize << bits) - 1)
}

// NAND / NOT / AND / OR / XOR
// ================================================================================================

macro_rules! simple_gate {
    ($ty:ident, $in_names:expr, $out_name:expr, |$args:ident| $body:expr) => {
        #[derive(Debug)]
        pub struct $ty {
            inputs: PinBank,
            outputs: PinBank,
        }

        impl $ty {
            pub fn new() -> Self {
                Self {
                    inputs: PinBank::new($in_names.into_iter().map(|n| PinSpec::new(n, 1))),
                    outputs: PinBank::new([PinSpec::new($out_name, 1)]),
                }
            }

            fn eval(&mut self) {
                let $args: Vec<bool> =
                    $in_names.into_iter().map(|n| self.inputs.get(n).bit(0)).collect();
                let out = $body;
                self.outputs.set($out_name, Word::from(out));
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl_combinational_gate!($ty);
    };
}

simple_gate!(Nand, ["a", "b"], "out", |args| !(args[0] && args[1]));
simple_gate!(Not, ["in"], "out", |args| !args[0]);
simple_gate!(And, ["a", "b"], "out", |args| args[0] && args[1]);
simple_gate!(Or, ["a", "b"], "out", |args| args[0] || args[1]);
simple_gate!(Xor, ["a", "b"], "out", |args| args[0] != args[1]);

// MUX / DMUX
// ================================================================================================

#[derive(Debug)]
pub struct Mux {
    inputs: PinBank,
    outputs: PinBank,
}

impl Mux {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("a", 1), PinSpec::new("b", 1), PinSpec::new("sel", 1)]),
            outputs: PinBank::new([PinSpec::new("out", 1)]),
        }
    }

    fn eval(&mut self) {
        let out = if self.inputs.get("sel").bit(0) {
            self.inputs.get("b")
        } else {
            self.inputs.get("a")
        };
        self.outputs.set("out", out);
    }
}

impl_combinational_gate!(Mux);

#[derive(Debug)]
pub struct DMux {
    inputs: PinBank,
    outputs: PinBank,
}

impl DMux {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("in", 1), PinSpec::new("sel", 1)]),
            outputs: PinBank::new([PinSpec::new("a", 1), PinSpec::new("b", 1)]),
        }
    }

    fn eval(&mut self) {
        let input = self.inputs.get("in");
        if self.inputs.get("sel").bit(0) {
            self.outputs.set("a", Word::ZERO);
            self.outputs.set("b", input);
        } else {
            self.outputs.set("a", input);
            self.outputs.set("b", Word::ZERO);
        }
    }
}

impl_combinational_gate!(DMux);

// 16-BIT WIDE GATES
// ================================================================================================

macro_rules! wide_gate {
    ($ty:ident, $in_names:expr, $out_name:expr, |$args:ident| $body:expr) => {
        #[derive(Debug)]
        pub struct $ty {
            inputs: PinBank,
            outputs: PinBank,
        }

        impl $ty {
            pub fn new() -> Self {
                Self {
                    inputs: PinBank::new($in_names.into_iter().map(|n| PinSpec::new(n, 16))),
                    outputs: PinBank::new([PinSpec::new($out_name, 16)]),
                }
            }

            fn eval(&mut self) {
                let $args: Vec<Word> = $in_names.into_iter().map(|n| self.inputs.get(n)).collect();
                let out: Word = $body;
                self.outputs.set($out_name, out);
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl_combinational_gate!($ty);
    };
}

wide_gate!(And16, ["a", "b"], "out", |args| args[0] & args[1]);
wide_gate!(Or16, ["a", "b"], "out", |args| args[0] | args[1]);
wide_gate!(Not16, ["in"], "out", |args| !args[0]);
wide_gate!(Add16, ["a", "b"], "out", |args| args[0] + args[1]);
wide_gate!(Inc16, ["in"], "out", |args| args[0] + Word::from_bits(1));

#[derive(Debug)]
pub struct Mux16 {
    inputs: PinBank,
    outputs: PinBank,
}

impl Mux16 {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([
                PinSpec::new("a", 16),
                PinSpec::new("b", 16),
                PinSpec::new("sel", 1),
            ]),
            outputs: PinBank::new([PinSpec::new("out", 16)]),
        }
    }

    fn eval(&mut self) {
        let out = if self.inputs.get("sel").bit(0) {
            self.inputs.get("b")
        } else {
            self.inputs.get("a")
        };
        self.outputs.set("out", out);
    }
}

impl_combinational_gate!(Mux16);

// FAN-IN / FAN-OUT GATES
// ================================================================================================

#[derive(Debug)]
pub struct Or8Way {
    inputs: PinBank,
    outputs: PinBank,
}

impl Or8Way {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("in", 8)]),
            outputs: PinBank::new([PinSpec::new("out", 1)]),
        }
    }

    fn eval(&mut self) {
        let in_ = self.inputs.get("in");
        let any = (0..8).any(|i| in_.bit(i));
        self.outputs.set("out", Word::from(any));
    }
}

impl_combinational_gate!(Or8Way);

#[derive(Debug)]
pub struct Mux4Way16 {
    inputs: PinBank,
    outputs: PinBank,
}

impl Mux4Way16 {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([
                PinSpec::new("a", 16),
                PinSpec::new("b", 16),
                PinSpec::new("c", 16),
                PinSpec::new("d", 16),
                PinSpec::new("sel", 2),
            ]),
            outputs: PinBank::new([PinSpec::new("out", 16)]),
        }
    }

    fn eval(&mut self) {
        let names = ["a", "b", "c", "d"];
        let idx = select_index(self.inputs.get("sel"), 2);
        self.outputs.set("out", self.inputs.get(names[idx]));
    }
}

impl_combinational_gate!(Mux4Way16);

#[derive(Debug)]
pub struct Mux8Way16 {
    inputs: PinBank,
    outputs: PinBank,
}

impl Mux8Way16 {
    pub fn new() -> Self {
        let mut specs: Vec<PinSpec> =
            ["a", "b", "c", "d", "e", "f", "g", "h"].iter().map(|n| PinSpec::new(*n, 16)).collect();
        specs.push(PinSpec::new("sel", 3));
        Self { inputs: PinBank::new(specs), outputs: PinBank::new([PinSpec::new("out", 16)]) }
    }

    fn eval(&mut self) {
        let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let idx = select_index(self.inputs.get("sel"), 3);
        self.outputs.set("out", self.inputs.get(names[idx]));
    }
}

impl_combinational_gate!(Mux8Way16);

#[derive(Debug)]
pub struct DMux4Way {
    inputs: PinBank,
    outputs: PinBank,
}

impl DMux4Way {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("in", 1), PinSpec::new("sel", 2)]),
            outputs: PinBank::new(["a", "b", "c", "d"].map(|n| PinSpec::new(n, 1))),
        }
    }

    fn eval(&mut self) {
        let names = ["a", "b", "c", "d"];
        let idx = select_index(self.inputs.get("sel"), 2);
        let input = self.inputs.get("in");
        for (i, name) in names.iter().enumerate() {
            self.outputs.set(name, if i == idx { input } else { Word::ZERO });
        }
    }
}

impl_combinational_gate!(DMux4Way);

#[derive(Debug)]
pub struct DMux8Way {
    inputs: PinBank,
    outputs: PinBank,
}

impl DMux8Way {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("in", 1), PinSpec::new("sel", 3)]),
            outputs: PinBank::new(["a", "b", "c", "d", "e", "f", "g", "h"].map(|n| PinSpec::new(n, 1))),
        }
    }

    fn eval(&mut self) {
        let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let idx = select_index(self.inputs.get("sel"), 3);
        let input = self.inputs.get("in");
        for (i, name) in names.iter().enumerate() {
            self.outputs.set(name, if i == idx { input } else { Word::ZERO });
        }
    }
}

impl_combinational_gate!(DMux8Way);

// ARITHMETIC: ADDERS AND THE ALU
// ================================================================================================

#[derive(Debug)]
pub struct HalfAdder {
    inputs: PinBank,
    outputs: PinBank,
}

impl HalfAdder {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("a", 1), PinSpec::new("b", 1)]),
            outputs: PinBank::new([PinSpec::new("sum", 1), PinSpec::new("carry", 1)]),
        }
    }

    fn eval(&mut self) {
        let a = self.inputs.get("a").bit(0);
        let b = self.inputs.get("b").bit(0);
        self.outputs.set("sum", Word::from(a != b));
        self.outputs.set("carry", Word::from(a && b));
    }
}

impl_combinational_gate!(HalfAdder);

#[derive(Debug)]
pub struct FullAdder {
    inputs: PinBank,
    outputs: PinBank,
}

impl FullAdder {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("a", 1), PinSpec::new("b", 1), PinSpec::new("c", 1)]),
            outputs: PinBank::new([PinSpec::new("sum", 1), PinSpec::new("carry", 1)]),
        }
    }

    fn eval(&mut self) {
        let a = self.inputs.get("a").bit(0);
        let b = self.inputs.get("b").bit(0);
        let c = self.inputs.get("c").bit(0);
        let sum = a ^ b ^ c;
        let carry = (a && b) || (b && c) || (a && c);
        self.outputs.set("sum", Word::from(sum));
        self.outputs.set("carry", Word::from(carry));
    }
}

impl_combinational_gate!(FullAdder);

/// The Hack ALU: `zx`/`nx` zero/negate `x`, `zy`/`ny` the same for `y`,
/// `f` selects `x + y` (1) or `x & y` (0), `no` negates the result. `zr`
/// and `ng` report whether the output is zero or negative (two's
/// complement) respectively.
#[derive(Debug)]
pub struct Alu {
    inputs: PinBank,
    outputs: PinBank,
}

impl Alu {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([
                PinSpec::new("x", 16),
                PinSpec::new("y", 16),
                PinSpec::new("zx", 1),
                PinSpec::new("nx", 1),
                PinSpec::new("zy", 1),
                PinSpec::new("ny", 1),
                PinSpec::new("f", 1),
                PinSpec::new("no", 1),
            ]),
            outputs: PinBank::new([PinSpec::new("out", 16), PinSpec::new("zr", 1), PinSpec::new("ng", 1)]),
        }
    }

    fn eval(&mut self) {
        let mut x = self.inputs.get("x");
        let mut y = self.inputs.get("y");
        if self.inputs.get("zx").bit(0) {
            x = Word::ZERO;
        }
        if self.inputs.get("nx").bit(0) {
            x = !x;
        }
        if self.inputs.get("zy").bit(0) {
            y = Word::ZERO;
        }
        if self.inputs.get("ny").bit(0) {
            y = !y;
        }
        let mut out = if self.inputs.get("f").bit(0) { x + y } else { x & y };
        if self.inputs.get("no").bit(0) {
            out = !out;
        }
        self.outputs.set("out", out);
        self.outputs.set("zr", Word::from(out.is_zero()));
        self.outputs.set("ng", Word::from(out.as_signed() < 0));
    }
}

impl_combinational_gate!(Alu);

#[cfg(test)]
mod tests {
    use n2t_hdl_core::Word;

    use super::*;
    use crate::instance::GateInstance;

    #[test]
    fn mux_selects_b_when_sel_high() {
        let mut mux = Mux::new();
        mux.input_pins_mut().set("a", Word::from(true));
        mux.input_pins_mut().set("b", Word::from(false));
        mux.input_pins_mut().set("sel", Word::from(true));
        mux.evaluate();
        assert_eq!(mux.output_pins().get("out"), Word::from(false));
    }

    #[test]
    fn alu_zero_negate_add_matches_canonical_constant_one() {
        let mut alu = Alu::new();
        alu.input_pins_mut().set("x", Word::from_bits(0xFFFF));
        alu.input_pins_mut().set("y", Word::from_bits(0x0001));
        for (name, v) in [("zx", false), ("nx", false), ("zy", false), ("ny", false), ("f", true), ("no", false)] {
            alu.input_pins_mut().set(name, Word::from(v));
        }
        alu.evaluate();
        assert_eq!(alu.output_pins().get("out"), Word::ZERO);
        assert_eq!(alu.output_pins().get("zr"), Word::from(true));
        assert_eq!(alu.output_pins().get("ng"), Word::from(false));

        for (name, v) in [("zx", true), ("nx", true), ("zy", true), ("ny", true), ("f", true), ("no", true)] {
            alu.input_pins_mut().set(name, Word::from(v));
        }
        alu.evaluate();
        assert_eq!(alu.output_pins().get("out"), Word::from_bits(1));
        assert_eq!(alu.output_pins().get("zr"), Word::from(false));
        assert_eq!(alu.output_pins().get("ng"), Word::from(false));
    }

    #[test]
    fn mux4way16_decodes_sel_lsb_first() {
        let mut mux = Mux4Way16::new();
        mux.input_pins_mut().set("a", Word::from_bits(1));
        mux.input_pins_mut().set("b", Word::from_bits(2));
        mux.input_pins_mut().set("c", Word::from_bits(3));
        mux.input_pins_mut().set("d", Word::from_bits(4));
        mux.input_pins_mut().set("sel", Word::from_bits(0b10));
        mux.evaluate();
        assert_eq!(mux.output_pins().get("out"), Word::from_bits(3));
    }

    #[test]
    fn dmux8way_routes_input_to_selected_output_only() {
        let mut dmux = DMux8Way::new();
        dmux.input_pins_mut().set("in", Word::from(true));
        dmux.input_pins_mut().set("sel", Word::from_bits(5));
        dmux.evaluate();
        assert_eq!(dmux.output_pins().get("f"), Word::from(true));
        assert_eq!(dmux.output_pins().get("a"), Word::from(false));
    }
}
