//! The built-in gate registry (C3): a name-keyed table of `GateClass`
//! records, each pairing an immutable [`GateSpec`] with a constructor for a
//! fresh [`GateInstance`]. Built once per `Registry` value (never a global
//! table), so tests and recursive directory loading can each hold their own.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use n2t_hdl_core::{PinSpec, Word};

use crate::builtins;
use crate::instance::GateInstance;
use crate::spec::{GateSpec, Row};

/// Cap (in total input bits) below which [`Registry::with_builtins`]
/// exhaustively enumerates a combinational gate's truth table; above it, a
/// curated sample of rows is recorded instead. Configurable per spec §4.3 —
/// not a baked-in constant.
pub const DEFAULT_TRUTH_TABLE_BIT_CAP: u32 = 8;

type Constructor = Box<dyn Fn() -> Box<dyn GateInstance>>;

/// An entry in the registry: a gate's spec plus how to build a fresh,
/// zeroed instance of it. Held behind `Rc` so a linked composite can keep
/// its own reference to each part's class without borrowing the `Registry`
/// it was linked against — the core is single-threaded, so `Rc` (not `Arc`)
/// is the right shared-ownership tool here.
pub struct GateClass {
    pub spec: GateSpec,
    ctor: Constructor,
}

impl fmt::Debug for GateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateClass").field("spec", &self.spec).finish_non_exhaustive()
    }
}

impl GateClass {
    pub fn new(spec: GateSpec, ctor: impl Fn() -> Box<dyn GateInstance> + 'static) -> Self {
        Self { spec, ctor: Box::new(ctor) }
    }

    /// Builds a fresh, zeroed instance from this class.
    pub fn instantiate(&self) -> Box<dyn GateInstance> {
        (self.ctor)()
    }
}

/// A table of gate classes, keyed by case-sensitive PascalCase name. The
/// default table ([`Registry::with_builtins`]) holds every gate named in
/// the design; [`Registry::register`] lets a caller (typically the linker,
/// recursively resolving a directory of `.hdl` files) add more.
#[derive(Default)]
pub struct Registry {
    classes: BTreeMap<String, Rc<GateClass>>,
    truth_table_bit_cap: u32,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("classes", &self.classes.keys().collect::<Vec<_>>()).finish()
    }
}

impl Registry {
    /// An empty registry with the default truth-table enumeration cap.
    pub fn new() -> Self {
        Self { classes: BTreeMap::new(), truth_table_bit_cap: DEFAULT_TRUTH_TABLE_BIT_CAP }
    }

    /// An empty registry with a caller-chosen truth-table enumeration cap.
    pub fn with_truth_table_bit_cap(cap: u32) -> Self {
        Self { classes: BTreeMap::new(), truth_table_bit_cap: cap }
    }

    /// A registry pre-populated with every built-in named in the design,
    /// combinational truth tables precomputed up to this registry's bit cap.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Adds a gate class, overwriting any existing entry of the same name.
    /// Used both to seed the built-ins and by the linker to register a
    /// successfully linked chip so later parts in a directory can reference
    /// it by name (§4.7 point 2).
    pub fn register(&mut self, name: impl Into<String>, class: GateClass) {
        self.classes.insert(name.into(), Rc::new(class));
    }

    /// Looks up a gate class by name. Returns an `Rc` clone so a caller
    /// (typically the linker) can hold onto the class independently of
    /// this registry's lifetime.
    pub fn get(&self, name: &str) -> Option<Rc<GateClass>> {
        self.classes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn list(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }

    fn register_builtins(&mut self) {
        macro_rules! combinational {
            ($name:expr, $ty:ty, $ins:expr, $outs:expr, $description:expr) => {{
                let mut spec = GateSpec::new($name, $description, $ins, $outs);
                let ctor: Constructor = Box::new(|| Box::new(<$ty>::new()));
                spec.truth_table = Some(enumerate_truth_table(&spec, &ctor, self.truth_table_bit_cap));
                self.register($name, GateClass::new(spec, move || Box::new(<$ty>::new())));
            }};
        }

        macro_rules! sequential {
            ($name:expr, $ty:ty, $ins:expr, $outs:expr, $description:expr) => {{
                let spec = GateSpec::new($name, $description, $ins, $outs);
                self.register($name, GateClass::new(spec, || Box::new(<$ty>::new())));
            }};
        }

        fn p(name: &str, size: u32) -> PinSpec {
            PinSpec::new(name, size)
        }

        combinational!("Nand", builtins::Nand, vec![p("a", 1), p("b", 1)], vec![p("out", 1)], "NAND of two 1-bit inputs.");
        combinational!("And", builtins::And, vec![p("a", 1), p("b", 1)], vec![p("out", 1)], "AND of two 1-bit inputs.");
        combinational!("Or", builtins::Or, vec![p("a", 1), p("b", 1)], vec![p("out", 1)], "OR of two 1-bit inputs.");
        combinational!("Not", builtins::Not, vec![p("in", 1)], vec![p("out", 1)], "Negation of a 1-bit input.");
        combinational!("Xor", builtins::Xor, vec![p("a", 1), p("b", 1)], vec![p("out", 1)], "XOR of two 1-bit inputs.");
        combinational!(
            "Mux", builtins::Mux,
            vec![p("a", 1), p("b", 1), p("sel", 1)], vec![p("out", 1)],
            "1-bit multiplexer."
        );
        combinational!(
            "DMux", builtins::DMux,
            vec![p("in", 1), p("sel", 1)], vec![p("a", 1), p("b", 1)],
            "1-bit demultiplexer."
        );
        combinational!(
            "And16", builtins::And16,
            vec![p("a", 16), p("b", 16)], vec![p("out", 16)],
            "Bitwise AND of two 16-bit buses."
        );
        combinational!(
            "Or16", builtins::Or16,
            vec![p("a", 16), p("b", 16)], vec![p("out", 16)],
            "Bitwise OR of two 16-bit buses."
        );
        combinational!(
            "Not16", builtins::Not16,
            vec![p("in", 16)], vec![p("out", 16)],
            "Bitwise negation of a 16-bit bus."
        );
        combinational!(
            "Mux16", builtins::Mux16,
            vec![p("a", 16), p("b", 16), p("sel", 1)], vec![p("out", 16)],
            "16-bit multiplexer."
        );
        combinational!(
            "Or8Way", builtins::Or8Way,
            vec![p("in", 8)], vec![p("out", 1)],
            "OR-reduction of 8 input bits."
        );
        combinational!(
            "Mux4Way16", builtins::Mux4Way16,
            vec![p("a", 16), p("b", 16), p("c", 16), p("d", 16), p("sel", 2)], vec![p("out", 16)],
            "4-way 16-bit multiplexer, sel LSB-first."
        );
        combinational!(
            "Mux8Way16", builtins::Mux8Way16,
            vec![
                p("a", 16), p("b", 16), p("c", 16), p("d", 16),
                p("e", 16), p("f", 16), p("g", 16), p("h", 16), p("sel", 3)
            ],
            vec![p("out", 16)],
            "8-way 16-bit multiplexer, sel LSB-first."
        );
        combinational!(
            "DMux4Way", builtins::DMux4Way,
            vec![p("in", 1), p("sel", 2)], vec![p("a", 1), p("b", 1), p("c", 1), p("d", 1)],
            "4-way 1-bit demultiplexer, sel LSB-first."
        );
        combinational!(
            "DMux8Way", builtins::DMux8Way,
            vec![p("in", 1), p("sel", 3)],
            vec![p("a", 1), p("b", 1), p("c", 1), p("d", 1), p("e", 1), p("f", 1), p("g", 1), p("h", 1)],
            "8-way 1-bit demultiplexer, sel LSB-first."
        );
        combinational!(
            "HalfAdder", builtins::HalfAdder,
            vec![p("a", 1), p("b", 1)], vec![p("sum", 1), p("carry", 1)],
            "Sum and carry of two bits."
        );
        combinational!(
            "FullAdder", builtins::FullAdder,
            vec![p("a", 1), p("b", 1), p("c", 1)], vec![p("sum", 1), p("carry", 1)],
            "Sum and carry of three bits."
        );
        combinational!(
            "Add16", builtins::Add16,
            vec![p("a", 16), p("b", 16)], vec![p("out", 16)],
            "16-bit addition, reduced modulo 2^16."
        );
        combinational!(
            "Inc16", builtins::Inc16,
            vec![p("in", 16)], vec![p("out", 16)],
            "16-bit increment, reduced modulo 2^16."
        );
        combinational!(
            "ALU", builtins::Alu,
            vec![
                p("x", 16), p("y", 16), p("zx", 1), p("nx", 1),
                p("zy", 1), p("ny", 1), p("f", 1), p("no", 1)
            ],
            vec![p("out", 16), p("zr", 1), p("ng", 1)],
            "The Hack arithmetic logic unit."
        );

        sequential!(
            "DFF", builtins::Dff,
            vec![p("in", 1)], vec![p("out", 1)],
            "Data flip-flop: the base clocked primitive."
        );
        sequential!(
            "Bit", builtins::Bit,
            vec![p("in", 1), p("load", 1)], vec![p("out", 1)],
            "A single load-gated bit of state."
        );
        sequential!(
            "Register", builtins::Register,
            vec![p("in", 16), p("load", 1)], vec![p("out", 16)],
            "16 load-gated bits of state."
        );
        sequential!(
            "ARegister", builtins::ARegister,
            vec![p("in", 16), p("load", 1)], vec![p("out", 16)],
            "The Hack address register."
        );
        sequential!(
            "DRegister", builtins::DRegister,
            vec![p("in", 16), p("load", 1)], vec![p("out", 16)],
            "The Hack data register."
        );
        sequential!(
            "PC", builtins::Pc,
            vec![p("in", 16), p("load", 1), p("inc", 1), p("reset", 1)], vec![p("out", 16)],
            "16-bit program counter: reset > load > inc > hold."
        );
        sequential!(
            "RAM8", builtins::Ram8,
            vec![p("in", 16), p("load", 1), p("address", 3)], vec![p("out", 16)],
            "8-word random access memory."
        );
        sequential!(
            "RAM64", builtins::Ram64,
            vec![p("in", 16), p("load", 1), p("address", 6)], vec![p("out", 16)],
            "64-word random access memory."
        );
        sequential!(
            "RAM512", builtins::Ram512,
            vec![p("in", 16), p("load", 1), p("address", 9)], vec![p("out", 16)],
            "512-word random access memory."
        );
        sequential!(
            "RAM4K", builtins::Ram4k,
            vec![p("in", 16), p("load", 1), p("address", 12)], vec![p("out", 16)],
            "4K-word random access memory."
        );
        sequential!(
            "RAM16K", builtins::Ram16k,
            vec![p("in", 16), p("load", 1), p("address", 14)], vec![p("out", 16)],
            "16K-word random access memory."
        );
        sequential!(
            "ROM32K", builtins::Rom32k,
            vec![p("address", 15)], vec![p("out", 16)],
            "32K-word read-only memory."
        );
        sequential!(
            "Screen", builtins::Screen,
            vec![p("in", 16), p("load", 1), p("address", 13)], vec![p("out", 16)],
            "8K-word memory-mapped screen buffer."
        );
        sequential!(
            "Keyboard", builtins::Keyboard,
            vec![], vec![p("out", 16)],
            "Read-only memory-mapped keyboard register."
        );
        sequential!(
            "CPU", builtins::Cpu,
            vec![p("inM", 16), p("instruction", 16), p("reset", 1)],
            vec![p("outM", 16), p("writeM", 1), p("addressM", 15), p("pc", 15)],
            "The Hack central processing unit."
        );
        sequential!(
            "Memory", builtins::Memory,
            vec![p("in", 16), p("load", 1), p("address", 15)], vec![p("out", 16)],
            "Address-decoded RAM/Screen/Keyboard."
        );
        sequential!(
            "Computer", builtins::Computer,
            vec![p("reset", 1)], vec![],
            "The whole Hack platform."
        );
    }
}

/// Exhaustively enumerates every input combination when the gate's total
/// input width is within `cap`; otherwise records a small curated sample of
/// representative rows (all-zero, all-one, alternating, and one-hot
/// patterns per input pin) rather than every combination.
fn enumerate_truth_table(spec: &GateSpec, ctor: &Constructor, cap: u32) -> Vec<Row> {
    let total_bits = spec.total_input_bits();
    if total_bits == 0 {
        return Vec::new();
    }
    if total_bits <= cap {
        let mut rows = Vec::with_capacity(1usize << total_bits);
        for combo in 0u32..(1u32 << total_bits) {
            rows.push(run_row(spec, ctor, combo));
        }
        rows
    } else {
        let mask = if total_bits >= 32 { u32::MAX } else { (1u32 << total_bits) - 1 };
        let mut combos = vec![0u32, mask, 0x5555_5555 & mask, 0xAAAA_AAAA & mask];
        for bit in 0..total_bits.min(8) {
            combos.push(1u32 << bit);
        }
        combos.dedup();
        combos.into_iter().map(|combo| run_row(spec, ctor, combo)).collect()
    }
}

/// Drives one combination of input bits (packed LSB-first across the
/// declared input pins in order) through a fresh instance and reads back
/// every declared input and output, per the `truthTable` row shape in §3.
fn run_row(spec: &GateSpec, ctor: &Constructor, combo: u32) -> Row {
    let mut instance = ctor();
    let mut shift = 0u32;
    for pin in &spec.input_pins {
        let width = pin.size.max(1);
        let mask = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
        let value = if shift >= 32 { 0 } else { (combo >> shift) & mask };
        instance.input_pins_mut().set(&pin.name, Word::new(value));
        shift += width;
    }
    instance.evaluate();

    let mut row = Row::new();
    for pin in &spec.input_pins {
        row.insert(pin.name.clone(), instance.input_pins().get(&pin.name));
    }
    for pin in &spec.output_pins {
        row.insert(pin.name.clone(), instance.output_pins().get(&pin.name));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_builtins_lists_every_required_gate() {
        let registry = Registry::with_builtins();
        for name in [
            "Nand", "And", "Or", "Not", "Xor", "Mux", "DMux", "And16", "Or16", "Not16", "Mux16", "Or8Way",
            "Mux4Way16", "Mux8Way16", "DMux4Way", "DMux8Way", "HalfAdder", "FullAdder", "Add16", "Inc16", "ALU",
            "DFF", "Bit", "Register", "ARegister", "DRegister", "PC", "RAM8", "RAM64", "RAM512", "RAM4K",
            "RAM16K", "ROM32K", "Screen", "Keyboard", "CPU", "Memory", "Computer",
        ] {
            assert!(registry.contains(name), "missing builtin gate {name}");
        }
    }

    #[test]
    fn nand_truth_table_has_exactly_four_rows() {
        let registry = Registry::with_builtins();
        let nand = registry.get("Nand").unwrap();
        let table = nand.spec.truth_table.as_ref().unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn or8way_truth_table_is_exhaustive_at_the_default_cap() {
        let registry = Registry::with_builtins();
        let gate = registry.get("Or8Way").unwrap();
        let table = gate.spec.truth_table.as_ref().unwrap();
        assert_eq!(table.len(), 256);
    }

    #[test]
    fn alu_truth_table_is_a_curated_sample_not_exhaustive() {
        let registry = Registry::with_builtins();
        let alu = registry.get("ALU").unwrap();
        let table = alu.spec.truth_table.as_ref().unwrap();
        assert!(table.len() < 32, "ALU has far more than 2^8 input combinations");
        assert!(!table.is_empty());
    }

    #[test]
    fn sequential_gates_have_no_precomputed_truth_table() {
        let registry = Registry::with_builtins();
        let dff = registry.get("DFF").unwrap();
        assert!(dff.spec.truth_table.is_none());
    }

    #[test]
    fn register_overrides_lets_a_linked_chip_join_the_table() {
        let mut registry = Registry::new();
        let spec = GateSpec::new("MyChip", "a linked composite", vec![], vec![]);
        registry.register("MyChip", GateClass::new(spec, || Box::new(builtins::Nand::new())));
        assert!(registry.contains("MyChip"));
    }
}
