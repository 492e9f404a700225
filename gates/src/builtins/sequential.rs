//! Sequential built-ins (C4): split into `up` (rising-edge sample into
//! shadow state) and `down` (falling-edge commit to outputs), wired up by
//! [`super::impl_sequential_gate`].

use n2t_hdl_core::{PinSpec, Word};

use super::impl_sequential_gate;
use crate::errors::ClockPhaseViolation;
use crate::instance::{PhaseGuard, PinBank};

// DFF
// ================================================================================================

/// The single clocked primitive every other sequential gate is built from:
/// on tick-up, latches `in` into shadow state; on tick-down, commits the
/// shadow value to `out`.
#[derive(Debug)]
pub struct Dff {
    inputs: PinBank,
    outputs: PinBank,
    shadow: Word,
    phase: PhaseGuard,
}

impl Dff {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("in", 1)]),
            outputs: PinBank::new([PinSpec::new("out", 1)]),
            shadow: Word::ZERO,
            phase: PhaseGuard::new(),
        }
    }

    fn up(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_up()?;
        self.shadow = self.inputs.get("in");
        Ok(())
    }

    fn down(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_down()?;
        self.outputs.set("out", self.shadow);
        Ok(())
    }
}

impl_sequential_gate!(Dff);

// BIT / REGISTER
// ================================================================================================

/// A single `load`-gated bit of state: `DFF` in front of a `Mux` selecting
/// between the held value and the new input.
#[derive(Debug)]
pub struct Bit {
    inputs: PinBank,
    outputs: PinBank,
    shadow: Word,
    phase: PhaseGuard,
}

impl Bit {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("in", 1), PinSpec::new("load", 1)]),
            outputs: PinBank::new([PinSpec::new("out", 1)]),
            shadow: Word::ZERO,
            phase: PhaseGuard::new(),
        }
    }

    fn up(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_up()?;
        if self.inputs.get("load").bit(0) {
            self.shadow = self.inputs.get("in");
        }
        Ok(())
    }

    fn down(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_down()?;
        self.outputs.set("out", self.shadow);
        Ok(())
    }
}

impl_sequential_gate!(Bit);

/// 16 `Bit`s sharing one `load` line.
#[derive(Debug)]
pub struct Register {
    inputs: PinBank,
    outputs: PinBank,
    shadow: Word,
    phase: PhaseGuard,
}

impl Register {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("in", 16), PinSpec::new("load", 1)]),
            outputs: PinBank::new([PinSpec::new("out", 16)]),
            shadow: Word::ZERO,
            phase: PhaseGuard::new(),
        }
    }

    fn up(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_up()?;
        if self.inputs.get("load").bit(0) {
            self.shadow = self.inputs.get("in");
        }
        Ok(())
    }

    fn down(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_down()?;
        self.outputs.set("out", self.shadow);
        Ok(())
    }
}

impl_sequential_gate!(Register);

/// `ARegister`/`DRegister` are plain 16-bit `Register`s under Hack-specific
/// names; kept as distinct types so the registry lists them under their
/// canonical gate names.
pub type ARegister = Register;
pub type DRegister = Register;

// PC
// ================================================================================================

/// 16-bit counter: `reset` beats `load` beats `inc` beats hold.
#[derive(Debug)]
pub struct Pc {
    inputs: PinBank,
    outputs: PinBank,
    shadow: Word,
    phase: PhaseGuard,
}

impl Pc {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([
                PinSpec::new("in", 16),
                PinSpec::new("load", 1),
                PinSpec::new("inc", 1),
                PinSpec::new("reset", 1),
            ]),
            outputs: PinBank::new([PinSpec::new("out", 16)]),
            shadow: Word::ZERO,
            phase: PhaseGuard::new(),
        }
    }

    fn up(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_up()?;
        self.shadow = if self.inputs.get("reset").bit(0) {
            Word::ZERO
        } else if self.inputs.get("load").bit(0) {
            self.inputs.get("in")
        } else if self.inputs.get("inc").bit(0) {
            self.shadow + Word::from_bits(1)
        } else {
            self.shadow
        };
        Ok(())
    }

    fn down(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_down()?;
        self.outputs.set("out", self.shadow);
        Ok(())
    }
}

impl_sequential_gate!(Pc);

// RAM
// ================================================================================================

/// `out` reads the cell at `address` asynchronously; on tick-up, if `load`
/// is set, the cell at `address` is staged for write; on tick-down the
/// write commits. `address` is `log2(len)` bits wide.
#[derive(Debug)]
pub struct Ram {
    inputs: PinBank,
    outputs: PinBank,
    cells: Vec<Word>,
    pending_write: Option<(usize, Word)>,
    phase: PhaseGuard,
}

impl Ram {
    pub fn with_len(len: usize) -> Self {
        let addr_bits = len.trailing_zeros();
        Self {
            inputs: PinBank::new([
                PinSpec::new("in", 16),
                PinSpec::new("load", 1),
                PinSpec::new("address", addr_bits),
            ]),
            outputs: PinBank::new([PinSpec::new("out", 16)]),
            cells: vec![Word::ZERO; len],
            pending_write: None,
            phase: PhaseGuard::new(),
        }
    }

    fn address(&self) -> usize {
        self.inputs.get("address").bits() as usize % self.cells.len()
    }

    fn up(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_up()?;
        if self.inputs.get("load").bit(0) {
            self.pending_write = Some((self.address(), self.inputs.get("in")));
        } else {
            self.pending_write = None;
        }
        Ok(())
    }

    fn down(&mut self) -> Result<(), ClockPhaseViolation> {
        self.phase.begin_down()?;
        if let Some((addr, value)) = self.pending_write.take() {
            self.cells[addr] = value;
        }
        self.outputs.set("out", self.cells[self.address()]);
        Ok(())
    }
}

macro_rules! ram_alias {
    ($ty:ident, $len:expr) => {
        #[derive(Debug)]
        pub struct $ty(Ram);

        impl $ty {
            pub fn new() -> Self {
                Self(Ram::with_len($len))
            }
        }

        impl crate::instance::GateInstance for $ty {
            fn input_pins(&self) -> &PinBank {
                self.0.input_pins()
            }

            fn input_pins_mut(&mut self) -> &mut PinBank {
                self.0.input_pins_mut()
            }

            fn output_pins(&self) -> &PinBank {
                self.0.output_pins()
            }

            fn output_pins_mut(&mut self) -> &mut PinBank {
                self.0.output_pins_mut()
            }

            fn evaluate(&mut self) {
                // Reads are asynchronous: refresh `out` from the current
                // address on every combinational pass, not only on ticks.
                let addr = self.0.address();
                self.0.outputs.set("out", self.0.cells[addr]);
            }

            fn is_sequential(&self) -> bool {
                true
            }

            fn clock_up(&mut self) -> Result<(), ClockPhaseViolation> {
                self.0.up()
            }

            fn clock_down(&mut self) -> Result<(), ClockPhaseViolation> {
                self.0.down()
            }
        }
    };
}

ram_alias!(Ram8, 8);
ram_alias!(Ram64, 64);
ram_alias!(Ram512, 512);
ram_alias!(Ram4k, 4096);
ram_alias!(Ram16k, 16384);

/// Read-only memory: behaves like a `Ram` with `load` tied low; content is
/// preloaded via [`Rom32k::load_program`] rather than through the `in` pin.
#[derive(Debug)]
pub struct Rom32k {
    inputs: PinBank,
    outputs: PinBank,
    cells: Vec<Word>,
}

impl Rom32k {
    pub fn new() -> Self {
        Self {
            inputs: PinBank::new([PinSpec::new("address", 15)]),
            outputs: PinBank::new([PinSpec::new("out", 16)]),
            cells: vec![Word::ZERO; 32768],
        }
    }

    pub fn load_program(&mut self, words: &[Word]) {
        for (cell, word) in self.cells.iter_mut().zip(words) {
            *cell = *word;
        }
    }
}

impl crate::instance::GateInstance for Rom32k {
    fn input_pins(&self) -> &PinBank {
        &self.inputs
    }

    fn input_pins_mut(&mut self) -> &mut PinBank {
        &mut self.inputs
    }

    fn output_pins(&self) -> &PinBank {
        &self.outputs
    }

    fn output_pins_mut(&mut self) -> &mut PinBank {
        &mut self.outputs
    }

    fn evaluate(&mut self) {
        let addr = self.inputs.get("address").bits() as usize % self.cells.len();
        self.outputs.set("out", self.cells[addr]);
    }
}

// MEMORY-MAPPED I/O
// ================================================================================================

/// 8K-word memory-mapped screen buffer; reads/writes behave like a `Ram`.
#[derive(Debug)]
pub struct Screen(Ram);

impl Screen {
    pub fn new() -> Self {
        Self(Ram::with_len(8192))
    }

    /// The backing cells, exposed read-only for a CLI collaborator that
    /// wants to render the framebuffer without going through a pin.
    pub fn cells(&self) -> &[Word] {
        &self.0.cells
    }
}

impl crate::instance::GateInstance for Screen {
    fn input_pins(&self) -> &PinBank {
        self.0.input_pins()
    }

    fn input_pins_mut(&mut self) -> &mut PinBank {
        self.0.input_pins_mut()
    }

    fn output_pins(&self) -> &PinBank {
        self.0.output_pins()
    }

    fn output_pins_mut(&mut self) -> &mut PinBank {
        self.0.output_pins_mut()
    }

    fn evaluate(&mut self) {
        let addr = self.0.address();
        self.0.outputs.set("out", self.0.cells[addr]);
    }

    fn is_sequential(&self) -> bool {
        true
    }

    fn clock_up(&mut self) -> Result<(), ClockPhaseViolation> {
        self.0.up()
    }

    fn clock_down(&mut self) -> Result<(), ClockPhaseViolation> {
        self.0.down()
    }
}

/// Single read-only 16-bit register modeling the memory-mapped keyboard;
/// set externally via [`Keyboard::press`], never via the `in` pin.
#[derive(Debug)]
pub struct Keyboard {
    outputs: PinBank,
}

impl Keyboard {
    pub fn new() -> Self {
        Self { outputs: PinBank::new([PinSpec::new("out", 16)]) }
    }

    pub fn press(&mut self, key_code: Word) {
        self.outputs.set("out", key_code);
    }
}

impl crate::instance::GateInstance for Keyboard {
    fn input_pins(&self) -> &PinBank {
        static EMPTY: std::sync::OnceLock<PinBank> = std::sync::OnceLock::new();
        EMPTY.get_or_init(PinBank::default)
    }

    fn input_pins_mut(&mut self) -> &mut PinBank {
        // Keyboard has no writable inputs; the bank is reused only so the
        // trait's shape stays uniform across built-ins.
        unreachable!("Keyboard has no input pins to bind")
    }

    fn output_pins(&self) -> &PinBank {
        &self.outputs
    }

    fn output_pins_mut(&mut self) -> &mut PinBank {
        &mut self.outputs
    }

    fn evaluate(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::GateInstance;

    #[test]
    fn dff_requires_up_before_down() {
        let mut dff = Dff::new();
        assert!(dff.clock_down().is_err());
        assert!(dff.clock_up().is_ok());
        assert!(dff.clock_down().is_ok());
    }

    #[test]
    fn register_holds_value_across_ticks_when_load_is_low() {
        let mut reg = Register::new();
        reg.input_pins_mut().set("in", Word::from_bits(0xBEEF));
        reg.input_pins_mut().set("load", Word::from(true));
        reg.clock_up().unwrap();
        reg.clock_down().unwrap();
        assert_eq!(reg.output_pins().get("out"), Word::from_bits(0xBEEF));

        reg.input_pins_mut().set("in", Word::from_bits(0x1234));
        reg.input_pins_mut().set("load", Word::from(false));
        reg.clock_up().unwrap();
        reg.clock_down().unwrap();
        assert_eq!(reg.output_pins().get("out"), Word::from_bits(0xBEEF));
    }

    #[test]
    fn pc_priority_is_reset_then_load_then_inc() {
        let mut pc = Pc::new();
        pc.input_pins_mut().set("in", Word::from_bits(42));
        pc.input_pins_mut().set("load", Word::from(true));
        pc.input_pins_mut().set("reset", Word::from(true));
        pc.clock_up().unwrap();
        pc.clock_down().unwrap();
        assert_eq!(pc.output_pins().get("out"), Word::ZERO, "reset beats load");
    }

    #[test]
    fn ram_write_is_visible_only_after_clock_down() {
        let mut ram = Ram8::new();
        ram.input_pins_mut().set("address", Word::from_bits(3));
        ram.input_pins_mut().set("in", Word::from_bits(99));
        ram.input_pins_mut().set("load", Word::from(true));
        ram.clock_up().unwrap();
        ram.evaluate();
        assert_eq!(ram.output_pins().get("out"), Word::ZERO, "write not yet committed");
        ram.clock_down().unwrap();
        ram.evaluate();
        assert_eq!(ram.output_pins().get("out"), Word::from_bits(99));
    }
}
