//! Built-in (primitive) gate implementations (C3 + C4): the fixed set of
//! combinational and sequential gates named in the design, plus the three
//! canonical composites (`CPU`, `Memory`, `Computer`) whose reference
//! behavior is specified directly in terms of the others rather than via
//! HDL text.

mod combinational;
mod composite;
mod sequential;

pub use combinational::*;
pub use composite::*;
pub use sequential::*;

/// Wires up the `GateInstance` pin-bank boilerplate every built-in shares
/// (`inputs: PinBank` / `outputs: PinBank` fields), forwarding `evaluate()`
/// to an inherent `eval(&mut self)` method defined on the gate itself.
macro_rules! impl_combinational_gate {
    ($ty:ty) => {
        impl crate::instance::GateInstance for $ty {
            fn input_pins(&self) -> &crate::instance::PinBank {
                &self.inputs
            }

            fn input_pins_mut(&mut self) -> &mut crate::instance::PinBank {
                &mut self.inputs
            }

            fn output_pins(&self) -> &crate::instance::PinBank {
                &self.outputs
            }

            fn output_pins_mut(&mut self) -> &mut crate::instance::PinBank {
                &mut self.outputs
            }

            fn evaluate(&mut self) {
                self.eval();
            }
        }
    };
}

/// As [`impl_combinational_gate`], but also marks the gate sequential and
/// forwards `clock_up`/`clock_down` to inherent `up`/`down` methods.
macro_rules! impl_sequential_gate {
    ($ty:ty) => {
        impl crate::instance::GateInstance for $ty {
            fn input_pins(&self) -> &crate::instance::PinBank {
                &self.inputs
            }

            fn input_pins_mut(&mut self) -> &mut crate::instance::PinBank {
                &mut self.inputs
            }

            fn output_pins(&self) -> &crate::instance::PinBank {
                &self.outputs
            }

            fn output_pins_mut(&mut self) -> &mut crate::instance::PinBank {
                &mut self.outputs
            }

            fn evaluate(&mut self) {
                // Sequential outputs only change on clock_down; evaluate()
                // between edges is a no-op read of the already-committed
                // output pins.
            }

            fn is_sequential(&self) -> bool {
                true
            }

            fn clock_up(&mut self) -> Result<(), crate::errors::ClockPhaseViolation> {
                self.up()
            }

            fn clock_down(&mut self) -> Result<(), crate::errors::ClockPhaseViolation> {
                self.down()
            }
        }
    };
}

pub(crate) use impl_combinational_gate;
pub(crate) use impl_sequential_gate;
