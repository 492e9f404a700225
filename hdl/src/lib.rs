//! Facade crate for the Nand2Tetris HDL toolkit: re-exports the
//! programmatic API a CLI (or any other driver) needs, so a consumer can
//! depend on one crate instead of five (§6).
//!
//! ```text
//! parse(text) -> Chip | ParseError
//! link(&chip, &mut registry, &loader) -> Composite | LinkError
//! registry.get(name) -> Option<GateClass>; registry.list() -> [&str]
//! gate_class.instantiate() -> Box<dyn GateInstance>
//! instance.evaluate(); eval::exec_on_data(&mut instance, rows) -> ExecResult
//! instance.input_pins_mut().set(name, value); instance.input_pins().get(name)
//! SystemClock::shared().{set_rate, rate, tick, reset}
//! eval::print_truth_table(&table, &format) -> Vec<String>
//! ```

pub use n2t_hdl_core::{InvalidLiteral, Pin, PinRef, PinSpec, Radix, Word};
pub use n2t_hdl_eval::{
    exec_on_data, print_truth_table, step, tick, Cell, DataRow, EvalError, ExecResult, Mismatch, Row, RowConflict,
    TruthTableFormat,
};
pub use n2t_hdl_gates::{
    Clock, ClockPhaseViolation, GateBuildError, GateClass, GateInstance, GateSpec, Half, PhaseGuard, PinBank,
    Registry, SharedSystemClock, SystemClock, DEFAULT_TRUTH_TABLE_BIT_CAP,
};
pub use n2t_hdl_linker::{
    link, link_chip, ArgBinding, ChipLoader, CombinationalLoop, Composite, CompositeInstance, Conflict,
    FsChipLoader, LinkError, MapChipLoader, NullChipLoader, PartPlan, PinNotDeclared, Signal, UnknownGate,
};
pub use n2t_hdl_syntax::{parse, Argument, Chip, ChipCall, ParseError};

/// Links `text` against a registry pre-populated with every built-in gate
/// and a caller-supplied loader, returning a runnable instance of the top
/// chip it defines. Convenience wrapper over `parse` + `link` +
/// `CompositeInstance::new` for the common "compile one file" case.
pub fn compile(text: &str, loader: &dyn ChipLoader) -> Result<CompositeInstance, CompileError> {
    let chip = parse(text)?;
    let mut registry = Registry::with_builtins();
    let composite = link(&chip, &mut registry, loader)?;
    Ok(CompositeInstance::new(composite))
}

/// The union of everything that can go wrong compiling one chip end to end.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Link(#[from] LinkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_evaluates_a_simple_chip() {
        let source = r#"
            CHIP Pass {
                IN a;
                OUT out;
                PARTS:
                Not(in=a, out=mid);
                Not(in=mid, out=out);
            }
        "#;
        let mut instance = compile(source, &NullChipLoader).expect("should compile");
        instance.input_pins_mut().set("a", Word::from_bits(1));
        instance.evaluate();
        assert_eq!(instance.output_pins().get("out"), Word::from_bits(1));
    }

    #[test]
    fn an_unknown_gate_surfaces_as_a_link_error() {
        let source = r#"
            CHIP Bad {
                IN a;
                OUT out;
                PARTS:
                NoSuchGate(in=a, out=out);
            }
        "#;
        let result = compile(source, &NullChipLoader);
        assert!(matches!(result, Err(CompileError::Link(_))));
    }
}
