//! Drives a [`CompositeInstance`] over stimulus data and across clock edges
//! (§4.8). `exec_on_data` is implemented in terms of repeated [`step`]
//! calls, per the design notes' "eager vs lazy" resolution: the iterator
//! style is the primitive, the batch style is sugar over it.

use n2t_hdl_gates::{Clock, GateInstance, Half};
use n2t_hdl_linker::CompositeInstance;

use crate::data::{Cell, DataRow, ExecResult, Mismatch, Row, RowConflict, StepOutput};

/// Assigns one row's `Value` cells to the composite's input pins,
/// evaluates, and reads back every declared input and output pin plus any
/// `Expected` mismatches and write conflicts from that single pass.
pub fn step(instance: &mut CompositeInstance, row: &DataRow) -> StepOutput {
    for (pin, cell) in row {
        if let Cell::Value(value) = cell {
            instance.input_pins_mut().set(pin, *value);
        }
    }

    instance.evaluate();

    let mut result: Row = Row::new();
    for pin in instance.blueprint.spec.input_pins.clone() {
        result.insert(pin.name.clone(), instance.input_pins().get(&pin.name));
    }
    for pin in instance.blueprint.spec.output_pins.clone() {
        result.insert(pin.name.clone(), instance.output_pins().get(&pin.name));
    }

    let mut mismatches = Vec::new();
    for (pin, cell) in row {
        if let Cell::Expected(expected) = cell {
            let actual = result.get(pin).copied().unwrap_or(n2t_hdl_core::Word::ZERO);
            if actual != *expected {
                mismatches.push(Mismatch { row: 0, pin: pin.clone(), expected: *expected, actual });
            }
        }
    }

    let conflicts = instance.conflicts().to_vec();
    if !conflicts.is_empty() {
        log::debug!("step produced {} write conflict(s)", conflicts.len());
    }

    StepOutput { result, conflicts, mismatches }
}

/// Runs `rows` through [`step`] in order, accumulating every row's result,
/// conflicts (tagged with the row index), and mismatches.
pub fn exec_on_data(instance: &mut CompositeInstance, rows: &[DataRow]) -> ExecResult {
    let mut out = ExecResult::default();
    for (index, row) in rows.iter().enumerate() {
        let step_output = step(instance, row);
        out.result.push(step_output.result);
        out.conflicts.extend(step_output.conflicts.into_iter().map(|c| RowConflict {
            row: index,
            pin: c.pin,
            writers: c.writers,
        }));
        out.mismatches.extend(step_output.mismatches.into_iter().map(|m| Mismatch { row: index, ..m }));
    }
    out
}

/// Advances `clock` one half-phase, delivers the corresponding `clockUp`/
/// `clockDown` call to every sequential primitive nested inside `instance`
/// (recursively, via [`GateInstance::clock_up`]/[`GateInstance::clock_down`]
/// on the composite itself), then re-runs `evaluate()` so combinational
/// logic downstream of any just-updated register sees the new value.
pub fn tick(instance: &mut CompositeInstance, clock: &mut dyn Clock) -> Result<(), n2t_hdl_gates::ClockPhaseViolation> {
    match clock.tick() {
        Half::High => instance.clock_up()?,
        Half::Low => instance.clock_down()?,
    }
    instance.evaluate();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use n2t_hdl_core::Word;
    use n2t_hdl_gates::{Registry, SystemClock};
    use n2t_hdl_linker::{link, NullChipLoader};

    use super::*;

    fn linked_register() -> CompositeInstance {
        let source = r#"
            CHIP Holder {
                IN in, load;
                OUT out;
                PARTS:
                Register(in=in, load=load, out=out);
            }
        "#;
        let ast = n2t_hdl_syntax::parse(source).unwrap();
        let mut registry = Registry::with_builtins();
        let composite = link(&ast, &mut registry, &NullChipLoader).unwrap();
        CompositeInstance::new(composite)
    }

    #[test]
    fn step_assigns_evaluates_and_reads_back_every_declared_pin() {
        let mut instance = linked_register();
        let mut row = BTreeMap::new();
        row.insert("in".to_string(), Cell::Value(Word::from_bits(0xBEEF)));
        row.insert("load".to_string(), Cell::Value(Word::from_bits(1)));
        let output = step(&mut instance, &row);
        assert!(output.result.contains_key("in"));
        assert!(output.result.contains_key("load"));
        assert!(output.result.contains_key("out"));
        assert!(output.mismatches.is_empty());
    }

    #[test]
    fn an_expected_cell_that_disagrees_is_a_mismatch() {
        let mut instance = linked_register();
        let mut row = BTreeMap::new();
        row.insert("in".to_string(), Cell::Value(Word::from_bits(5)));
        row.insert("load".to_string(), Cell::Value(Word::ZERO));
        row.insert("out".to_string(), Cell::Expected(Word::from_bits(5)));
        let output = step(&mut instance, &row);
        // load is low: the register holds its old (zero) value, not 5.
        assert_eq!(output.mismatches.len(), 1);
        assert_eq!(output.mismatches[0].pin, "out");
    }

    #[test]
    fn exec_on_data_tags_conflicts_with_their_row_index() {
        let mut instance = linked_register();
        let rows = vec![BTreeMap::new(), BTreeMap::new()];
        let result = exec_on_data(&mut instance, &rows);
        assert_eq!(result.result.len(), 2);
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn tick_commits_a_register_load_after_one_full_cycle() {
        let mut instance = linked_register();
        instance.input_pins_mut().set("in", Word::from_bits(0xBEEF));
        instance.input_pins_mut().set("load", Word::from_bits(1));
        let mut clock = SystemClock::new();
        tick(&mut instance, &mut clock).unwrap(); // rising edge: sample
        tick(&mut instance, &mut clock).unwrap(); // falling edge: commit
        assert_eq!(instance.output_pins().get("out"), Word::from_bits(0xBEEF));

        instance.input_pins_mut().set("load", Word::ZERO);
        instance.input_pins_mut().set("in", Word::from_bits(0x1234));
        tick(&mut instance, &mut clock).unwrap();
        tick(&mut instance, &mut clock).unwrap();
        assert_eq!(instance.output_pins().get("out"), Word::from_bits(0xBEEF));
    }
}
