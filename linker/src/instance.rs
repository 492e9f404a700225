//! Drives a linked [`Composite`] as a single [`GateInstance`]: copies
//! sources into each part, evaluates it, copies its outputs back out, and
//! along the way records every write so overlapping, disagreeing writes
//! surface as a [`Conflict`] (§4.8) instead of silently picking one.
//!
//! This lives in the linker crate rather than the evaluator crate because a
//! composite has to be runnable the moment it is linked: resolving a part
//! against a directory of `.hdl` files means recursively linking that part
//! and registering it as a fresh [`n2t_hdl_gates::GateClass`], which in turn
//! needs a constructor producing something that already implements
//! `GateInstance`. The evaluator crate builds its row/tick-driving API on
//! top of this type rather than duplicating it.

use std::collections::BTreeMap;
use std::rc::Rc;

use n2t_hdl_core::Word;
use n2t_hdl_gates::{ClockPhaseViolation, GateInstance, PinBank};

use crate::blueprint::{Composite, Signal};

/// Two or more parts wrote disagreeing values into overlapping bits of the
/// same destination pin during one `evaluate()` pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub pin: String,
    pub writers: Vec<String>,
}

struct Write {
    pin: String,
    from: u32,
    to: u32,
    value: Word,
    writer: String,
}

/// A runnable instance of a linked composite gate.
#[derive(Debug)]
pub struct CompositeInstance {
    pub blueprint: Rc<Composite>,
    inputs: PinBank,
    outputs: PinBank,
    nets: PinBank,
    parts: Vec<Box<dyn GateInstance>>,
    sequential: bool,
    conflicts: Vec<Conflict>,
}

impl CompositeInstance {
    pub fn new(blueprint: Rc<Composite>) -> Self {
        let inputs = PinBank::new(blueprint.spec.input_pins.clone());
        let outputs = PinBank::new(blueprint.spec.output_pins.clone());
        let nets = PinBank::new(blueprint.internal_nets.clone());
        let parts: Vec<Box<dyn GateInstance>> =
            blueprint.parts.iter().map(|p| p.class.instantiate()).collect();
        let sequential = parts.iter().any(|p| p.is_sequential());
        Self { blueprint, inputs, outputs, nets, parts, sequential, conflicts: Vec::new() }
    }

    /// Conflicts recorded by the most recent [`GateInstance::evaluate`] call.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    fn read_signal(&self, signal: &Signal) -> Word {
        match signal {
            Signal::Input { name, from, to } => self.inputs.read_slice(name, *from, *to),
            Signal::Output { name, from, to } => self.outputs.read_slice(name, *from, *to),
            Signal::Internal { name, from, to } => self.nets.read_slice(name, *from, *to),
            Signal::Constant { value, width } => Word::constant(*value, *width),
        }
    }

    fn apply_write(&mut self, signal: &Signal, value: Word, writer: String, log: &mut Vec<Write>) {
        match signal {
            Signal::Output { name, from, to } => {
                self.outputs.write_slice(name, *from, *to, value);
                log.push(Write { pin: name.clone(), from: *from, to: *to, value, writer });
            },
            Signal::Internal { name, from, to } => {
                self.nets.write_slice(name, *from, *to, value);
                log.push(Write { pin: name.clone(), from: *from, to: *to, value, writer });
            },
            Signal::Input { .. } | Signal::Constant { .. } => {
                // Never a destination; the linker only produces these as sources.
            },
        }
    }
}

/// Two write ranges overlap and disagree on at least one shared bit.
fn writes_conflict(a: &Write, b: &Write) -> bool {
    let overlap_from = a.from.max(b.from);
    let overlap_to = a.to.min(b.to);
    if overlap_from > overlap_to {
        return false;
    }
    for bit in overlap_from..=overlap_to {
        let a_bit = a.value.bit(bit - a.from);
        let b_bit = b.value.bit(bit - b.from);
        if a_bit != b_bit {
            return true;
        }
    }
    false
}

fn find_conflicts(log: &[Write]) -> Vec<Conflict> {
    let mut by_pin: BTreeMap<&str, Vec<&Write>> = BTreeMap::new();
    for w in log {
        by_pin.entry(w.pin.as_str()).or_default().push(w);
    }
    let mut conflicts = Vec::new();
    for (pin, writes) in by_pin {
        if writes.len() < 2 {
            continue;
        }
        let mut offenders: Vec<String> = Vec::new();
        for i in 0..writes.len() {
            for j in (i + 1)..writes.len() {
                if writes_conflict(writes[i], writes[j]) {
                    if !offenders.contains(&writes[i].writer) {
                        offenders.push(writes[i].writer.clone());
                    }
                    if !offenders.contains(&writes[j].writer) {
                        offenders.push(writes[j].writer.clone());
                    }
                }
            }
        }
        if !offenders.is_empty() {
            conflicts.push(Conflict { pin: pin.to_string(), writers: offenders });
        }
    }
    conflicts
}

impl GateInstance for CompositeInstance {
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
        self.nets.clear();
        let mut log: Vec<Write> = Vec::new();

        for (idx, part) in self.blueprint.parts.iter().enumerate() {
            for binding in &part.bindings {
                if binding.is_part_input {
                    let value = self.read_signal(&binding.signal);
                    self.parts[idx].input_pins_mut().set(&binding.part_pin, value);
                }
            }
            self.parts[idx].evaluate();
            let writer = format!("{}#{idx}", part.gate_name);
            for binding in &part.bindings {
                if !binding.is_part_input {
                    let value = self.parts[idx].output_pins().get(&binding.part_pin);
                    self.apply_write(&binding.signal, value, writer.clone(), &mut log);
                }
            }
        }

        self.conflicts = find_conflicts(&log);
    }

    fn is_sequential(&self) -> bool {
        self.sequential
    }

    fn clock_up(&mut self) -> Result<(), ClockPhaseViolation> {
        // Copy composite inputs/nets into every part's input pins (and run
        // combinational parts so nets feeding a sequential part's inputs are
        // current) before any sequential part samples its rising edge.
        // Otherwise a register fed straight from a composite input latches
        // whatever was left over from construction instead of the value the
        // caller just set.
        self.evaluate();
        for part in &mut self.parts {
            part.clock_up()?;
        }
        Ok(())
    }

    fn clock_down(&mut self) -> Result<(), ClockPhaseViolation> {
        for part in &mut self.parts {
            part.clock_down()?;
        }
        Ok(())
    }
}
