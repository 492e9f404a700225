//! Composite gate evaluator for the Nand2Tetris HDL toolkit (C8): drives a
//! linked [`n2t_hdl_linker::CompositeInstance`] over stimulus rows and
//! across clock edges, on top of the propagation and conflict-detection
//! mechanics the linker crate already implements (required there so a
//! linked composite is itself usable as a part while still being linked).

mod data;
mod errors;
mod evaluator;
mod format;

// RE-EXPORTS
// ================================================================================================

pub use data::{Cell, DataRow, ExecResult, Mismatch, Row, RowConflict, StepOutput};
pub use errors::{ClockPhaseViolation, EvalError};
pub use evaluator::{exec_on_data, step, tick};
pub use format::{print_truth_table, TruthTableFormat};
