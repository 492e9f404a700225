//! Evaluation-phase errors. `evaluate()` itself is total per the design —
//! the only failure mode downstream of a successful link is a clock handler
//! called out of phase, which already has its own leaf type in the gates
//! crate; this enum exists so a driver that only depends on this crate
//! doesn't also have to import `n2t-hdl-gates` just to name that error.

pub use n2t_hdl_gates::ClockPhaseViolation;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    ClockPhaseViolation(#[from] ClockPhaseViolation),
}
