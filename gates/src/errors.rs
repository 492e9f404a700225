//! Error types owned by gate construction and clocked evaluation.

/// A sequential primitive's half-phase handler was called out of order: two
/// `clock_up`s (or two `clock_down`s) in a row without the opposite phase
/// in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("clock phase violation: handler called out of Low/High sequence")]
pub struct ClockPhaseViolation;

/// A gate could not be constructed from its [`crate::spec::GateSpec`], e.g.
/// a pin width that does not match what the built-in implementation expects.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot build gate '{gate}': {reason}")]
pub struct GateBuildError {
    pub gate: String,
    pub reason: String,
}
