//! Built-in gate library for the Nand2Tetris HDL toolkit: primitive
//! specifications and semantics (C3/C4) plus the system clock (C5).
//! Consumed by the linker (C7), which binds HDL parts against
//! [`registry::Registry`] entries, and the evaluator (C8), which drives
//! [`instance::GateInstance`] uniformly across built-ins and composites.

pub mod builtins;
mod clock;
mod errors;
pub mod instance;
mod registry;
mod spec;

// RE-EXPORTS
// ================================================================================================

pub use clock::{Clock, Half, SharedSystemClock, SystemClock};
pub use errors::{ClockPhaseViolation, GateBuildError};
pub use instance::{GateInstance, PhaseGuard, PinBank};
pub use registry::{GateClass, Registry, DEFAULT_TRUTH_TABLE_BIT_CAP};
pub use spec::{GateSpec, Row};
