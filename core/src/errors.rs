//! Error types owned by the pin/bus/word layer.
//!
//! Slice-bounds and width-mismatch checking happen at link time, where the
//! chip and gate name are available to report alongside the bad pin
//! (`n2t_hdl_linker::errors::{SliceOutOfRange, WidthMismatch}`); this crate
//! only owns the one failure mode that is purely about a literal's own text,
//! independent of any chip context.

/// A stimulus or HDL numeric literal did not fit in 16 bits, or was not
/// well-formed for the radix it was parsed in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid numeric literal '{literal}'")]
pub struct InvalidLiteral {
    pub literal: String,
}
