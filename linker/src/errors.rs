//! Link-time error kinds (§7): each leaf variant names the chip and part
//! involved; [`LinkError`] composes them into the one type `link()` returns.

use miette::Diagnostic;

/// A part referenced a gate name absent from the registry and unresolvable
/// via the loader.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error("unknown gate '{gate}' referenced by part in chip '{chip}'")]
pub struct UnknownGate {
    pub chip: String,
    pub gate: String,
}

/// An argument name is neither an input nor an output of the part it binds.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error("'{pin}' is not a declared pin of gate '{gate}' (part in chip '{chip}')")]
pub struct PinNotDeclared {
    pub chip: String,
    pub gate: String,
    pub pin: String,
}

/// A source/destination pair in an argument binding disagreed on width.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error(
    "width mismatch binding '{pin}' of gate '{gate}' in chip '{chip}': expected {expected} bits, found {found} bits"
)]
pub struct WidthMismatch {
    pub chip: String,
    pub gate: String,
    pub pin: String,
    pub expected: u32,
    pub found: u32,
}

/// A slice in an argument fell outside the declared size of the pin it
/// names.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error("slice [{from}..{to}] of pin '{pin}' is out of range for a {size}-bit pin (chip '{chip}')")]
pub struct SliceOutOfRange {
    pub chip: String,
    pub pin: String,
    pub from: u32,
    pub to: u32,
    pub size: u32,
}

/// A purely combinational cycle was found while topologically ordering a
/// chip's parts. Cycles that pass through at least one sequential primitive
/// are permitted and are not reported here.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error("combinational loop detected in chip '{chip}' involving net(s): {}", nets.join(", "))]
pub struct CombinationalLoop {
    pub chip: String,
    pub nets: Vec<String>,
}

/// The top-level error `link()` returns: either a structural problem with
/// the chip itself, or an I/O failure while a [`crate::loader::ChipLoader`]
/// tried to resolve a part against a directory of HDL files.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum LinkError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownGate(#[from] UnknownGate),
    #[error(transparent)]
    #[diagnostic(transparent)]
    PinNotDeclared(#[from] PinNotDeclared),
    #[error(transparent)]
    #[diagnostic(transparent)]
    WidthMismatch(#[from] WidthMismatch),
    #[error(transparent)]
    #[diagnostic(transparent)]
    SliceOutOfRange(#[from] SliceOutOfRange),
    #[error(transparent)]
    #[diagnostic(transparent)]
    CombinationalLoop(#[from] CombinationalLoop),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] n2t_hdl_syntax::ParseError),
    #[error("failed to load chip '{chip}' from disk: {source}")]
    Io {
        chip: String,
        #[source]
        source: std::io::Error,
    },
}
