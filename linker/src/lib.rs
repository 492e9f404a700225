//! Composite gate linker for the Nand2Tetris HDL toolkit (C7): resolves the
//! parts named in a parsed [`n2t_hdl_syntax::Chip`] against a
//! [`n2t_hdl_gates::Registry`] (or a [`loader::ChipLoader`] for parts found
//! on disk), validates and binds their arguments, and orders the result for
//! evaluation. Produces a [`blueprint::Composite`] plus a runnable
//! [`instance::CompositeInstance`] that the evaluator crate (C8) drives.

pub mod blueprint;
pub mod errors;
pub mod instance;
pub mod loader;
mod link;
mod order;

// RE-EXPORTS
// ================================================================================================

pub use blueprint::{ArgBinding, Composite, PartPlan, Signal};
pub use errors::{CombinationalLoop, LinkError, PinNotDeclared, SliceOutOfRange, UnknownGate, WidthMismatch};
pub use instance::{CompositeInstance, Conflict};
pub use link::{link, link_chip};
pub use loader::{ChipLoader, FsChipLoader, MapChipLoader, NullChipLoader};
