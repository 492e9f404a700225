//! Tokenizer, recursive-descent parser, and AST for the Nand2Tetris HDL
//! dialect (C6). Consumers: the linker (C7), which resolves an AST's parts
//! against the gate registry or a directory of `.hdl` files.

mod ast;
mod errors;
mod lexer;
mod parser;

// RE-EXPORTS
// ================================================================================================

pub use ast::{Argument, Chip, ChipCall};
pub use errors::ParseError;
pub use parser::parse;
