//! Parse-time diagnostics. [`ParseError`] carries both the plain fields the
//! design mandates (`line`, `column`, `source_line`, `caret`) and a
//! `miette::Diagnostic` implementation, so a consumer that wants fancy
//! terminal rendering gets it for free without this crate hand-rolling
//! ANSI output itself.

use miette::{Diagnostic, SourceSpan};

#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error("{message}")]
#[diagnostic()]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub source_line: String,
    pub caret: String,
    #[source_code]
    source_code: String,
    #[label("here")]
    span: SourceSpan,
}

impl ParseError {
    /// Builds a `ParseError` at the given byte `offset`/`line`/`column`
    /// within `source`, computing `source_line` and `caret` from them.
    pub fn at(source: &str, offset: usize, line: usize, column: usize, message: impl Into<String>) -> Self {
        let source_line = source.lines().nth(line.saturating_sub(1)).unwrap_or("").to_string();
        let caret_col = column.saturating_sub(1);
        let caret = format!("{}^", " ".repeat(caret_col));
        Self {
            message: message.into(),
            line,
            column,
            source_line,
            caret,
            source_code: source.to_string(),
            span: SourceSpan::from(offset..offset + 1),
        }
    }
}
