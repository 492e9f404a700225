//! Plain-text truth-table rendering (§6 `printTruthTable`). Produces a
//! `Vec<String>` of already-formatted lines; ANSI coloring and terminal
//! layout are explicitly the CLI collaborator's job, not this crate's.

use std::collections::BTreeMap;

use n2t_hdl_core::{Radix, Word};

use crate::data::Row;

/// How to render a table produced by [`print_truth_table`].
pub struct TruthTableFormat {
    pub radix: Radix,
    /// Minimum field width each column is padded to (beyond what the radix
    /// itself demands, e.g. 4 hex digits).
    pub field_width: usize,
    /// Declared bit width per column name, used to zero-pad binary output to
    /// the pin's own size rather than a flat 16 bits (§4.1). Columns absent
    /// here fall back to the full 16-bit width.
    pub pin_widths: BTreeMap<String, u32>,
    /// Applied to every value before formatting, e.g. to invert polarity or
    /// remap don't-care bits for display; identity if `None`.
    pub transform: Option<fn(Word) -> Word>,
}

impl Default for TruthTableFormat {
    fn default() -> Self {
        Self { radix: Radix::Bin, field_width: 0, pin_widths: BTreeMap::new(), transform: None }
    }
}

/// Renders `table` (typically a [`n2t_hdl_gates::GateSpec::truth_table`] or
/// an [`crate::data::ExecResult::result`]) as a header line plus one line
/// per row, columns ordered by first-row key order.
pub fn print_truth_table(table: &[Row], format: &TruthTableFormat) -> Vec<String> {
    let Some(first) = table.first() else {
        return Vec::new();
    };
    let columns: Vec<String> = first.keys().cloned().collect();

    let mut lines = Vec::with_capacity(table.len() + 1);
    lines.push(render_row(&columns, |name| pad(name.to_string(), format.field_width)));

    for row in table {
        lines.push(render_row(&columns, |name| {
            let raw = row.get(name).copied().unwrap_or(Word::ZERO);
            let value = format.transform.map(|f| f(raw)).unwrap_or(raw);
            let width = format.pin_widths.get(name).copied().unwrap_or(16);
            pad(value.format(format.radix, width), format.field_width)
        }));
    }
    lines
}

fn render_row(columns: &[String], mut cell: impl FnMut(&str) -> String) -> String {
    columns.iter().map(|c| cell(c)).collect::<Vec<_>>().join(" | ")
}

fn pad(s: String, width: usize) -> String {
    if s.len() >= width {
        s
    } else {
        format!("{s:>width$}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn renders_a_header_and_one_line_per_row() {
        let mut row = BTreeMap::new();
        row.insert("a".to_string(), Word::from_bits(1));
        row.insert("out".to_string(), Word::ZERO);
        let table = vec![row];
        let lines = print_truth_table(&table, &TruthTableFormat::default());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains('a') && lines[0].contains("out"));
    }

    #[test]
    fn empty_table_renders_no_lines() {
        assert!(print_truth_table(&[], &TruthTableFormat::default()).is_empty());
    }

    #[test]
    fn binary_columns_pad_to_their_own_pin_width_not_a_flat_sixteen() {
        let mut row = BTreeMap::new();
        row.insert("sel".to_string(), Word::from_bits(1));
        let table = vec![row];
        let mut widths = BTreeMap::new();
        widths.insert("sel".to_string(), 2);
        let format = TruthTableFormat { pin_widths: widths, ..TruthTableFormat::default() };
        let lines = print_truth_table(&table, &format);
        assert_eq!(lines[1], "01");
    }
}
