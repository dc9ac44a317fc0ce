//! Presentation of joined tables: a text grid that can be rendered and
//! serialized back to tab-delimited text, and the copy action built on it.

pub mod clipboard;

use crate::table::Table;

pub use clipboard::{copy_grid, ClipboardSink, FileSink, MemorySink, Notice, NoticeKind};

/// Something that shows rows and can hand them back as delimited text.
pub trait Presenter {
    /// Replace whatever is shown with `table`, one cell per field.
    fn render(&mut self, table: &Table);

    /// Tab-join each row, newline-join rows, trailing newline.
    fn serialize(&self) -> String;
}

/// In-memory grid of plain-text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextGrid {
    table: Table,
}

impl TextGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column-padded view for a terminal. Cells are shown verbatim.
    pub fn to_aligned_string(&self) -> String {
        let mut widths = vec![0usize; self.table.max_width()];
        for row in &self.table.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for row in &self.table.rows {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<w$}", cell, w = widths[i]))
                .collect();
            out.push_str(line.join(" | ").trim_end());
            out.push('\n');
        }
        out
    }
}

impl Presenter for TextGrid {
    fn render(&mut self, table: &Table) {
        self.table.rows.clear();
        self.table.rows.extend(table.rows.iter().cloned());
    }

    fn serialize(&self) -> String {
        let mut out = String::new();
        for row in &self.table.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }
}
