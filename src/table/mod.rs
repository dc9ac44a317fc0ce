// src/table/mod.rs
use serde::Serialize;
use tracing::debug;

/// One delimited line, addressed by position.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Rows in input line order, blank lines already dropped.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row, used for grid alignment.
    pub fn max_width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Split pasted text into rows of tab-separated fields.
///
/// Each line is trimmed before splitting, which also strips leading and
/// trailing tabs, so empty edge fields do not survive. There is no quoting:
/// a tab always separates fields. Never fails; short rows are left for the
/// caller to handle.
pub fn parse_table(text: &str) -> Table {
    let rows: Vec<Row> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect();
    debug!(rows = rows.len(), "parsed table");
    Table { rows }
}
