// src/pipeline.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{self, Read},
    path::Path,
};
use tracing::{debug, info};

use crate::join::{join_tables, DuplicatePolicy, JoinReport};
use crate::mapping::FieldMapping;
use crate::table::{parse_table, Table};

/// Joined table plus what happened while building it.
#[derive(Debug, Clone, Serialize)]
pub struct JoinOutput {
    pub rows: Vec<Vec<String>>,
    pub report: JoinReport,
}

impl JoinOutput {
    pub fn table(&self) -> Table {
        Table::new(self.rows.clone())
    }
}

/// Parse both pasted texts and join them. Everything is rebuilt per call.
#[tracing::instrument(level = "info", skip_all, fields(primary_bytes = primary_text.len(), secondary_bytes = secondary_text.len()))]
pub fn run(
    primary_text: &str,
    secondary_text: &str,
    mapping: &FieldMapping,
    policy: DuplicatePolicy,
) -> Result<JoinOutput> {
    let mut primary = parse_table(primary_text);
    let secondary = parse_table(secondary_text);
    info!(
        primary_rows = primary.len(),
        secondary_rows = secondary.len(),
        "parsed inputs"
    );

    let report = join_tables(&mut primary, &secondary, mapping, policy)?;
    Ok(JoinOutput {
        rows: primary.rows,
        report,
    })
}

/// Read an input source: a file path, or `-` for stdin.
pub fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        debug!(bytes = buf.len(), "read stdin");
        return Ok(buf);
    }
    let path = Path::new(source);
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    debug!(path = %path.display(), bytes = text.len(), "read input");
    Ok(text)
}
