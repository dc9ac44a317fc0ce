use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, HashMap};
use tracing::{debug, warn};

use crate::mapping::FieldMapping;
use crate::table::Table;

/// What to do when two secondary rows share an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Later rows replace earlier ones.
    #[default]
    LastWins,
    /// The first row seen is kept.
    KeepFirst,
    /// Any duplicate fails the join.
    Reject,
}

/// Identifier → secondary row, borrowed from the secondary table.
#[derive(Debug, Default)]
pub struct Lookup<'a> {
    by_id: HashMap<&'a str, &'a [String]>,
    /// Identifiers seen more than once, in first-duplicate order.
    duplicates: Vec<&'a str>,
    skipped: usize,
}

impl<'a> Lookup<'a> {
    /// Index `secondary` by its `mapping.secondary_id` field.
    /// Rows shorter than `mapping.min_secondary_fields()` are skipped and can
    /// never match.
    pub fn build(
        secondary: &'a Table,
        mapping: &FieldMapping,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        let mut lookup = Lookup::default();
        let min_fields = mapping.min_secondary_fields();

        for row in &secondary.rows {
            if row.len() < min_fields {
                lookup.skipped += 1;
                continue;
            }
            let id = row[mapping.secondary_id].as_str();
            match lookup.by_id.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(row.as_slice());
                }
                Entry::Occupied(mut slot) => {
                    warn!(id, ?policy, "duplicate identifier in secondary table");
                    if !lookup.duplicates.contains(&id) {
                        lookup.duplicates.push(id);
                    }
                    if policy == DuplicatePolicy::LastWins {
                        slot.insert(row.as_slice());
                    }
                }
            }
        }

        if policy == DuplicatePolicy::Reject && !lookup.duplicates.is_empty() {
            bail!(
                "secondary table has {} duplicate identifier(s): {}",
                lookup.duplicates.len(),
                lookup.duplicates.join(", ")
            );
        }

        debug!(
            entries = lookup.by_id.len(),
            skipped = lookup.skipped,
            "built lookup"
        );
        Ok(lookup)
    }

    pub fn get(&self, id: &str) -> Option<&'a [String]> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }

    /// Rows too short to carry an identifier.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
