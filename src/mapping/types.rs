// src/mapping/types.rs

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal written into the marker column of a matched row.
pub const DEFAULT_MARKER: &str = "YES";

/// One appended output column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum ProjectionField {
    /// The match marker literal.
    Marker,
    /// Copy of a field from the matched secondary row.
    Secondary { index: usize },
    /// Copy of a field from the primary row itself.
    Primary { index: usize },
}

/// Positional column contract for both tables, plus what to append.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
#[serde(default)]
pub struct FieldMapping {
    /// `DD-Mon-YY` date column of the primary table.
    pub primary_date: usize,
    pub primary_id: usize,
    /// `HH:MM[:SS]` column of the primary table; midnight when absent.
    pub primary_time: usize,
    /// `DD/Mon/YYYY HH:MM:SS` column of the secondary table.
    pub secondary_datetime: usize,
    pub secondary_id: usize,
    pub marker: String,
    pub projection: Vec<ProjectionField>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Preset::Basic.mapping()
    }
}

impl FieldMapping {
    /// Number of columns appended to every primary row.
    pub fn width(&self) -> usize {
        self.projection.len()
    }

    /// Secondary rows shorter than this never enter the lookup.
    pub fn min_secondary_fields(&self) -> usize {
        self.secondary_id + 1
    }

    /// Primary rows shorter than this carry no identifier.
    pub fn min_primary_fields(&self) -> usize {
        self.primary_id + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.projection.is_empty() {
            bail!("field mapping has an empty projection list");
        }
        if self.marker.is_empty() && self.projection.contains(&ProjectionField::Marker) {
            bail!("field mapping projects a marker column but the marker literal is empty");
        }
        Ok(())
    }
}

/// Built-in mappings for the two known table layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Marker plus the secondary status column.
    #[default]
    Basic,
    /// Marker, four secondary columns, and the compared primary date/time.
    Extended,
}

impl Preset {
    pub fn mapping(self) -> FieldMapping {
        match self {
            Preset::Basic => FieldMapping {
                primary_date: 0,
                primary_id: 1,
                primary_time: 25,
                secondary_datetime: 4,
                secondary_id: 12,
                marker: DEFAULT_MARKER.to_string(),
                projection: vec![
                    ProjectionField::Marker,
                    ProjectionField::Secondary { index: 5 },
                ],
            },
            Preset::Extended => FieldMapping {
                primary_date: 0,
                primary_id: 1,
                primary_time: 24,
                secondary_datetime: 4,
                secondary_id: 12,
                marker: DEFAULT_MARKER.to_string(),
                projection: vec![
                    ProjectionField::Marker,
                    ProjectionField::Secondary { index: 1 },
                    ProjectionField::Secondary { index: 3 },
                    ProjectionField::Secondary { index: 4 },
                    ProjectionField::Secondary { index: 5 },
                    ProjectionField::Primary { index: 0 },
                    ProjectionField::Primary { index: 24 },
                ],
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Basic => write!(f, "basic"),
            Preset::Extended => write!(f, "extended"),
        }
    }
}
