//! Join engine: match primary rows to secondary rows by identifier, keep the
//! match only when the secondary event is at or before the primary event, and
//! append the projection columns to every primary row.

pub mod date_parser;
pub mod lookup;

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::mapping::{FieldMapping, ProjectionField};
use crate::table::Table;

pub use date_parser::{parse_primary_instant, parse_secondary_instant};
pub use lookup::{DuplicatePolicy, Lookup};

/// Why a primary row did or did not pick up a secondary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Row too short to carry an identifier.
    NoIdentifier,
    UnknownIdentifier,
    MalformedPrimaryDate,
    MalformedSecondaryDate,
    /// Secondary event is after the primary one.
    NotYetDue,
    Matched,
}

/// Resolution of one primary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatch {
    pub outcome: MatchOutcome,
    /// Always one value per projection field; all empty unless matched.
    pub values: Vec<String>,
}

impl RowMatch {
    fn empty(outcome: MatchOutcome, width: usize) -> Self {
        Self {
            outcome,
            values: vec![String::new(); width],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub primary_rows: usize,
    pub lookup_entries: usize,
    /// Secondary rows too short to carry an identifier.
    pub skipped_secondary_rows: usize,
    pub duplicate_ids: Vec<String>,
    pub outcomes: BTreeMap<MatchOutcome, usize>,
}

impl JoinReport {
    pub fn count(&self, outcome: MatchOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn matched(&self) -> usize {
        self.count(MatchOutcome::Matched)
    }
}

/// Resolve a single primary row against the lookup. Never fails: every
/// problem with the row degrades to a non-match outcome.
pub fn resolve_row(row: &[String], lookup: &Lookup<'_>, mapping: &FieldMapping) -> RowMatch {
    let width = mapping.width();

    if row.len() < mapping.min_primary_fields() {
        return RowMatch::empty(MatchOutcome::NoIdentifier, width);
    }
    let Some(other) = lookup.get(&row[mapping.primary_id]) else {
        return RowMatch::empty(MatchOutcome::UnknownIdentifier, width);
    };

    let date = row.get(mapping.primary_date).map(String::as_str).unwrap_or("");
    let time = row.get(mapping.primary_time).map(String::as_str);
    let Some(primary_at) = parse_primary_instant(date, time) else {
        return RowMatch::empty(MatchOutcome::MalformedPrimaryDate, width);
    };

    let raw = other
        .get(mapping.secondary_datetime)
        .map(String::as_str)
        .unwrap_or("");
    let Some(secondary_at) = parse_secondary_instant(raw) else {
        return RowMatch::empty(MatchOutcome::MalformedSecondaryDate, width);
    };

    // inclusive: an event at the same instant counts
    if secondary_at > primary_at {
        return RowMatch::empty(MatchOutcome::NotYetDue, width);
    }

    let values = mapping
        .projection
        .iter()
        .map(|field| match field {
            ProjectionField::Marker => mapping.marker.clone(),
            ProjectionField::Secondary { index } => other.get(*index).cloned().unwrap_or_default(),
            ProjectionField::Primary { index } => row.get(*index).cloned().unwrap_or_default(),
        })
        .collect();

    RowMatch {
        outcome: MatchOutcome::Matched,
        values,
    }
}

/// Append `mapping.width()` columns to every row of `primary`, filled from
/// `secondary` where a qualifying match exists and empty otherwise.
///
/// Only fails when `policy` is [`DuplicatePolicy::Reject`] and the secondary
/// table repeats an identifier; `primary` is untouched in that case.
#[tracing::instrument(level = "info", skip_all, fields(primary = primary.len(), secondary = secondary.len()))]
pub fn join_tables(
    primary: &mut Table,
    secondary: &Table,
    mapping: &FieldMapping,
    policy: DuplicatePolicy,
) -> Result<JoinReport> {
    let lookup = Lookup::build(secondary, mapping, policy)?;

    let mut report = JoinReport {
        primary_rows: primary.len(),
        lookup_entries: lookup.len(),
        skipped_secondary_rows: lookup.skipped(),
        duplicate_ids: lookup.duplicates().iter().map(|s| s.to_string()).collect(),
        outcomes: BTreeMap::new(),
    };

    for (idx, row) in primary.rows.iter_mut().enumerate() {
        let resolved = resolve_row(row, &lookup, mapping);
        debug!(row = idx, outcome = ?resolved.outcome, "resolved row");
        *report.outcomes.entry(resolved.outcome).or_default() += 1;
        row.extend(resolved.values);
    }

    info!(
        matched = report.matched(),
        rows = report.primary_rows,
        lookup = report.lookup_entries,
        duplicates = report.duplicate_ids.len(),
        "join complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Preset;
    use crate::table::Row;

    /// Primary row with `date` at 0, `id` at 1 and `time` at `time_at`.
    fn primary_row(date: &str, id: &str, time_at: usize, time: &str) -> Row {
        let mut row: Row = (0..=time_at).map(|i| format!("p{}", i)).collect();
        row[0] = date.to_string();
        row[1] = id.to_string();
        row[time_at] = time.to_string();
        row
    }

    /// 13-field secondary row with `datetime` at 4, `status` at 5, `id` at 12.
    fn secondary_row(id: &str, datetime: &str, status: &str) -> Row {
        let mut row: Row = (0..13).map(|i| format!("s{}", i)).collect();
        row[4] = datetime.to_string();
        row[5] = status.to_string();
        row[12] = id.to_string();
        row
    }

    fn join_basic(primary: Vec<Row>, secondary: Vec<Row>) -> (Table, JoinReport) {
        let mut primary = Table::new(primary);
        let secondary = Table::new(secondary);
        let report = join_tables(
            &mut primary,
            &secondary,
            &Preset::Basic.mapping(),
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        (primary, report)
    }

    fn tail(row: &Row, n: usize) -> &[String] {
        &row[row.len() - n..]
    }

    #[test]
    fn test_match_when_secondary_before_primary() {
        let p = primary_row("15-Mar-24", "ID1", 25, "14:00");
        let s = secondary_row("ID1", "15/Mar/2024 13:00:00", "Dispensed");
        let (out, report) = join_basic(vec![p.clone()], vec![s]);

        assert_eq!(out.rows[0].len(), p.len() + 2);
        assert_eq!(&out.rows[0][..p.len()], p.as_slice());
        assert_eq!(tail(&out.rows[0], 2), &["YES", "Dispensed"]);
        assert_eq!(report.matched(), 1);
    }

    #[test]
    fn test_no_match_when_secondary_after_primary() {
        let p = primary_row("15-Mar-24", "ID1", 25, "14:00");
        let s = secondary_row("ID1", "15/Mar/2024 15:00:00", "Dispensed");
        let (out, report) = join_basic(vec![p], vec![s]);

        assert_eq!(tail(&out.rows[0], 2), &["", ""]);
        assert_eq!(report.count(MatchOutcome::NotYetDue), 1);
        assert_eq!(report.matched(), 0);
    }

    #[test]
    fn test_equal_instants_match_and_one_second_later_does_not() {
        let p = primary_row("15-Mar-24", "ID1", 25, "14:00:00");
        let (out, _) = join_basic(
            vec![p.clone()],
            vec![secondary_row("ID1", "15/Mar/2024 14:00:00", "ok")],
        );
        assert_eq!(tail(&out.rows[0], 2), &["YES", "ok"]);

        let (out, _) = join_basic(
            vec![p],
            vec![secondary_row("ID1", "15/Mar/2024 14:00:01", "ok")],
        );
        assert_eq!(tail(&out.rows[0], 2), &["", ""]);
    }

    #[test]
    fn test_unknown_identifier() {
        let p = primary_row("15-Mar-24", "ID1", 25, "14:00");
        let s = secondary_row("ID2", "01/Jan/2020 00:00:00", "x");
        let (out, report) = join_basic(vec![p], vec![s]);
        assert_eq!(tail(&out.rows[0], 2), &["", ""]);
        assert_eq!(report.count(MatchOutcome::UnknownIdentifier), 1);
    }

    #[test]
    fn test_short_primary_row_gets_empty_columns() {
        let p: Row = vec!["15-Mar-24".to_string()];
        let s = secondary_row("15-Mar-24", "01/Jan/2020 00:00:00", "x");
        let (out, report) = join_basic(vec![p], vec![s]);
        assert_eq!(out.rows[0], vec!["15-Mar-24", "", ""]);
        assert_eq!(report.count(MatchOutcome::NoIdentifier), 1);
    }

    #[test]
    fn test_identifier_threshold_follows_mapping() {
        let mapping = FieldMapping {
            primary_id: 3,
            ..Preset::Basic.mapping()
        };
        let s = secondary_row("ID1", "01/Jan/2020 00:00:00", "ok");
        let secondary = Table::new(vec![s]);
        let lookup = Lookup::build(&secondary, &mapping, DuplicatePolicy::LastWins).unwrap();

        let short: Row = vec!["15-Mar-24".into(), "x".into(), "ID1".into()];
        let resolved = resolve_row(&short, &lookup, &mapping);
        assert_eq!(resolved.outcome, MatchOutcome::NoIdentifier);
        assert_eq!(resolved.values, vec!["", ""]);

        let long: Row = vec!["15-Mar-24".into(), "x".into(), "y".into(), "ID1".into()];
        let resolved = resolve_row(&long, &lookup, &mapping);
        assert_eq!(resolved.outcome, MatchOutcome::Matched);
        assert_eq!(resolved.values, vec!["YES", "ok"]);
    }

    #[test]
    fn test_short_secondary_row_never_matches() {
        let p = primary_row("15-Mar-24", "ID1", 25, "14:00");
        let mut s = secondary_row("ID1", "01/Jan/2020 00:00:00", "x");
        s.truncate(12);
        s.push("ID1".to_string());
        s.remove(0); // now 12 fields, ID1 at index 11
        let (out, report) = join_basic(vec![p], vec![s]);
        assert_eq!(tail(&out.rows[0], 2), &["", ""]);
        assert_eq!(report.lookup_entries, 0);
        assert_eq!(report.skipped_secondary_rows, 1);
    }

    #[test]
    fn test_missing_time_defaults_to_midnight() {
        let mut p = primary_row("15-Mar-24", "ID1", 25, "");
        p.truncate(10);
        let (out, _) = join_basic(
            vec![p.clone()],
            vec![secondary_row("ID1", "15/Mar/2024 00:00:00", "ok")],
        );
        assert_eq!(tail(&out.rows[0], 2), &["YES", "ok"]);

        let (out, _) = join_basic(
            vec![p],
            vec![secondary_row("ID1", "15/Mar/2024 00:00:01", "ok")],
        );
        assert_eq!(tail(&out.rows[0], 2), &["", ""]);
    }

    #[test]
    fn test_malformed_dates_are_non_matches() {
        let p = primary_row("2024-03-15", "ID1", 25, "14:00");
        let s = secondary_row("ID1", "15/Mar/2024 13:00:00", "ok");
        let (out, report) = join_basic(vec![p], vec![s]);
        assert_eq!(tail(&out.rows[0], 2), &["", ""]);
        assert_eq!(report.count(MatchOutcome::MalformedPrimaryDate), 1);

        let p = primary_row("15-Mar-24", "ID1", 25, "14:00");
        let s = secondary_row("ID1", "15/Mar/2024", "ok");
        let (out, report) = join_basic(vec![p], vec![s]);
        assert_eq!(tail(&out.rows[0], 2), &["", ""]);
        assert_eq!(report.count(MatchOutcome::MalformedSecondaryDate), 1);
    }

    #[test]
    fn test_every_row_gets_same_column_count() {
        let rows = vec![
            primary_row("15-Mar-24", "ID1", 25, "14:00"),
            vec!["lonely".to_string()],
            primary_row("bad", "ID1", 25, "14:00"),
            primary_row("15-Mar-24", "ID9", 25, "14:00"),
        ];
        let before: Vec<usize> = rows.iter().map(Vec::len).collect();
        let (out, report) = join_basic(
            rows,
            vec![secondary_row("ID1", "15/Mar/2024 13:00:00", "ok")],
        );
        for (row, len) in out.rows.iter().zip(before) {
            assert_eq!(row.len(), len + 2);
        }
        assert_eq!(report.primary_rows, 4);
        assert_eq!(report.outcomes.values().sum::<usize>(), 4);
    }

    #[test]
    fn test_extended_projection() {
        let mapping = Preset::Extended.mapping();
        let p = primary_row("15-Mar-24", "ID1", 24, "14:00");
        let s = secondary_row("ID1", "15/Mar/2024 13:00:00", "Dispensed");
        let mut primary = Table::new(vec![p.clone()]);
        let secondary = Table::new(vec![s]);

        join_tables(&mut primary, &secondary, &mapping, DuplicatePolicy::LastWins).unwrap();

        let row = &primary.rows[0];
        assert_eq!(row.len(), p.len() + 7);
        assert_eq!(
            tail(row, 7),
            &[
                "YES",
                "s1",
                "s3",
                "15/Mar/2024 13:00:00",
                "Dispensed",
                "15-Mar-24",
                "14:00"
            ]
        );
    }

    #[test]
    fn test_extended_primary_projection_missing_field_is_empty() {
        let mapping = Preset::Extended.mapping();
        // no time column at all: matches at midnight, audit column is empty
        let p: Row = vec!["15-Mar-24".to_string(), "ID1".to_string()];
        let s = secondary_row("ID1", "14/Mar/2024 23:00:00", "ok");
        let mut primary = Table::new(vec![p]);
        join_tables(
            &mut primary,
            &Table::new(vec![s]),
            &mapping,
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        assert_eq!(primary.rows[0][2], "YES");
        assert_eq!(primary.rows[0][7], "15-Mar-24");
        assert_eq!(primary.rows[0][8], "");
    }

    #[test]
    fn test_reject_policy_leaves_primary_untouched() {
        let p = primary_row("15-Mar-24", "ID1", 25, "14:00");
        let mut primary = Table::new(vec![p.clone()]);
        let secondary = Table::new(vec![
            secondary_row("ID1", "15/Mar/2024 13:00:00", "a"),
            secondary_row("ID1", "15/Mar/2024 13:00:00", "b"),
        ]);
        let res = join_tables(
            &mut primary,
            &secondary,
            &Preset::Basic.mapping(),
            DuplicatePolicy::Reject,
        );
        assert!(res.is_err());
        assert_eq!(primary.rows[0], p);
    }

    #[test]
    fn test_duplicates_reported_and_last_wins() {
        let p = primary_row("15-Mar-24", "ID1", 25, "14:00");
        let (out, report) = join_basic(
            vec![p],
            vec![
                secondary_row("ID1", "15/Mar/2024 13:00:00", "first"),
                secondary_row("ID1", "15/Mar/2024 13:30:00", "second"),
            ],
        );
        assert_eq!(tail(&out.rows[0], 2), &["YES", "second"]);
        assert_eq!(report.duplicate_ids, vec!["ID1".to_string()]);
    }
}
