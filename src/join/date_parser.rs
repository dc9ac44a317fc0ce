use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// `H:MM`, `HH:MM` or `HH:MM:SS`
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("valid time regex"));

const MONTHS: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

/// Time used when the primary row has no time-of-day.
pub const MIDNIGHT: &str = "00:00";

/// English month name (abbreviated or full, any case) → 1..=12
pub fn parse_month(s: &str) -> Option<u32> {
    let lower = s.trim().to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|(abbr, full)| lower == *abbr || lower == *full)
        .map(|i| i as u32 + 1)
}

pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(s.trim())?;
    let hour: u32 = caps[1].parse().ok()?;
    let min: u32 = caps[2].parse().ok()?;
    let sec: u32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_opt(hour, min, sec)
}

fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Build an instant from the four textual components shared by both formats.
fn assemble(day: &str, month: &str, year: &str, time: &str) -> Option<NaiveDateTime> {
    let day: u32 = parse_digits(day)?;
    let month = parse_month(month)?;
    let year: i32 = parse_digits(year)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(parse_time_of_day(time)?))
}

/// Primary format: date `"DD-Mon-YY"` plus an optional `"HH:MM[:SS]"`.
///
/// A two-character year is taken as 20YY. A missing or blank time means
/// midnight.
pub fn parse_primary_instant(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = date.trim().split('-').collect();
    if parts.len() < 3 {
        return None;
    }
    let (day, month, year) = (parts[0], parts[1], parts[2].trim());

    let year = if year.len() == 2 {
        format!("20{}", year)
    } else {
        year.to_string()
    };
    let time = time.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(MIDNIGHT);

    assemble(day, month, &year, time)
}

/// Secondary format: `"DD/Mon/YYYY HH:MM:SS"` in a single field.
pub fn parse_secondary_instant(raw: &str) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = raw.trim().split(' ').collect();
    if parts.len() < 2 {
        return None;
    }
    let (date_part, time_part) = (parts[0], parts[1]);

    let date_parts: Vec<&str> = date_part.split('/').collect();
    if date_parts.len() < 3 {
        return None;
    }
    assemble(date_parts[0], date_parts[1], date_parts[2], time_part)
}
