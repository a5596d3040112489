// Date cleansing and the calendar dimension

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::model::DateRow;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Parse a source date value. Anything unparseable, blank or missing is `None`.
pub fn parse_datetime(raw: Option<&str>) -> Option<NaiveDateTime> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn quarter(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

pub fn year_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month - 1) as usize]
}

pub fn date_row(date: NaiveDate) -> DateRow {
    let (year, month, day) = (date.year(), date.month(), date.day());
    DateRow {
        date_key: year * 10_000 + (month * 100 + day) as i32,
        date,
        year,
        month,
        day,
        quarter: quarter(month),
        year_month: year_month(date),
        month_name: month_name(month).to_string(),
        weekday_name: WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize].to_string(),
        iso_week: date.iso_week().week(),
        day_of_year: date.ordinal(),
    }
}

/// Contiguous daily calendar covering every date given, inclusive on both
/// ends. `None` when no date is present at all.
pub fn date_dimension<I>(dates: I) -> Option<Vec<DateRow>>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for dt in dates {
        let d = dt.date();
        bounds = Some(match bounds {
            None => (d, d),
            Some((lo, hi)) => (lo.min(d), hi.max(d)),
        });
    }

    let (min, max) = bounds?;
    Some(
        min.iter_days()
            .take_while(|d| *d <= max)
            .map(date_row)
            .collect(),
    )
}
