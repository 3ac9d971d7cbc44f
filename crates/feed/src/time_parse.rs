// ABOUTME: Flexible date parsing for scraped, feed, and calendar dates.
// ABOUTME: Normalizes any recognised date to RFC 822 GMT, falling back to the run time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Output format for every `pub_date` in the feed.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Named zones that show up in RSS dates; chrono's `%Z` cannot parse these.
const NAMED_ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UTC", 0),
    ("UT", 0),
    ("Z", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("AKST", -9 * 3600),
    ("AKDT", -8 * 3600),
    ("HST", -10 * 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("BST", 3600),
];

/// Parses a date string in any of the formats seen across sources.
///
/// Order: RFC 3339, RFC 2822, named-zone RSS dates, ICS basic format, ISO-like
/// and English loose formats, then `dateparser` as a last resort. Naive values are
/// taken as UTC.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_with_named_zone(s) {
        return Some(dt);
    }
    if let Some(dt) = parse_ics_basic(s) {
        return Some(dt);
    }

    const WITH_OFFSET: &[&str] = &[
        "%a, %d %b %Y %H:%M:%S %z",
        "%a, %e %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M%:z",
    ];
    for fmt in WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    const NAIVE: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d %b %Y %H:%M:%S",
        "%a, %d %b %Y %H:%M:%S",
    ];
    for fmt in NAIVE {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    const DATE_ONLY: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%b %e, %Y",
        "%b %d, %Y",
        "%B %e, %Y",
        "%B %d, %Y",
        "%e %b %Y",
        "%d %b %Y",
        "%e %B %Y",
        "%d %B %Y",
        "%A, %B %e, %Y",
        "%a, %b %e, %Y",
    ];
    for fmt in DATE_ONLY {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return midnight_utc(date);
        }
    }

    dateparser::parse(s).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Normalizes a raw date to [`PUB_DATE_FORMAT`], using `now` when it cannot be parsed.
pub fn normalize_pub_date(raw: &str, now: DateTime<Utc>) -> String {
    format_pub_date(parse_flexible_time(raw).unwrap_or(now))
}

/// Formats a UTC datetime as an RSS `pubDate`.
pub fn format_pub_date(dt: DateTime<Utc>) -> String {
    dt.format(PUB_DATE_FORMAT).to_string()
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// ICS basic format: `20240601T190000`, `20240601T190000Z`, or `20240601`.
fn parse_ics_basic(s: &str) -> Option<DateTime<Utc>> {
    let body = s.strip_suffix('Z').unwrap_or(s);
    if !body.chars().all(|c| c.is_ascii_digit() || c == 'T') {
        return None;
    }
    match body.len() {
        8 => midnight_utc(NaiveDate::parse_from_str(body, "%Y%m%d").ok()?),
        15 => {
            let naive = NaiveDateTime::parse_from_str(body, "%Y%m%dT%H%M%S").ok()?;
            Some(Utc.from_utc_datetime(&naive))
        }
        13 => {
            let naive = NaiveDateTime::parse_from_str(body, "%Y%m%dT%H%M").ok()?;
            Some(Utc.from_utc_datetime(&naive))
        }
        _ => None,
    }
}

fn parse_with_named_zone(s: &str) -> Option<DateTime<Utc>> {
    let (base, zone) = s.rsplit_once(' ')?;
    let offset_secs = NAMED_ZONES
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|(_, secs)| *secs)?;

    const FORMATS: &[&str] = &[
        "%a, %d %b %Y %H:%M:%S",
        "%a, %e %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%e %b %Y %H:%M:%S",
        "%a, %d %b %Y %H:%M",
    ];

    let base = base.trim_end();
    for fmt in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(base, fmt) {
            let offset = FixedOffset::east_opt(offset_secs)?;
            let dt = offset.from_local_datetime(&naive).single()?;
            return Some(dt.with_timezone(&Utc));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        let dt = parse_flexible_time("2023-06-15T14:30:00Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 6, 15));
    }

    #[test]
    fn test_rfc2822() {
        assert!(parse_flexible_time("Mon, 02 Jan 2006 15:04:05 -0700").is_some());
    }

    #[test]
    fn test_named_zone() {
        let dt = parse_flexible_time("Mon, 02 Jan 2006 15:04:05 MST").unwrap();
        assert_eq!(dt.hour(), 22);
    }

    #[test]
    fn test_ics_basic_formats() {
        let dt = parse_flexible_time("20240601T190000").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (6, 1, 19));
        let dt = parse_flexible_time("20240601T190000Z").unwrap();
        assert_eq!(dt.hour(), 19);
        let dt = parse_flexible_time("20240601").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (6, 1, 0));
    }

    #[test]
    fn test_loose_english_dates() {
        let dt = parse_flexible_time("May 1, 2024").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 5, 1));
        let dt = parse_flexible_time("1 May 2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (5, 1));
    }

    #[test]
    fn test_empty_and_garbage() {
        assert!(parse_flexible_time("").is_none());
        assert!(parse_flexible_time("   ").is_none());
        assert!(parse_flexible_time("every other tuesday-ish").is_none());
    }

    #[test]
    fn test_normalize_pub_date() {
        assert_eq!(
            normalize_pub_date("2024-05-01", fixed_now()),
            "Wed, 01 May 2024 00:00:00 GMT"
        );
        assert_eq!(
            normalize_pub_date("not a date", fixed_now()),
            "Tue, 02 Jan 2024 03:04:05 GMT"
        );
        assert_eq!(normalize_pub_date("", fixed_now()), "Tue, 02 Jan 2024 03:04:05 GMT");
    }
}
