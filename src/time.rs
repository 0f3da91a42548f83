//! Publication time normalization.
//!
//! News sites expose publication times in wildly different shapes: RFC 3339
//! meta tags, "Updated: May 10, 2025, 14:32 IST" labels, bare dates, or
//! nothing. [`TimeNormalizer`] turns all of them into a timestamp in one
//! configured offset so stories from different outlets can be compared.
//!
//! Normalization is total: anything that cannot be parsed becomes "now".

use crate::models::RawTime;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Formats that carry a numeric offset.
const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Formats without zone information.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y, %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y, %I:%M %p",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%b %d, %Y, %H:%M",
    "%b %d, %Y %I:%M %p",
    "%b %d, %Y, %I:%M %p",
    "%d %B %Y %H:%M",
    "%d %b %Y %H:%M",
    "%d %B %Y, %H:%M",
    "%d %b %Y, %H:%M",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

/// Date-only formats; these resolve to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%d/%m/%Y"];

static LABEL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(updated|published|posted|last updated)\s*(on)?\s*:?\s*").unwrap());

static TRAILING_ZONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\(?([A-Za-z]{1,5})\)?$").unwrap());

/// Converts raw publication times into one fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct TimeNormalizer {
    offset: FixedOffset,
}

impl TimeNormalizer {
    /// Create a normalizer for the given display offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// The current moment in the configured offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Normalize a raw time, falling back to [`Self::now`] when it cannot be parsed.
    pub fn normalize(&self, raw: &RawTime) -> DateTime<FixedOffset> {
        self.parse(raw).unwrap_or_else(|| {
            debug!(?raw, "Unparseable publication time; using now");
            self.now()
        })
    }

    /// Parse a raw time without any fallback.
    ///
    /// Aware timestamps are converted to the configured offset; naive ones
    /// are assumed to already be in it.
    pub fn parse(&self, raw: &RawTime) -> Option<DateTime<FixedOffset>> {
        match raw {
            RawTime::Unknown => None,
            RawTime::Aware(dt) => Some(dt.with_timezone(&self.offset)),
            RawTime::Naive(naive) => self.localize(naive),
            RawTime::Text(text) => self.parse_text(text),
        }
    }

    fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        self.offset.from_local_datetime(naive).single()
    }

    fn parse_text(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        let text = LABEL_PREFIX.replace(text.trim(), "");
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&self.offset));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Some(dt.with_timezone(&self.offset));
        }
        for fmt in AWARE_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
                return Some(dt.with_timezone(&self.offset));
            }
        }

        // "May 10, 2025 14:32 IST": a named zone we either know or drop.
        let (text, utc) = strip_zone_name(text);
        let naive = parse_naive(text)?;
        if utc {
            Some(Utc.from_utc_datetime(&naive).with_timezone(&self.offset))
        } else {
            self.localize(&naive)
        }
    }
}

/// Remove a trailing alphabetic zone name; reports whether it meant UTC.
fn strip_zone_name(text: &str) -> (&str, bool) {
    let Some(caps) = TRAILING_ZONE.captures(text) else {
        return (text, false);
    };
    let name = &caps[1];
    // AM/PM are part of the time, not a zone.
    if name.eq_ignore_ascii_case("am") || name.eq_ignore_ascii_case("pm") {
        return (text, false);
    }
    let utc = matches!(name.to_ascii_uppercase().as_str(), "UTC" | "GMT" | "Z");
    let stripped = text[..caps.get(0).map_or(text.len(), |m| m.start())].trim_end();
    (stripped, utc)
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(19800).unwrap()
    }

    fn normalizer() -> TimeNormalizer {
        TimeNormalizer::new(ist())
    }

    fn text(s: &str) -> RawTime {
        RawTime::Text(s.to_string())
    }

    #[test]
    fn test_unknown_and_garbage_fall_back_to_now() {
        let n = normalizer();
        let before = n.now();
        let a = n.normalize(&RawTime::Unknown);
        let b = n.normalize(&text("not a date"));
        let c = n.normalize(&text("Unknown"));
        let after = n.now();
        for dt in [a, b, c] {
            assert!(dt >= before && dt <= after);
            assert_eq!(dt.offset().local_minus_utc(), 19800);
        }
    }

    #[test]
    fn test_rfc3339_is_converted() {
        let dt = normalizer().parse(&text("2025-05-10T08:00:00Z")).unwrap();
        assert_eq!(dt, ist().with_ymd_and_hms(2025, 5, 10, 13, 30, 0).unwrap());
        assert_eq!(dt.offset().local_minus_utc(), 19800);
    }

    #[test]
    fn test_numeric_offset_formats() {
        let n = normalizer();
        let expected = ist().with_ymd_and_hms(2025, 5, 10, 14, 32, 0).unwrap();
        assert_eq!(n.parse(&text("2025-05-10T14:32:00+05:30")).unwrap(), expected);
        assert_eq!(n.parse(&text("2025-05-10 09:02:00+0000")).unwrap(), expected);
        assert_eq!(n.parse(&text("Sat, 10 May 2025 09:02:00 GMT")).unwrap(), expected);
    }

    #[test]
    fn test_naive_text_assumed_local() {
        let n = normalizer();
        let expected = ist().with_ymd_and_hms(2025, 5, 10, 14, 32, 0).unwrap();
        assert_eq!(n.parse(&text("2025-05-10 14:32:00")).unwrap(), expected);
        assert_eq!(n.parse(&text("May 10, 2025 14:32")).unwrap(), expected);
        assert_eq!(n.parse(&text("May 10, 2025, 02:32 PM")).unwrap(), expected);
        assert_eq!(n.parse(&text("10 May 2025 14:32")).unwrap(), expected);
    }

    #[test]
    fn test_site_labels_and_zone_names() {
        let n = normalizer();
        let expected = ist().with_ymd_and_hms(2025, 5, 10, 14, 32, 0).unwrap();
        assert_eq!(n.parse(&text("Updated: May 10, 2025, 14:32 IST")).unwrap(), expected);
        assert_eq!(n.parse(&text("May 10, 2025 09:02 UTC")).unwrap(), expected);
    }

    #[test]
    fn test_date_only_is_midnight() {
        let dt = normalizer().parse(&text("2025-05-10")).unwrap();
        assert_eq!(dt, ist().with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_structured_inputs() {
        let n = normalizer();
        let naive = NaiveDate::from_ymd_opt(2025, 5, 10)
            .unwrap()
            .and_hms_opt(14, 32, 0)
            .unwrap();
        let expected = ist().with_ymd_and_hms(2025, 5, 10, 14, 32, 0).unwrap();
        assert_eq!(n.parse(&RawTime::Naive(naive)).unwrap(), expected);

        let utc = FixedOffset::east_opt(0).unwrap();
        let aware = utc.with_ymd_and_hms(2025, 5, 10, 9, 2, 0).unwrap();
        let converted = n.parse(&RawTime::Aware(aware)).unwrap();
        assert_eq!(converted, expected);
        assert_eq!(converted.offset().local_minus_utc(), 19800);
    }
}
