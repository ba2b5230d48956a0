//! Histogram bucket selection

use chrono::{Months, NaiveDateTime, TimeDelta};

use super::params::{Interval, TimeUnit};
use crate::utils::time::parse_query_datetime;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Span threshold of an auto-interval row
#[derive(Clone, Copy)]
enum Span {
    Months(u32),
    Seconds(i64),
}

impl Span {
    fn covered_by(self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        match self {
            Self::Months(n) => start
                .checked_add_months(Months::new(n))
                .is_some_and(|threshold| end >= threshold),
            Self::Seconds(secs) => end - start >= TimeDelta::seconds(secs),
        }
    }
}

/// First row whose span the range reaches wins
const AUTO_TABLE: &[(Span, TimeUnit, i64)] = &[
    (Span::Months(36), TimeUnit::Month, 1),
    (Span::Months(12), TimeUnit::Week, 1),
    (Span::Months(1), TimeUnit::Day, 1),
    (Span::Seconds(7 * DAY), TimeUnit::Hour, 12),
    (Span::Seconds(4 * DAY), TimeUnit::Hour, 3),
    (Span::Seconds(DAY), TimeUnit::Hour, 1),
    (Span::Seconds(16 * HOUR), TimeUnit::Minute, 30),
    (Span::Seconds(8 * HOUR), TimeUnit::Minute, 10),
    (Span::Seconds(2 * HOUR), TimeUnit::Minute, 5),
    (Span::Seconds(38 * MINUTE), TimeUnit::Minute, 1),
    (Span::Seconds(13 * MINUTE), TimeUnit::Second, 30),
    (Span::Seconds(6 * MINUTE), TimeUnit::Second, 10),
    (Span::Seconds(4 * MINUTE), TimeUnit::Second, 5),
];

/// Resolve the bucket unit and width for a histogram.
///
/// A fixed interval passes through with `value`. `auto` picks from the range;
/// unparsable dates fall back to one-minute buckets.
pub fn resolve_interval(
    interval: Interval,
    value: i64,
    start_date: &str,
    end_date: &str,
) -> (TimeUnit, i64) {
    match interval {
        Interval::Fixed(unit) => (unit, value),
        Interval::Auto => {
            let (Some(start), Some(end)) = (
                parse_query_datetime(start_date),
                parse_query_datetime(end_date),
            ) else {
                tracing::debug!(start_date, end_date, "Unparsable range, using 1 minute buckets");
                return (TimeUnit::Minute, 1);
            };
            auto_interval(start, end)
        }
    }
}

fn auto_interval(start: NaiveDateTime, end: NaiveDateTime) -> (TimeUnit, i64) {
    AUTO_TABLE
        .iter()
        .find(|(span, _, _)| span.covered_by(start, end))
        .map(|(_, unit, n)| (*unit, *n))
        .unwrap_or((TimeUnit::Second, 1))
}
