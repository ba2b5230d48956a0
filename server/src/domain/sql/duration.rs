//! Trace duration bounds (`500ms`, `2s`, `100us`)

use std::time::Duration;

/// Accepted unit suffixes, longest first so `ms` wins over `s`.
/// The last column is how many fractional digits fit in nanoseconds.
const UNITS: &[(&str, &str, usize)] = &[
    ("ms", "ms", 6),
    ("us", "us", 3),
    ("µs", "us", 3),
    ("s", "s", 9),
];

/// Parse a duration bound into microseconds, rounded to the nearest one.
///
/// The magnitude is a non-negative decimal (`1.5s`, `.25ms`) followed
/// directly by one of `ms`, `us`, `µs` or `s`. Anything else yields `0`,
/// which callers treat as "no bound" rather than an error.
pub fn parse_duration_micros(input: &str) -> i64 {
    let input = input.trim();

    let Some((magnitude, unit, scale)) = UNITS
        .iter()
        .find_map(|(suffix, unit, scale)| input.strip_suffix(suffix).map(|m| (m, *unit, *scale)))
    else {
        return 0;
    };

    let (whole, fraction) = magnitude.split_once('.').unwrap_or((magnitude, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits(whole) || !digits(fraction) {
        return 0;
    }

    // fraction of the unit, expressed in nanoseconds
    let mut nanos: String = fraction.chars().take(scale).collect();
    while nanos.len() < scale {
        nanos.push('0');
    }
    let whole = if whole.is_empty() { "0" } else { whole };

    humantime::parse_duration(&format!("{whole}{unit} {nanos}ns"))
        .map(|d: Duration| {
            let micros = (d.as_nanos() + 500) / 1_000;
            i64::try_from(micros).unwrap_or(i64::MAX)
        })
        .unwrap_or(0)
}
