use chrono::{DateTime, TimeDelta};

use crate::config::Upstream;

/// Elapsed wall-clock span between two Unix-second timestamps.
///
/// `None` when either timestamp falls outside the representable range.
fn span(from: i64, to: i64) -> Option<TimeDelta> {
    let from = DateTime::from_timestamp(from, 0)?;
    let to = DateTime::from_timestamp(to, 0)?;
    Some(to - from)
}

/// Map a UDF resolution and `[from, to]` range onto the upstream's
/// `(size, period)` pair. An empty period means the resolution is unsupported.
pub fn time_diff(upstream: Upstream, resolution: &str, from: i64, to: i64) -> (i64, &'static str) {
    match upstream {
        Upstream::Zg => zg_time_diff(resolution, from, to),
        Upstream::Huobi => huobi_time_diff(resolution, from, to),
    }
}

/// Bar counts truncate toward zero, so a reversed range yields a negative size.
pub fn zg_time_diff(resolution: &str, from: i64, to: i64) -> (i64, &'static str) {
    let Some(diff) = span(from, to) else {
        return (0, "");
    };

    match resolution {
        "1" => (diff.num_minutes(), "1min"),
        "5" => (diff.num_hours() * 12, "5min"),
        "15" => (diff.num_hours() * 4, "15min"),
        "30" => (diff.num_hours() * 2, "30min"),
        "60" => (diff.num_hours(), "hour"),
        "D" => (diff.num_days(), "day"),
        "W" => (diff.num_weeks(), "week"),
        _ => (0, ""),
    }
}

/// Daily bars only. Whole elapsed hours are rounded up to days; an empty or
/// reversed range asks for one bar.
pub fn huobi_time_diff(resolution: &str, from: i64, to: i64) -> (i64, &'static str) {
    if resolution != "D" {
        return (0, "");
    }
    let Some(diff) = span(from, to) else {
        return (0, "");
    };

    if diff <= TimeDelta::zero() {
        return (1, "1day");
    }

    let hours = diff.num_hours();
    let size = if hours % 24 != 0 { hours / 24 + 1 } else { hours / 24 };
    (size, "1day")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZG_CODES: [&str; 7] = ["1", "5", "15", "30", "60", "D", "W"];

    #[test]
    fn zg_hourly_range() {
        assert_eq!(zg_time_diff("60", 0, 7200), (2, "hour"));
    }

    #[test]
    fn zg_units_per_resolution() {
        let day = 86_400;
        assert_eq!(zg_time_diff("1", 0, 3600), (60, "1min"));
        assert_eq!(zg_time_diff("5", 0, 3600), (12, "5min"));
        assert_eq!(zg_time_diff("15", 0, 3600), (4, "15min"));
        assert_eq!(zg_time_diff("30", 0, 3600), (2, "30min"));
        assert_eq!(zg_time_diff("D", 0, 3 * day), (3, "day"));
        assert_eq!(zg_time_diff("W", 0, 15 * day), (2, "week"));
    }

    #[test]
    fn zg_truncates_partial_units() {
        // 1h59m: the five-minute count scales whole hours only.
        assert_eq!(zg_time_diff("5", 0, 7140), (12, "5min"));
        assert_eq!(zg_time_diff("60", 0, 7199), (1, "hour"));
        assert_eq!(zg_time_diff("D", 0, 86_399), (0, "day"));
    }

    #[test]
    fn zg_reversed_range_passes_negative_size() {
        assert_eq!(zg_time_diff("60", 7200, 0), (-2, "hour"));
    }

    #[test]
    fn zg_unknown_resolution() {
        assert_eq!(zg_time_diff("120", 0, 7200), (0, ""));
        assert_eq!(zg_time_diff("240", 0, 7200), (0, ""));
        assert_eq!(zg_time_diff("", 0, 7200), (0, ""));
    }

    #[test]
    fn zg_supported_codes_are_non_negative() {
        let ranges = [(0, 0), (0, 59), (1_600_000_000, 1_700_000_000), (10, 10_000_000)];
        for code in ZG_CODES {
            for (from, to) in ranges {
                let (size, period) = zg_time_diff(code, from, to);
                assert!(size >= 0, "{code} {from}..{to} gave {size}");
                assert!(!period.is_empty(), "{code} gave empty period");
            }
        }
    }

    #[test]
    fn huobi_rounds_partial_days_up() {
        assert_eq!(huobi_time_diff("D", 0, 90_000), (2, "1day"));
        assert_eq!(huobi_time_diff("D", 0, 86_400), (1, "1day"));
        assert_eq!(huobi_time_diff("D", 0, 3600), (1, "1day"));
    }

    #[test]
    fn huobi_counts_whole_hours_only() {
        // 24.5h is 24 whole hours, exactly one day.
        assert_eq!(huobi_time_diff("D", 0, 88_200), (1, "1day"));
        // Under an hour rounds to zero hours, so zero days.
        assert_eq!(huobi_time_diff("D", 0, 1800), (0, "1day"));
    }

    #[test]
    fn huobi_non_positive_range_asks_for_one_bar() {
        assert_eq!(huobi_time_diff("D", 100, 50), (1, "1day"));
        assert_eq!(huobi_time_diff("D", 100, 100), (1, "1day"));
    }

    #[test]
    fn huobi_only_serves_daily_bars() {
        assert_eq!(huobi_time_diff("60", 0, 90_000), (0, ""));
        assert_eq!(huobi_time_diff("W", 0, 90_000), (0, ""));
    }

    #[test]
    fn out_of_range_timestamps_are_unsupported() {
        assert_eq!(zg_time_diff("60", i64::MIN, i64::MAX), (0, ""));
        assert_eq!(huobi_time_diff("D", 0, i64::MAX), (0, ""));
    }

    #[test]
    fn dispatch_follows_upstream() {
        assert_eq!(time_diff(Upstream::Zg, "D", 0, 90_000), (1, "day"));
        assert_eq!(time_diff(Upstream::Huobi, "D", 0, 90_000), (2, "1day"));
    }
}
