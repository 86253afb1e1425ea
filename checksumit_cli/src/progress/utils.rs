//! Human-readable sizes, rates and durations for summaries and progress bars

use std::time::Duration;

/// Format bytes with binary units, matching how capacities are reported
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} B")
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Format a rate given in MiB per second
pub fn format_throughput(mib_per_sec: f64) -> String {
    if mib_per_sec >= 1.0 {
        format!("{mib_per_sec:.1} MiB/s")
    } else {
        format!("{:.0} KiB/s", mib_per_sec * 1024.0)
    }
}

/// Throughput in MiB per second, zero for an instant run
pub fn throughput(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        (bytes as f64 / 1_048_576.0) / secs
    } else {
        0.0
    }
}

/// Format whole seconds as `1h 2m`, `3m 4s` or `5s`
pub fn format_duration(seconds: u64) -> String {
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    match (hours, minutes, secs) {
        (0, 0, s) => format!("{s}s"),
        (0, m, 0) => format!("{m}m"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, 0, _) => format!("{h}h"),
        (h, m, _) => format!("{h}h {m}m"),
    }
}

/// Format a [`Duration`], keeping sub-second precision for short runs
pub fn format_duration_from_duration(duration: Duration) -> String {
    if duration.as_secs() < 10 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format_duration(duration.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1048576), "1.00 MiB");
        assert_eq!(format_bytes(1073741824), "1.00 GiB");
    }

    #[test]
    fn test_format_throughput() {
        assert_eq!(format_throughput(0.5), "512 KiB/s");
        assert_eq!(format_throughput(1.0), "1.0 MiB/s");
        assert_eq!(format_throughput(100.5), "100.5 MiB/s");
        assert_eq!(throughput(1_048_576, Duration::ZERO), 0.0);
        assert_eq!(throughput(2 * 1_048_576, Duration::from_secs(2)), 1.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(60), "1m");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3600), "1h");
        assert_eq!(format_duration(3660), "1h 1m");
        assert_eq!(format_duration(7200), "2h");
        assert_eq!(format_duration_from_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration_from_duration(Duration::from_secs(75)), "1m 15s");
    }
}
