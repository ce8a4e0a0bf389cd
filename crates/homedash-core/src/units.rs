// ── Unit formatters ──
//
// Pure display helpers. All rate values flowing through the engine are
// bytes per second; formatting to bits happens here and nowhere else.

use chrono::{DateTime, Utc};

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;
const TB: f64 = GB * 1024.0;

/// `1536` -> `"1.5 KiB"`.
pub fn format_bytes(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let b = bytes as f64;
    if b >= TB {
        format!("{:.2} TiB", b / TB)
    } else if b >= GB {
        format!("{:.2} GiB", b / GB)
    } else if b >= MB {
        format!("{:.1} MiB", b / MB)
    } else if b >= KB {
        format!("{:.1} KiB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Bytes/sec -> human bits/sec, e.g. `"12.5 Mbps"`.
pub fn format_rate_bps(bytes_per_sec: f64) -> String {
    let bits = bytes_per_sec.max(0.0) * 8.0;
    if bits >= 1e9 {
        format!("{:.2} Gbps", bits / 1e9)
    } else if bits >= 1e6 {
        format!("{:.1} Mbps", bits / 1e6)
    } else if bits >= 1e3 {
        format!("{:.1} Kbps", bits / 1e3)
    } else {
        format!("{bits:.0} bps")
    }
}

/// `93784` -> `"1d 2h 3m"`; sub-minute durations render as seconds.
pub fn format_duration_secs(secs: i64) -> String {
    if secs < 0 {
        return "-".into();
    }
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}

/// `"3h ago"`, `"2d ago"`, or `"in 5h"` for future instants.
pub fn format_relative(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(instant);
    let (secs, future) = if delta.num_seconds() < 0 {
        (-delta.num_seconds(), true)
    } else {
        (delta.num_seconds(), false)
    };

    let body = if secs < 60 {
        "just now".to_owned()
    } else if secs < 3_600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3_600)
    } else {
        format!("{}d", secs / 86_400)
    };

    match (future, body.as_str()) {
        (_, "just now") => body,
        (true, _) => format!("in {body}"),
        (false, _) => format!("{body} ago"),
    }
}

/// Progress fraction (0..=1) to a whole-number percent string.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn bytes_pick_the_right_magnitude() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1_536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
        assert_eq!(format_bytes(5_368_709_120), "5.00 GiB");
    }

    #[test]
    fn rates_render_in_bits() {
        assert_eq!(format_rate_bps(1_250_000.0), "10.0 Mbps");
        assert_eq!(format_rate_bps(125.0), "1.0 Kbps");
        assert_eq!(format_rate_bps(0.0), "0 bps");
    }

    #[test]
    fn negative_rates_render_as_zero() {
        assert_eq!(format_rate_bps(-500.0), "0 bps");
    }

    #[test]
    fn durations_collapse_small_units() {
        assert_eq!(format_duration_secs(45), "45s");
        assert_eq!(format_duration_secs(150), "2m");
        assert_eq!(format_duration_secs(3_720), "1h 2m");
        assert_eq!(format_duration_secs(93_784), "1d 2h 3m");
        assert_eq!(format_duration_secs(-1), "-");
    }

    #[test]
    fn relative_times_cover_past_present_and_future() {
        let now = Utc::now();
        assert_eq!(format_relative(now, now), "just now");
        assert_eq!(format_relative(now - TimeDelta::hours(3), now), "3h ago");
        assert_eq!(format_relative(now - TimeDelta::days(2), now), "2d ago");
        assert_eq!(format_relative(now + TimeDelta::hours(5), now), "in 5h");
    }

    #[test]
    fn percent_clamps_out_of_range_fractions() {
        assert_eq!(format_percent(0.425), "42%");
        assert_eq!(format_percent(1.7), "100%");
        assert_eq!(format_percent(-0.1), "0%");
    }
}
