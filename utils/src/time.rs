//! Duration formatting for logs and CLI output.

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Render a window such as a voting period or installment spacing.
///
/// Whole days print as `7d`; otherwise the two most significant units are
/// shown (`2d 4h`, `3h 15m`, `45s`).
pub fn format_duration(secs: u64) -> String {
    if secs >= DAY {
        match (secs / DAY, (secs % DAY) / HOUR) {
            (d, 0) if secs % DAY == 0 => format!("{d}d"),
            (d, h) => format!("{d}d {h}h"),
        }
    } else if secs >= HOUR {
        format!("{}h {}m", secs / HOUR, (secs % HOUR) / MINUTE)
    } else if secs >= MINUTE {
        format!("{}m {}s", secs / MINUTE, secs % MINUTE)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voting_windows() {
        assert_eq!(format_duration(7 * DAY), "7d");
        assert_eq!(format_duration(3 * DAY), "3d");
    }

    #[test]
    fn uneven_spacing() {
        // 30 days split into 4 installments
        assert_eq!(format_duration(30 * DAY / 4), "7d 12h");
        assert_eq!(format_duration(DAY + 30 * MINUTE), "1d 0h");
        assert_eq!(format_duration(3 * HOUR + 15 * MINUTE), "3h 15m");
        assert_eq!(format_duration(45), "45s");
    }
}
