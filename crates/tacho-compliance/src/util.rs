//! Small shared helpers for the compliance rules.

/// Render minutes as `HhMm`, e.g. `600` becomes `10h00m`.
pub fn format_hhmm(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    format!("{sign}{}h{:02}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_hhmm(0), "0h00m");
        assert_eq!(format_hhmm(540), "9h00m");
        assert_eq!(format_hhmm(600), "10h00m");
        assert_eq!(format_hhmm(75), "1h15m");
        assert_eq!(format_hhmm(-90), "-1h30m");
    }
}
