//! ISO week keys identifying a weekly content cycle.

use chrono::{DateTime, Datelike, Utc};

/// Week key for the current UTC instant, e.g. `2026-W35`.
#[must_use]
pub fn current_week_key() -> String {
    week_key_for(Utc::now())
}

/// Week key (`YYYY-Www`) for an arbitrary instant, using the ISO week-based
/// year so late-December / early-January dates land in the right cycle.
#[must_use]
pub fn week_key_for(at: DateTime<Utc>) -> String {
    let iso = at.iso_week();
    format!("{:04}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn week_key_is_zero_padded() {
        let early_jan = Utc.with_ymd_and_hms(2026, 1, 7, 12, 0, 0).unwrap();
        assert_eq!(week_key_for(early_jan), "2026-W02");
    }

    #[test]
    fn year_boundary_uses_iso_week_year() {
        // 2026-01-01 is a Thursday of ISO week 1 of 2026.
        let new_year = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(week_key_for(new_year), "2026-W01");
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025.
        let spillover = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        assert_eq!(week_key_for(spillover), "2025-W01");
    }
}
