//! Attendance status values and read-time statistics.

use serde::Serialize;

/// The user attended, or has confirmed they will attend.
pub const ATTENDANCE_ATTENDING: &str = "attending";

/// The user did not attend, or has said they will not.
pub const ATTENDANCE_NOT_ATTENDING: &str = "not_attending";

/// All valid non-null attendance statuses. `NULL` means unmarked.
pub const VALID_ATTENDANCE_STATUSES: &[&str] = &[ATTENDANCE_ATTENDING, ATTENDANCE_NOT_ATTENDING];

/// Validate an attendance status. `None` (unmarked) is always valid.
pub fn validate_attendance_status(status: Option<&str>) -> Result<(), String> {
    match status {
        None => Ok(()),
        Some(s) if VALID_ATTENDANCE_STATUSES.contains(&s) => Ok(()),
        Some(s) => Err(format!(
            "Invalid attendance status '{s}'. Must be one of: {} (or null)",
            VALID_ATTENDANCE_STATUSES.join(", ")
        )),
    }
}

/// Aggregate counts over a set of attendance rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub attending: i64,
    pub not_attending: i64,
    pub unmarked: i64,
    pub total: i64,
}

impl AttendanceStats {
    /// Count statuses. Unknown values are treated as unmarked.
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut stats = Self::default();
        for status in statuses {
            match status {
                Some(ATTENDANCE_ATTENDING) => stats.attending += 1,
                Some(ATTENDANCE_NOT_ATTENDING) => stats.not_attending += 1,
                _ => stats.unmarked += 1,
            }
            stats.total += 1;
        }
        stats
    }

    /// Whole-number percentage of all rows marked `attending`. Unmarked rows
    /// count against the rate. Zero when there are no rows.
    pub fn attendance_rate(&self) -> i64 {
        if self.total == 0 {
            return 0;
        }
        (self.attending as f64 / self.total as f64 * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_status_is_valid() {
        assert!(validate_attendance_status(None).is_ok());
    }

    #[test]
    fn test_known_statuses_valid() {
        assert!(validate_attendance_status(Some("attending")).is_ok());
        assert!(validate_attendance_status(Some("not_attending")).is_ok());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = validate_attendance_status(Some("late")).unwrap_err();
        assert!(err.contains("Invalid attendance status"));
    }

    #[test]
    fn test_stats_counts_each_bucket() {
        let rows = [
            Some("attending"),
            Some("attending"),
            Some("not_attending"),
            None,
        ];
        let stats = AttendanceStats::from_statuses(rows);
        assert_eq!(
            stats,
            AttendanceStats {
                attending: 2,
                not_attending: 1,
                unmarked: 1,
                total: 4,
            }
        );
    }

    #[test]
    fn test_stats_empty() {
        let stats = AttendanceStats::from_statuses(std::iter::empty());
        assert_eq!(stats, AttendanceStats::default());
        assert_eq!(stats.attendance_rate(), 0);
    }

    #[test]
    fn test_attendance_rate_counts_unmarked_rows() {
        let stats =
            AttendanceStats::from_statuses([Some("attending"), Some("not_attending"), None]);
        assert_eq!(stats.attendance_rate(), 33);
    }

    #[test]
    fn test_attendance_rate_rounds_half_up() {
        let stats = AttendanceStats::from_statuses([Some("attending"), None]);
        assert_eq!(stats.attendance_rate(), 50);
        let stats = AttendanceStats::from_statuses([
            Some("attending"),
            Some("attending"),
            None,
            None,
            None,
            None,
            None,
            None,
        ]);
        assert_eq!(stats.attendance_rate(), 25);
        let stats = AttendanceStats::from_statuses([Some("attending"), Some("attending"), None]);
        assert_eq!(stats.attendance_rate(), 67);
    }
}
