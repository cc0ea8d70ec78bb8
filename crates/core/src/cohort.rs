//! Cohort defaults: capacity and display colour palette.

use std::sync::LazyLock;

use regex::Regex;

/// Capacity assigned to a cohort when none is given.
pub const DEFAULT_COHORT_CAPACITY: i32 = 10;

/// Colours handed out to new cohorts in rotation.
pub const COHORT_COLOR_PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
    "#F8B88B", "#ABEBC6",
];

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

/// Colour for the `existing_count`-th cohort (zero-based), cycling the palette.
pub fn color_for_index(existing_count: i64) -> &'static str {
    let idx = existing_count.rem_euclid(COHORT_COLOR_PALETTE.len() as i64) as usize;
    COHORT_COLOR_PALETTE[idx]
}

/// Validate a `#RRGGBB` colour string.
pub fn validate_color(color: &str) -> Result<(), String> {
    if HEX_COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(format!("Invalid color '{color}'. Expected #RRGGBB"))
    }
}

/// Cohort capacity must be a positive integer.
pub fn validate_capacity(capacity: i32) -> Result<(), String> {
    if capacity > 0 {
        Ok(())
    } else {
        Err(format!("capacity must be a positive integer, got {capacity}"))
    }
}

/// Whether a cohort has reached its advisory capacity.
///
/// Enrollment still succeeds past this point; admins may place students
/// beyond capacity.
pub fn is_at_capacity(capacity: i32, enrolled: i64) -> bool {
    enrolled >= i64::from(capacity)
}
