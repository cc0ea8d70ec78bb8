//! Weekly availability grid.
//!
//! A grid is 7 day rows (Monday first) of 33 half-hour slots covering
//! 06:00 to 22:00 inclusive. Per-date overrides replace the weekly pattern
//! for a single calendar date and are keyed `YYYY-MM-DD`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Rows in a weekly grid.
pub const DAYS_PER_WEEK: usize = 7;

/// First slot starts at this hour.
pub const FIRST_SLOT_HOUR: u32 = 6;

/// Last slot starts at this hour.
pub const LAST_SLOT_HOUR: u32 = 22;

/// Half-hour slots per day, 06:00 through 22:00 inclusive.
pub const SLOTS_PER_DAY: usize = ((LAST_SLOT_HOUR - FIRST_SLOT_HOUR) * 2 + 1) as usize;

pub type Grid = Vec<Vec<bool>>;

/// The persisted availability document for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityGrid {
    pub weekly_grid: Grid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consult_available_grid: Option<Grid>,
    #[serde(default)]
    pub date_overrides: BTreeMap<String, Grid>,
}

impl Default for AvailabilityGrid {
    fn default() -> Self {
        Self {
            weekly_grid: empty_grid(),
            consult_available_grid: None,
            date_overrides: BTreeMap::new(),
        }
    }
}

impl AvailabilityGrid {
    /// Check every grid in the document for shape.
    pub fn validate(&self) -> Result<(), String> {
        validate_weekly_grid(&self.weekly_grid).map_err(|e| format!("weekly_grid: {e}"))?;
        if let Some(consult) = &self.consult_available_grid {
            validate_weekly_grid(consult).map_err(|e| format!("consult_available_grid: {e}"))?;
        }
        for (date, grid) in &self.date_overrides {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| format!("date_overrides: invalid date key '{date}'"))?;
            validate_override_grid(grid).map_err(|e| format!("date_overrides[{date}]: {e}"))?;
        }
        Ok(())
    }

    /// Number of selected slots in the weekly grid.
    pub fn weekly_slot_count(&self) -> usize {
        count_selected(&self.weekly_grid)
    }
}

/// A 7x33 grid with nothing selected.
pub fn empty_grid() -> Grid {
    vec![vec![false; SLOTS_PER_DAY]; DAYS_PER_WEEK]
}

/// Weekly grids must be exactly 7 rows of 33 slots.
pub fn validate_weekly_grid(grid: &Grid) -> Result<(), String> {
    if grid.len() != DAYS_PER_WEEK {
        return Err(format!(
            "expected {DAYS_PER_WEEK} day rows, got {}",
            grid.len()
        ));
    }
    validate_rows(grid)
}

/// Overrides carry between 1 and 7 rows of 33 slots.
pub fn validate_override_grid(grid: &Grid) -> Result<(), String> {
    if grid.is_empty() || grid.len() > DAYS_PER_WEEK {
        return Err(format!(
            "expected 1 to {DAYS_PER_WEEK} rows, got {}",
            grid.len()
        ));
    }
    validate_rows(grid)
}

fn validate_rows(grid: &Grid) -> Result<(), String> {
    for (i, row) in grid.iter().enumerate() {
        if row.len() != SLOTS_PER_DAY {
            return Err(format!(
                "row {i} has {} slots, expected {SLOTS_PER_DAY}",
                row.len()
            ));
        }
    }
    Ok(())
}

pub fn count_selected(grid: &Grid) -> usize {
    grid.iter().flatten().filter(|s| **s).count()
}

/// Start time of the slot at `index`, or `None` past the end of the day.
pub fn slot_start_time(index: usize) -> Option<NaiveTime> {
    if index >= SLOTS_PER_DAY {
        return None;
    }
    let minutes = FIRST_SLOT_HOUR * 60 + index as u32 * 30;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}
