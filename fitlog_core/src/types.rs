//! Core domain types for workout tracking.
//!
//! This module defines:
//! - The workout record held by the store
//! - Stable record identifiers
//! - Validated construction from caller input

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical date format used whenever a date is written out
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date layouts accepted when reading, in the order they are tried.
///
/// `%y` must precede `%Y` so that `01/02/24` is not read as year 24.
const DATE_INPUT_FORMATS: &[&str] = &[DATE_FORMAT, "%m/%d/%y", "%m/%d/%Y"];

const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Record Types
// ============================================================================

/// A single logged workout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub date: NaiveDate,
    pub exercise_type: String,
    pub duration_minutes: u32,
    pub calories_burned: u32,
}

impl WorkoutRecord {
    /// The date rendered in canonical `YYYY-MM-DD` form
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Process-local identifier that survives index shifts.
///
/// Ids are handed out monotonically by the store and are never reused
/// within one store instance. They are not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub(crate) u64);

impl RecordId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Record fields, named as they appear in validation errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Date,
    ExerciseType,
    DurationMinutes,
    CaloriesBurned,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::ExerciseType => "exerciseType",
            Field::DurationMinutes => "durationMinutes",
            Field::CaloriesBurned => "caloriesBurned",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// Unvalidated workout input as supplied by a caller.
///
/// Numeric fields are signed so that negative entries can be reported as a
/// validation failure rather than being unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWorkout {
    pub date: NaiveDate,
    pub exercise_type: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
}

impl NewWorkout {
    pub fn new(
        date: NaiveDate,
        exercise_type: impl Into<String>,
        duration_minutes: i64,
        calories_burned: i64,
    ) -> Self {
        Self {
            date,
            exercise_type: exercise_type.into(),
            duration_minutes,
            calories_burned,
        }
    }

    /// Build input from raw form text.
    ///
    /// Numbers must be plain digit strings within entry range. Fields are
    /// checked fully in order, so the first offending field is reported.
    pub fn parse(date: &str, exercise_type: &str, duration: &str, calories: &str) -> Result<Self> {
        let date = parse_date(date).ok_or(Error::validation(Field::Date))?;
        if is_blank(exercise_type) {
            return Err(Error::validation(Field::ExerciseType));
        }
        let duration_minutes = parse_digits(duration, Field::DurationMinutes)?;
        let calories_burned = parse_digits(calories, Field::CaloriesBurned)?;

        Ok(Self::new(date, exercise_type, duration_minutes, calories_burned))
    }

    /// Check entry constraints and produce a record.
    ///
    /// Exercise type must be non-blank; duration and calories must be at
    /// least 1 and fit in a `u32`.
    pub fn validate(self) -> Result<WorkoutRecord> {
        if is_blank(&self.exercise_type) {
            return Err(Error::validation(Field::ExerciseType));
        }
        let duration_minutes = positive_u32(self.duration_minutes, Field::DurationMinutes)?;
        let calories_burned = positive_u32(self.calories_burned, Field::CaloriesBurned)?;

        Ok(WorkoutRecord {
            date: self.date,
            exercise_type: self.exercise_type,
            duration_minutes,
            calories_burned,
        })
    }
}

/// Parse a date in any accepted layout.
///
/// Accepts `YYYY-MM-DD`, `MM/DD/YY`, `MM/DD/YYYY` and `YYYY-MM-DD HH:MM:SS`
/// (the time part is dropped).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, DATETIME_INPUT_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn parse_digits(input: &str, field: Field) -> Result<i64> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(field));
    }
    let value = input.parse().map_err(|_| Error::validation(field))?;
    positive_u32(value, field)?;
    Ok(value)
}

fn positive_u32(value: i64, field: Field) -> Result<u32> {
    match u32::try_from(value) {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(Error::validation(field)),
    }
}
