//! Aggregate statistics over a record snapshot.
//!
//! Statistics are a pure function of the records passed in; nothing here
//! holds state between calls.

use crate::WorkoutRecord;
use serde::Serialize;
use std::fmt;

/// Aggregate metrics for a set of workouts
#[derive(Clone, Debug, PartialEq, Serialize, Default)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_duration_minutes: u64,
    pub total_calories_burned: u64,
    /// `total_duration_minutes / total_workouts`, or `0.0` when empty.
    pub average_duration_minutes: f64,
}

impl WorkoutStats {
    /// Average duration rounded to two decimal places
    pub fn average_duration_rounded(&self) -> f64 {
        (self.average_duration_minutes * 100.0).round() / 100.0
    }
}

impl fmt::Display for WorkoutStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Workouts: {}", self.total_workouts)?;
        writeln!(f, "Total Duration: {} min", self.total_duration_minutes)?;
        writeln!(f, "Total Calories Burned: {} kcal", self.total_calories_burned)?;
        write!(
            f,
            "Avg Duration per Workout: {:.2} min",
            self.average_duration_minutes
        )
    }
}

/// Compute count, totals and average duration for `records`.
///
/// Sums are accumulated in `u64` so they cannot overflow for any realistic
/// collection of `u32` fields.
pub fn compute_stats(records: &[WorkoutRecord]) -> WorkoutStats {
    let total_workouts = records.len();
    let (total_duration_minutes, total_calories_burned) =
        records.iter().fold((0u64, 0u64), |(duration, calories), r| {
            (
                duration + u64::from(r.duration_minutes),
                calories + u64::from(r.calories_burned),
            )
        });

    let average_duration_minutes = if total_workouts == 0 {
        0.0
    } else {
        total_duration_minutes as f64 / total_workouts as f64
    };

    WorkoutStats {
        total_workouts,
        total_duration_minutes,
        total_calories_burned,
        average_duration_minutes,
    }
}
