//! The workout record store.
//!
//! `WorkoutStore` owns the ordered record collection and is the only place
//! it is mutated. Reads hand out borrowed snapshots; every failed operation
//! leaves the collection exactly as it was.

use crate::{Error, NewWorkout, RecordId, RecordStorage, Result, WorkoutRecord};
use chrono::NaiveDate;

/// Ordered, index-addressable workout collection backed by durable storage
#[derive(Debug)]
pub struct WorkoutStore<S> {
    storage: S,
    records: Vec<WorkoutRecord>,
    // Parallel to `records`: ids[i] identifies records[i]
    ids: Vec<RecordId>,
    next_id: u64,
}

impl<S: RecordStorage> WorkoutStore<S> {
    /// Open a store, loading any records already in `storage`.
    ///
    /// Absent storage yields an empty store. Malformed storage fails with
    /// `StorageRead` unless the backend is configured to skip bad rows.
    pub fn initialize(storage: S) -> Result<Self> {
        let records = storage.load()?.unwrap_or_default();
        tracing::info!(
            "Loaded {} workouts from {:?}",
            records.len(),
            storage.location()
        );

        let mut store = Self {
            storage,
            records: Vec::new(),
            ids: Vec::new(),
            next_id: 0,
        };
        store.replace_all(records);
        Ok(store)
    }

    /// Validate and append a workout, returning its index.
    ///
    /// Duration and calories must be at least 1 and the exercise type must
    /// be non-empty. On failure nothing is appended.
    pub fn add(
        &mut self,
        date: NaiveDate,
        exercise_type: impl Into<String>,
        duration_minutes: i64,
        calories_burned: i64,
    ) -> Result<usize> {
        self.add_new(NewWorkout::new(
            date,
            exercise_type,
            duration_minutes,
            calories_burned,
        ))
    }

    /// Validate and append prepared input, returning its index
    pub fn add_new(&mut self, input: NewWorkout) -> Result<usize> {
        let record = input.validate()?;
        tracing::debug!(
            "Adding workout {} on {} ({} min, {} kcal)",
            record.exercise_type,
            record.date_string(),
            record.duration_minutes,
            record.calories_burned
        );
        self.push(record);
        Ok(self.records.len() - 1)
    }

    /// Remove the record at `index`, shifting later records down by one
    pub fn remove_at(&mut self, index: usize) -> Result<WorkoutRecord> {
        if index >= self.records.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        self.ids.remove(index);
        let removed = self.records.remove(index);
        tracing::debug!("Removed workout at index {}", index);
        Ok(removed)
    }

    /// Remove the record identified by `id`
    pub fn remove(&mut self, id: RecordId) -> Result<WorkoutRecord> {
        let index = self.index_of(id).ok_or(Error::UnknownRecord(id))?;
        self.remove_at(index)
    }

    /// Drop every record
    pub fn clear(&mut self) {
        tracing::debug!("Clearing {} workouts", self.records.len());
        self.records.clear();
        self.ids.clear();
    }

    /// Read-only view of all records, oldest first
    pub fn list(&self) -> &[WorkoutRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&WorkoutRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stable id of the record currently at `index`
    pub fn id_at(&self, index: usize) -> Option<RecordId> {
        self.ids.get(index).copied()
    }

    /// Current position of the record with `id`
    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.ids.iter().position(|&candidate| candidate == id)
    }

    /// Write the whole collection to storage, replacing what was there.
    ///
    /// A failed write leaves the in-memory collection untouched.
    pub fn persist(&self) -> Result<()> {
        self.storage.save(&self.records)?;
        tracing::info!(
            "Persisted {} workouts to {:?}",
            self.records.len(),
            self.storage.location()
        );
        Ok(())
    }

    /// Re-read storage, discarding unsaved changes.
    ///
    /// If the read fails the current collection is kept as is. Previously
    /// issued ids are not reused.
    pub fn reload(&mut self) -> Result<()> {
        let records = self.storage.load()?.unwrap_or_default();
        self.replace_all(records);
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn replace_all(&mut self, records: Vec<WorkoutRecord>) {
        self.clear();
        for record in records {
            self.push(record);
        }
    }

    fn push(&mut self, record: WorkoutRecord) {
        self.ids.push(RecordId(self.next_id));
        self.next_id += 1;
        self.records.push(record);
    }
}
