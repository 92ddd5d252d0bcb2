//! Durable storage for workout records.
//!
//! Records are stored as comma-separated rows in one of two layouts:
//! - `delimited`: `date,exercise,duration,calories` per line, no header
//! - `tabular`: a header row naming the four columns, then one row per record
//!
//! Both layouts use standard CSV quoting, so exercise names containing commas
//! or quotes round-trip. Saves replace the whole file atomically.

use crate::types::{is_blank, parse_date};
use crate::{Error, Result, WorkoutRecord};
use csv::StringRecord;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Column names written in the tabular header
pub const TABULAR_HEADER: [&str; 4] = ["Date", "Exercise Type", "Duration (min)", "Calories Burned"];

const FIELD_COUNT: usize = 4;

/// Persistence backend for the record store
pub trait RecordStorage {
    /// Read every stored record.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<WorkoutRecord>>>;

    /// Replace stored contents with `records`
    fn save(&self, records: &[WorkoutRecord]) -> Result<()>;

    /// Where the records live, for diagnostics
    fn location(&self) -> &Path;
}

/// On-disk row layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageFormat {
    Delimited,
    #[default]
    Tabular,
}

impl StorageFormat {
    /// File name used when none is configured
    pub fn default_file_name(&self) -> &'static str {
        match self {
            StorageFormat::Delimited => "workouts.txt",
            StorageFormat::Tabular => "workouts.csv",
        }
    }

    fn has_header(&self) -> bool {
        matches!(self, StorageFormat::Tabular)
    }
}

impl FromStr for StorageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "delimited" => Ok(StorageFormat::Delimited),
            "tabular" => Ok(StorageFormat::Tabular),
            other => Err(Error::Config(format!("Unknown storage format: {}", other))),
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageFormat::Delimited => f.write_str("delimited"),
            StorageFormat::Tabular => f.write_str("tabular"),
        }
    }
}

/// What to do with a stored row that cannot be turned into a record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Fail the whole load on the first bad row
    #[default]
    Abort,
    /// Log a warning and continue with the next row
    Skip,
}

impl FromStr for MalformedRowPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(MalformedRowPolicy::Abort),
            "skip" => Ok(MalformedRowPolicy::Skip),
            other => Err(Error::Config(format!("Unknown malformed-row policy: {}", other))),
        }
    }
}

/// A row as written to disk
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    exercise_type: &'a str,
    duration_minutes: u32,
    calories_burned: u32,
}

impl<'a> From<&'a WorkoutRecord> for CsvRow<'a> {
    fn from(record: &'a WorkoutRecord) -> Self {
        CsvRow {
            date: record.date_string(),
            exercise_type: &record.exercise_type,
            duration_minutes: record.duration_minutes,
            calories_burned: record.calories_burned,
        }
    }
}

/// File-backed storage in either layout
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
    format: StorageFormat,
    on_malformed: MalformedRowPolicy,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>, format: StorageFormat) -> Self {
        Self {
            path: path.into(),
            format,
            on_malformed: MalformedRowPolicy::default(),
        }
    }

    /// Headerless one-row-per-record file
    pub fn delimited(path: impl Into<PathBuf>) -> Self {
        Self::new(path, StorageFormat::Delimited)
    }

    /// CSV file with a header row
    pub fn tabular(path: impl Into<PathBuf>) -> Self {
        Self::new(path, StorageFormat::Tabular)
    }

    pub fn with_policy(mut self, on_malformed: MalformedRowPolicy) -> Self {
        self.on_malformed = on_malformed;
        self
    }

    pub fn format(&self) -> StorageFormat {
        self.format
    }

    pub fn policy(&self) -> MalformedRowPolicy {
        self.on_malformed
    }

    fn read_error(&self, line: Option<usize>, reason: impl Into<String>) -> Error {
        Error::StorageRead {
            path: self.path.clone(),
            line,
            reason: reason.into(),
        }
    }

    fn write_error(&self, source: io::Error) -> Error {
        Error::StorageWrite {
            path: self.path.clone(),
            source,
        }
    }

    fn check_header(&self, header: &StringRecord) -> Result<()> {
        let matches = header.len() == FIELD_COUNT
            && header
                .iter()
                .zip(TABULAR_HEADER)
                .all(|(found, expected)| found.trim().eq_ignore_ascii_case(expected));
        if matches {
            Ok(())
        } else {
            Err(self.read_error(
                Some(1),
                format!("unexpected header {:?}", header.iter().collect::<Vec<_>>()),
            ))
        }
    }

    /// Sidecar file used for advisory locking, `<file>.lock`
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn open_lock(&self) -> io::Result<std::fs::File> {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(self.lock_path())
    }

    fn write_rows(&self, file: &std::fs::File, records: &[WorkoutRecord]) -> io::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(io::BufWriter::new(file));

        if self.format.has_header() {
            writer.write_record(TABULAR_HEADER)?;
        }
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }

        writer.flush()?;
        let mut inner = writer
            .into_inner()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        inner.flush()?;
        Ok(())
    }
}

impl RecordStorage for FileStorage {
    fn load(&self) -> Result<Option<Vec<WorkoutRecord>>> {
        if !self.path.exists() {
            tracing::info!("No workout file at {:?}, starting empty", self.path);
            return Ok(None);
        }

        // Readers proceed unlocked if the sidecar cannot be created (read-only dir)
        let lock = match self.open_lock().and_then(|f| f.lock_shared().map(|_| f)) {
            Ok(lock) => Some(lock),
            Err(e) => {
                tracing::debug!("Reading {:?} without lock: {}", self.path, e);
                None
            }
        };

        let file = std::fs::File::open(&self.path).map_err(|e| self.read_error(None, e.to_string()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.format.has_header())
            .flexible(true)
            .from_reader(io::BufReader::new(file));

        if self.format.has_header() {
            let header = reader
                .headers()
                .map_err(|e| self.read_error(Some(1), e.to_string()))?
                .clone();
            // An empty file has no header yet
            if !header.is_empty() {
                self.check_header(&header)?;
            }
        }

        let mut records = Vec::new();
        let mut skipped = 0;
        for row in reader.records() {
            let parsed = match row {
                Ok(row) => parse_row(&row).map_err(|reason| (row_line(row.position()), reason)),
                Err(e) if e.is_io_error() => {
                    return Err(self.read_error(row_line(e.position()), e.to_string()))
                }
                // Undecodable rows count as malformed, same as unparseable ones
                Err(e) => Err((row_line(e.position()), e.to_string())),
            };

            match parsed {
                Ok(record) => records.push(record),
                Err((line, reason)) => match self.on_malformed {
                    MalformedRowPolicy::Abort => return Err(self.read_error(line, reason)),
                    MalformedRowPolicy::Skip => {
                        tracing::warn!(
                            "Skipping malformed row at line {:?} of {:?}: {}",
                            line,
                            self.path,
                            reason
                        );
                        skipped += 1;
                    }
                },
            }
        }

        if let Some(lock) = lock {
            let _ = lock.unlock();
        }

        tracing::debug!(
            "Loaded {} workouts from {:?} ({} skipped)",
            records.len(),
            self.path,
            skipped
        );
        Ok(Some(records))
    }

    fn save(&self, records: &[WorkoutRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.write_error(e))?;

        // Held until the rename lands so concurrent saves and loads serialize
        let lock = self.open_lock().map_err(|e| self.write_error(e))?;
        lock.lock_exclusive().map_err(|e| self.write_error(e))?;

        // Temp file in the same directory so the final rename stays atomic
        let temp = NamedTempFile::new_in(&dir).map_err(|e| self.write_error(e))?;
        self.write_rows(temp.as_file(), records)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| self.write_error(e))?;

        temp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;
        lock.unlock().map_err(|e| self.write_error(e))?;

        tracing::debug!("Saved {} workouts to {:?}", records.len(), self.path);
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Turn one stored row into a record.
///
/// Stored rows are checked less strictly than new entries: zero duration or
/// calories is accepted, but the field count, date, exercise name and
/// non-negative integers are enforced.
fn parse_row(row: &StringRecord) -> std::result::Result<WorkoutRecord, String> {
    if row.len() != FIELD_COUNT {
        return Err(format!("expected {} fields, found {}", FIELD_COUNT, row.len()));
    }

    let date = parse_date(&row[0]).ok_or_else(|| format!("unparseable date {:?}", &row[0]))?;
    if is_blank(&row[1]) {
        return Err("empty exercise type".into());
    }
    let duration_minutes = parse_count(&row[2], "duration")?;
    let calories_burned = parse_count(&row[3], "calories")?;

    Ok(WorkoutRecord {
        date,
        exercise_type: row[1].to_string(),
        duration_minutes,
        calories_burned,
    })
}

fn row_line(position: Option<&csv::Position>) -> Option<usize> {
    position.map(|p| p.line() as usize)
}

fn parse_count(value: &str, name: &str) -> std::result::Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("{} is not a non-negative integer: {:?}", name, value))
}
