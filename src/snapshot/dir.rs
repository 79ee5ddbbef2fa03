use super::SnapshotSource;
use crate::dataset::pick::RawRow;
use crate::errors::{DashError, DashResult};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const EXTENSION: &str = ".json";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Snapshots stored as `<dir>/<prefix>YYYY-MM-DD.json`, one file per date.
///
/// File content is either a JSON array of row objects, or the
/// column-oriented layout `{"col": {"0": v, ...}}` / `{"col": [v, ...]}`.
#[derive(Debug, Clone)]
pub struct DirSnapshotSource {
    dir: PathBuf,
    prefix: String,
}

impl DirSnapshotSource {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}{}{EXTENSION}", self.prefix, date.format(DATE_FORMAT)))
    }

    /// Date encoded in a snapshot file name, if the name matches the pattern.
    fn date_from_name(&self, name: &str) -> Option<NaiveDate> {
        let stem = name.strip_prefix(&self.prefix)?.strip_suffix(EXTENSION)?;
        NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
    }

    /// Matching snapshot files with their dates, unsorted.
    fn snapshot_entries(&self) -> DashResult<Vec<(NaiveDate, std::fs::DirEntry)>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "snapshot directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(DashError::Io(format!("{}: {e}", self.dir.display()))),
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(date) = name.to_str().and_then(|n| self.date_from_name(n)) {
                found.push((date, entry));
            }
        }
        Ok(found)
    }
}

impl SnapshotSource for DirSnapshotSource {
    fn list_available_dates(&self) -> DashResult<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self
            .snapshot_entries()?
            .into_iter()
            .map(|(date, _)| date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    fn load_rows(&self, date: NaiveDate) -> DashResult<Option<Vec<RawRow>>> {
        let path = self.path_for(date);
        let body = match std::fs::read_to_string(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DashError::Io(format!("{}: {e}", path.display()))),
        };
        let value: Value = serde_json::from_str(&body)?;
        parse_rows(value).map(Some)
    }

    fn revision(&self) -> Option<u64> {
        let mut entries = self.snapshot_entries().ok()?;
        entries.sort_by_key(|(date, _)| *date);

        let mut hasher = DefaultHasher::new();
        for (date, entry) in &entries {
            date.hash(&mut hasher);
            if let Ok(meta) = entry.metadata() {
                meta.len().hash(&mut hasher);
                if let Ok(modified) = meta.modified() {
                    modified.hash(&mut hasher);
                }
            }
        }
        Some(hasher.finish())
    }
}

/// Turn a parsed snapshot document into rows.
pub fn parse_rows(value: Value) -> DashResult<Vec<RawRow>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(DashError::Parse(format!(
                    "row {i} is not an object: {other}"
                ))),
            })
            .collect(),
        Value::Object(columns) => transpose_columns(columns),
        other => Err(DashError::Parse(format!(
            "snapshot must be an array or object, got {}",
            type_name(&other)
        ))),
    }
}

/// Column-oriented document to rows, ordered by row index.
fn transpose_columns(columns: serde_json::Map<String, Value>) -> DashResult<Vec<RawRow>> {
    let mut rows: BTreeMap<u64, RawRow> = BTreeMap::new();

    for (column, cells) in columns {
        match cells {
            Value::Array(values) => {
                for (i, v) in values.into_iter().enumerate() {
                    rows.entry(i as u64).or_default().insert(column.clone(), v);
                }
            }
            Value::Object(indexed) => {
                for (key, v) in indexed {
                    let i = key.parse::<u64>().map_err(|_| {
                        DashError::Parse(format!("column {column}: bad row index {key:?}"))
                    })?;
                    rows.entry(i).or_default().insert(column.clone(), v);
                }
            }
            other => {
                return Err(DashError::Parse(format!(
                    "column {column} must be an array or object, got {}",
                    type_name(&other)
                )))
            }
        }
    }

    Ok(rows.into_values().collect())
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
