use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};
use crate::error::StoreError;
use crate::rules::ConfigRecord;

/// Default location of the saved configurations
pub const DEFAULT_STORE_PATH: &str = "faulty_technology.json";

/// Named configurations kept in a JSON file
#[derive(Debug, Clone, Default)]
pub struct SavedRuns {
    path: PathBuf,
    runs: BTreeMap<String, ConfigRecord>,
}

impl SavedRuns {
    /// Loads saved configurations, starting empty when the file does not exist yet
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved configurations yet");
                return Ok(Self { path, runs: BTreeMap::new() });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut runs: BTreeMap<String, ConfigRecord> = serde_json::from_str(&contents)?;
        for (name, record) in runs.iter_mut() {
            record.check().map_err(|source| StoreError::InvalidRecord {
                name: name.clone(),
                source,
            })?;
            *record = record.normalized();
        }
        info!(path = %path.display(), count = runs.len(), "loaded saved configurations");
        Ok(Self { path, runs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.runs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigRecord)> {
        self.runs.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn get(&self, name: &str) -> Option<ConfigRecord> {
        self.runs.get(name).copied()
    }

    /// The saved configuration when exactly one exists
    pub fn only(&self) -> Option<(&str, ConfigRecord)> {
        match self.runs.len() {
            1 => self.iter().next().map(|(name, record)| (name, *record)),
            _ => None,
        }
    }

    /// True when `name` already holds exactly this record
    pub fn is_saved(&self, name: &str, record: &ConfigRecord) -> bool {
        self.runs.get(name) == Some(record)
    }

    /// Stores a record under `name`, returning whether anything changed
    pub fn insert(&mut self, name: &str, record: ConfigRecord) -> bool {
        if self.is_saved(name, &record) {
            return false;
        }
        self.runs.insert(name.to_string(), record);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<ConfigRecord> {
        self.runs.remove(name)
    }

    /// Writes every configuration back to the file.
    /// An empty store only touches a file that already exists.
    pub fn save(&self) -> Result<(), StoreError> {
        if self.runs.is_empty() && !self.path.exists() {
            return Ok(());
        }
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.runs.serialize(&mut serializer)?;
        fs::write(&self.path, buffer).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), count = self.runs.len(), "saved configurations");
        Ok(())
    }
}
