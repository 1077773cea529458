//! Profile persistence
//!
//! Stores are read and written wholesale: `save` replaces the whole mapping
//! with whatever the caller built, there is no partial merge.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{ColloquyError, Result};

use super::set::ProfileSet;

/// External key-value store holding the profile mapping
pub trait ProfileStore: Send + Sync {
    /// Load the stored mapping, `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ProfileSet>>;

    /// Replace the stored mapping.
    fn save(&self, profiles: &ProfileSet) -> Result<()>;

    /// Load the mapping, treating "nothing stored" as an empty set.
    fn load_or_default(&self) -> Result<ProfileSet> {
        Ok(self.load()?.unwrap_or_default())
    }
}

/// In-process store, mostly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    inner: RwLock<Option<ProfileSet>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `profiles`
    pub fn with_profiles(profiles: ProfileSet) -> Self {
        Self {
            inner: RwLock::new(Some(profiles)),
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self) -> Result<Option<ProfileSet>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| ColloquyError::Storage("profile store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, profiles: &ProfileSet) -> Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| ColloquyError::Storage("profile store lock poisoned".to_string()))?;
        *guard = Some(profiles.clone());
        Ok(())
    }
}

/// Profiles kept in a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileProfileStore {
    path: PathBuf,
}

impl JsonFileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<data_dir>/colloquy/profiles.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no data directory.
    pub fn default_path() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("colloquy").join("profiles.json"))
            .ok_or_else(|| {
                ColloquyError::Configuration("no data directory on this platform".to_string())
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for JsonFileProfileStore {
    fn load(&self) -> Result<Option<ProfileSet>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no profile file yet");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        let profiles: ProfileSet = serde_json::from_str(&raw).map_err(|e| {
            ColloquyError::Storage(format!(
                "Failed to parse profile file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), count = profiles.len(), "loaded profiles");
        Ok(Some(profiles))
    }

    fn save(&self, profiles: &ProfileSet) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(profiles)?;

        // Uniquely named and created 0600, so keys are never readable by others
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!(path = %self.path.display(), count = profiles.len(), "saved profiles");
        Ok(())
    }
}
