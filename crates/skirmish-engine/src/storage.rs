//! File-backed key/value store.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file
//! first and are renamed into place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use skirmish_common::{StoreError, StoreResult};
use skirmish_gameplay::KeyValueStore;

/// Directory of JSON files keyed by name.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Checks that a key maps to a plain file name.
    fn validate_key(key: &str) -> StoreResult<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.tmp"))
    }

    fn io_error(key: &str, source: io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Self::validate_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        Self::validate_key(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;

        let temp_path = self.temp_path_for(key);
        let final_path = self.path_for(key);

        let mut file = fs::File::create(&temp_path).map_err(|e| Self::io_error(key, e))?;
        file.write_all(value.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| Self::io_error(key, e))?;
        drop(file);

        fs::rename(&temp_path, &final_path).map_err(|e| Self::io_error(key, e))?;
        debug!("Wrote {}", final_path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        Self::validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}
