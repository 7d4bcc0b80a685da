//! Address map persisted as a JSON array of records.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use addrmap_core::{AddressMap, AddressMapStore, AddressUpdate, RecordKey, StoreError};
use anyhow::{Context, Result};

/// Address-map store that rewrites its backing file after every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMapFile {
    path: PathBuf,
    map: AddressMap,
}

impl AddressMapFile {
    /// Loads the map at `path`; a missing file starts an empty map.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("invalid address map {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => AddressMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read address map {}", path.display()))
            }
        };
        Ok(Self { path, map })
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory contents.
    #[must_use]
    pub const fn map(&self) -> &AddressMap {
        &self.map
    }

    /// Consumes the store, returning its in-memory contents.
    #[must_use]
    pub fn into_map(self) -> AddressMap {
        self.map
    }

    /// Writes the current contents to the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when serialization or the write fails.
    pub fn save(&self) -> Result<(), StoreError> {
        let mut text = serde_json::to_string_pretty(&self.map).map_err(StoreError::new)?;
        text.push('\n');
        fs::write(&self.path, text)
            .map_err(|err| StoreError::new(format!("{}: {err}", self.path.display())))
    }
}

impl AddressMapStore for AddressMapFile {
    fn update(&mut self, key: &RecordKey<'_>, update: &AddressUpdate) -> Result<(), StoreError> {
        self.map.update(key, update)?;
        self.save()
    }
}
