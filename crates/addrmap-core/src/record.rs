//! Address-map records and the store the verifier writes through.

use thiserror::Error;

use crate::numeric::format_hex;

/// Failure to update the address-map store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("address map update failed: {message}")]
pub struct StoreError {
    /// Store-specific detail.
    pub message: String,
}

impl StoreError {
    /// Wraps any displayable cause.
    #[must_use]
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Lookup key of an address-map record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey<'a> {
    /// Core instance name.
    pub core_instance: &'a str,
    /// Core type.
    pub core_type: &'a str,
    /// Owning platform identifier.
    pub platform_id: &'a str,
}

/// Address assignment for one core, as stored in the address map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AddressMapRecord {
    /// Core instance name.
    pub core_instance: String,
    /// Core type.
    pub core_type: String,
    /// Owning platform identifier.
    pub platform_id: String,
    /// Base address as a hex literal.
    pub base: String,
    /// High address as a hex literal.
    pub high: String,
    /// Window size as a hex literal.
    pub size: String,
    /// Processor architectures that see this core.
    #[cfg_attr(feature = "serde", serde(default))]
    pub proc_targets: Vec<String>,
}

impl AddressMapRecord {
    /// Returns `true` when the record is the one `key` names.
    #[must_use]
    pub fn matches(&self, key: &RecordKey<'_>) -> bool {
        self.core_instance == key.core_instance
            && self.core_type == key.core_type
            && self.platform_id == key.platform_id
    }
}

/// Address assignment written back after a window is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressUpdate {
    /// Inclusive base address.
    pub base: u64,
    /// Inclusive high address.
    pub high: u64,
    /// Hex digits used when rendering the values.
    pub digits: usize,
}

impl AddressUpdate {
    /// Number of addresses in `[base, high]`.
    #[must_use]
    pub const fn size(&self) -> u64 {
        (self.high - self.base).saturating_add(1)
    }

    /// Writes the update's literals into `record`.
    pub fn apply(&self, record: &mut AddressMapRecord) {
        record.base = format_hex(self.base, self.digits);
        record.high = format_hex(self.high, self.digits);
        record.size = format_hex(self.size(), self.digits);
    }
}

/// Persistent address-map collaborator.
pub trait AddressMapStore {
    /// Records `update` against the record matching `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update cannot be persisted.
    fn update(&mut self, key: &RecordKey<'_>, update: &AddressUpdate) -> Result<(), StoreError>;
}

/// In-memory address map.
///
/// Updates rewrite every matching record; a key with no record gets a new
/// one appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AddressMap {
    records: Vec<AddressMapRecord>,
}

impl AddressMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding `records`.
    #[must_use]
    pub const fn from_records(records: Vec<AddressMapRecord>) -> Self {
        Self { records }
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[AddressMapRecord] {
        &self.records
    }

    /// First record matching `key`.
    #[must_use]
    pub fn find(&self, key: &RecordKey<'_>) -> Option<&AddressMapRecord> {
        self.records.iter().find(|record| record.matches(key))
    }

    /// Consumes the map, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<AddressMapRecord> {
        self.records
    }
}

impl AddressMapStore for AddressMap {
    fn update(&mut self, key: &RecordKey<'_>, update: &AddressUpdate) -> Result<(), StoreError> {
        let mut matched = false;
        for record in self.records.iter_mut().filter(|record| record.matches(key)) {
            update.apply(record);
            matched = true;
        }

        if !matched {
            let mut record = AddressMapRecord {
                core_instance: key.core_instance.to_string(),
                core_type: key.core_type.to_string(),
                platform_id: key.platform_id.to_string(),
                ..AddressMapRecord::default()
            };
            update.apply(&mut record);
            self.records.push(record);
        }

        Ok(())
    }
}

impl<S: AddressMapStore + ?Sized> AddressMapStore for &mut S {
    fn update(&mut self, key: &RecordKey<'_>, update: &AddressUpdate) -> Result<(), StoreError> {
        (**self).update(key, update)
    }
}
