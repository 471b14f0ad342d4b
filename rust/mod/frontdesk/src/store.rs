//! Document trait + typed Collection over a KVStore.
//!
//! Each model impls `Document` to declare its key prefix and hooks.
//! `Collection<T>` does the actual get/save/list/delete with JSON encoding.

use std::marker::PhantomData;
use std::sync::Arc;

use resort_core::ServiceError;
use resort_kv::{KVError, KVStore};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Compare-and-set rounds before a read-modify-write gives up.
const MAX_CAS_ROUNDS: usize = 5;

/// Implemented by models that live in the KV store.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human-readable resource name for error messages.
    const RESOURCE: &'static str;

    /// KV key prefix: "{module}:{resource}:".
    fn kv_prefix() -> &'static str;

    /// Key suffix for this instance (appended to the prefix).
    fn key_value(&self) -> String;

    /// Called before inserting a new record. Use for auto-fill (id, timestamps).
    fn before_create(&mut self) {}

    /// Called before overwriting an existing record.
    fn before_update(&mut self) {}
}

pub(crate) fn kv_err(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// CRUD operations for one document type. Holds a reference to the KV backend.
pub struct Collection<T: Document> {
    kv: Arc<dyn KVStore>,
    _phantom: PhantomData<T>,
}

impl<T: Document> Collection<T> {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            _phantom: PhantomData,
        }
    }

    pub(crate) fn make_key(id: &str) -> String {
        format!("{}{}", T::kv_prefix(), id)
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<T, ServiceError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::Internal(format!("decode {}: {}", T::RESOURCE, e)))
    }

    pub(crate) fn encode(record: &T) -> Result<Vec<u8>, ServiceError> {
        serde_json::to_vec(record)
            .map_err(|e| ServiceError::Internal(format!("encode {}: {}", T::RESOURCE, e)))
    }

    /// Get a record by key suffix. Returns None if not found.
    pub fn get(&self, id: &str) -> Result<Option<T>, ServiceError> {
        Ok(self.get_raw(id)?.map(|(record, _)| record))
    }

    /// Get a record together with its stored bytes, for compare-and-set.
    pub(crate) fn get_raw(&self, id: &str) -> Result<Option<(T, Vec<u8>)>, ServiceError> {
        match self.kv.get(&Self::make_key(id)).map_err(kv_err)? {
            Some(bytes) => Ok(Some((Self::decode(&bytes)?, bytes))),
            None => Ok(None),
        }
    }

    /// Get a record or return NotFound.
    pub fn get_or_err(&self, id: &str) -> Result<T, ServiceError> {
        self.get(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", T::RESOURCE, id)))
    }

    /// List every record of this type, in key order.
    pub fn list(&self) -> Result<Vec<T>, ServiceError> {
        self.list_under("")
    }

    /// List records whose key suffix starts with `sub_prefix`.
    ///
    /// Documents that no longer decode are logged and skipped.
    pub fn list_under(&self, sub_prefix: &str) -> Result<Vec<T>, ServiceError> {
        let prefix = Self::make_key(sub_prefix);
        let entries = self.kv.scan(&prefix).map_err(kv_err)?;
        Ok(entries
            .iter()
            .filter_map(|(key, bytes)| match Self::decode(bytes) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping {}: {}", key, e);
                    None
                }
            })
            .collect())
    }

    /// First record (in key order) matching the predicate.
    pub fn find<F>(&self, mut pred: F) -> Result<Option<T>, ServiceError>
    where
        F: FnMut(&T) -> bool,
    {
        Ok(self.list()?.into_iter().find(|r| pred(r)))
    }

    /// Create a new record. Calls before_create, rejects duplicate keys.
    pub fn save_new(&self, mut record: T) -> Result<T, ServiceError> {
        record.before_create();

        let id = record.key_value();
        let inserted = self
            .kv
            .insert_if_absent(&Self::make_key(&id), &Self::encode(&record)?)
            .map_err(kv_err)?;
        if !inserted {
            return Err(ServiceError::Conflict(format!(
                "{} '{}' already exists",
                T::RESOURCE,
                id
            )));
        }
        Ok(record)
    }

    /// Overwrite an existing record. Calls before_update.
    pub fn save(&self, mut record: T) -> Result<T, ServiceError> {
        record.before_update();
        let key = Self::make_key(&record.key_value());
        self.kv.set(&key, &Self::encode(&record)?).map_err(kv_err)?;
        Ok(record)
    }

    /// Overwrite a record only if its stored bytes still equal `original`.
    /// Returns false (and writes nothing) if someone else wrote first.
    pub(crate) fn save_if_unchanged(&self, original: &[u8], mut record: T) -> Result<bool, ServiceError> {
        record.before_update();
        let key = Self::make_key(&record.key_value());
        self.kv
            .compare_and_set(&key, original, &Self::encode(&record)?)
            .map_err(kv_err)
    }

    /// Read-modify-write under compare-and-set. `apply` may run several
    /// times; returning false from it leaves the record untouched.
    ///
    /// Returns whether the change was written. NotFound if the record is
    /// missing.
    pub(crate) fn modify<F>(&self, id: &str, mut apply: F) -> Result<bool, ServiceError>
    where
        F: FnMut(&mut T) -> bool,
    {
        for round in 0..MAX_CAS_ROUNDS {
            let (mut record, original) = self
                .get_raw(id)?
                .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", T::RESOURCE, id)))?;

            if !apply(&mut record) {
                return Ok(false);
            }
            if self.save_if_unchanged(&original, record)? {
                return Ok(true);
            }
            debug!("{} '{}' changed underneath us (round {})", T::RESOURCE, id, round + 1);
        }

        Err(ServiceError::Storage(format!(
            "{} '{}' kept changing during update",
            T::RESOURCE,
            id
        )))
    }

    /// Delete a record by key suffix. NotFound if it does not exist.
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let key = Self::make_key(id);
        if self.kv.get(&key).map_err(kv_err)?.is_none() {
            return Err(ServiceError::NotFound(format!("{} '{}' not found", T::RESOURCE, id)));
        }
        self.kv.delete(&key).map_err(kv_err)
    }
}
