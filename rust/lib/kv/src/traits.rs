use crate::error::KVError;

/// KVStore is the document store behind every front-desk collection.
///
/// Keys are namespaced: `frontdesk:reservation:{id}`,
/// `frontdesk:account:staff:{id}`, etc. Values are opaque bytes (JSON
/// documents in practice).
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any existing value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns (key, value) pairs sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Atomically replace the value at `key` only if it currently equals
    /// `expected` byte for byte.
    ///
    /// Returns `Ok(false)` without writing when the key is missing or holds
    /// a different value.
    fn compare_and_set(&self, key: &str, expected: &[u8], value: &[u8]) -> Result<bool, KVError>;

    /// Atomically write `value` only if `key` does not exist yet.
    ///
    /// Returns `Ok(false)` without writing when the key is already taken.
    fn insert_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, KVError>;
}
