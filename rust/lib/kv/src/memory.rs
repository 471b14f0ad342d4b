use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::KVError;
use crate::traits::KVStore;

/// MemoryStore keeps everything in a sorted map. Nothing is persisted;
/// used by tests and by `resortd --ephemeral`.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>, KVError> {
        self.entries
            .read()
            .map_err(|_| KVError::Storage("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>, KVError> {
        self.entries
            .write()
            .map_err(|_| KVError::Storage("memory store lock poisoned".into()))
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.write()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        self.write()?.remove(key);
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let entries = self.read()?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn compare_and_set(&self, key: &str, expected: &[u8], value: &[u8]) -> Result<bool, KVError> {
        let mut entries = self.write()?;
        match entries.get_mut(key) {
            Some(current) if current.as_slice() == expected => {
                *current = value.to_vec();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn insert_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, KVError> {
        let mut entries = self.write()?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaves_like_a_sorted_kv() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("frontdesk:reservation:b", b"2").unwrap();
        store.set("frontdesk:reservation:a", b"1").unwrap();
        store.set("frontdesk:accommodation:a", b"x").unwrap();

        let res = store.scan("frontdesk:reservation:").unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].0, "frontdesk:reservation:a");
        assert_eq!(store.len(), 3);

        store.delete("frontdesk:reservation:a").unwrap();
        assert!(store.get("frontdesk:reservation:a").unwrap().is_none());
    }

    #[test]
    fn compare_and_set() {
        let store = MemoryStore::new();
        assert!(!store.compare_and_set("k", b"a", b"b").unwrap());

        store.set("k", b"a").unwrap();
        assert!(store.compare_and_set("k", b"a", b"b").unwrap());
        assert!(!store.compare_and_set("k", b"a", b"c").unwrap());
        assert_eq!(store.get("k").unwrap().unwrap(), b"b");
    }

    #[test]
    fn insert_if_absent_claims_once() {
        let store = MemoryStore::new();
        assert!(store.insert_if_absent("frontdesk:reservation-id:R-1", b"doc1").unwrap());
        assert!(!store.insert_if_absent("frontdesk:reservation-id:R-1", b"doc2").unwrap());
        assert_eq!(store.get("frontdesk:reservation-id:R-1").unwrap().unwrap(), b"doc1");
    }
}
