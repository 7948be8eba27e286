use crate::{
    error::Result,
    handle_read_err, handle_write_err,
    json_store::{decode_document, encode_document, JsonStore},
};
use log::error;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

/// Keeps each collection as a serialized JSON document in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    mem: Arc<RwLock<HashMap<String, Mutex<String>>>>,
}

impl MemoryStore {
    /// Seeds `collection` with a raw `{ "<collection>": [..] }` document.
    pub fn with_document(self, collection: &str, json: impl Into<String>) -> Self {
        self.write_document(collection, json.into());
        self
    }

    /// Returns the current serialized document of `collection`.
    pub fn document(&self, collection: &str) -> Option<String> {
        let map = self.mem.read().unwrap_or_else(handle_read_err);
        map.get(collection)
            .map(|v| v.lock().unwrap_or_else(handle_mutex_err).clone())
    }

    fn write_document(&self, collection: &str, json: String) {
        let map = self.mem.read().unwrap_or_else(handle_read_err);
        if let Some(val) = map.get(collection) {
            let mut value_guard = val.lock().unwrap_or_else(handle_mutex_err);
            *value_guard = json;
            return;
        }
        drop(map);
        let mut map = self.mem.write().unwrap_or_else(handle_write_err);
        map.insert(collection.to_string(), Mutex::new(json));
    }
}

impl JsonStore for MemoryStore {
    fn load<T>(&self, collection: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        match self.document(collection) {
            Some(json) => decode_document(collection, serde_json::from_str(&json)?),
            None => Ok(vec![]),
        }
    }

    fn persist<T>(&self, collection: &str, records: &[T]) -> Result<()>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(&encode_document(collection, records))?;
        self.write_document(collection, json);
        Ok(())
    }
}

fn handle_mutex_err<T>(err: PoisonError<MutexGuard<T>>) -> MutexGuard<T> {
    error!("Mutex poisoned");
    err.into_inner()
}
