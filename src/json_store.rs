use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) trait JsonStore: Send + Sync {
    /// Loads every record of `collection`. A collection that was never
    /// persisted is empty.
    fn load<T>(&self, collection: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned;

    /// Replaces the whole persisted collection with `records`.
    fn persist<T>(&self, collection: &str, records: &[T]) -> Result<()>
    where
        T: Serialize;
}

/// Wraps `records` as `{ "<collection>": [..] }`, keeping the field order
/// of `T`.
pub(crate) fn encode_document<'a, T: Serialize>(
    collection: &'a str,
    records: &'a [T],
) -> BTreeMap<&'a str, &'a [T]> {
    BTreeMap::from([(collection, records)])
}

pub(crate) fn decode_document<T: DeserializeOwned>(collection: &str, json: Value) -> Result<Vec<T>> {
    let Value::Object(mut doc) = json else {
        return Err(Error::InvalidData("expected a JSON object".to_string()));
    };
    let records = doc
        .remove(collection)
        .ok_or_else(|| Error::InvalidData(format!("missing \"{collection}\" key")))?;
    if !records.is_array() {
        return Err(Error::InvalidData(format!("\"{collection}\" is not an array")));
    }
    Ok(serde_json::from_value(records)?)
}
