use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{value::Map, Number, Value};

pub type Object = Map<String, Value>;

/// A record type kept in a [`RecordStore`](crate::RecordStore).
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Name used in result messages, e.g. `Partner not found`.
    const NAME: &'static str;
    /// Envelope key carrying the record.
    const FIELD: &'static str;
    /// Top level key of the backing JSON document.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Apart from `id` every partner field, `name` included, is free-form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    #[serde(flatten)]
    pub extra: Object,
}

impl Partner {
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

impl Entity for Partner {
    const NAME: &'static str = "Partner";
    const FIELD: &'static str = "partner";
    const COLLECTION: &'static str = "partners";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub stock: Number,
    #[serde(flatten)]
    pub extra: Object,
}

impl Product {
    /// Whether any stock is left. Fractional stock counts.
    pub fn in_stock(&self) -> bool {
        self.stock.as_f64().is_some_and(|s| s > 0.0)
    }
}

impl Entity for Product {
    const NAME: &'static str = "Product";
    const FIELD: &'static str = "product";
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Builds a fresh record from caller supplied fields. The assigned `id`
/// always wins over an `id` in `input`.
pub(crate) fn assemble<T: Entity>(id: String, input: Object) -> Result<T> {
    let mut fields = Object::new();
    fields.insert("id".to_string(), Value::String(id));
    fields.extend(input.into_iter().filter(|(k, _)| k != "id"));
    decode(fields)
}

/// Shallow merge: every field in `patch` replaces the record's field as a
/// whole. The `id` is never patched.
pub(crate) fn merge<T: Entity>(record: &T, patch: &Object) -> Result<T> {
    let mut fields = encode(record)?;
    for (k, v) in patch {
        if k != "id" {
            fields.insert(k.clone(), v.clone());
        }
    }
    decode(fields)
}

fn encode<T: Entity>(record: &T) -> Result<Object> {
    match serde_json::to_value(record)? {
        Value::Object(o) => Ok(o),
        _ => Err(Error::InvalidRecord {
            entity: T::NAME,
            reason: "not a JSON object".to_string(),
        }),
    }
}

fn decode<T: Entity>(fields: Object) -> Result<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|err| Error::InvalidRecord {
        entity: T::NAME,
        reason: err.to_string(),
    })
}
