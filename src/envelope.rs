use crate::entity::Entity;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Result of a create or update.
///
/// A missing record on update is reported here with `code == 404` and
/// `success == false` rather than as an error, so callers must check
/// `success`. Serializes as `{ code, success, message, <entity field> }`,
/// e.g. `{ "code": 200, ..., "partner": { .. } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResponse<T> {
    pub code: u16,
    pub success: bool,
    pub message: String,
    pub record: Option<T>,
}

impl<T: Entity> MutationResponse<T> {
    pub(crate) fn created(record: T) -> Self {
        MutationResponse {
            code: 200,
            success: true,
            message: format!("{} created successfully", T::NAME),
            record: Some(record),
        }
    }

    pub(crate) fn updated(record: T) -> Self {
        MutationResponse {
            code: 200,
            success: true,
            message: format!("{} updated successfully", T::NAME),
            record: Some(record),
        }
    }

    pub(crate) fn not_found() -> Self {
        MutationResponse {
            code: 404,
            success: false,
            message: format!("{} not found", T::NAME),
            record: None,
        }
    }
}

impl<T: Entity> Serialize for MutationResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("code", &self.code)?;
        map.serialize_entry("success", &self.success)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry(T::FIELD, &self.record)?;
        map.end()
    }
}
