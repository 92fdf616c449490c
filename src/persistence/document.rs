//! JSON documents and merge-on-write
//!
//! Stores keep documents as JSON objects. Writes with merge semantics fold
//! the new document into the old one key by key, recursing into nested
//! objects, so a write that only names one module's progress leaves its
//! sibling modules alone.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A stored document: a JSON object
pub type Document = Map<String, Value>;

/// Recursively merge `patch` into `target`. Objects merge key by key; any
/// other value in `patch` replaces what was there.
pub fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => merge_objects(target, patch),
        (target, patch) => *target = patch,
    }
}

/// Object form of [`merge`]
pub fn merge_objects(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        match target.get_mut(&key) {
            Some(existing) => merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

/// Serialize a record into a document. Records must serialize as objects.
pub fn to_document<T: Serialize>(record: &T) -> crate::Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(doc) => Ok(doc),
        other => Err(crate::VowelDropError::Storage(format!(
            "expected an object, got {other}"
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> crate::Result<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}
