//! Core traits for testability and abstraction.

use crate::error::Result;
use crate::query::{Query, SObject};
use serde_json::{Map, Value};

/// Field name → value mapping sent on create and update.
pub type FieldMap = Map<String, Value>;

/// One row returned by the remote service, fields accessible by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wrap a raw field map.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Consume the record, returning its raw field map.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// The record's id, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_str("Id")
    }

    /// Raw value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// A string field. Null, missing, and non-string fields are `None`.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// A field as display text: strings verbatim, other scalars formatted,
    /// null or missing as an empty string.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        match self.fields.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Trait for the hosted record service.
///
/// This trait abstracts the remote API for testability. The production
/// implementation talks REST; tests use an in-memory mock.
pub trait RecordService {
    /// Run a query and return every matching row.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the query or cannot be reached.
    fn query(&self, query: &Query) -> Result<Vec<Record>>;

    /// Create a record and return its new id.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the record.
    fn create(&self, object: SObject, fields: &FieldMap) -> Result<String>;

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or cannot be fetched.
    fn retrieve(&self, object: SObject, id: &str) -> Result<Record>;

    /// Apply field changes to a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the change.
    fn update(&self, object: SObject, id: &str, fields: &FieldMap) -> Result<()>;
}

impl<T: RecordService + ?Sized> RecordService for &T {
    fn query(&self, query: &Query) -> Result<Vec<Record>> {
        (**self).query(query)
    }

    fn create(&self, object: SObject, fields: &FieldMap) -> Result<String> {
        (**self).create(object, fields)
    }

    fn retrieve(&self, object: SObject, id: &str) -> Result<Record> {
        (**self).retrieve(object, id)
    }

    fn update(&self, object: SObject, id: &str, fields: &FieldMap) -> Result<()> {
        (**self).update(object, id, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_record_accessors() {
        let r = record(json!({"Id": "500x", "Subject": "Disk full", "Description": null, "IsClosed": false}));
        assert_eq!(r.id(), Some("500x"));
        assert_eq!(r.get_str("Subject"), Some("Disk full"));
        assert_eq!(r.get_str("Description"), None);
        assert_eq!(r.text("Description"), "");
        assert_eq!(r.text("Missing"), "");
        assert_eq!(r.text("IsClosed"), "false");
    }
}
