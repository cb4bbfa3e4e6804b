//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::error::{Error, Result};
use crate::query::{Conjunct, Query, SObject};
use crate::traits::{FieldMap, Record, RecordService};
use serde_json::{Map, Value};
use std::cell::RefCell;

/// A call made against [`MockRecordService`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// A query, as rendered SOQL.
    Query(String),
    /// A create with the fields sent.
    Create(SObject, FieldMap),
    /// A retrieve by id.
    Retrieve(SObject, String),
    /// An update with the fields sent.
    Update(SObject, String, FieldMap),
}

/// An in-memory record service.
///
/// Holds records per object type, evaluates filters and sort clauses against
/// them, and records every call for later assertions.
#[derive(Debug, Default)]
pub struct MockRecordService {
    records: RefCell<Vec<(SObject, Record)>>,
    calls: RefCell<Vec<Call>>,
    next_id: RefCell<u32>,
}

impl MockRecordService {
    /// Create an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record. `fields` must be a JSON object.
    ///
    /// # Panics
    ///
    /// Panics if `fields` is not an object.
    pub fn insert(&self, object: SObject, fields: Value) {
        let Value::Object(map) = fields else { panic!("record fields must be a JSON object") };
        self.records.borrow_mut().push((object, Record::new(map)));
    }

    /// Seed a case with the usual list fields.
    pub fn insert_case(&self, id: &str, number: &str, subject: &str, owner: &str, status: &str) {
        self.insert(
            SObject::Case,
            serde_json::json!({
                "Id": id,
                "CaseNumber": number,
                "Subject": subject,
                "Developer__c": owner,
                "Status": status,
                "Release__c": null,
                "CreatedDate": format!("2010-05-{:02}T12:00:00.000+0000", self.len() + 1),
                "Description": null,
            }),
        );
    }

    /// Every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Current state of a record.
    #[must_use]
    pub fn get(&self, object: SObject, id: &str) -> Option<Record> {
        self.records
            .borrow()
            .iter()
            .find(|(o, r)| *o == object && r.id() == Some(id))
            .map(|(_, r)| r.clone())
    }

    /// Number of stored records of any type.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Whether no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

fn matches(conjunct: &Conjunct, record: &Record) -> bool {
    let actual = record.text(conjunct.field());
    match conjunct {
        Conjunct::Equals { value, .. } => actual == *value,
        Conjunct::In { values, .. } => values.iter().any(|v| *v == actual),
        Conjunct::Contains { needle, .. } => {
            actual.to_lowercase().contains(&needle.to_lowercase())
        }
    }
}

fn project(record: &Record, fields: &[&str]) -> Record {
    let mut map = Map::new();
    for field in fields {
        map.insert((*field).to_string(), record.get(field).cloned().unwrap_or(Value::Null));
    }
    Record::new(map)
}

impl RecordService for MockRecordService {
    fn query(&self, query: &Query) -> Result<Vec<Record>> {
        self.record(Call::Query(query.to_soql()));
        let mut rows: Vec<Record> = self
            .records
            .borrow()
            .iter()
            .filter(|(object, _)| *object == query.object)
            .filter(|(_, r)| query.filter.conjuncts().iter().all(|c| matches(c, r)))
            .map(|(_, r)| r.clone())
            .collect();
        if let Some(order) = &query.order_by {
            rows.sort_by_key(|r| r.text(&order.field));
            if order.descending {
                rows.reverse();
            }
        }
        Ok(rows.iter().map(|r| project(r, &query.fields)).collect())
    }

    fn create(&self, object: SObject, fields: &FieldMap) -> Result<String> {
        self.record(Call::Create(object, fields.clone()));
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        let prefix = match object {
            SObject::Case => "500",
            SObject::CaseComment => "00a",
        };
        let id = format!("{prefix}MOCK{:08}", *next);

        let mut stored = fields.clone();
        stored.insert("Id".to_string(), Value::String(id.clone()));
        stored.insert(
            "CreatedDate".to_string(),
            Value::String("2010-06-01T00:00:00.000+0000".to_string()),
        );
        if object == SObject::Case {
            stored
                .entry("CaseNumber")
                .or_insert_with(|| Value::String(format!("{:08}", 9000 + *next)));
        }
        self.records.borrow_mut().push((object, Record::new(stored)));
        Ok(id)
    }

    fn retrieve(&self, object: SObject, id: &str) -> Result<Record> {
        self.record(Call::Retrieve(object, id.to_string()));
        self.get(object, id)
            .ok_or_else(|| Error::RemoteService(format!("NOT_FOUND: {object} {id}")))
    }

    fn update(&self, object: SObject, id: &str, fields: &FieldMap) -> Result<()> {
        self.record(Call::Update(object, id.to_string(), fields.clone()));
        let mut records = self.records.borrow_mut();
        let (_, record) = records
            .iter_mut()
            .find(|(o, r)| *o == object && r.id() == Some(id))
            .ok_or_else(|| Error::RemoteService(format!("NOT_FOUND: {object} {id}")))?;
        let mut merged = std::mem::take(record).into_fields();
        for (field, value) in fields {
            merged.insert(field.clone(), value.clone());
        }
        *record = Record::new(merged);
        Ok(())
    }
}

/// A record service whose every call fails, for testing error paths.
#[derive(Debug, Default)]
pub struct FailingRecordService {
    error_message: String,
}

impl FailingRecordService {
    /// Create a failing service with the specified error message.
    #[must_use]
    pub fn new(error_message: impl Into<String>) -> Self {
        Self { error_message: error_message.into() }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(Error::RemoteService(self.error_message.clone()))
    }
}

impl RecordService for FailingRecordService {
    fn query(&self, _query: &Query) -> Result<Vec<Record>> {
        self.fail()
    }

    fn create(&self, _object: SObject, _fields: &FieldMap) -> Result<String> {
        self.fail()
    }

    fn retrieve(&self, _object: SObject, _id: &str) -> Result<Record> {
        self.fail()
    }

    fn update(&self, _object: SObject, _id: &str, _fields: &FieldMap) -> Result<()> {
        self.fail()
    }
}
