//! Query and mutation building.
//!
//! Reads become a [`Query`] whose conjuncts always appear in the order
//! release, status, owner, then free-text search. Writes become a
//! [`FieldMap`] keyed by canonical field names.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::{is_field_identifier, OrderBy, Query, SObject};
use crate::request::{FilterSet, NewCaseFields, UpdateFieldSet};
use crate::traits::FieldMap;
use serde_json::Value;

/// Canonical field names on the remote objects.
pub mod fields {
    /// Record id.
    pub const ID: &str = "Id";
    /// Human-facing case number.
    pub const CASE_NUMBER: &str = "CaseNumber";
    /// Case subject.
    pub const SUBJECT: &str = "Subject";
    /// Creation timestamp.
    pub const CREATED_DATE: &str = "CreatedDate";
    /// Assigned developer.
    pub const OWNER: &str = "Developer__c";
    /// Case status.
    pub const STATUS: &str = "Status";
    /// Target release.
    pub const RELEASE: &str = "Release__c";
    /// Case type.
    pub const TYPE: &str = "Type";
    /// Case priority.
    pub const PRIORITY: &str = "Priority";
    /// Long description.
    pub const DESCRIPTION: &str = "Description";
    /// Where the case came from.
    pub const ORIGIN: &str = "Origin";
    /// Case a comment belongs to.
    pub const PARENT_ID: &str = "ParentId";
    /// Comment text.
    pub const COMMENT_BODY: &str = "CommentBody";
    /// Whether a comment is visible to the customer.
    pub const IS_PUBLISHED: &str = "IsPublished";
}

/// Origin recorded on every case this tool creates.
pub const ORIGIN_MARKER: &str = "Web";

/// Status for new cases when neither the option nor config sets one.
pub const DEFAULT_STATUS: &str = "New";

/// Priority for new cases when neither the option nor config sets one.
pub const DEFAULT_PRIORITY: &str = "Low";

/// Fields selected when listing cases.
pub const CASE_LIST_FIELDS: [&str; 7] = [
    fields::ID,
    fields::CASE_NUMBER,
    fields::SUBJECT,
    fields::CREATED_DATE,
    fields::OWNER,
    fields::STATUS,
    fields::RELEASE,
];

/// Fields selected when showing one case.
pub const CASE_DETAIL_FIELDS: [&str; 8] = [
    fields::ID,
    fields::CASE_NUMBER,
    fields::SUBJECT,
    fields::CREATED_DATE,
    fields::OWNER,
    fields::STATUS,
    fields::RELEASE,
    fields::DESCRIPTION,
];

/// Fields selected when listing comments.
pub const COMMENT_FIELDS: [&str; 3] = [fields::ID, fields::COMMENT_BODY, fields::CREATED_DATE];

const DATE_ALIASES: &[&str] = &["Date", "date", "Created", "created", "CreatedDate"];

const CASE_ORDER_ALIASES: &[(&[&str], &str)] = &[
    (&["Developer", "developer", "dev", "Dev", "owner", "Owner", "Developer__c"], fields::OWNER),
    (DATE_ALIASES, fields::CREATED_DATE),
    (&["subject", "Subject"], fields::SUBJECT),
    (&["Release", "release", "Rel", "rel"], fields::RELEASE),
];

const COMMENT_ORDER_ALIASES: &[(&[&str], &str)] = &[(DATE_ALIASES, fields::CREATED_DATE)];

/// Update keys that are forwarded, with the field each one sets.
const UPDATE_KEYS: &[(&str, &str)] = &[
    ("owner", fields::OWNER),
    ("status", fields::STATUS),
    ("type", fields::TYPE),
    ("release", fields::RELEASE),
    ("priority", fields::PRIORITY),
];

fn alias_table(object: SObject) -> &'static [(&'static [&'static str], &'static str)] {
    match object {
        SObject::Case => CASE_ORDER_ALIASES,
        SObject::CaseComment => COMMENT_ORDER_ALIASES,
    }
}

/// Map an order-by alias to its canonical field for `object`.
///
/// Keys not in the alias table come back unchanged.
#[must_use]
pub fn canonical_order_key(object: SObject, key: &str) -> &str {
    alias_table(object)
        .iter()
        .find(|(aliases, _)| aliases.contains(&key))
        .map_or(key, |(_, canonical)| *canonical)
}

/// Build the sort clause. `reverse` applies to the canonical key and does
/// nothing without an order key.
///
/// # Errors
///
/// Returns [`Error::InvalidOrderKey`] when an unrecognized key is not a plain
/// field name.
pub fn order_clause(object: SObject, key: Option<&str>, reverse: bool) -> Result<Option<OrderBy>> {
    let Some(key) = key else {
        if reverse {
            tracing::debug!("--reverse has no effect without --order-by");
        }
        return Ok(None);
    };

    let canonical = canonical_order_key(object, key);
    if canonical == key {
        if !is_field_identifier(key) {
            return Err(Error::InvalidOrderKey(key.to_string()));
        }
        tracing::debug!(key, object = %object, "order key not an alias, passing through");
    }

    Ok(Some(OrderBy { field: canonical.to_string(), descending: reverse }))
}

/// Query listing cases that match `filters`.
///
/// # Errors
///
/// Returns an error if the order key is unusable.
pub fn case_list_query(filters: &FilterSet) -> Result<Query> {
    let mut query = Query::new(SObject::Case, &CASE_LIST_FIELDS);
    query
        .filter
        .member_of(fields::RELEASE, &filters.releases)
        .member_of(fields::STATUS, &filters.statuses)
        .member_of(fields::OWNER, &filters.owners);
    if let Some(grep) = &filters.grep {
        query.filter.contains(fields::SUBJECT, grep);
    }
    query.order_by = order_clause(SObject::Case, filters.order_by.as_deref(), filters.reverse)?;
    tracing::debug!(soql = %query, "built case list query");
    Ok(query)
}

/// Query listing the comments on the case with id `parent_id`.
///
/// # Errors
///
/// Returns an error if the order key is unusable.
pub fn comment_query(parent_id: &str, filters: &FilterSet) -> Result<Query> {
    let mut query = Query::new(SObject::CaseComment, &COMMENT_FIELDS);
    query.filter.equals(fields::PARENT_ID, parent_id);
    if let Some(grep) = &filters.grep {
        query.filter.contains(fields::COMMENT_BODY, grep);
    }
    query.order_by =
        order_clause(SObject::CaseComment, filters.order_by.as_deref(), filters.reverse)?;
    tracing::debug!(soql = %query, "built comment query");
    Ok(query)
}

/// Query finding the id of the case with `case_number`.
#[must_use]
pub fn case_lookup_query(case_number: &str) -> Query {
    let mut query = Query::new(SObject::Case, &[fields::ID]);
    query.filter.equals(fields::CASE_NUMBER, case_number);
    query
}

/// Query fetching the fields shown for the case with `case_number`.
#[must_use]
pub fn case_detail_query(case_number: &str) -> Query {
    let mut query = Query::new(SObject::Case, &CASE_DETAIL_FIELDS);
    query.filter.equals(fields::CASE_NUMBER, case_number);
    query
}

/// Field changes for update-case, plus the keys that were not forwarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    /// Canonical field → new value.
    pub fields: FieldMap,
    /// Requested keys that have no updatable field.
    pub dropped: Vec<String>,
}

/// Map requested changes to canonical fields. Unrecognized keys are logged
/// and reported in [`UpdatePayload::dropped`].
///
/// # Errors
///
/// Returns [`Error::InvalidFieldValue`] under strict validation.
pub fn update_payload(update: &UpdateFieldSet, config: &Config) -> Result<UpdatePayload> {
    let mut payload = UpdatePayload::default();
    for (key, value) in update.iter() {
        match UPDATE_KEYS.iter().find(|(name, _)| *name == key) {
            Some((name, field)) => {
                config.validate(*name, value)?;
                payload.fields.insert((*field).to_string(), Value::String(value.to_string()));
            }
            None => {
                tracing::warn!(field = key, "ignoring field that cannot be updated");
                payload.dropped.push(key.to_string());
            }
        }
    }
    Ok(payload)
}

/// Fields for a new case, with configured and built-in defaults applied.
///
/// # Errors
///
/// Returns [`Error::InvalidFieldValue`] under strict validation.
pub fn new_case_payload(new_case: &NewCaseFields, config: &Config) -> Result<FieldMap> {
    let defaults = &config.defaults;
    let owner = new_case.owner.as_deref().or(defaults.owner.as_deref());
    let case_type = new_case.case_type.as_deref().or(defaults.case_type.as_deref());
    let release = new_case.release.as_deref();
    let status = new_case.status.as_deref().or(defaults.status.as_deref()).unwrap_or(DEFAULT_STATUS);
    let priority =
        new_case.priority.as_deref().or(defaults.priority.as_deref()).unwrap_or(DEFAULT_PRIORITY);

    let checked = [
        ("status", Some(status)),
        ("priority", Some(priority)),
        ("owner", owner),
        ("type", case_type),
        ("release", release),
    ];
    for (key, value) in checked {
        if let Some(value) = value {
            config.validate(key, value)?;
        }
    }

    let mut payload = FieldMap::new();
    let mut put = |field: &str, value: &str| {
        payload.insert(field.to_string(), Value::String(value.to_string()));
    };
    put(fields::SUBJECT, &new_case.subject);
    put(fields::ORIGIN, ORIGIN_MARKER);
    put(fields::STATUS, status);
    put(fields::PRIORITY, priority);
    for (field, value) in [
        (fields::OWNER, owner),
        (fields::TYPE, case_type),
        (fields::RELEASE, release),
        (fields::DESCRIPTION, new_case.description.as_deref()),
    ] {
        if let Some(value) = value {
            put(field, value);
        }
    }
    Ok(payload)
}

/// Fields for a published comment on the case with id `parent_id`.
#[must_use]
pub fn note_payload(parent_id: &str, note: &str, signature: Option<&str>) -> FieldMap {
    let body = match signature {
        Some(name) => format!("{note}\n-- {name}\n"),
        None => note.to_string(),
    };
    let mut fields = FieldMap::new();
    fields.insert(fields::COMMENT_BODY.to_string(), Value::String(body));
    fields.insert(fields::PARENT_ID.to_string(), Value::String(parent_id.to_string()));
    fields.insert(fields::IS_PUBLISHED.to_string(), Value::Bool(true));
    fields
}
