//! Case operations against a [`RecordService`].
//!
//! Each resolved request runs as one linear sequence: look up the target case
//! if there is one, build the query or payload, make the remote call.

use crate::builder::{
    case_detail_query, case_list_query, case_lookup_query, comment_query, fields,
    new_case_payload, note_payload, update_payload,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::SObject;
use crate::request::{CommandKind, CommandRequest, FilterSet, NewCaseFields, Payload, UpdateFieldSet};
use crate::traits::{FieldMap, Record, RecordService};

/// What a request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Matching cases.
    Cases(Vec<Record>),
    /// One case in full.
    Details(Record),
    /// Comments on one case.
    Comments(Vec<Record>),
    /// A case was created.
    Created {
        /// Number assigned by the service.
        case_number: String,
    },
    /// A case was updated.
    Updated {
        /// The case changed.
        case_number: String,
        /// Fields sent.
        fields: FieldMap,
        /// Requested keys that were not sent.
        dropped: Vec<String>,
    },
    /// A comment was added.
    NoteAdded {
        /// The case commented on.
        case_number: String,
    },
}

/// Case operations bound to a service and configuration.
pub struct CaseClient<'a> {
    service: &'a dyn RecordService,
    config: &'a Config,
}

impl<'a> CaseClient<'a> {
    /// Create a client.
    #[must_use]
    pub const fn new(service: &'a dyn RecordService, config: &'a Config) -> Self {
        Self { service, config }
    }

    /// Run a resolved request.
    ///
    /// # Errors
    ///
    /// Returns an error if the target case does not exist, a payload is
    /// rejected, or the remote service fails.
    pub fn execute(&self, request: &CommandRequest) -> Result<Outcome> {
        let case_number = || {
            request
                .case_number
                .as_deref()
                .ok_or(Error::MissingCaseNumber { command: request.kind.option_name() })
        };

        match (request.kind, &request.payload) {
            (CommandKind::GetIds, Payload::Filters(filters)) => {
                Ok(Outcome::Cases(self.list_cases(filters)?))
            }
            (CommandKind::GetComments, Payload::Filters(filters)) => {
                Ok(Outcome::Comments(self.case_comments(case_number()?, filters)?))
            }
            (CommandKind::GetDetails, Payload::None) => {
                Ok(Outcome::Details(self.case_details(case_number()?)?))
            }
            (CommandKind::AddNote, Payload::Note(note)) => {
                let number = case_number()?;
                self.add_note(number, note)?;
                Ok(Outcome::NoteAdded { case_number: number.to_string() })
            }
            (CommandKind::Create, Payload::NewCase(new_case)) => {
                Ok(Outcome::Created { case_number: self.create_case(new_case)? })
            }
            (CommandKind::UpdateCase, Payload::Update(update)) => {
                let number = case_number()?;
                let (fields, dropped) = self.update_case(number, update)?;
                Ok(Outcome::Updated { case_number: number.to_string(), fields, dropped })
            }
            (kind, _) => Err(Error::MismatchedPayload(kind.option_name())),
        }
    }

    /// Internal id of the case with `case_number`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaseNotFound`] if no case has that number.
    pub fn find_case_id(&self, case_number: &str) -> Result<String> {
        let rows = self.service.query(&case_lookup_query(case_number))?;
        rows.first()
            .and_then(Record::id)
            .map(str::to_string)
            .ok_or_else(|| Error::CaseNotFound(case_number.to_string()))
    }

    /// Cases matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or run.
    pub fn list_cases(&self, filters: &FilterSet) -> Result<Vec<Record>> {
        if filters.is_unfiltered() {
            tracing::debug!("no filters given, listing every case");
        }
        self.service.query(&case_list_query(filters)?)
    }

    /// Full record of one case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaseNotFound`] or a remote error.
    pub fn case_details(&self, case_number: &str) -> Result<Record> {
        self.service
            .query(&case_detail_query(case_number))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::CaseNotFound(case_number.to_string()))
    }

    /// Comments on one case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaseNotFound`] or a remote error.
    pub fn case_comments(&self, case_number: &str, filters: &FilterSet) -> Result<Vec<Record>> {
        let id = self.find_case_id(case_number)?;
        self.service.query(&comment_query(&id, filters)?)
    }

    /// Create a case and return the number the service assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the service rejects the case.
    pub fn create_case(&self, new_case: &NewCaseFields) -> Result<String> {
        let payload = new_case_payload(new_case, self.config)?;
        let id = self.service.create(SObject::Case, &payload)?;
        let created = self.service.retrieve(SObject::Case, &id)?;
        Ok(created.get_str(fields::CASE_NUMBER).unwrap_or(&id).to_string())
    }

    /// Apply `update` to the case with `case_number`. Returns the fields sent
    /// and the keys that were dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaseNotFound`], a validation error, or a remote error.
    pub fn update_case(
        &self,
        case_number: &str,
        update: &UpdateFieldSet,
    ) -> Result<(FieldMap, Vec<String>)> {
        let payload = update_payload(update, self.config)?;
        let id = self.find_case_id(case_number)?;
        if payload.fields.is_empty() {
            tracing::warn!(case = case_number, "no updatable fields given, leaving case unchanged");
        } else {
            self.service.update(SObject::Case, &id, &payload.fields)?;
        }
        Ok((payload.fields, payload.dropped))
    }

    /// Add a signed, published comment to the case with `case_number`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaseNotFound`] or a remote error.
    pub fn add_note(&self, case_number: &str, note: &str) -> Result<String> {
        let id = self.find_case_id(case_number)?;
        let signature = self.config.signature();
        let payload = note_payload(&id, note, signature.as_deref());
        self.service.create(SObject::CaseComment, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use crate::testing::{Call, FailingRecordService, MockRecordService};
    use serde_json::{json, Value};

    fn seeded() -> MockRecordService {
        let svc = MockRecordService::new();
        svc.insert_case("500A", "00001001", "Disk full", "bob", "Open");
        svc.insert_case("500B", "00001002", "Login broken", "alice", "New");
        svc.insert(
            SObject::CaseComment,
            json!({"Id": "00aA", "ParentId": "500A", "CommentBody": "Rebooted", "CreatedDate": "2010-05-03"}),
        );
        svc
    }

    fn run(svc: &MockRecordService, config: &Config, options: &[(&str, &str)], case: Option<&str>) -> Result<Outcome> {
        let request = resolve(options, case)?;
        CaseClient::new(svc, config).execute(&request)
    }

    #[test]
    fn test_get_ids_lists_matching_cases() {
        let svc = seeded();
        let outcome =
            run(&svc, &Config::default(), &[("--get-ids", ""), ("--owner", "alice")], None).unwrap();
        let Outcome::Cases(rows) = outcome else { panic!("expected cases") };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("CaseNumber"), Some("00001002"));
    }

    #[test]
    fn test_get_details() {
        let svc = seeded();
        let outcome = run(&svc, &Config::default(), &[("--get-details", "")], Some("00001001")).unwrap();
        let Outcome::Details(record) = outcome else { panic!("expected details") };
        assert_eq!(record.get_str("Subject"), Some("Disk full"));
    }

    #[test]
    fn test_unknown_case_is_not_found() {
        let svc = seeded();
        let err = run(&svc, &Config::default(), &[("--get-details", "")], Some("99999999")).unwrap_err();
        assert!(matches!(err, Error::CaseNotFound(n) if n == "99999999"));
    }

    #[test]
    fn test_get_comments_scoped_to_case() {
        let svc = seeded();
        svc.insert(
            SObject::CaseComment,
            json!({"Id": "00aB", "ParentId": "500B", "CommentBody": "Other", "CreatedDate": "2010-05-04"}),
        );
        let outcome = run(&svc, &Config::default(), &[("--get-comments", "")], Some("00001001")).unwrap();
        let Outcome::Comments(rows) = outcome else { panic!("expected comments") };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("CommentBody"), Some("Rebooted"));
    }

    #[test]
    fn test_create_returns_case_number() {
        let svc = seeded();
        let outcome = run(
            &svc,
            &Config::default(),
            &[("--create", "Server down"), ("--priority", "High")],
            None,
        )
        .unwrap();
        let Outcome::Created { case_number } = outcome else { panic!("expected created") };
        assert!(!case_number.is_empty());

        let Some(Call::Create(SObject::Case, sent)) = svc.calls().into_iter().next() else {
            panic!("expected create call first")
        };
        assert_eq!(sent["Status"], "New");
        assert_eq!(sent["Priority"], "High");
        assert_eq!(sent["Origin"], "Web");
    }

    #[test]
    fn test_update_case() {
        let svc = seeded();
        let outcome = run(
            &svc,
            &Config::default(),
            &[("--update-case", ""), ("--status", "Closed"), ("--owner", "alice"), ("--grep", "x")],
            Some("00001001"),
        )
        .unwrap();
        let Outcome::Updated { fields, dropped, .. } = outcome else { panic!("expected updated") };
        assert_eq!(Value::Object(fields), json!({"Status": "Closed", "Developer__c": "alice"}));
        assert_eq!(dropped, vec!["grep"]);

        let record = svc.get(SObject::Case, "500A").unwrap();
        assert_eq!(record.get_str("Status"), Some("Closed"));
        assert_eq!(record.get_str("Developer__c"), Some("alice"));
    }

    #[test]
    fn test_update_unknown_case() {
        let svc = seeded();
        let err = run(
            &svc,
            &Config::default(),
            &[("--update-case", ""), ("--status", "Closed")],
            Some("00000000"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::CaseNotFound(_)));
        assert!(!svc.calls().iter().any(|c| matches!(c, Call::Update(..))));
    }

    #[test]
    fn test_update_with_nothing_recognized_skips_remote_update() {
        let svc = seeded();
        run(&svc, &Config::default(), &[("--update-case", ""), ("--grep", "x")], Some("00001001"))
            .unwrap();
        assert!(!svc.calls().iter().any(|c| matches!(c, Call::Update(..))));
    }

    #[test]
    fn test_add_note_signed() {
        let svc = seeded();
        let config = Config { signature: Some("Evan".to_string()), ..Config::default() };
        let outcome = run(&svc, &config, &[("--add-note", "Fixed it")], Some("00001001")).unwrap();
        assert_eq!(outcome, Outcome::NoteAdded { case_number: "00001001".to_string() });
        let created = svc
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Create(SObject::CaseComment, fields) => Some(fields),
                _ => None,
            })
            .unwrap();
        assert_eq!(created["CommentBody"], "Fixed it\n-- Evan\n");
        assert_eq!(created["ParentId"], "500A");
        assert_eq!(created["IsPublished"], true);
    }

    #[test]
    fn test_remote_errors_propagate() {
        let svc = FailingRecordService::new("INVALID_SESSION_ID");
        let request = resolve(&[("--get-ids", "")], None).unwrap();
        let err = CaseClient::new(&svc, &Config::default()).execute(&request).unwrap_err();
        assert!(matches!(err, Error::RemoteService(m) if m == "INVALID_SESSION_ID"));
    }

    #[test]
    fn test_mismatched_payload() {
        let svc = seeded();
        let request = CommandRequest {
            kind: CommandKind::Create,
            case_number: None,
            payload: Payload::None,
        };
        let err = CaseClient::new(&svc, &Config::default()).execute(&request).unwrap_err();
        assert!(matches!(err, Error::MismatchedPayload("create")));
    }
}
