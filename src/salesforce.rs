//! REST implementation of [`RecordService`].
//!
//! Logs in with the OAuth2 username-password flow, then talks to the
//! versioned data API. Requests are blocking; one invocation makes at most a
//! handful of calls.

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::query::{Query, SObject};
use crate::traits::{FieldMap, Record, RecordService};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Path of the token endpoint on the login host.
const TOKEN_PATH: &str = "/services/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    records: Vec<Map<String, Value>>,
    #[serde(default)]
    done: bool,
    #[serde(rename = "nextRecordsUrl", default)]
    next_records_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(rename = "errorCode", default)]
    error_code: String,
}

/// Record service backed by the platform's REST API.
#[derive(Debug, Clone)]
pub struct RestRecordService {
    client: Client,
    instance_url: String,
    api_version: String,
    access_token: String,
}

impl RestRecordService {
    /// Log in and return a connected service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteService`] if the login is refused, or an HTTP
    /// error if the login host cannot be reached.
    pub fn connect(credentials: &Credentials) -> Result<Self> {
        if credentials.username.is_empty() || credentials.client_id.is_empty() {
            return Err(Error::Config(
                "salesforce.username and salesforce.client_id are required".to_string(),
            ));
        }

        let client = Client::builder().build()?;
        let url = format!("{}{TOKEN_PATH}", credentials.login_url.trim_end_matches('/'));
        let password = credentials.password_with_token();
        let form = [
            ("grant_type", "password"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("username", credentials.username.as_str()),
            ("password", password.as_str()),
        ];

        tracing::debug!(%url, user = %credentials.username, "logging in");
        let response = client.post(&url).form(&form).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(auth_error(status.as_u16(), &body));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(Self::with_token(client, &token.instance_url, &credentials.api_version, token.access_token))
    }

    /// Build a service from an existing session.
    #[must_use]
    pub fn with_token(
        client: Client,
        instance_url: &str,
        api_version: &str,
        access_token: String,
    ) -> Self {
        Self {
            client,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            api_version: api_version.trim_start_matches('v').to_string(),
            access_token,
        }
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}/services/data/v{}{path}", self.instance_url, self.api_version)
    }

    fn sobject_url(&self, object: SObject, id: Option<&str>) -> String {
        match id {
            Some(id) => self.data_url(&format!("/sobjects/{object}/{id}")),
            None => self.data_url(&format!("/sobjects/{object}/")),
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.bearer_auth(&self.access_token).send()?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(api_error(status.as_u16(), &body))
        }
    }
}

impl RecordService for RestRecordService {
    fn query(&self, query: &Query) -> Result<Vec<Record>> {
        let soql = query.to_soql();
        tracing::debug!(%soql, "running query");

        let mut page: QueryResponse = self
            .send(self.client.get(self.data_url("/query")).query(&[("q", soql.as_str())]))?
            .json()?;
        let mut records: Vec<Record> = Vec::new();
        loop {
            records.extend(page.records.into_iter().map(strip_attributes));
            match page.next_records_url {
                Some(next) if !page.done => {
                    let url = format!("{}{next}", self.instance_url);
                    page = self.send(self.client.get(url))?.json()?;
                }
                _ => break,
            }
        }
        Ok(records)
    }

    fn create(&self, object: SObject, fields: &FieldMap) -> Result<String> {
        tracing::debug!(%object, ?fields, "creating record");
        let created: CreateResponse =
            self.send(self.client.post(self.sobject_url(object, None)).json(fields))?.json()?;
        Ok(created.id)
    }

    fn retrieve(&self, object: SObject, id: &str) -> Result<Record> {
        let fields: Map<String, Value> =
            self.send(self.client.get(self.sobject_url(object, Some(id))))?.json()?;
        Ok(strip_attributes(fields))
    }

    fn update(&self, object: SObject, id: &str, fields: &FieldMap) -> Result<()> {
        tracing::debug!(%object, id, ?fields, "updating record");
        self.send(self.client.patch(self.sobject_url(object, Some(id))).json(fields))?;
        Ok(())
    }
}

/// Drop the type metadata the API attaches to every row.
fn strip_attributes(mut fields: Map<String, Value>) -> Record {
    fields.remove("attributes");
    Record::new(fields)
}

/// Turn a failed data API response into an error carrying the platform's message.
fn api_error(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<Vec<ApiErrorBody>>(body)
        .ok()
        .filter(|errors| !errors.is_empty())
        .map_or_else(
            || body.trim().to_string(),
            |errors| {
                errors
                    .iter()
                    .map(|e| {
                        if e.error_code.is_empty() {
                            e.message.clone()
                        } else {
                            format!("{}: {}", e.error_code, e.message)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            },
        );
    Error::RemoteService(format!("HTTP {status}: {detail}"))
}

fn auth_error(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<AuthErrorBody>(body).map_or_else(
        |_| body.trim().to_string(),
        |e| {
            if e.error_description.is_empty() {
                e.error
            } else {
                format!("{}: {}", e.error, e.error_description)
            }
        },
    );
    Error::RemoteService(format!("login failed (HTTP {status}): {detail}"))
}
