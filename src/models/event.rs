//! Update events and the decoder that turns inbound payloads into them.
//!
//! Every inbound call carries a kind (the last path segment) and a body of the
//! form `{"data": <event>}`. The body is read as YAML, which also accepts JSON.
//! Unknown fields anywhere in the body are rejected.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::models::dependency::{Dependency, DependencyFile};

/// Discriminator selecting an [`Event`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UpdateDependencyList,
    CreatePullRequest,
    UpdatePullRequest,
    ClosePullRequest,
    MarkAsProcessed,
    RecordPackageManagerVersion,
    RecordUpdateJobError,
}

impl EventKind {
    /// Every known kind, in wire-name order of the API.
    pub const ALL: [EventKind; 7] = [
        EventKind::UpdateDependencyList,
        EventKind::CreatePullRequest,
        EventKind::UpdatePullRequest,
        EventKind::ClosePullRequest,
        EventKind::MarkAsProcessed,
        EventKind::RecordPackageManagerVersion,
        EventKind::RecordUpdateJobError,
    ];

    /// The wire name, also the final path segment of the call.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::UpdateDependencyList => "update_dependency_list",
            EventKind::CreatePullRequest => "create_pull_request",
            EventKind::UpdatePullRequest => "update_pull_request",
            EventKind::ClosePullRequest => "close_pull_request",
            EventKind::MarkAsProcessed => "mark_as_processed",
            EventKind::RecordPackageManagerVersion => "record_package_manager_version",
            EventKind::RecordUpdateJobError => "record_update_job_error",
        }
    }

    /// Human-readable name used in mismatch messages.
    pub fn description(self) -> &'static str {
        match self {
            EventKind::UpdateDependencyList => "dependency list",
            EventKind::CreatePullRequest => "create pull request",
            EventKind::UpdatePullRequest => "update pull request",
            EventKind::ClosePullRequest => "close pull request",
            EventKind::MarkAsProcessed => "mark as processed",
            EventKind::RecordPackageManagerVersion => "record package manager version",
            EventKind::RecordUpdateJobError => "record update job error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownKind(s.to_string()))
    }
}

/// The dependencies found by the update job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateDependencyList {
    pub dependencies: Vec<Dependency>,
    pub dependency_files: Vec<String>,
}

/// A request to open a pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CreatePullRequest {
    pub base_commit_sha: String,
    pub dependencies: Vec<Dependency>,
    pub updated_dependency_files: Vec<DependencyFile>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pr_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pr_body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub commit_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_group: Option<Map<String, Value>>,
}

/// A request to rebase or refresh an existing pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct UpdatePullRequest {
    pub base_commit_sha: String,
    pub dependency_names: Vec<String>,
    pub updated_dependency_files: Vec<DependencyFile>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pr_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pr_body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub commit_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_group: Option<Map<String, Value>>,
}

/// A request to close a pull request that is no longer needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ClosePullRequest {
    pub dependency_names: Vec<String>,
    pub reason: String,
}

/// Signals that the job finished processing the given commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct MarkAsProcessed {
    pub base_commit_sha: String,
}

/// Versions of the package manager tooling the job ran with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RecordPackageManagerVersion {
    pub ecosystem: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub package_managers: Map<String, Value>,
}

/// A job-level failure report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RecordUpdateJobError {
    pub error_type: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub error_details: Map<String, Value>,
}

/// A decoded update event.
///
/// Serializes as the bare event body, without the kind. Use
/// [`Event::encode`] to produce a request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Event {
    UpdateDependencyList(UpdateDependencyList),
    CreatePullRequest(CreatePullRequest),
    UpdatePullRequest(UpdatePullRequest),
    ClosePullRequest(ClosePullRequest),
    MarkAsProcessed(MarkAsProcessed),
    RecordPackageManagerVersion(RecordPackageManagerVersion),
    RecordUpdateJobError(RecordUpdateJobError),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope<T> {
    #[serde(default)]
    data: T,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    data: &'a Event,
}

impl Event {
    /// Decode a raw request body for the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownKind`] for an unrecognized kind and
    /// [`DecodeError::Malformed`] if the body does not fit the kind's schema.
    pub fn decode(kind: &str, data: &[u8]) -> Result<Self, DecodeError> {
        let kind: EventKind = kind.parse()?;
        match kind {
            EventKind::UpdateDependencyList => {
                from_slice(kind, data).map(Event::UpdateDependencyList)
            }
            EventKind::CreatePullRequest => from_slice(kind, data).map(Event::CreatePullRequest),
            EventKind::UpdatePullRequest => from_slice(kind, data).map(Event::UpdatePullRequest),
            EventKind::ClosePullRequest => from_slice(kind, data).map(Event::ClosePullRequest),
            EventKind::MarkAsProcessed => from_slice(kind, data).map(Event::MarkAsProcessed),
            EventKind::RecordPackageManagerVersion => {
                from_slice(kind, data).map(Event::RecordPackageManagerVersion)
            }
            EventKind::RecordUpdateJobError => {
                from_slice(kind, data).map(Event::RecordUpdateJobError)
            }
        }
    }

    /// Decode an already-parsed `{data: ...}` document for the given kind.
    pub fn from_value(kind: EventKind, value: serde_yaml::Value) -> Result<Self, DecodeError> {
        match kind {
            EventKind::UpdateDependencyList => {
                from_value(kind, value).map(Event::UpdateDependencyList)
            }
            EventKind::CreatePullRequest => from_value(kind, value).map(Event::CreatePullRequest),
            EventKind::UpdatePullRequest => from_value(kind, value).map(Event::UpdatePullRequest),
            EventKind::ClosePullRequest => from_value(kind, value).map(Event::ClosePullRequest),
            EventKind::MarkAsProcessed => from_value(kind, value).map(Event::MarkAsProcessed),
            EventKind::RecordPackageManagerVersion => {
                from_value(kind, value).map(Event::RecordPackageManagerVersion)
            }
            EventKind::RecordUpdateJobError => {
                from_value(kind, value).map(Event::RecordUpdateJobError)
            }
        }
    }

    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::UpdateDependencyList(_) => EventKind::UpdateDependencyList,
            Event::CreatePullRequest(_) => EventKind::CreatePullRequest,
            Event::UpdatePullRequest(_) => EventKind::UpdatePullRequest,
            Event::ClosePullRequest(_) => EventKind::ClosePullRequest,
            Event::MarkAsProcessed(_) => EventKind::MarkAsProcessed,
            Event::RecordPackageManagerVersion(_) => EventKind::RecordPackageManagerVersion,
            Event::RecordUpdateJobError(_) => EventKind::RecordUpdateJobError,
        }
    }

    /// Encode as a JSON request body, `{"data": ...}`.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&EnvelopeRef { data: self })
    }

    /// The event body as a JSON value.
    pub fn to_json(&self) -> Value {
        // All maps in the model are string-keyed, so this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn from_slice<T>(kind: EventKind, data: &[u8]) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Default,
{
    // An empty stream holds no document, which is not the same as `{}`.
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Malformed {
            kind,
            source: serde::de::Error::custom("empty body"),
        });
    }
    serde_yaml::from_slice::<Envelope<T>>(data)
        .map(|envelope| envelope.data)
        .map_err(|source| DecodeError::Malformed { kind, source })
}

fn from_value<T>(kind: EventKind, value: serde_yaml::Value) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Default,
{
    serde_yaml::from_value::<Envelope<T>>(value)
        .map(|envelope| envelope.data)
        .map_err(|source| DecodeError::Malformed { kind, source })
}
