// Job Domain Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Job identifier, assigned by the client at submission time
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&JobId> for JobId {
    fn from(id: &JobId) -> Self {
        id.clone()
    }
}

/// Remote job status
///
/// The remote vocabulary is open-ended: anything unknown lands in `Other` and
/// is treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    #[default]
    Waiting,
    Executing,
    Succeeded,
    Failed,
    Cancelled,
    Other(String),
}

impl JobStatus {
    /// Terminal statuses are sinks: no further transition occurs
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Waiting => "Waiting",
            JobStatus::Executing => "Executing",
            JobStatus::Succeeded => "Succeeded",
            JobStatus::Failed => "Failed",
            JobStatus::Cancelled => "Cancelled",
            JobStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Waiting" => JobStatus::Waiting,
            "Executing" => JobStatus::Executing,
            "Succeeded" => JobStatus::Succeeded,
            "Failed" => JobStatus::Failed,
            "Cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        JobStatus::from(s.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Error reported by the remote side for a failed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub code: String,
    pub message: String,
}

/// Where an uploaded payload lives, as reported by the storage collaborator.
/// Never interpreted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLocation {
    pub container_uri: String,
    pub input_data_uri: String,
}

impl PayloadLocation {
    pub fn new(container_uri: impl Into<String>, input_data_uri: impl Into<String>) -> Self {
        Self {
            container_uri: container_uri.into(),
            input_data_uri: input_data_uri.into(),
        }
    }
}

/// Job details snapshot
///
/// Fields other than `status`, the timestamps, `output_data_uri` and
/// `error_data` are fixed once the remote side accepts the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub id: JobId,
    #[serde(default)]
    pub name: String,
    pub target: String,
    pub provider_id: String,
    pub input_data_format: String,
    pub output_data_format: String,
    #[serde(default)]
    pub container_uri: String,
    #[serde(default)]
    pub input_data_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data_uri: Option<String>,
    #[serde(default)]
    pub input_params: BTreeMap<String, serde_json::Value>,

    // Server-driven fields
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_execution_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_execution_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<ErrorData>,
}

impl JobDetails {
    /// Create details for a new job. `id` and payload location are filled in
    /// at submission.
    pub fn new(
        target: impl Into<String>,
        provider_id: impl Into<String>,
        input_data_format: impl Into<String>,
        output_data_format: impl Into<String>,
    ) -> Self {
        Self {
            id: JobId::default(),
            name: String::new(),
            target: target.into(),
            provider_id: provider_id.into(),
            input_data_format: input_data_format.into(),
            output_data_format: output_data_format.into(),
            container_uri: String::new(),
            input_data_uri: String::new(),
            output_data_uri: None,
            input_params: BTreeMap::new(),
            status: JobStatus::Waiting,
            creation_time: None,
            begin_execution_time: None,
            end_execution_time: None,
            error_data: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_input_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.input_params.insert(key.into(), value.into());
        self
    }

    /// Bind the details to an id and payload location (done by the client)
    pub fn assign(&mut self, id: JobId, location: PayloadLocation) {
        self.id = id;
        self.container_uri = location.container_uri;
        self.input_data_uri = location.input_data_uri;
    }
}

/// Filter for job listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub target: Option<String>,
    pub provider_id: Option<String>,
    pub name_contains: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
}

impl JobFilter {
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    pub fn with_name_containing(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    pub fn created_after(mut self, at: DateTime<Utc>) -> Self {
        self.created_after = Some(at);
        self
    }

    pub fn matches(&self, job: &JobDetails) -> bool {
        if let Some(status) = &self.status {
            if &job.status != status {
                return false;
            }
        }
        if let Some(target) = &self.target {
            if &job.target != target {
                return false;
            }
        }
        if let Some(provider_id) = &self.provider_id {
            if !job.provider_id.eq_ignore_ascii_case(provider_id) {
                return false;
            }
        }
        if let Some(fragment) = &self.name_contains {
            if !job.name.contains(fragment.as_str()) {
                return false;
            }
        }
        if let Some(after) = &self.created_after {
            match job.creation_time {
                Some(created) if created > *after => {}
                _ => return false,
            }
        }
        true
    }
}
