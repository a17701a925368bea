use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UPLOADS_DIR_NAME: &str = "uploads";
pub const LOG_FILE_NAME: &str = "process.log";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const ARCHIVE_FILE_NAME: &str = "results.zip";

/// Suffix of the tool-internal files that never leave a job
pub const SIDECAR_SUFFIX: &str = ".lock";

const JOB_ID_PREFIX: &str = "job-";
const JOB_ID_HEX_LEN: usize = 8;

/// Whether a relative path names a tool sidecar file
pub fn is_sidecar(rel: &str) -> bool {
    rel.ends_with(SIDECAR_SUFFIX)
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum JobIdError {
    #[error("invalid job id: {0:?}")]
    Invalid(String),
}

/// Opaque job identifier, `job-` followed by eight lowercase hex digits.
///
/// Parsing is strict: an id is also a directory name under the jobs
///  root, so anything that could carry a separator or a `..` is rejected
///  before it gets near the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", JOB_ID_PREFIX, &hex[..JOB_ID_HEX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JobId {
    type Err = JobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix(JOB_ID_PREFIX)
            .ok_or_else(|| JobIdError::Invalid(s.to_string()))?;
        let valid = hex.len() == JOB_ID_HEX_LEN
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !valid {
            return Err(JobIdError::Invalid(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for JobId {
    type Error = JobIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("invalid action: {0:?}")]
    Invalid(String),
}

/// What the external tool is asked to do with a job's files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Encrypt,
    Decrypt,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Encrypt => "encrypt",
            Action::Decrypt => "decrypt",
        }
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "encrypt" => Ok(Action::Encrypt),
            "decrypt" => Ok(Action::Decrypt),
            other => Err(ActionError::Invalid(other.to_string())),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job workspace on disk.
///
/// The root is owned exclusively by the job and holds:
/// * `uploads/` - the sandboxed file tree
/// * `process.log` - combined tool output
/// * `manifest.json` - the result listing (its presence means "ready")
/// * `results.zip` - the archive cache, once someone asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    root: PathBuf,
    action: Action,
}

impl Job {
    pub fn new(id: JobId, root: PathBuf, action: Action) -> Self {
        Self { id, root, action }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE_NAME)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE_NAME)
    }
}
