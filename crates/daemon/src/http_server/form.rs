use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;

use common::job::ActionError;
use common::prelude::{Action, JobRequest, UploadedFile};

/// Form field carrying individually picked files
pub const FILES_FIELD: &str = "files";
/// Form field carrying files picked through a directory chooser
pub const FOLDER_FIELD: &str = "folder";
/// Positional relative path hints, one per uploaded file
pub const RELPATHS_FIELD: &str = "relpaths";

const DEFAULT_ACTION: &str = "encrypt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Files,
    Folder,
}

#[derive(Debug)]
struct FilePart {
    source: Source,
    file_name: String,
    contents: Bytes,
}

/// A job submission as read off the wire, before validation
#[derive(Debug, Default)]
pub struct JobForm {
    pub action: Option<String>,
    pub password: Option<String>,
    pub files: Vec<UploadedFile>,
}

impl JobForm {
    /// Drain a multipart body into a form.
    ///
    /// Unknown fields are skipped. File parts are paired with the
    ///  `relpaths` values once the whole body has been read.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut action = None;
        let mut password = None;
        let mut parts = Vec::new();
        let mut hints = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "action" => action = Some(field.text().await?),
                "password" => password = Some(field.text().await?),
                RELPATHS_FIELD => hints.push(field.text().await?),
                FILES_FIELD | FOLDER_FIELD => {
                    let source = if name == FILES_FIELD {
                        Source::Files
                    } else {
                        Source::Folder
                    };
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let contents = field.bytes().await?;
                    tracing::debug!(file_name, size = contents.len(), "received file part");
                    parts.push(FilePart {
                        source,
                        file_name,
                        contents,
                    });
                }
                _ => {
                    tracing::warn!("Ignoring unknown field: {}", name);
                }
            }
        }

        Ok(Self {
            action,
            password,
            files: pair_uploads(parts, hints),
        })
    }

    /// Validate the form into a job request
    pub fn into_request(self) -> Result<JobRequest, ActionError> {
        let action: Action = self.action.as_deref().unwrap_or(DEFAULT_ACTION).parse()?;
        let password = self
            .password
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(JobRequest {
            action,
            password,
            files: self.files,
        })
    }
}

/// Pair file parts with their path hints.
///
/// `files` parts come first, then `folder` parts, each in arrival order;
///  the i-th hint belongs to the i-th file in that order. A `folder` file
///  with no usable hint falls back to its own client filename, which is
///  where browsers put the relative path for directory uploads.
fn pair_uploads(parts: Vec<FilePart>, hints: Vec<String>) -> Vec<UploadedFile> {
    let (picked, folder): (Vec<_>, Vec<_>) =
        parts.into_iter().partition(|p| p.source == Source::Files);
    let mut hints = hints.into_iter();

    picked
        .into_iter()
        .chain(folder)
        .map(|part| {
            let hint = hints.next().filter(|h| !h.trim().is_empty());
            let hint = match (hint, part.source) {
                (Some(hint), _) => Some(hint),
                (None, Source::Folder) if !part.file_name.is_empty() => {
                    Some(part.file_name.clone())
                }
                (None, _) => None,
            };
            let upload = UploadedFile::new(part.file_name, part.contents);
            match hint {
                Some(hint) => upload.with_relative_path(hint),
                None => upload,
            }
        })
        .collect()
}
