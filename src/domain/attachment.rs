//! Files attached to an idea.
//!
//! An attachment is either a local file that has been picked but not yet
//! uploaded, or a reference to a file that already lives in storage. The two
//! cases carry different data, so they are kept apart at the type level.

use std::{fs, io, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file attached to an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Attachment {
    /// Selected locally, awaiting upload.
    Pending(PendingUpload),
    /// Uploaded and addressable.
    Persisted(StoredAttachment),
}

/// A local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpload {
    /// File name shown to users.
    pub filename: String,
    /// MIME type, e.g. `application/pdf`.
    pub mime_type: String,
    /// Size of the file in bytes.
    pub size_bytes: u64,
    /// Where the file currently lives on the local machine.
    pub local_path: PathBuf,
}

/// A file that has been persisted to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAttachment {
    /// Unique identifier of the stored file.
    pub id: Uuid,
    /// File name shown to users.
    pub filename: String,
    /// MIME type, e.g. `application/pdf`.
    pub mime_type: String,
    /// Size of the file in bytes.
    pub size_bytes: u64,
    /// Storage location (URL or key).
    pub location: String,
    /// When the upload completed.
    pub uploaded: DateTime<Utc>,
}

impl PendingUpload {
    /// Describe a local file as a pending upload.
    ///
    /// The MIME type is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read, or if the path
    /// does not name a regular file.
    pub fn from_path(path: PathBuf) -> io::Result<Self> {
        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            mime_type: mime_type_for(&filename).to_string(),
            filename,
            size_bytes: metadata.len(),
            local_path: path,
        })
    }

    /// Mark the upload as complete.
    #[must_use]
    pub fn persist(self, location: String) -> StoredAttachment {
        StoredAttachment {
            id: Uuid::new_v4(),
            filename: self.filename,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            location,
            uploaded: Utc::now(),
        }
    }
}

impl Attachment {
    /// File name shown to users.
    #[must_use]
    pub fn filename(&self) -> &str {
        match self {
            Self::Pending(upload) => &upload.filename,
            Self::Persisted(stored) => &stored.filename,
        }
    }

    /// MIME type of the file.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Pending(upload) => &upload.mime_type,
            Self::Persisted(stored) => &stored.mime_type,
        }
    }

    /// Size of the file in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        match self {
            Self::Pending(upload) => upload.size_bytes,
            Self::Persisted(stored) => stored.size_bytes,
        }
    }

    /// Whether the file still has to be uploaded.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl From<PendingUpload> for Attachment {
    fn from(upload: PendingUpload) -> Self {
        Self::Pending(upload)
    }
}

impl From<StoredAttachment> for Attachment {
    fn from(stored: StoredAttachment) -> Self {
        Self::Persisted(stored)
    }
}

fn mime_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}
