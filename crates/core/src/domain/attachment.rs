use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(pub Uuid);

impl AttachmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A local file queued for upload. Content is never read until submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
    #[serde(skip)]
    pub path: PathBuf,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = mime_guess::from_path(&path).first_or_octet_stream().to_string();

        Self { id: AttachmentId::new(), name, size_bytes, content_type, path }
    }

    /// Builds an attachment from file metadata on disk.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{}` is not a regular file", path.display()),
            ));
        }
        Ok(Self::new(path, metadata.len()))
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name).extension().map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AttachmentRejection {
    #[error("`{name}` has an unsupported file type (accepted: {accepted})")]
    UnsupportedType { name: String, accepted: String },
    #[error("`{name}` is {size_bytes} bytes which exceeds the {max_bytes} byte limit")]
    TooLarge { name: String, size_bytes: u64, max_bytes: u64 },
}

/// Upload constraints declared to the upload entry point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub accepted_extensions: Vec<String>,
    pub max_file_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted_extensions: ["pdf", "png", "jpg", "jpeg", "doc", "docx", "txt", "log"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            max_file_size_bytes: 10 * 1024 * 1024,
        }
    }
}

impl UploadPolicy {
    pub fn check(&self, attachment: &Attachment) -> Result<(), AttachmentRejection> {
        let accepted = attachment.extension().is_some_and(|ext| {
            self.accepted_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        });
        if !accepted {
            return Err(AttachmentRejection::UnsupportedType {
                name: attachment.name.clone(),
                accepted: self.accepted_extensions.join(", "),
            });
        }

        if attachment.size_bytes > self.max_file_size_bytes {
            return Err(AttachmentRejection::TooLarge {
                name: attachment.name.clone(),
                size_bytes: attachment.size_bytes,
                max_bytes: self.max_file_size_bytes,
            });
        }

        Ok(())
    }
}

/// Ordered list of files held until submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttachmentList {
    items: Vec<Attachment>,
}

impl AttachmentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attachment: Attachment) -> AttachmentId {
        let id = attachment.id;
        self.items.push(attachment);
        id
    }

    pub fn remove(&mut self, id: AttachmentId) -> Option<Attachment> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: AttachmentId) -> Option<&Attachment> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
