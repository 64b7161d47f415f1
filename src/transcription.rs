//! Audio transcription upload guard
//!
//! Files over the size limit are rejected before any request is made and the
//! current selection is left as it was.

use thiserror::Error;

/// Largest audio file accepted for transcription
pub const MAX_AUDIO_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptionError {
    #[error("File size exceeds {} MB. Please choose a smaller file.", .limit / (1024 * 1024))]
    FileTooLarge { size: usize, limit: usize },
    #[error("No file selected")]
    NoFile,
}

/// An audio file picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: Option<String>,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// The selected-file field of the upload form
#[derive(Debug, Clone)]
pub struct FileSelection {
    limit: usize,
    selected: Option<SelectedFile>,
}

impl Default for FileSelection {
    fn default() -> Self {
        Self::new(MAX_AUDIO_BYTES)
    }
}

impl FileSelection {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            selected: None,
        }
    }

    /// Replace the selection, unless the file is over the limit
    pub fn select(&mut self, file: SelectedFile) -> Result<(), TranscriptionError> {
        if file.size() > self.limit {
            tracing::debug!(name = %file.name, size = file.size(), limit = self.limit, "Rejected oversized audio file");
            return Err(TranscriptionError::FileTooLarge {
                size: file.size(),
                limit: self.limit,
            });
        }
        self.selected = Some(file);
        Ok(())
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Take the selection for submission
    pub fn take(&mut self) -> Result<SelectedFile, TranscriptionError> {
        self.selected.take().ok_or(TranscriptionError::NoFile)
    }
}
