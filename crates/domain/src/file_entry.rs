use serde::{Deserialize, Serialize};

/// One file or folder returned by a remote folder listing.
///
/// The path is relative to the listed folder, exactly as the hosting API
/// reports it. Extra listing fields (size, timestamps) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    path: String,
}

impl FileEntry {
    /// Creates an entry from a listed path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the listed path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }
}

/// Joins a listed folder and an entry path into the path used for deletion.
///
/// An empty folder denotes the server root, where listed paths are already
/// root-relative.
#[must_use]
pub fn remote_path(folder_path: &str, entry: &FileEntry) -> String {
    let folder_path = folder_path.trim_end_matches('/');
    if folder_path.is_empty() {
        return entry.path().to_owned();
    }

    format!("{folder_path}/{}", entry.path().trim_start_matches('/'))
}
