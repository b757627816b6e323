use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A source image, identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub name: String,
    pub path: PathBuf,
}

impl ImageItem {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path: path.to_path_buf(),
        }
    }

    /// File name without extension.
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionRow {
    #[serde(rename = "Image Name")]
    pub image_name: String,
    #[serde(rename = "Caption")]
    pub caption: String,
}
