//! Per-file decorations shown next to the file in the workspace tree.

use serde::{Deserialize, Serialize};

pub const OWNER: &str = "solsense";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileStateKind {
    Custom,
    /// Removes a decoration previously set by the same owner.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileState {
    pub path: String,
    pub is_directory: bool,
    pub state_kind: FileStateKind,
    pub label_class: String,
    pub icon_descriptor: String,
    pub comment: String,
    pub owner: String,
    pub bubble: bool,
}

impl FileState {
    /// Decoration of a file whose compilation reported diagnostics.
    pub fn diagnosed(path: &str, fatal: bool) -> Self {
        let (label_class, icon_descriptor, comment) = if fatal {
            ("text-danger", "fas fa-exclamation-circle", "compilation failed")
        } else {
            (
                "text-warning",
                "fas fa-exclamation-triangle",
                "compiled with warnings",
            )
        };
        Self {
            path: path.to_string(),
            is_directory: false,
            state_kind: FileStateKind::Custom,
            label_class: label_class.to_string(),
            icon_descriptor: icon_descriptor.to_string(),
            comment: comment.to_string(),
            owner: OWNER.to_string(),
            bubble: fatal,
        }
    }

    pub fn cleared(path: &str) -> Self {
        Self {
            path: path.to_string(),
            is_directory: false,
            state_kind: FileStateKind::None,
            label_class: String::new(),
            icon_descriptor: String::new(),
            comment: String::new(),
            owner: OWNER.to_string(),
            bubble: false,
        }
    }
}
