//! Raw edits as produced by a refactoring, before they are grouped for preview.

use serde::{Deserialize, Serialize};

use super::uri::ResourceUri;

/// 1-based position inside a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: Range,
    pub text: String,
}

/// Grouping and confirmation hints attached to an edit by its producer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditMetadata {
    /// Category label, e.g. the refactoring kind.
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Edits that need confirmation start unchecked.
    #[serde(default)]
    pub needs_confirmation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTextEdit {
    pub resource: ResourceUri,
    pub edit: TextEdit,
    /// Model version the edit was computed against.
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub metadata: Option<EditMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEditOptions {
    pub overwrite: bool,
    pub ignore_if_exists: bool,
    pub ignore_if_not_exists: bool,
}

/// Create (`new` only), delete (`old` only) or rename (both).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFileEdit {
    #[serde(default)]
    pub old_resource: Option<ResourceUri>,
    #[serde(default)]
    pub new_resource: Option<ResourceUri>,
    #[serde(default)]
    pub options: FileEditOptions,
    #[serde(default)]
    pub metadata: Option<EditMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceEdit {
    Text(ResourceTextEdit),
    File(ResourceFileEdit),
}

impl ResourceEdit {
    pub fn text(resource: impl Into<ResourceUri>, range: Range, text: impl Into<String>) -> Self {
        ResourceEdit::Text(ResourceTextEdit {
            resource: resource.into(),
            edit: TextEdit {
                range,
                text: text.into(),
            },
            version: None,
            metadata: None,
        })
    }

    pub fn create(resource: impl Into<ResourceUri>) -> Self {
        ResourceEdit::File(ResourceFileEdit {
            old_resource: None,
            new_resource: Some(resource.into()),
            options: FileEditOptions::default(),
            metadata: None,
        })
    }

    pub fn delete(resource: impl Into<ResourceUri>) -> Self {
        ResourceEdit::File(ResourceFileEdit {
            old_resource: Some(resource.into()),
            new_resource: None,
            options: FileEditOptions::default(),
            metadata: None,
        })
    }

    pub fn rename(from: impl Into<ResourceUri>, to: impl Into<ResourceUri>) -> Self {
        ResourceEdit::File(ResourceFileEdit {
            old_resource: Some(from.into()),
            new_resource: Some(to.into()),
            options: FileEditOptions::default(),
            metadata: None,
        })
    }

    pub fn with_metadata(mut self, metadata: EditMetadata) -> Self {
        match &mut self {
            ResourceEdit::Text(edit) => edit.metadata = Some(metadata),
            ResourceEdit::File(edit) => edit.metadata = Some(metadata),
        }
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        if let ResourceEdit::Text(edit) = &mut self {
            edit.version = Some(version);
        }
        self
    }

    pub fn metadata(&self) -> Option<&EditMetadata> {
        match self {
            ResourceEdit::Text(edit) => edit.metadata.as_ref(),
            ResourceEdit::File(edit) => edit.metadata.as_ref(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ResourceEdit::Text(_))
    }

    /// The resource the edit lands on: the target of a text edit, the new
    /// name of a create/rename, the old name of a delete.
    pub fn resource(&self) -> Option<&ResourceUri> {
        match self {
            ResourceEdit::Text(edit) => Some(&edit.resource),
            ResourceEdit::File(edit) => edit.new_resource.as_ref().or(edit.old_resource.as_ref()),
        }
    }
}

/// Final, materialized list of edits to apply.
pub type WorkspaceEdit = Vec<ResourceEdit>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_edits() {
        let json = r#"[
            {"type": "text", "resource": "file:///a.rs",
             "edit": {"range": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 4}}, "text": "foo"},
             "metadata": {"label": "Rename"}},
            {"type": "file", "old_resource": "file:///b.rs"}
        ]"#;
        let edits: Vec<ResourceEdit> = serde_json::from_str(json).unwrap();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].metadata().map(|m| m.label.as_str()), Some("Rename"));
        assert_eq!(edits[1], ResourceEdit::delete("file:///b.rs"));
    }

    #[test]
    fn resource_prefers_new_name() {
        let rename = ResourceEdit::rename("file:///old.rs", "file:///new.rs");
        assert_eq!(rename.resource(), Some(&ResourceUri::from("file:///new.rs")));
        let delete = ResourceEdit::delete("file:///gone.rs");
        assert_eq!(delete.resource(), Some(&ResourceUri::from("file:///gone.rs")));
    }
}
