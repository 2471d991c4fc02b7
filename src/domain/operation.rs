use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use super::edit::{Range, TextEdit};
use super::uri::ResourceUri;

/// Index of a raw edit in the input list of a preview session.
pub type EditId = usize;

/// Label used for edits that carry no metadata.
pub const DEFAULT_CATEGORY_LABEL: &str = "Other";

/// Bitmask of what happens to a file: several kinds may combine,
/// e.g. a created file that also receives text edits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileOperationKind(u8);

impl FileOperationKind {
    pub const TEXT_EDIT: Self = Self(1);
    pub const CREATE: Self = Self(1 << 1);
    pub const DELETE: Self = Self(1 << 2);
    pub const RENAME: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FileOperationKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FileOperationKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for FileOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::TEXT_EDIT, "TEXT_EDIT"),
            (Self::CREATE, "CREATE"),
            (Self::DELETE, "DELETE"),
            (Self::RENAME, "RENAME"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            f.write_str("FileOperationKind(empty)")
        } else {
            write!(f, "FileOperationKind({})", names.join(" | "))
        }
    }
}

/// One text edit of a file operation, with the id of its raw edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditEntry {
    pub id: EditId,
    pub edit: TextEdit,
}

impl TextEditEntry {
    pub fn range(&self) -> Range {
        self.edit.range
    }
}

/// Everything a bulk edit does to one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOperation {
    /// The resource as it exists before the edit; renames are keyed by
    /// their old name.
    pub uri: ResourceUri,
    /// Target name when the file is renamed.
    pub new_uri: Option<ResourceUri>,
    pub kind: FileOperationKind,
    /// Raw create/delete/rename edits.
    pub file_edits: Vec<EditId>,
    pub text_edits: Vec<TextEditEntry>,
}

impl FileOperation {
    pub fn new(uri: ResourceUri) -> Self {
        Self {
            uri,
            new_uri: None,
            kind: FileOperationKind::empty(),
            file_edits: Vec::new(),
            text_edits: Vec::new(),
        }
    }

    pub fn is_delete(&self) -> bool {
        self.kind.contains(FileOperationKind::DELETE)
    }

    /// Ids of every raw edit that belongs to this operation.
    pub fn edit_ids(&self) -> impl Iterator<Item = EditId> + '_ {
        self.file_edits
            .iter()
            .copied()
            .chain(self.text_edits.iter().map(|entry| entry.id))
    }
}

/// Shared, immutable file operation sequence. Identity matters: caches
/// compare these with `Arc::ptr_eq`.
pub type FileOperations = Arc<Vec<FileOperation>>;

/// A group of operations sharing one metadata label.
#[derive(Debug, Clone)]
pub struct BulkCategory {
    pub label: String,
    pub description: Option<String>,
    pub file_operations: FileOperations,
}

impl BulkCategory {
    pub fn edit_ids(&self) -> impl Iterator<Item = EditId> + '_ {
        self.file_operations.iter().flat_map(|op| op.edit_ids())
    }
}

/// Endpoints of one diff: `original` is `None` for a one-sided view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResourcePair {
    pub original: Option<ResourceUri>,
    pub modified: ResourceUri,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_combine_as_bitmask() {
        let mut kind = FileOperationKind::CREATE;
        kind |= FileOperationKind::TEXT_EDIT;
        assert!(kind.contains(FileOperationKind::CREATE));
        assert!(kind.contains(FileOperationKind::TEXT_EDIT));
        assert!(!kind.contains(FileOperationKind::DELETE));
        assert!(!kind.contains(FileOperationKind::empty()));
        assert_eq!(format!("{kind:?}"), "FileOperationKind(TEXT_EDIT | CREATE)");
    }
}
