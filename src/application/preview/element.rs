//! Nodes of the preview tree.
//!
//! Elements are plain indices into the session's [`BulkFileOperations`], so
//! they double as their own identity inside view states.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BulkCategory, BulkFileOperations, EditId, FileOperation, FileOperationKind, TextEditEntry,
};

/// A file row, either top-level (`category: None`) or below a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileElement {
    pub category: Option<usize>,
    pub operation: usize,
}

impl FileElement {
    pub fn resolve<'a>(&self, ops: &'a BulkFileOperations) -> Option<&'a FileOperation> {
        match self.category {
            Some(category) => ops
                .categories()
                .get(category)?
                .file_operations
                .get(self.operation),
            None => ops.file_operations().get(self.operation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeElement {
    Category { category: usize },
    File(FileElement),
    TextEdit { file: FileElement, edit: usize },
}

impl TreeElement {
    pub fn category<'a>(&self, ops: &'a BulkFileOperations) -> Option<&'a BulkCategory> {
        match self {
            TreeElement::Category { category } => ops.categories().get(*category),
            _ => None,
        }
    }

    /// The file this element belongs to: itself, or the parent of a text edit.
    pub fn file(&self) -> Option<FileElement> {
        match self {
            TreeElement::Category { .. } => None,
            TreeElement::File(file) | TreeElement::TextEdit { file, .. } => Some(*file),
        }
    }

    pub fn text_edit<'a>(&self, ops: &'a BulkFileOperations) -> Option<&'a TextEditEntry> {
        match self {
            TreeElement::TextEdit { file, edit } => file.resolve(ops)?.text_edits.get(*edit),
            _ => None,
        }
    }

    pub fn edit_ids(&self, ops: &BulkFileOperations) -> Vec<EditId> {
        match self {
            TreeElement::Category { .. } => self
                .category(ops)
                .map(|category| category.edit_ids().collect())
                .unwrap_or_default(),
            TreeElement::File(file) => file
                .resolve(ops)
                .map(|op| op.edit_ids().collect())
                .unwrap_or_default(),
            TreeElement::TextEdit { .. } => self
                .text_edit(ops)
                .map(|entry| vec![entry.id])
                .unwrap_or_default(),
        }
    }

    /// Checked when every edit below the element is checked.
    pub fn is_checked(&self, ops: &BulkFileOperations) -> bool {
        let ids = self.edit_ids(ops);
        !ids.is_empty() && ops.checked().all_checked(ids)
    }

    /// Applies `value` to every edit below the element; cascades for
    /// categories and files. Returns whether anything changed.
    pub fn set_checked(&self, ops: &BulkFileOperations, value: bool) -> bool {
        ops.checked().set_checked(self.edit_ids(ops), value)
    }

    /// A text edit of a created, deleted or renamed file cannot be included
    /// while the file-level edit itself is excluded.
    pub fn is_disabled(&self, ops: &BulkFileOperations) -> bool {
        let TreeElement::TextEdit { file, .. } = self else {
            return false;
        };
        let Some(op) = file.resolve(ops) else {
            return true;
        };
        !op.file_edits.is_empty() && !ops.checked().all_checked(op.file_edits.iter().copied())
    }

    pub fn label(&self, ops: &BulkFileOperations) -> String {
        match self {
            TreeElement::Category { .. } => self
                .category(ops)
                .map(|category| category.label.clone())
                .unwrap_or_default(),
            TreeElement::File(file) => file.resolve(ops).map(file_label).unwrap_or_default(),
            TreeElement::TextEdit { .. } => self
                .text_edit(ops)
                .map(|entry| {
                    let start = entry.range().start;
                    format!("{}:{} {}", start.line, start.column, entry.edit.text.trim())
                })
                .unwrap_or_default(),
        }
    }
}

fn file_label(op: &FileOperation) -> String {
    let mut label = match &op.new_uri {
        Some(new) => format!("{} \u{2192} {}", op.uri, new),
        None => op.uri.to_string(),
    };
    if op.kind.contains(FileOperationKind::CREATE) {
        label.push_str(" (create)");
    } else if op.kind.contains(FileOperationKind::DELETE) {
        label.push_str(" (delete)");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EditMetadata, Range, ResourceEdit};
    use std::collections::HashMap;

    fn ops() -> BulkFileOperations {
        let rename = EditMetadata {
            label: "Rename".into(),
            ..Default::default()
        };
        BulkFileOperations::from_edits(
            vec![
                ResourceEdit::create("file:///new.rs").with_metadata(rename.clone()),
                ResourceEdit::text("file:///new.rs", Range::new(1, 1, 1, 1), "mod a;")
                    .with_metadata(rename.clone()),
                ResourceEdit::text("file:///lib.rs", Range::new(2, 1, 2, 4), "b")
                    .with_metadata(rename),
                ResourceEdit::text("file:///lib.rs", Range::new(9, 1, 9, 4), "c"),
            ],
            &HashMap::new(),
        )
    }

    #[test]
    fn file_toggle_cascades_to_its_edits() {
        let ops = ops();
        let new_rs = TreeElement::File(FileElement {
            category: None,
            operation: 0,
        });
        assert!(new_rs.is_checked(&ops));
        assert!(new_rs.set_checked(&ops, false));
        assert!(!ops.checked().is_checked(0));
        assert!(!ops.checked().is_checked(1));
        assert_eq!(ops.checked().checked_count(), 2);
    }

    #[test]
    fn category_toggle_covers_only_its_edits() {
        let ops = ops();
        let rename = TreeElement::Category { category: 0 };
        rename.set_checked(&ops, false);
        assert_eq!(ops.checked().checked_count(), 1);
        assert!(ops.checked().is_checked(3));
        assert!(!rename.is_checked(&ops));
    }

    #[test]
    fn text_edit_of_excluded_create_is_disabled() {
        let ops = ops();
        let file = FileElement {
            category: None,
            operation: 0,
        };
        let edit = TreeElement::TextEdit { file, edit: 0 };
        assert!(!edit.is_disabled(&ops));

        ops.checked().set_checked([0], false);
        assert!(edit.is_disabled(&ops));

        let plain = TreeElement::TextEdit {
            file: FileElement {
                category: None,
                operation: 1,
            },
            edit: 0,
        };
        assert!(!plain.is_disabled(&ops));
    }

    #[test]
    fn labels_describe_the_element() {
        let ops = ops();
        let file = FileElement {
            category: None,
            operation: 0,
        };
        assert_eq!(
            TreeElement::File(file).label(&ops),
            "file:///new.rs (create)"
        );
        assert_eq!(
            TreeElement::TextEdit { file, edit: 0 }.label(&ops),
            "1:1 mod a;"
        );
        assert_eq!(TreeElement::Category { category: 0 }.label(&ops), "Rename");
    }
}
