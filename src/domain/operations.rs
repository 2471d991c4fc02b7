//! The operation set of one preview session: raw edits grouped per file and
//! per category, their checked state and the conflicts found so far.

use std::collections::HashMap;
use std::sync::Arc;

use super::checked::CheckedStates;
use super::conflicts::ConflictList;
use super::edit::{ResourceEdit, WorkspaceEdit};
use super::operation::{
    BulkCategory, DEFAULT_CATEGORY_LABEL, EditId, FileOperation, FileOperationKind, FileOperations,
    TextEditEntry,
};
use super::uri::ResourceUri;

#[derive(Debug)]
pub struct BulkFileOperations {
    edits: Vec<ResourceEdit>,
    file_operations: FileOperations,
    categories: Vec<BulkCategory>,
    checked: CheckedStates,
    conflicts: ConflictList,
}

impl BulkFileOperations {
    /// Groups `edits`. `versions` holds the current model version of open
    /// resources; text edits computed against another version conflict
    /// right away.
    pub fn from_edits(edits: Vec<ResourceEdit>, versions: &HashMap<ResourceUri, u64>) -> Self {
        let file_operations = Arc::new(group_by_resource(&edits, 0..edits.len()));
        let categories = group_by_category(&edits);

        let initial = edits
            .iter()
            .map(|edit| !edit.metadata().is_some_and(|m| m.needs_confirmation))
            .collect();

        let monitored = file_operations
            .iter()
            .flat_map(|op| std::iter::once(op.uri.clone()).chain(op.new_uri.clone()));
        let conflicts = ConflictList::new(monitored);
        for edit in &edits {
            if let ResourceEdit::Text(text) = edit
                && let (Some(expected), Some(current)) = (text.version, versions.get(&text.resource))
                && expected != *current
            {
                log::debug!(
                    "{} is at version {} but the edit targets {}",
                    text.resource,
                    current,
                    expected
                );
                conflicts.mark_changed(&text.resource);
            }
        }

        Self {
            edits,
            file_operations,
            categories,
            checked: CheckedStates::new(initial),
            conflicts,
        }
    }

    pub fn edits(&self) -> &[ResourceEdit] {
        &self.edits
    }

    pub fn file_operations(&self) -> &FileOperations {
        &self.file_operations
    }

    pub fn categories(&self) -> &[BulkCategory] {
        &self.categories
    }

    pub fn checked(&self) -> &CheckedStates {
        &self.checked
    }

    pub fn conflicts(&self) -> &ConflictList {
        &self.conflicts
    }

    /// The checked raw edits, in input order.
    pub fn workspace_edit(&self) -> WorkspaceEdit {
        self.edits
            .iter()
            .enumerate()
            .filter(|(id, _)| self.checked.is_checked(*id))
            .map(|(_, edit)| edit.clone())
            .collect()
    }
}

/// Groups edits per resource. A rename is keyed by its old name, and text
/// edits addressing the new name land in that same operation.
fn group_by_resource(
    edits: &[ResourceEdit],
    ids: impl IntoIterator<Item = EditId>,
) -> Vec<FileOperation> {
    let renamed: HashMap<&ResourceUri, &ResourceUri> = edits
        .iter()
        .filter_map(|edit| match edit {
            ResourceEdit::File(file) => match (&file.old_resource, &file.new_resource) {
                (Some(old), Some(new)) => Some((new, old)),
                _ => None,
            },
            ResourceEdit::Text(_) => None,
        })
        .collect();
    let original = |uri: &ResourceUri| -> ResourceUri {
        renamed.get(uri).map_or_else(|| uri.clone(), |old| (*old).clone())
    };

    let mut operations: Vec<FileOperation> = Vec::new();
    let mut index: HashMap<ResourceUri, usize> = HashMap::new();

    let mut slot = |uri: ResourceUri| -> usize {
        *index.entry(uri.clone()).or_insert_with(|| {
            operations.push(FileOperation::new(uri));
            operations.len() - 1
        })
    };

    let mut placed: Vec<(usize, EditId)> = Vec::new();
    for id in ids {
        let Some(edit) = edits.get(id) else {
            continue;
        };
        match edit {
            ResourceEdit::Text(text) => placed.push((slot(original(&text.resource)), id)),
            ResourceEdit::File(file) => match (&file.old_resource, &file.new_resource) {
                (Some(old), _) => placed.push((slot(old.clone()), id)),
                (None, Some(new)) => placed.push((slot(new.clone()), id)),
                (None, None) => log::warn!("Ignoring file edit #{id} without any resource"),
            },
        }
    }

    for (at, id) in placed {
        let operation = &mut operations[at];
        match &edits[id] {
            ResourceEdit::Text(text) => {
                operation.kind |= FileOperationKind::TEXT_EDIT;
                operation.text_edits.push(TextEditEntry {
                    id,
                    edit: text.edit.clone(),
                });
            }
            ResourceEdit::File(file) => {
                operation.kind |= match (&file.old_resource, &file.new_resource) {
                    (None, Some(_)) => FileOperationKind::CREATE,
                    (Some(_), None) => FileOperationKind::DELETE,
                    _ => {
                        operation.new_uri = file.new_resource.clone();
                        FileOperationKind::RENAME
                    }
                };
                operation.file_edits.push(id);
            }
        }
    }
    operations
}

fn group_by_category(edits: &[ResourceEdit]) -> Vec<BulkCategory> {
    let mut order: Vec<(String, Option<String>, Vec<EditId>)> = Vec::new();
    for (id, edit) in edits.iter().enumerate() {
        let (label, description) = match edit.metadata() {
            Some(meta) => (meta.label.as_str(), meta.description.clone()),
            None => (DEFAULT_CATEGORY_LABEL, None),
        };
        match order.iter_mut().find(|(existing, _, _)| existing == label) {
            Some((_, _, ids)) => ids.push(id),
            None => order.push((label.to_string(), description, vec![id])),
        }
    }

    order
        .into_iter()
        .map(|(label, description, ids)| BulkCategory {
            label,
            description,
            file_operations: Arc::new(group_by_resource(edits, ids)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::edit::{EditMetadata, Range};

    fn labeled(edit: ResourceEdit, label: &str) -> ResourceEdit {
        edit.with_metadata(EditMetadata {
            label: label.into(),
            ..Default::default()
        })
    }

    #[test]
    fn groups_edits_per_resource() {
        let ops = BulkFileOperations::from_edits(
            vec![
                ResourceEdit::text("file:///a.rs", Range::new(1, 1, 1, 2), "x"),
                ResourceEdit::create("file:///b.rs"),
                ResourceEdit::text("file:///b.rs", Range::new(1, 1, 1, 1), "fn b() {}"),
                ResourceEdit::text("file:///a.rs", Range::new(3, 1, 3, 2), "y"),
            ],
            &HashMap::new(),
        );

        let files = ops.file_operations();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].uri, ResourceUri::from("file:///a.rs"));
        assert_eq!(files[0].kind, FileOperationKind::TEXT_EDIT);
        assert_eq!(
            files[0].text_edits.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![0, 3]
        );
        assert_eq!(
            files[1].kind,
            FileOperationKind::CREATE | FileOperationKind::TEXT_EDIT
        );
        assert_eq!(files[1].file_edits, vec![1]);
    }

    #[test]
    fn rename_is_tracked_under_old_name() {
        let ops = BulkFileOperations::from_edits(
            vec![ResourceEdit::rename("file:///old.rs", "file:///new.rs")],
            &HashMap::new(),
        );
        let op = &ops.file_operations()[0];
        assert_eq!(op.uri, ResourceUri::from("file:///old.rs"));
        assert_eq!(op.new_uri, Some(ResourceUri::from("file:///new.rs")));
        assert!(op.kind.contains(FileOperationKind::RENAME));
    }

    #[test]
    fn edits_on_either_name_of_a_renamed_file_share_one_operation() {
        let ops = BulkFileOperations::from_edits(
            vec![
                ResourceEdit::text("file:///old.rs", Range::new(1, 1, 1, 1), "a"),
                ResourceEdit::rename("file:///old.rs", "file:///new.rs"),
                ResourceEdit::text("file:///new.rs", Range::new(2, 1, 2, 1), "b"),
            ],
            &HashMap::new(),
        );
        let files = ops.file_operations();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].uri, ResourceUri::from("file:///old.rs"));
        assert_eq!(
            files[0].kind,
            FileOperationKind::RENAME | FileOperationKind::TEXT_EDIT
        );
        assert_eq!(files[0].file_edits, vec![1]);
        assert_eq!(
            files[0].text_edits.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[test]
    fn categories_follow_metadata_labels() {
        let ops = BulkFileOperations::from_edits(
            vec![
                labeled(
                    ResourceEdit::text("file:///a.rs", Range::new(1, 1, 1, 2), "x"),
                    "Rename",
                ),
                ResourceEdit::delete("file:///c.rs"),
                labeled(
                    ResourceEdit::text("file:///b.rs", Range::new(1, 1, 1, 2), "x"),
                    "Rename",
                ),
            ],
            &HashMap::new(),
        );
        let labels: Vec<_> = ops.categories().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Rename", DEFAULT_CATEGORY_LABEL]);
        assert_eq!(ops.categories()[0].file_operations.len(), 2);
        assert!(ops.categories()[1].file_operations[0].is_delete());
    }

    #[test]
    fn edits_needing_confirmation_start_unchecked() {
        let ops = BulkFileOperations::from_edits(
            vec![
                ResourceEdit::create("file:///a.rs"),
                ResourceEdit::delete("file:///b.rs").with_metadata(EditMetadata {
                    label: "Cleanup".into(),
                    description: None,
                    needs_confirmation: true,
                }),
            ],
            &HashMap::new(),
        );
        assert_eq!(ops.checked().checked_count(), 1);
        assert_eq!(ops.workspace_edit(), vec![ResourceEdit::create("file:///a.rs")]);
    }

    #[test]
    fn stale_versions_are_conflicts() {
        let mut versions = HashMap::new();
        versions.insert(ResourceUri::from("file:///a.rs"), 7);
        versions.insert(ResourceUri::from("file:///b.rs"), 2);
        let ops = BulkFileOperations::from_edits(
            vec![
                ResourceEdit::text("file:///a.rs", Range::new(1, 1, 1, 1), "x").with_version(6),
                ResourceEdit::text("file:///b.rs", Range::new(1, 1, 1, 1), "x").with_version(2),
            ],
            &versions,
        );
        assert_eq!(ops.conflicts().list(), vec![ResourceUri::from("file:///a.rs")]);
    }
}
