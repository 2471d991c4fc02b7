use std::collections::VecDeque;

use super::element::TreeElement;
use super::tree::TreeView;
use crate::domain::PreviewError;

/// Expands a freshly loaded tree that has no remembered view state.
///
/// Only the first `limit` root children are considered. Files are expanded
/// to show their edits; categories are expanded and all of their files
/// queued. Expansions run one after another since a node's children exist
/// only once its own expansion finished.
#[derive(Debug, Clone, Copy)]
pub struct AutoExpandPlanner {
    limit: usize,
}

impl AutoExpandPlanner {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of nodes expanded.
    pub async fn run<T: TreeView + ?Sized>(&self, tree: &mut T) -> Result<usize, PreviewError> {
        let mut queue: VecDeque<TreeElement> =
            tree.children(None).into_iter().take(self.limit).collect();
        let mut expanded = 0;

        while let Some(element) = queue.pop_front() {
            match element {
                TreeElement::File(_) => {
                    tree.expand(&element).await.map_err(PreviewError::Tree)?;
                    expanded += 1;
                }
                TreeElement::Category { .. } => {
                    tree.expand(&element).await.map_err(PreviewError::Tree)?;
                    expanded += 1;
                    queue.extend(tree.children(Some(&element)));
                }
                TreeElement::TextEdit { .. } => {}
            }
        }

        log::debug!("Auto-expanded {expanded} preview nodes");
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::preview::tree::{GroupingMode, PreviewTree};
    use crate::domain::{BulkFileOperations, EditMetadata, Range, ResourceEdit};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn many_files(count: usize) -> Arc<BulkFileOperations> {
        let edits = (0..count)
            .map(|i| {
                ResourceEdit::text(
                    format!("file:///f{i:02}.rs"),
                    Range::new(1, 1, 1, 1),
                    "x",
                )
            })
            .collect();
        Arc::new(BulkFileOperations::from_edits(edits, &HashMap::new()))
    }

    #[tokio::test]
    async fn expands_only_the_first_ten_files() {
        let mut tree = PreviewTree::new();
        tree.set_input(many_files(14), GroupingMode::ByFile, None)
            .await
            .unwrap();

        let expanded = AutoExpandPlanner::new(10).run(&mut tree).await.unwrap();
        assert_eq!(expanded, 10);

        let roots = tree.children(None);
        for (idx, element) in roots.iter().enumerate() {
            assert_eq!(tree.is_expanded(element), idx < 10, "root #{idx}");
        }
    }

    #[tokio::test]
    async fn categories_expand_all_of_their_files() {
        let edits = (0..12)
            .map(|i| {
                ResourceEdit::text(
                    format!("file:///f{i:02}.rs"),
                    Range::new(1, 1, 1, 1),
                    "x",
                )
                .with_metadata(EditMetadata {
                    label: if i % 2 == 0 { "Even" } else { "Odd" }.into(),
                    ..Default::default()
                })
            })
            .collect();
        let input = Arc::new(BulkFileOperations::from_edits(edits, &HashMap::new()));
        let mut tree = PreviewTree::new();
        tree.set_input(input, GroupingMode::ByCategory, None)
            .await
            .unwrap();

        let expanded = AutoExpandPlanner::new(10).run(&mut tree).await.unwrap();
        assert_eq!(expanded, 2 + 12);
        for category in tree.children(None) {
            assert!(tree.is_expanded(&category));
            for file in tree.children(Some(&category)) {
                assert!(tree.is_expanded(&file));
            }
        }
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let mut tree = PreviewTree::new();
        tree.set_input(many_files(0), GroupingMode::ByFile, None)
            .await
            .unwrap();
        assert_eq!(AutoExpandPlanner::new(10).run(&mut tree).await.unwrap(), 0);
    }
}
