//! The preview tree: which rows exist for the current grouping, which are
//! expanded and which one has focus.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::element::{FileElement, TreeElement};
use super::view_states::ViewState;
use crate::domain::BulkFileOperations;

/// Whether the tree's top level lists files or categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingMode {
    ByFile,
    ByCategory,
}

impl GroupingMode {
    pub fn from_group_by_file(group_by_file: bool) -> Self {
        if group_by_file {
            GroupingMode::ByFile
        } else {
            GroupingMode::ByCategory
        }
    }

    pub fn is_by_file(self) -> bool {
        self == GroupingMode::ByFile
    }

    pub fn toggled(self) -> Self {
        match self {
            GroupingMode::ByFile => GroupingMode::ByCategory,
            GroupingMode::ByCategory => GroupingMode::ByFile,
        }
    }
}

/// A flattened, visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub element: TreeElement,
    pub depth: usize,
    pub label: String,
    pub checked: bool,
    pub disabled: bool,
    pub expanded: bool,
}

/// Asynchronous data tree holding a [`BulkFileOperations`] as its root.
#[async_trait(?Send)]
pub trait TreeView {
    /// Installs a root. With a view state, expansion and focus are restored
    /// from it; without one, everything starts collapsed.
    async fn set_input(
        &mut self,
        input: Arc<BulkFileOperations>,
        mode: GroupingMode,
        view_state: Option<ViewState>,
    ) -> Result<()>;

    fn input(&self) -> Option<&Arc<BulkFileOperations>>;

    /// Children in display order; `None` asks for the root's children.
    fn children(&self, parent: Option<&TreeElement>) -> Vec<TreeElement>;

    /// Loads the element's children and expands it. Returns whether the
    /// element was collapsed before.
    async fn expand(&mut self, element: &TreeElement) -> Result<bool>;

    fn is_expanded(&self, element: &TreeElement) -> bool;

    fn view_state(&self) -> ViewState;

    fn focus(&self) -> Option<TreeElement>;

    /// Re-reads rows from the input, e.g. after checked state changed.
    fn update_children(&mut self);
}

/// In-memory [`TreeView`].
#[derive(Debug)]
pub struct PreviewTree {
    input: Option<Arc<BulkFileOperations>>,
    mode: GroupingMode,
    expanded: BTreeSet<TreeElement>,
    focus: Option<TreeElement>,
    selection: Vec<TreeElement>,
    rows: Vec<TreeRow>,
    refreshes: usize,
}

impl Default for PreviewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewTree {
    pub fn new() -> Self {
        Self {
            input: None,
            mode: GroupingMode::ByFile,
            expanded: BTreeSet::new(),
            focus: None,
            selection: Vec::new(),
            rows: Vec::new(),
            refreshes: 0,
        }
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    /// How many times rows were re-read through [`TreeView::update_children`].
    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    /// Focuses and selects `element` if it is part of the current tree.
    pub fn set_focus(&mut self, element: TreeElement) -> bool {
        if !self.belongs(&element) {
            return false;
        }
        self.focus = Some(element);
        self.selection = vec![element];
        true
    }

    pub fn collapse(&mut self, element: &TreeElement) -> bool {
        let collapsed = self.expanded.remove(element);
        if collapsed {
            self.rebuild_rows();
        }
        collapsed
    }

    /// Whether `element` exists under the current input and grouping.
    fn belongs(&self, element: &TreeElement) -> bool {
        let Some(ops) = self.input.as_deref() else {
            return false;
        };
        let by_category = self.mode == GroupingMode::ByCategory;
        match element {
            TreeElement::Category { category } => {
                by_category && *category < ops.categories().len()
            }
            TreeElement::File(file) => {
                file.category.is_some() == by_category && file.resolve(ops).is_some()
            }
            TreeElement::TextEdit { file, .. } => {
                file.category.is_some() == by_category && element.text_edit(ops).is_some()
            }
        }
    }

    fn rebuild_rows(&mut self) {
        let mut rows = Vec::new();
        if let Some(ops) = self.input.clone() {
            for child in self.children(None) {
                self.push_rows(&ops, child, 0, &mut rows);
            }
        }
        self.rows = rows;
    }

    fn push_rows(
        &self,
        ops: &BulkFileOperations,
        element: TreeElement,
        depth: usize,
        rows: &mut Vec<TreeRow>,
    ) {
        let expanded = self.expanded.contains(&element);
        rows.push(TreeRow {
            element,
            depth,
            label: element.label(ops),
            checked: element.is_checked(ops),
            disabled: element.is_disabled(ops),
            expanded,
        });
        if expanded {
            for child in self.children(Some(&element)) {
                self.push_rows(ops, child, depth + 1, rows);
            }
        }
    }
}

#[async_trait(?Send)]
impl TreeView for PreviewTree {
    async fn set_input(
        &mut self,
        input: Arc<BulkFileOperations>,
        mode: GroupingMode,
        view_state: Option<ViewState>,
    ) -> Result<()> {
        self.input = Some(input);
        self.mode = mode;
        self.expanded.clear();
        self.focus = None;
        self.selection.clear();

        match view_state {
            Some(state) => {
                self.expanded = state
                    .expanded
                    .into_iter()
                    .filter(|element| self.belongs(element))
                    .collect();
                self.focus = state.focus.filter(|element| self.belongs(element));
                self.selection = state
                    .selection
                    .into_iter()
                    .filter(|element| self.belongs(element))
                    .collect();
            }
            None => {
                if let Some(first) = self.children(None).first().copied() {
                    self.set_focus(first);
                }
            }
        }
        self.rebuild_rows();
        Ok(())
    }

    fn input(&self) -> Option<&Arc<BulkFileOperations>> {
        self.input.as_ref()
    }

    fn children(&self, parent: Option<&TreeElement>) -> Vec<TreeElement> {
        let Some(ops) = self.input.as_deref() else {
            return Vec::new();
        };
        match parent {
            None => match self.mode {
                GroupingMode::ByCategory => (0..ops.categories().len())
                    .map(|category| TreeElement::Category { category })
                    .collect(),
                GroupingMode::ByFile => files_in_display_order(ops.file_operations(), None),
            },
            Some(TreeElement::Category { category }) => ops
                .categories()
                .get(*category)
                .map(|c| files_in_display_order(&c.file_operations, Some(*category)))
                .unwrap_or_default(),
            Some(TreeElement::File(file)) => {
                let Some(op) = file.resolve(ops) else {
                    return Vec::new();
                };
                let mut order: Vec<usize> = (0..op.text_edits.len()).collect();
                order.sort_by_key(|idx| op.text_edits[*idx].range());
                order
                    .into_iter()
                    .map(|edit| TreeElement::TextEdit { file: *file, edit })
                    .collect()
            }
            Some(TreeElement::TextEdit { .. }) => Vec::new(),
        }
    }

    async fn expand(&mut self, element: &TreeElement) -> Result<bool> {
        // Children load lazily; give other tasks a turn like a real fetch would.
        tokio::task::yield_now().await;

        if !self.belongs(element) || matches!(element, TreeElement::TextEdit { .. }) {
            return Ok(false);
        }
        let expanded = self.expanded.insert(*element);
        if expanded {
            self.rebuild_rows();
        }
        Ok(expanded)
    }

    fn is_expanded(&self, element: &TreeElement) -> bool {
        self.expanded.contains(element)
    }

    fn view_state(&self) -> ViewState {
        ViewState {
            expanded: self.expanded.clone(),
            focus: self.focus,
            selection: self.selection.clone(),
        }
    }

    fn focus(&self) -> Option<TreeElement> {
        self.focus
    }

    fn update_children(&mut self) {
        self.refreshes += 1;
        self.rebuild_rows();
    }
}

fn files_in_display_order(
    operations: &[crate::domain::FileOperation],
    category: Option<usize>,
) -> Vec<TreeElement> {
    let mut order: Vec<usize> = (0..operations.len()).collect();
    order.sort_by(|a, b| operations[*a].uri.cmp(&operations[*b].uri));
    order
        .into_iter()
        .map(|operation| TreeElement::File(FileElement { category, operation }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EditMetadata, Range, ResourceEdit};
    use std::collections::HashMap;

    fn input() -> Arc<BulkFileOperations> {
        let meta = |label: &str| EditMetadata {
            label: label.into(),
            ..Default::default()
        };
        Arc::new(BulkFileOperations::from_edits(
            vec![
                ResourceEdit::text("file:///b.rs", Range::new(5, 1, 5, 2), "x")
                    .with_metadata(meta("Rename")),
                ResourceEdit::text("file:///b.rs", Range::new(1, 1, 1, 2), "y")
                    .with_metadata(meta("Rename")),
                ResourceEdit::text("file:///a.rs", Range::new(1, 1, 1, 2), "z")
                    .with_metadata(meta("Imports")),
            ],
            &HashMap::new(),
        ))
    }

    #[tokio::test]
    async fn root_children_follow_grouping() {
        let mut tree = PreviewTree::new();
        tree.set_input(input(), GroupingMode::ByFile, None)
            .await
            .unwrap();
        let labels: Vec<_> = tree.rows().iter().map(|row| row.label.clone()).collect();
        assert_eq!(labels, vec!["file:///a.rs", "file:///b.rs"]);

        tree.set_input(input(), GroupingMode::ByCategory, None)
            .await
            .unwrap();
        let labels: Vec<_> = tree.rows().iter().map(|row| row.label.clone()).collect();
        assert_eq!(labels, vec!["Rename", "Imports"]);
    }

    #[tokio::test]
    async fn text_edits_are_sorted_by_range() {
        let mut tree = PreviewTree::new();
        tree.set_input(input(), GroupingMode::ByFile, None)
            .await
            .unwrap();
        let b = tree.children(None)[1];
        assert!(tree.expand(&b).await.unwrap());
        assert!(!tree.expand(&b).await.unwrap());

        let labels: Vec<_> = tree.rows().iter().map(|row| row.label.clone()).collect();
        assert_eq!(labels, vec!["file:///a.rs", "file:///b.rs", "1:1 y", "5:1 x"]);
        assert_eq!(tree.rows()[2].depth, 1);
    }

    #[tokio::test]
    async fn view_state_restores_only_known_elements() {
        let mut tree = PreviewTree::new();
        tree.set_input(input(), GroupingMode::ByCategory, None)
            .await
            .unwrap();
        let rename = tree.children(None)[0];
        tree.expand(&rename).await.unwrap();
        let state = tree.view_state();

        tree.set_input(input(), GroupingMode::ByFile, Some(state.clone()))
            .await
            .unwrap();
        assert!(tree.view_state().expanded.is_empty());

        tree.set_input(input(), GroupingMode::ByCategory, Some(state.clone()))
            .await
            .unwrap();
        assert_eq!(tree.view_state(), state);
    }

    #[tokio::test]
    async fn update_children_rereads_checked_state() {
        let mut tree = PreviewTree::new();
        let ops = input();
        tree.set_input(ops.clone(), GroupingMode::ByFile, None)
            .await
            .unwrap();
        assert!(tree.rows()[0].checked);

        ops.checked().set_checked([2], false);
        assert!(tree.rows()[0].checked);
        tree.update_children();
        assert!(!tree.rows()[0].checked);
        assert_eq!(tree.refresh_count(), 1);
    }
}
