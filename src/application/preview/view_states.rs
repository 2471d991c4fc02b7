use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::element::TreeElement;
use super::tree::GroupingMode;

/// Snapshot of tree expansion, focus and selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub expanded: BTreeSet<TreeElement>,
    pub focus: Option<TreeElement>,
    pub selection: Vec<TreeElement>,
}

/// Last view state seen under each grouping mode, so toggling back and forth
/// keeps the tree where the user left it. Holds at most one state per mode.
#[derive(Debug, Default)]
pub struct ViewStateCache {
    by_file: Option<ViewState>,
    by_category: Option<ViewState>,
}

impl ViewStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(&mut self, mode: GroupingMode, state: ViewState) {
        *self.slot(mode) = Some(state);
    }

    pub fn restore(&self, mode: GroupingMode) -> Option<ViewState> {
        match mode {
            GroupingMode::ByFile => self.by_file.clone(),
            GroupingMode::ByCategory => self.by_category.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.by_file = None;
        self.by_category = None;
    }

    fn slot(&mut self, mode: GroupingMode) -> &mut Option<ViewState> {
        match mode {
            GroupingMode::ByFile => &mut self.by_file,
            GroupingMode::ByCategory => &mut self.by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded(category: usize) -> ViewState {
        ViewState {
            expanded: [TreeElement::Category { category }].into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_one_state_per_mode() {
        let mut cache = ViewStateCache::new();
        assert!(cache.restore(GroupingMode::ByFile).is_none());

        cache.capture(GroupingMode::ByCategory, expanded(0));
        cache.capture(GroupingMode::ByCategory, expanded(1));
        assert_eq!(cache.restore(GroupingMode::ByCategory), Some(expanded(1)));
        assert!(cache.restore(GroupingMode::ByFile).is_none());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut cache = ViewStateCache::new();
        cache.capture(GroupingMode::ByFile, ViewState::default());
        cache.capture(GroupingMode::ByCategory, expanded(0));
        cache.clear();
        assert!(cache.restore(GroupingMode::ByFile).is_none());
        assert!(cache.restore(GroupingMode::ByCategory).is_none());
    }
}
