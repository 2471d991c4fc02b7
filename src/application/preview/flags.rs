/// Context flags other UI parts key their actions and menus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextFlags {
    /// More than one category exists, so grouping by type is meaningful.
    pub has_categories: bool,
    pub group_by_file: bool,
    /// At least one edit is checked, so applying does something.
    pub has_checked_changes: bool,
}

impl Default for ContextFlags {
    fn default() -> Self {
        Self {
            has_categories: false,
            group_by_file: true,
            has_checked_changes: true,
        }
    }
}
