use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{DiffResourcePair, Position, ResourceEdit, ResourceUri};

/// Where a diff view opens relative to the active editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorGroup {
    #[default]
    Active,
    Side,
}

/// Resource and position a freshly opened view scrolls to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTarget {
    pub resource: ResourceUri,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct DiffViewRequest {
    pub edits: Vec<ResourceEdit>,
    pub source: ResourceUri,
    pub diff_resources: Arc<Vec<DiffResourcePair>>,
    pub label: String,
    pub reveal: Option<RevealTarget>,
    pub group: EditorGroup,
}

/// An open multi-diff view.
#[async_trait(?Send)]
pub trait DiffViewHandle {
    /// Completes once the view settles on its edits; `None` when it was
    /// dismissed without a result.
    async fn resolved_edits(&mut self) -> Result<Option<Vec<ResourceEdit>>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

#[async_trait(?Send)]
pub trait DiffViewOpener {
    async fn open(&self, request: DiffViewRequest) -> Result<Box<dyn DiffViewHandle>>;
}
