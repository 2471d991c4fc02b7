use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::{BulkFileOperations, ResourceEdit, ResourceUri};

/// Turns a raw edit list into the operation set of a preview session.
#[async_trait]
pub trait OperationSetFactory: Send + Sync {
    async fn create(&self, edits: Vec<ResourceEdit>) -> Result<BulkFileOperations>;
}

/// Builds operation sets in memory. Known model versions, if any, turn
/// edits computed against an older version into conflicts.
#[derive(Debug, Default, Clone)]
pub struct DefaultOperationSetFactory {
    versions: HashMap<ResourceUri, u64>,
}

impl DefaultOperationSetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(versions: HashMap<ResourceUri, u64>) -> Self {
        Self { versions }
    }
}

#[async_trait]
impl OperationSetFactory for DefaultOperationSetFactory {
    async fn create(&self, edits: Vec<ResourceEdit>) -> Result<BulkFileOperations> {
        Ok(BulkFileOperations::from_edits(edits, &self.versions))
    }
}
