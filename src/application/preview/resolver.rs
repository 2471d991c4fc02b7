//! Maps file operations to the (original, proposed) endpoints of their diffs.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::domain::{DiffResourcePair, FileOperations, ResolutionError, ResourceUri};
use crate::infra::preview_uri::{PreviewUriAllocator, SessionPreviewUris};
use crate::infra::probe::{ModelProbe, ProbeOutcome};

pub type DiffResources = Arc<Vec<DiffResourcePair>>;

/// Memoizes the resolution of the last operation sequence it saw.
///
/// The key is the sequence's identity, not its contents. The slot is only
/// replaced once a resolution has completed, so readers never see a
/// half-built result.
#[derive(Debug, Default)]
pub struct ResourceResolver {
    slot: Mutex<Option<(FileOperations, DiffResources)>>,
}

impl ResourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, operations: &FileOperations) -> Option<DiffResources> {
        match &*self.slot.lock() {
            Some((key, value)) if Arc::ptr_eq(key, operations) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn invalidate(&self) {
        self.slot.lock().take();
    }

    pub async fn resolve(
        &self,
        operations: &FileOperations,
        uris: &dyn PreviewUriAllocator,
        probe: &dyn ModelProbe,
    ) -> Result<DiffResources, ResolutionError> {
        if let Some(hit) = self.cached(operations) {
            log::debug!("Reusing {} resolved diff resources", hit.len());
            return Ok(hit);
        }

        let mut resources = Vec::with_capacity(operations.len());
        for operation in operations.iter() {
            let modified = uris.as_preview_uri(&operation.uri);
            if operation.is_delete() {
                // Deleted files show the removed content alone.
                resources.push(DiffResourcePair {
                    original: None,
                    modified,
                });
            } else {
                let original = resolve_original(&operation.uri, probe).await?;
                resources.push(DiffResourcePair {
                    original: Some(original),
                    modified,
                });
            }
        }

        let resources = Arc::new(resources);
        *self.slot.lock() = Some((operations.clone(), resources.clone()));
        log::debug!("Resolved {} diff resources", resources.len());
        Ok(resources)
    }
}

/// The real resource when it can be opened, the empty sentinel otherwise.
pub async fn resolve_original(
    uri: &ResourceUri,
    probe: &dyn ModelProbe,
) -> Result<ResourceUri, ResolutionError> {
    match probe.open_and_release(uri).await {
        Ok(ProbeOutcome::Exists) => Ok(uri.clone()),
        Ok(ProbeOutcome::Missing) => Ok(SessionPreviewUris::empty_preview()),
        Err(source) => Err(ResolutionError::Probe {
            uri: uri.clone(),
            source,
        }),
    }
}

/// Diff endpoints for plain resources, one pair per distinct resource in
/// first-seen order. Not memoized.
pub async fn resolve_uris<'a>(
    resources: impl IntoIterator<Item = &'a ResourceUri>,
    uris: &dyn PreviewUriAllocator,
    probe: &dyn ModelProbe,
) -> Result<Vec<DiffResourcePair>, ResolutionError> {
    let mut seen: Vec<&ResourceUri> = Vec::new();
    for resource in resources {
        if !seen.contains(&resource) {
            seen.push(resource);
        }
    }

    let mut pairs = Vec::with_capacity(seen.len());
    for resource in seen {
        pairs.push(DiffResourcePair {
            original: Some(resolve_original(resource, probe).await?),
            modified: uris.as_preview_uri(resource),
        });
    }
    Ok(pairs)
}
