use anyhow::Result;
use async_trait::async_trait;
use std::io::ErrorKind;

use crate::domain::ResourceUri;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Exists,
    /// The resource cannot be opened as a text model, e.g. it is created by
    /// the edit itself.
    Missing,
}

/// Opens a text model for a resource and releases it right away; used only
/// to learn whether the original side of a diff exists.
#[async_trait]
pub trait ModelProbe: Send + Sync {
    /// `Err` is reserved for unexpected failures; absence is `Missing`.
    async fn open_and_release(&self, uri: &ResourceUri) -> Result<ProbeOutcome>;
}

/// Probes `file:` resources on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsModelProbe;

#[async_trait]
impl ModelProbe for FsModelProbe {
    async fn open_and_release(&self, uri: &ResourceUri) -> Result<ProbeOutcome> {
        let Some(path) = uri.to_file_path() else {
            return Ok(ProbeOutcome::Missing);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                // Opening proves readability; the handle is dropped at once.
                drop(tokio::fs::File::open(&path).await?);
                Ok(ProbeOutcome::Exists)
            }
            Ok(_) => Ok(ProbeOutcome::Missing),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ProbeOutcome::Missing),
            Err(err) => Err(err.into()),
        }
    }
}
