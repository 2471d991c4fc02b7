use uuid::Uuid;

use crate::domain::ResourceUri;

/// Sentinel shown as the original side when a resource does not exist yet.
pub const EMPTY_PREVIEW: &str = "refactor-preview-empty:";

/// Maps a real resource to the synthetic URI holding its proposed content.
/// Must be deterministic per resource for the lifetime of one session.
pub trait PreviewUriAllocator: Send + Sync {
    fn as_preview_uri(&self, uri: &ResourceUri) -> ResourceUri;
}

/// Preview URIs scoped to one session: `<scheme>://<session>/<original>`.
#[derive(Debug, Clone)]
pub struct SessionPreviewUris {
    scheme: String,
    session: Uuid,
}

impl SessionPreviewUris {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            session: Uuid::new_v4(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn empty_preview() -> ResourceUri {
        ResourceUri::from(EMPTY_PREVIEW)
    }

    /// URI identifying the preview itself, handed to diff views as source.
    pub fn source(&self) -> ResourceUri {
        ResourceUri::new(format!("{}:", self.scheme))
    }
}

impl PreviewUriAllocator for SessionPreviewUris {
    fn as_preview_uri(&self, uri: &ResourceUri) -> ResourceUri {
        ResourceUri::new(format!("{}://{}/{}", self.scheme, self.session, uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_uris_are_stable_within_a_session() {
        let uris = SessionPreviewUris::new("refactor-preview");
        let a = ResourceUri::from("file:///a.rs");
        let first = uris.as_preview_uri(&a);
        assert_eq!(first, uris.as_preview_uri(&a));
        assert_eq!(first.scheme(), "refactor-preview");
        assert!(first.as_str().ends_with("/file:///a.rs"));
    }

    #[test]
    fn sessions_do_not_share_preview_uris() {
        let a = ResourceUri::from("file:///a.rs");
        let one = SessionPreviewUris::new("refactor-preview");
        let two = SessionPreviewUris::new("refactor-preview");
        assert_ne!(one.as_preview_uri(&a), two.as_preview_uri(&a));
    }
}
