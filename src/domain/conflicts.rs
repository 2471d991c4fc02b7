use parking_lot::RwLock;
use std::collections::BTreeSet;

use super::uri::ResourceUri;

/// Resources that changed on disk after the preview was computed.
#[derive(Debug, Default)]
pub struct ConflictList {
    monitored: BTreeSet<ResourceUri>,
    changed: RwLock<Vec<ResourceUri>>,
}

impl ConflictList {
    pub fn new(monitored: impl IntoIterator<Item = ResourceUri>) -> Self {
        Self {
            monitored: monitored.into_iter().collect(),
            changed: RwLock::new(Vec::new()),
        }
    }

    /// Records an external change. Returns `false` for resources the preview
    /// does not touch and for repeats.
    pub fn mark_changed(&self, uri: &ResourceUri) -> bool {
        if !self.monitored.contains(uri) {
            return false;
        }
        let mut changed = self.changed.write();
        if changed.contains(uri) {
            return false;
        }
        changed.push(uri.clone());
        true
    }

    pub fn list(&self) -> Vec<ResourceUri> {
        self.changed.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_monitored_resources_conflict() {
        let conflicts = ConflictList::new([ResourceUri::from("file:///a.rs")]);
        assert!(!conflicts.mark_changed(&ResourceUri::from("file:///elsewhere.rs")));
        assert!(conflicts.is_empty());

        assert!(conflicts.mark_changed(&ResourceUri::from("file:///a.rs")));
        assert!(!conflicts.mark_changed(&ResourceUri::from("file:///a.rs")));
        assert_eq!(conflicts.list(), vec![ResourceUri::from("file:///a.rs")]);
    }
}
