//! One preview session at a time: from `set_input` to accept, discard or
//! cancellation.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::IntoFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::element::TreeElement;
use super::expand::AutoExpandPlanner;
use super::flags::ContextFlags;
use super::resolver::{self, DiffResources, ResourceResolver};
use super::tree::{GroupingMode, TreeView};
use super::view_states::ViewStateCache;
use crate::domain::{
    BulkFileOperations, CheckedSubscription, Position, PreviewError, ResourceEdit, ResourceUri,
    WorkspaceEdit,
};
use crate::infra::app_config::{AppConfig, DEFAULT_AUTO_EXPAND_LIMIT, DEFAULT_PREVIEW_SCHEME};
use crate::infra::dialog::Dialog;
use crate::infra::opener::{DiffViewOpener, DiffViewRequest, EditorGroup, RevealTarget};
use crate::infra::operations::OperationSetFactory;
use crate::infra::preferences::PreferenceStore;
use crate::infra::preview_uri::SessionPreviewUris;
use crate::infra::probe::ModelProbe;

/// Preference key of the persisted grouping mode.
pub const GROUP_BY_FILE_KEY: &str = "refactorPreview.groupByFile";

/// Label of the diff views opened from the preview.
pub const PREVIEW_LABEL: &str = "Refactor Preview";

/// Collaborators the controller consumes.
pub struct PreviewServices {
    pub factory: Arc<dyn OperationSetFactory>,
    pub probe: Arc<dyn ModelProbe>,
    pub dialog: Box<dyn Dialog>,
    pub opener: Box<dyn DiffViewOpener>,
    pub preferences: Box<dyn PreferenceStore>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOptions {
    pub auto_expand_limit: usize,
    pub preview_scheme: String,
    pub workspace_root: Option<PathBuf>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            auto_expand_limit: DEFAULT_AUTO_EXPAND_LIMIT,
            preview_scheme: DEFAULT_PREVIEW_SCHEME.to_string(),
            workspace_root: None,
        }
    }
}

impl From<&AppConfig> for PreviewOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            auto_expand_limit: config.auto_expand_limit,
            preview_scheme: config.preview_scheme.clone(),
            workspace_root: config.workspace_root.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No input; a placeholder is shown.
    Empty,
    /// Tree populated, waiting for a decision.
    Loaded,
    /// The caller cancelled; cleanup waits for the next `set_input`.
    Cancelled,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Accepted,
    Discarded,
    Cancelled,
}

/// Final outcome of a `set_input` call: the checked edits when the preview
/// is accepted, `None` when it is discarded, superseded or cancelled.
///
/// Awaiting stops observing the cancellation token once the outcome is known.
#[derive(Debug)]
pub struct PreviewDecision {
    rx: oneshot::Receiver<Option<WorkspaceEdit>>,
    token: CancellationToken,
}

impl PreviewDecision {
    pub async fn wait(mut self) -> Option<WorkspaceEdit> {
        tokio::select! {
            biased;
            result = &mut self.rx => result.ok().flatten(),
            _ = self.token.cancelled() => None,
        }
    }
}

impl IntoFuture for PreviewDecision {
    type Output = Option<WorkspaceEdit>;
    type IntoFuture = BoxFuture<'static, Option<WorkspaceEdit>>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait().boxed()
    }
}

struct PendingResolution {
    tx: oneshot::Sender<Option<WorkspaceEdit>>,
    token: CancellationToken,
}

impl PendingResolution {
    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A cancelled session already resolved with "no result".
    fn resolve(self, result: Option<WorkspaceEdit>) {
        if self.is_cancelled() {
            return;
        }
        let _ = self.tx.send(result);
    }
}

/// Resources living exactly as long as one session.
struct Session {
    input: Arc<BulkFileOperations>,
    uris: SessionPreviewUris,
    checked_changes: CheckedSubscription,
}

pub struct PreviewController<T: TreeView> {
    tree: T,
    services: PreviewServices,
    options: PreviewOptions,
    preferred_grouping: GroupingMode,
    grouping: GroupingMode,
    view_states: ViewStateCache,
    planner: AutoExpandPlanner,
    resolver: ResourceResolver,
    flags: ContextFlags,
    session: Option<Session>,
    pending: Option<PendingResolution>,
}

impl<T: TreeView> PreviewController<T> {
    pub fn new(tree: T, services: PreviewServices, options: PreviewOptions) -> Self {
        let preferred_grouping =
            GroupingMode::from_group_by_file(services.preferences.get_bool(GROUP_BY_FILE_KEY, true));
        Self {
            tree,
            planner: AutoExpandPlanner::new(options.auto_expand_limit),
            services,
            options,
            preferred_grouping,
            grouping: preferred_grouping,
            view_states: ViewStateCache::new(),
            resolver: ResourceResolver::new(),
            flags: ContextFlags {
                group_by_file: preferred_grouping.is_by_file(),
                ..ContextFlags::default()
            },
            session: None,
            pending: None,
        }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    pub fn grouping(&self) -> GroupingMode {
        self.grouping
    }

    pub fn input(&self) -> Option<&Arc<BulkFileOperations>> {
        self.session.as_ref().map(|session| &session.input)
    }

    pub fn has_input(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> SessionState {
        match (&self.session, &self.pending) {
            (None, _) => SessionState::Empty,
            (Some(_), Some(pending)) if pending.is_cancelled() => SessionState::Cancelled,
            (Some(_), _) => SessionState::Loaded,
        }
    }

    /// Whether a decision is still outstanding.
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_cancelled())
    }

    /// Starts a new session for `edits`. Any previous session is resolved
    /// with "no result" first.
    pub async fn set_input(
        &mut self,
        edits: Vec<ResourceEdit>,
        token: CancellationToken,
    ) -> Result<PreviewDecision, PreviewError> {
        log::info!("Previewing {} edits", edits.len());
        self.session = None;
        self.view_states.clear();
        self.resolver.invalidate();
        if let Some(stale) = self.pending.take() {
            log::debug!("Superseding the previous preview session");
            stale.resolve(None);
        }

        let input = match self.services.factory.create(edits).await {
            Ok(input) => Arc::new(input),
            Err(err) => {
                self.flags.has_categories = false;
                return Err(PreviewError::OperationSet(err));
            }
        };

        let has_categories = input.categories().len() > 1;
        self.grouping = if has_categories {
            self.preferred_grouping
        } else {
            GroupingMode::ByFile
        };
        self.flags = ContextFlags {
            has_categories,
            group_by_file: self.grouping.is_by_file(),
            has_checked_changes: input.checked().checked_count() > 0,
        };

        let (tx, rx) = oneshot::channel();
        self.pending = Some(PendingResolution {
            tx,
            token: token.clone(),
        });
        self.session = Some(Session {
            checked_changes: input.checked().subscribe(),
            uris: SessionPreviewUris::new(self.options.preview_scheme.as_str()),
            input: input.clone(),
        });

        if let Err(err) = self.set_tree_input(input).await {
            self.teardown(None);
            return Err(err);
        }

        if let Err(err) = self.resolve_resources().await {
            log::warn!("Could not resolve diff resources up front: {err}");
        }

        Ok(PreviewDecision { rx, token })
    }

    async fn set_tree_input(&mut self, input: Arc<BulkFileOperations>) -> Result<(), PreviewError> {
        let view_state = self.view_states.restore(self.grouping);
        let restored = view_state.is_some();
        self.tree
            .set_input(input, self.grouping, view_state)
            .await
            .map_err(PreviewError::Tree)?;

        if restored {
            return Ok(());
        }
        self.planner.run(&mut self.tree).await?;
        Ok(())
    }

    /// Applies the checked edits unless a resource changed in the meantime;
    /// conflicts always end the session as discarded, after a warning.
    pub async fn accept(&mut self) -> Option<Resolution> {
        let session = self.session.as_ref()?;
        if self.state() == SessionState::Cancelled {
            self.teardown(None);
            return Some(Resolution::Cancelled);
        }

        let conflicts = session.input.conflicts().list();
        if conflicts.is_empty() {
            let edit = session.input.workspace_edit();
            log::info!("Applying {} edits", edit.len());
            self.teardown(Some(edit));
            return Some(Resolution::Accepted);
        }

        let message = conflict_message(&conflicts, self.options.workspace_root.as_deref());
        log::warn!("{message}");
        if let Err(err) = self.services.dialog.warn(&message).await {
            log::warn!("Conflict warning could not be shown: {err}");
        }
        self.teardown(None);
        Some(Resolution::Discarded)
    }

    pub fn discard(&mut self) -> Option<Resolution> {
        self.session.as_ref()?;
        let resolution = if self.state() == SessionState::Cancelled {
            Resolution::Cancelled
        } else {
            log::info!("Discarding preview");
            Resolution::Discarded
        };
        self.teardown(None);
        Some(resolution)
    }

    fn teardown(&mut self, result: Option<WorkspaceEdit>) {
        if let Some(pending) = self.pending.take() {
            pending.resolve(result);
        }
        self.session = None;
        self.resolver.invalidate();
    }

    /// Flips the checked state of the focused element. Disabled text edits
    /// are left alone.
    pub fn toggle_checked(&mut self) -> bool {
        let Some(input) = self.input().cloned() else {
            return false;
        };
        let Some(focused) = self.tree.focus() else {
            return false;
        };
        let toggled = match focused {
            TreeElement::File(_) | TreeElement::TextEdit { .. } if focused.is_disabled(&input) => {
                false
            }
            TreeElement::File(_) | TreeElement::TextEdit { .. } | TreeElement::Category { .. } => {
                focused.set_checked(&input, !focused.is_checked(&input))
            }
        };
        self.process_checked_changes();
        toggled
    }

    /// Handles pending checked-state notifications: one tree refresh and one
    /// flag update per change. Returns the number of changes handled.
    pub fn process_checked_changes(&mut self) -> usize {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        let mut handled = 0;
        while let Some(change) = session.checked_changes.try_next() {
            log::debug!(
                "{} edits now {}",
                change.edits.len(),
                if change.checked { "checked" } else { "unchecked" }
            );
            self.tree.update_children();
            self.flags.has_checked_changes = session.input.checked().checked_count() > 0;
            handled += 1;
        }
        handled
    }

    pub async fn group_by_file(&mut self) -> Result<(), PreviewError> {
        if !self.grouping.is_by_file() {
            self.toggle_grouping().await?;
        }
        Ok(())
    }

    pub async fn group_by_type(&mut self) -> Result<(), PreviewError> {
        if self.grouping.is_by_file() {
            self.toggle_grouping().await?;
        }
        Ok(())
    }

    /// Switches grouping, keeping each mode's view state for the way back,
    /// and remembers the choice. Without a live session or with a single
    /// category the tree stays grouped by file.
    pub async fn toggle_grouping(&mut self) -> Result<(), PreviewError> {
        let Some(input) = self.input().cloned() else {
            return Ok(());
        };
        if !self.flags.has_categories {
            log::debug!("Only one category, keeping the tree grouped by file");
            return Ok(());
        }

        self.view_states
            .capture(self.grouping, self.tree.view_state());

        self.grouping = self.grouping.toggled();
        self.preferred_grouping = self.grouping;
        self.set_tree_input(input).await?;

        self.services
            .preferences
            .store_bool(GROUP_BY_FILE_KEY, self.grouping.is_by_file())
            .map_err(PreviewError::Preferences)?;
        self.flags.group_by_file = self.grouping.is_by_file();
        Ok(())
    }

    /// Diff endpoints for every file operation of the session, memoized on
    /// the identity of the operation sequence.
    pub async fn resolve_resources(&self) -> Result<DiffResources, PreviewError> {
        let session = self.session.as_ref().ok_or(PreviewError::NoInput)?;
        let resources = self
            .resolver
            .resolve(
                session.input.file_operations(),
                &session.uris,
                self.services.probe.as_ref(),
            )
            .await?;
        Ok(resources)
    }

    /// Opens the multi-diff view over the whole session, scrolled to the
    /// file of `element`. Categories open nothing.
    pub async fn open_element(
        &self,
        element: &TreeElement,
        side_by_side: bool,
    ) -> Result<bool, PreviewError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(false);
        };
        let Some(operation) = element.file().and_then(|file| file.resolve(&session.input)) else {
            return Ok(false);
        };

        let diff_resources = self.resolve_resources().await?;
        let request = DiffViewRequest {
            edits: session.input.edits().to_vec(),
            source: session.uris.source(),
            diff_resources,
            label: PREVIEW_LABEL.to_string(),
            reveal: Some(RevealTarget {
                resource: operation.uri.clone(),
                position: Position::new(1, 1),
            }),
            group: if side_by_side {
                EditorGroup::Side
            } else {
                EditorGroup::Active
            },
        };
        self.services
            .opener
            .open(request)
            .await
            .map_err(PreviewError::Opener)?;
        Ok(true)
    }

    /// Shows `edits` in a transient diff view, waits for the edits it
    /// settles on and closes it. Only text edits can be shown this way; any
    /// other edit yields an empty list without opening anything.
    pub async fn open_and_collect(
        &self,
        edits: Vec<ResourceEdit>,
    ) -> Result<Option<Vec<ResourceEdit>>, PreviewError> {
        if edits.iter().any(|edit| !edit.is_text()) {
            return Ok(Some(Vec::new()));
        }
        let session = self.session.as_ref().ok_or(PreviewError::NoInput)?;

        let resources: Vec<&ResourceUri> = edits.iter().filter_map(|e| e.resource()).collect();
        let reveal = resources.first().map(|resource| RevealTarget {
            resource: (*resource).clone(),
            position: Position::new(1, 1),
        });
        let diff_resources =
            resolver::resolve_uris(resources, &session.uris, self.services.probe.as_ref()).await?;

        let request = DiffViewRequest {
            edits: edits.clone(),
            source: session.uris.source(),
            diff_resources: Arc::new(diff_resources),
            label: PREVIEW_LABEL.to_string(),
            reveal,
            group: EditorGroup::Active,
        };
        let mut handle = self
            .services
            .opener
            .open(request)
            .await
            .map_err(PreviewError::Opener)?;
        let resolved = handle.resolved_edits().await.map_err(PreviewError::Opener)?;
        handle.close().await.map_err(PreviewError::Opener)?;
        Ok(resolved)
    }
}

pub fn conflict_message(conflicts: &[ResourceUri], root: Option<&Path>) -> String {
    match conflicts {
        [single] => format!(
            "Cannot apply refactoring because '{}' has changed in the meantime.",
            single.label(root)
        ),
        _ => format!(
            "Cannot apply refactoring because {} other files have changed in the meantime.",
            conflicts.len()
        ),
    }
}
