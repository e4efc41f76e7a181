//! One author editing one document.
//!
//! `EditorSession` owns the document buffer exclusively. Edits apply in the
//! order they are issued (every mutator takes `&mut self`); each one lands
//! in the history and re-arms autosave. The save/publish/send handlers are
//! the only places that talk to the store or the transport on the user's
//! behalf, and they only change session state after the call succeeds.

use std::sync::Arc;

use quire_common::{
    ContentMode, DocumentId, DocumentKind, DocumentPatch, DocumentRecord, EditorConfig,
    PublishStatus, RecordStore, StoreError,
};
use quire_editor_core::{
    CommandOutcome, Document, EditHistory, EditorCapabilities, FormatCommand, ImagePicker,
    Selection, SelectionProvider,
};
use quire_renderer::{
    RenderedArtifact, RenderedEmail, SanitizerPolicy, TemplateDocument, TemplateValues,
    compose_email, render_str,
};
use smol_str::SmolStr;

use crate::autosave::AutosaveCoordinator;
use crate::error::SessionError;
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::transport::{EmailTransport, OutgoingEmail};
use crate::validation::{Action, validate};

/// Who is editing. Passed in by the host instead of read from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub author: Option<SmolStr>,
}

impl SessionContext {
    pub fn for_author(author: impl Into<SmolStr>) -> Self {
        Self {
            author: Some(author.into()),
        }
    }
}

/// Fields edited alongside the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub subject: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    mode: ContentMode,
    text: String,
}

pub struct EditorSession<S, N = TracingNotifier> {
    store: Arc<S>,
    notifier: Arc<N>,
    context: SessionContext,
    config: EditorConfig,
    policy: SanitizerPolicy,
    capabilities: EditorCapabilities,

    id: Option<DocumentId>,
    kind: DocumentKind,
    status: PublishStatus,
    metadata: Metadata,
    document: Document,
    history: EditHistory<Snapshot>,
    autosave: Option<AutosaveCoordinator<S>>,
    dirty: bool,
    closed: bool,
}

impl<S, N> EditorSession<S, N>
where
    S: RecordStore + 'static,
    N: Notifier,
{
    /// A blank, unsaved document.
    pub fn new(
        kind: DocumentKind,
        store: Arc<S>,
        notifier: Arc<N>,
        context: SessionContext,
        config: EditorConfig,
    ) -> Self {
        let document = Document::new();
        let history = EditHistory::with_initial(Self::snapshot_of(&document), config.history_cap);
        let policy = SanitizerPolicy::with_allowed(&config.allowed_embeds);
        Self {
            store,
            notifier,
            context,
            config,
            policy,
            capabilities: EditorCapabilities::default(),
            id: None,
            kind,
            status: PublishStatus::Draft,
            metadata: Metadata::default(),
            document,
            history,
            autosave: None,
            dirty: false,
            closed: false,
        }
    }

    /// Open a stored document.
    #[tracing::instrument(skip(store, notifier, context, config))]
    pub async fn load(
        id: &DocumentId,
        store: Arc<S>,
        notifier: Arc<N>,
        context: SessionContext,
        config: EditorConfig,
    ) -> Result<Self, SessionError> {
        let record = store
            .get_document(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut session = Self::new(record.kind, store, notifier, context, config);
        session.status = record.status;
        session.metadata = Metadata {
            title: record.title.clone(),
            subject: record.subject.clone(),
            category: record.category.clone(),
        };
        session.document = Document::from_record(&record);
        session.history = EditHistory::with_initial(
            Self::snapshot_of(&session.document),
            session.config.history_cap,
        );
        session.attach(record.id.clone().unwrap_or_else(|| id.clone()));
        tracing::debug!(mode = ?session.document.content_mode(), "loaded document");
        Ok(session)
    }

    pub fn with_capabilities(mut self, capabilities: EditorCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn status(&self) -> PublishStatus {
        self.status
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn capabilities(&self) -> EditorCapabilities {
        self.capabilities
    }

    /// Unsaved changes exist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // === Editing ===

    /// Apply a formatting command at the selection the host reports.
    pub fn apply_format(
        &mut self,
        provider: &impl SelectionProvider,
        command: &FormatCommand,
    ) -> Result<CommandOutcome, SessionError> {
        let selection = provider
            .selection()
            .ok_or_else(|| SessionError::unsupported("no active editing surface"))?;
        self.apply_command_at(selection, command, None)
    }

    /// Apply a formatting command at an explicit selection.
    pub fn apply_command_at(
        &mut self,
        selection: Selection,
        command: &FormatCommand,
        placeholder: Option<&str>,
    ) -> Result<CommandOutcome, SessionError> {
        self.ensure_open()?;
        if self.document.content_mode() != ContentMode::Markdown {
            return Err(SessionError::unsupported(
                "formatting commands apply to markdown; switch to markdown mode first",
            ));
        }
        self.ensure_supported(ContentMode::Markdown)?;

        let outcome = self.document.apply(selection, command, placeholder);
        tracing::debug!(%command, caret = outcome.caret, "formatting command applied");
        self.changed();
        Ok(outcome)
    }

    /// Ask the image picker for an image and insert its tag at `selection`.
    /// `Ok(None)` when the user cancelled the picker.
    pub async fn insert_image(
        &mut self,
        picker: &impl ImagePicker,
        selection: Selection,
    ) -> Result<Option<CommandOutcome>, SessionError> {
        self.ensure_open()?;
        let Some(markdown) = picker.pick_image().await? else {
            return Ok(None);
        };
        self.apply_command_at(selection, &FormatCommand::Image { markdown }, None)
            .map(Some)
    }

    /// Replace the markdown buffer with typed or pasted text.
    pub fn edit_text(&mut self, markdown: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.ensure_supported(ContentMode::Markdown)?;
        self.document.edit_markdown(markdown);
        self.changed();
        Ok(())
    }

    /// Replace the HTML buffer from the rich surface.
    pub fn edit_html(&mut self, html: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.ensure_supported(ContentMode::Html)?;
        self.document.edit_html(html);
        self.changed();
        Ok(())
    }

    /// Make `mode` authoritative. Returns whether divergent content on the
    /// other side was discarded, in which case the notifier hears about it.
    pub fn switch_mode(&mut self, mode: ContentMode) -> Result<bool, SessionError> {
        self.ensure_open()?;
        self.ensure_supported(mode)?;
        if mode == self.document.content_mode() {
            return Ok(false);
        }
        let discarded = self.document.switch_mode(mode);
        if discarded {
            self.notifier.notify(Notice::info(
                "Switched to markdown; edits made in the HTML editor were discarded",
            ));
        }
        self.changed();
        Ok(discarded)
    }

    /// Start the body over from `template`. The document keeps its own copy;
    /// a non-empty template subject replaces the subject.
    pub fn apply_template(&mut self, template: &TemplateDocument) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.ensure_supported(ContentMode::Html)?;
        self.document.apply_template(template);
        if !template.subject.trim().is_empty() {
            self.metadata.subject = Some(template.subject.clone());
        }
        self.changed();
        Ok(())
    }

    /// Step back one snapshot. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        self.ensure_open()?;
        let Some(snapshot) = self.history.undo().cloned() else {
            return Ok(false);
        };
        self.restore(snapshot);
        Ok(true)
    }

    /// Step forward one snapshot. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        self.ensure_open()?;
        let Some(snapshot) = self.history.redo().cloned() else {
            return Ok(false);
        };
        self.restore(snapshot);
        Ok(true)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.metadata.title = title.into();
        self.touched();
        Ok(())
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.metadata.subject = Some(subject.into());
        self.touched();
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.metadata.category = Some(category.into());
        self.touched();
        Ok(())
    }

    // === Output ===

    /// Sanitized HTML of the current body, rebuilt on every call.
    pub fn preview(&self) -> RenderedArtifact {
        self.document.preview(&self.policy)
    }

    /// The email a send would produce right now.
    ///
    /// With a `shell`, the body is placed into it; without one the body is
    /// the whole email (e.g. after a full-page template was applied).
    pub fn compose(&self, shell: Option<&TemplateDocument>, values: &TemplateValues) -> RenderedEmail {
        let subject = self.metadata.subject.as_deref().unwrap_or_default();
        let body = self.document.current_html();
        match shell {
            Some(shell) => compose_email(shell, subject, &body, values, &self.policy),
            None => RenderedEmail {
                subject: render_str(subject, values),
                html: RenderedArtifact::sanitized(&render_str(&body, values), &self.policy),
            },
        }
    }

    // === Actions ===

    /// Explicit save. Bypasses the autosave debounce.
    #[tracing::instrument(skip(self), fields(id = ?self.id, kind = ?self.kind))]
    pub async fn save(&mut self) -> Result<DocumentRecord, SessionError> {
        self.ensure_open()?;
        self.check(Action::Save)?;
        self.persist(self.patch(), "Draft saved").await
    }

    /// Publish an article.
    #[tracing::instrument(skip(self), fields(id = ?self.id))]
    pub async fn publish(&mut self) -> Result<DocumentRecord, SessionError> {
        self.ensure_open()?;
        if self.kind != DocumentKind::Article {
            return Err(SessionError::unsupported("only articles are published; send newsletters"));
        }
        self.check(Action::Publish)?;
        let patch = self.patch().with_status(PublishStatus::Published);
        self.persist(patch, "Article published").await
    }

    /// Compose a newsletter, hand it to `transport` and mark it sent.
    #[tracing::instrument(skip_all, fields(id = ?self.id))]
    pub async fn send<T: EmailTransport>(
        &mut self,
        transport: &T,
        shell: Option<&TemplateDocument>,
        values: &TemplateValues,
    ) -> Result<DocumentRecord, SessionError> {
        self.ensure_open()?;
        if self.kind != DocumentKind::Newsletter {
            return Err(SessionError::unsupported("only newsletters are sent"));
        }
        self.check(Action::Send)?;

        let email = self.compose(shell, values);
        let outgoing = OutgoingEmail {
            subject: email.subject,
            html: email.html,
        };
        if let Err(err) = transport.send(outgoing).await {
            self.notifier.notify(Notice::error(format!("Sending failed: {err}")));
            return Err(err.into());
        }

        let patch = self.patch().with_status(PublishStatus::Sent);
        self.persist(patch, "Newsletter sent").await
    }

    /// End the session. The armed autosave is cancelled; a persist already
    /// in flight completes with its result discarded.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(autosave) = &self.autosave {
            autosave.close();
        }
        tracing::debug!(id = ?self.id, dirty = self.dirty, "session closed");
    }

    // === Internals ===

    fn snapshot_of(document: &Document) -> Snapshot {
        Snapshot {
            mode: document.content_mode(),
            text: document.authoritative().to_string(),
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn ensure_supported(&self, mode: ContentMode) -> Result<(), SessionError> {
        if self.capabilities.supports(mode) {
            Ok(())
        } else {
            Err(SessionError::unsupported(format!(
                "this editor does not support {mode:?} input"
            )))
        }
    }

    fn check(&self, action: Action) -> Result<(), SessionError> {
        validate(action, self.kind, &self.metadata, self.document.has_content()).map_err(|err| {
            self.notifier.notify(Notice::error(err.to_string()));
            SessionError::from(err)
        })
    }

    fn patch(&self) -> DocumentPatch {
        DocumentPatch {
            title: Some(self.metadata.title.clone()),
            subject: self.metadata.subject.clone(),
            category: self.metadata.category.clone(),
            ..self.document.to_patch()
        }
    }

    /// A body edit: record it and schedule an autosave.
    fn changed(&mut self) {
        self.history.record(Self::snapshot_of(&self.document));
        self.touched();
    }

    /// Any edit, body or metadata.
    fn touched(&mut self) {
        self.dirty = true;
        if let Some(autosave) = &self.autosave {
            autosave.notify_change(self.patch());
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        match snapshot.mode {
            ContentMode::Markdown => self.document.edit_markdown(snapshot.text),
            ContentMode::Html => self.document.edit_html(snapshot.text),
        }
        self.touched();
    }

    fn attach(&mut self, id: DocumentId) {
        self.autosave = Some(AutosaveCoordinator::new(
            Arc::clone(&self.store),
            id.clone(),
            self.config.autosave_delay(),
        ));
        self.id = Some(id);
    }

    async fn persist(
        &mut self,
        patch: DocumentPatch,
        success: &str,
    ) -> Result<DocumentRecord, SessionError> {
        let result = match (&self.id, &self.autosave) {
            (Some(_), Some(autosave)) => autosave.save_now(patch).await,
            (Some(id), None) => self.store.update_document(id, patch).await,
            (None, _) => {
                let mut record = DocumentRecord::new(self.kind, "");
                record.author = self.context.author.clone();
                record.apply(patch);
                self.store.create_document(record).await
            }
        };

        match result {
            Ok(record) => {
                if self.id.is_none() {
                    if let Some(id) = record.id.clone() {
                        self.attach(id);
                    }
                }
                self.status = record.status;
                self.dirty = false;
                self.notifier.notify(Notice::success(success));
                Ok(record)
            }
            Err(err) => {
                tracing::error!(error = %err, "persist failed");
                self.notifier.notify(Notice::error(format!("Save failed: {err}")));
                Err(err.into())
            }
        }
    }
}
