//! Debounced edit → preview synchronization.
//!
//! The controller is a single tokio task that owns all session state: the
//! latest draft, the debounce timer, the (at most one) in-flight render and
//! the preview currently on display. Edits arrive over a channel and are
//! applied immediately; regeneration only happens once the quiet period
//! elapses with no further edits.
//!
//! ```text
//!   Idle ──edit──▶ PendingRegen ──quiet period──▶ Regenerating ──settled──▶ Idle
//!                   ▲      │ edit: re-arm                │ edit: re-arm timer
//!                   └──────┘                             ▼
//!                                      settled with timer armed → PendingRegen
//! ```
//!
//! If the quiet period elapses while a render is still in flight, one
//! follow-up render is queued and starts as soon as the in-flight one settles,
//! using the newest draft. It is skipped when that draft is identical to the
//! one just submitted, and dropped when a newer edit has re-armed the timer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::editor::preview::{Preview, PreviewSurface};
use crate::editor::timer::DebounceTimer;
use crate::models::{Document, ResumeDocument};
use crate::render::{DocumentRenderer, RenderError, RenderedDocument};
use crate::storage::{ExpiringStore, StorageBackend, StorageError, CV_DATA_KEY, DEFAULT_TTL};

/// Default debounce delay between the last edit and a preview regeneration.
pub const QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    /// Timer armed, nothing in flight.
    PendingRegen,
    /// A render request is in flight.
    Regenerating,
}

/// Snapshot published to the UI after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Renders that have settled, successfully or not.
    pub regenerations: u64,
    /// Error from the most recent render or present attempt, cleared on success.
    pub last_error: Option<String>,
    /// The draft could not be written to storage on the last regeneration.
    /// The in-memory draft is unaffected.
    pub last_save_failed: bool,
    /// Preview currently on display.
    pub preview: Option<Uuid>,
}

impl SyncStatus {
    pub fn is_loading(&self) -> bool {
        self.state != SyncState::Idle
    }
}

#[derive(Debug, Error)]
#[error("edit session has been torn down")]
pub struct SyncClosed;

enum Command {
    Edit(Box<ResumeDocument>),
    Teardown,
}

type RenderFuture = Pin<Box<dyn Future<Output = Result<RenderedDocument, RenderError>> + Send>>;

pub struct SyncController<B, S> {
    renderer: Arc<dyn DocumentRenderer>,
    store: ExpiringStore<B>,
    surface: S,
    quiet_period: Duration,
    timer: DebounceTimer,
    draft: Option<ResumeDocument>,
    submitted: Option<ResumeDocument>,
    in_flight: Option<RenderFuture>,
    rerun_queued: bool,
    preview: Option<Uuid>,
    status: watch::Sender<SyncStatus>,
}

impl<B, S> SyncController<B, S>
where
    B: StorageBackend + 'static,
    S: PreviewSurface + 'static,
{
    pub fn new(renderer: Arc<dyn DocumentRenderer>, store: ExpiringStore<B>, surface: S) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            renderer,
            store,
            surface,
            quiet_period: QUIET_PERIOD,
            timer: DebounceTimer::new(),
            draft: None,
            submitted: None,
            in_flight: None,
            rerun_queued: false,
            preview: None,
            status,
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Loads the persisted draft (if still live), starts the session and
    /// schedules a first preview for it.
    pub fn mount(self) -> Result<(SyncHandle, Option<ResumeDocument>), StorageError> {
        let draft: Option<ResumeDocument> = self.store.get(CV_DATA_KEY)?;
        let handle = self.spawn();
        if let Some(draft) = &draft {
            // The task was just spawned; the channel cannot be closed yet.
            let _ = handle.edit(draft.clone());
        }
        Ok((handle, draft))
    }

    /// Starts the session task with no draft loaded.
    pub fn spawn(self) -> SyncHandle {
        let (commands, receiver) = mpsc::unbounded_channel();
        let status = self.status.subscribe();
        let task = tokio::spawn(self.run(receiver));
        SyncHandle {
            commands,
            status,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Edit(draft)) => self.on_edit(*draft),
                    Some(Command::Teardown) | None => break,
                },
                () = self.timer.expired() => self.on_quiet_period_elapsed(),
                result = settle(&mut self.in_flight) => self.on_settled(result),
            }
        }
        self.teardown();
    }

    fn on_edit(&mut self, draft: ResumeDocument) {
        self.draft = Some(draft);
        self.timer.arm(self.quiet_period);
        if self.in_flight.is_none() {
            self.set_state(SyncState::PendingRegen);
        }
    }

    fn on_quiet_period_elapsed(&mut self) {
        if self.in_flight.is_some() {
            debug!("Quiet period elapsed during an in-flight render; queueing a follow-up");
            self.rerun_queued = true;
            return;
        }
        self.start_regeneration();
    }

    fn start_regeneration(&mut self) {
        let Some(draft) = self.draft.clone() else {
            self.set_state(SyncState::Idle);
            return;
        };

        let save_failed = match self.store.set(CV_DATA_KEY, &draft, DEFAULT_TTL) {
            Ok(()) => false,
            Err(e) => {
                warn!("Failed to persist draft: {e}");
                true
            }
        };

        let renderer = Arc::clone(&self.renderer);
        let document = Document::Resume(draft.clone());
        self.in_flight = Some(Box::pin(async move { renderer.render(&document).await }));
        self.submitted = Some(draft);

        self.status.send_modify(|status| {
            status.state = SyncState::Regenerating;
            status.last_save_failed = save_failed;
        });
    }

    fn on_settled(&mut self, result: Result<RenderedDocument, RenderError>) {
        self.in_flight = None;

        let last_error = match result {
            Ok(rendered) => self.show(Preview::new(rendered.bytes, rendered.filename)),
            Err(e) => {
                warn!("Preview regeneration failed: {e}");
                Some(e.to_string())
            }
        };
        let preview = self.preview;
        self.status.send_modify(|status| {
            status.regenerations += 1;
            status.last_error = last_error;
            status.preview = preview;
        });

        // An armed timer already covers the newest draft; a queued follow-up
        // would start it before its own quiet period has passed.
        if std::mem::take(&mut self.rerun_queued) && !self.timer.is_armed() {
            if self.draft != self.submitted {
                self.start_regeneration();
                return;
            }
            debug!("Queued regeneration skipped: draft unchanged since last submit");
        }

        let next = if self.timer.is_armed() {
            SyncState::PendingRegen
        } else {
            SyncState::Idle
        };
        self.set_state(next);
    }

    /// Presents `preview` and releases the one it supersedes. Returns the error
    /// message if the surface refused it; the old preview then stays up.
    fn show(&mut self, preview: Preview) -> Option<String> {
        match self.surface.present(&preview) {
            Ok(()) => {
                if let Some(previous) = self.preview.replace(preview.id) {
                    self.surface.release(previous);
                }
                None
            }
            Err(e) => {
                warn!("Failed to present preview: {e}");
                self.surface.release(preview.id);
                Some(e.to_string())
            }
        }
    }

    fn teardown(&mut self) {
        if self.timer.cancel() {
            debug!("Cancelled armed regeneration on teardown");
        }
        // A late response is simply never observed.
        self.in_flight = None;
        self.rerun_queued = false;
        if let Some(preview) = self.preview.take() {
            self.surface.release(preview);
        }
        self.status.send_modify(|status| {
            status.state = SyncState::Idle;
            status.preview = None;
        });
        info!("Edit session torn down");
    }

    fn set_state(&self, state: SyncState) {
        self.status.send_if_modified(|status| {
            let changed = status.state != state;
            status.state = state;
            changed
        });
    }
}

async fn settle(in_flight: &mut Option<RenderFuture>) -> Result<RenderedDocument, RenderError> {
    match in_flight {
        Some(render) => render.await,
        None => std::future::pending().await,
    }
}

/// The UI's grip on a running session.
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SyncStatus>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Submits the latest draft. The caller keeps its own copy for display.
    pub fn edit(&self, draft: ResumeDocument) -> Result<(), SyncClosed> {
        self.commands
            .send(Command::Edit(Box::new(draft)))
            .map_err(|_| SyncClosed)
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Cancels any armed timer, drops any in-flight render and releases the
    /// displayed preview. Resolves once the session task has finished.
    pub async fn teardown(self) {
        let _ = self.commands.send(Command::Teardown);
        if let Err(e) = self.task.await {
            warn!("Edit session task ended abnormally: {e}");
        }
    }
}
