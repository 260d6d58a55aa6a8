//! ClientCore: single-owner event loop for all client session state.
//!
//! Runs embedded in the TUI process.  The render loop sends `ClientEvent`s
//! in; network calls and operator prompts run as tasks on a `JoinSet` and
//! report back through `TaskDone`.  Only this loop touches the catalog, the
//! selection, the synchronizer, or the dispatcher.
//!
//! After every change the core publishes a fresh `ClientView` on a
//! `tokio::sync::watch` channel; the render loop only ever reads that.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use scrobble_proto::client::{ApiError, ScrobblerApi};
use scrobble_proto::protocol::{CommandResponse, SessionStatus, Station, StationsResponse};

use crate::dispatch::{
    ControlDispatcher, Dispatch, DispatchContext, Submission, EMERGENCY_CONFIRM_PROMPT,
};
use crate::display::{DisplayState, LocalContext};
use crate::intent::{CommandBoard, CommandKind, UserIntent};
use crate::prompt::OperatorPrompt;
use crate::sync::StatusSynchronizer;


const CATALOG_FAILED: &str = "Failed to load stations. Restart to retry.";

/// How long shutdown waits for in-flight requests before abandoning them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

// ── ClientEvent ───────────────────────────────────────────────────────────────

/// All inputs into the ClientCore loop from the outside.
#[derive(Debug)]
pub enum ClientEvent {
    Intent(UserIntent),
    /// Stop polling, let in-flight requests land, exit.
    Shutdown,
}

/// Completions of tasks the core spawned.
#[derive(Debug)]
enum TaskDone {
    Catalog(Result<StationsResponse, ApiError>),
    Poll(Result<SessionStatus, ApiError>),
    Command(CommandKind, Result<CommandResponse, ApiError>),
    Confirmation(bool),
}

// ── ClientView ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Ready(Vec<Station>),
    Failed,
}

impl CatalogState {
    pub fn stations(&self) -> Option<&[Station]> {
        match self {
            CatalogState::Ready(stations) => Some(stations),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CatalogState::Ready(_))
    }
}

/// Everything the render loop needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct ClientView {
    pub display: DisplayState,
    pub catalog: CatalogState,
    pub selection: Option<Station>,
    pub commands: CommandBoard,
    pub last_poll: Option<DateTime<Local>>,
}

fn local_context<'a>(
    catalog: &'a CatalogState,
    selection: Option<&'a Station>,
) -> LocalContext<'a> {
    LocalContext {
        selection,
        catalog_ready: catalog.is_ready(),
    }
}

// ── ClientCore ────────────────────────────────────────────────────────────────

/// All mutable client state: one per process, owned by `ClientCore`.
#[derive(Debug, Default)]
pub struct ClientSession {
    pub catalog: CatalogState,
    /// Station picked by the operator; independent of the active station.
    pub selection: Option<Station>,
    pub sync: StatusSynchronizer,
    pub dispatcher: ControlDispatcher,
}

impl ClientSession {
    pub fn view(&self) -> ClientView {
        ClientView {
            display: self.sync.display().clone(),
            catalog: self.catalog.clone(),
            selection: self.selection.clone(),
            commands: *self.dispatcher.commands(),
            last_poll: self.sync.last_success(),
        }
    }
}

pub struct ClientCore<A, P> {
    api: Arc<A>,
    prompt: Arc<P>,
    poll_interval: Duration,
    session: ClientSession,
    tasks: JoinSet<TaskDone>,
    view_tx: watch::Sender<ClientView>,
}

impl<A: ScrobblerApi, P: OperatorPrompt> ClientCore<A, P> {
    pub fn new(
        api: Arc<A>,
        prompt: Arc<P>,
        poll_interval: Duration,
    ) -> (Self, watch::Receiver<ClientView>) {
        let (view_tx, view_rx) = watch::channel(ClientView::default());
        let core = Self {
            api,
            prompt,
            poll_interval,
            session: ClientSession::default(),
            tasks: JoinSet::new(),
            view_tx,
        };
        (core, view_rx)
    }

    /// Run the core event loop.  Returns when a `Shutdown` event is received
    /// or the event channel is closed (TUI exited).
    pub async fn run(mut self, mut events: mpsc::Receiver<ClientEvent>) -> anyhow::Result<()> {
        info!(
            "ClientCore: starting event loop (poll every {:?})",
            self.poll_interval
        );
        self.start();

        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.poll_interval,
            self.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                evt = events.recv() => match evt {
                    None => {
                        info!("ClientCore: event channel closed, shutting down");
                        break;
                    }
                    Some(ClientEvent::Shutdown) => {
                        info!("ClientCore: shutdown requested");
                        break;
                    }
                    Some(ClientEvent::Intent(intent)) => self.handle_intent(intent),
                },

                _ = ticker.tick() => self.on_tick(),

                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.on_joined(joined);
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Kick off the catalog load and the first poll.
    pub fn start(&mut self) {
        let api = Arc::clone(&self.api);
        self.tasks
            .spawn(async move { TaskDone::Catalog(api.stations().await) });
        self.on_tick();
        self.publish();
    }

    pub fn on_tick(&mut self) {
        if self.session.sync.cycle.on_tick() {
            self.spawn_poll();
        }
    }

    pub fn handle_intent(&mut self, intent: UserIntent) {
        debug!("ClientCore: intent {:?}", intent);
        let ctx = DispatchContext {
            selection: self.session.selection.as_ref(),
            catalog: self.session.catalog.stations(),
            display: self.session.sync.display(),
        };
        let outcome = self.session.dispatcher.on_intent(intent, ctx);
        self.apply(outcome);
    }

    /// Wait for one spawned task and fold its result in.  Returns `false`
    /// when nothing is outstanding.
    pub async fn next_completion(&mut self) -> bool {
        match self.tasks.join_next().await {
            Some(joined) => {
                self.on_joined(joined);
                true
            }
            None => false,
        }
    }

    /// Drain every outstanding task, including follow-ups they spawn.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    /// Stop the poll cycle and give in-flight requests up to `SHUTDOWN_GRACE`
    /// to land.
    pub async fn shutdown(&mut self) {
        self.session.sync.cycle.stop();
        if tokio::time::timeout(SHUTDOWN_GRACE, self.settle())
            .await
            .is_err()
        {
            warn!(
                "ClientCore: abandoning {} in-flight task(s) on shutdown",
                self.tasks.len()
            );
            self.tasks.shutdown().await;
        }
        self.publish();
        info!("ClientCore: stopped");
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    // ── internals ─────────────────────────────────────────────────────────────

    fn publish(&self) {
        self.view_tx.send_replace(self.session.view());
    }

    fn refresh(&mut self) {
        let ctx = local_context(&self.session.catalog, self.session.selection.as_ref());
        self.session.sync.refresh(ctx);
    }

    fn surface_error(&mut self, message: impl Into<String>) {
        let ctx = local_context(&self.session.catalog, self.session.selection.as_ref());
        self.session.sync.surface_error(message, ctx);
    }

    fn apply(&mut self, outcome: Dispatch) {
        match outcome {
            Dispatch::Ignored => {}
            Dispatch::Select(station) => {
                debug!("ClientCore: selection {:?}", station);
                self.session.selection = station;
                self.refresh();
            }
            Dispatch::Reject(message) => self.surface_error(message),
            Dispatch::Confirm => self.spawn_confirmation(),
            Dispatch::Submit(submission) => self.spawn_submission(submission),
        }
        self.publish();
    }

    fn spawn_poll(&mut self) {
        let api = Arc::clone(&self.api);
        self.tasks
            .spawn(async move { TaskDone::Poll(api.status().await) });
    }

    fn spawn_confirmation(&mut self) {
        let prompt = Arc::clone(&self.prompt);
        self.tasks.spawn(async move {
            TaskDone::Confirmation(prompt.confirm(EMERGENCY_CONFIRM_PROMPT).await)
        });
    }

    fn spawn_submission(&mut self, submission: Submission) {
        info!("ClientCore: sending {}", submission.kind().label());
        let api = Arc::clone(&self.api);
        self.tasks.spawn(async move {
            let kind = submission.kind();
            let outcome = match submission {
                Submission::Start(station) => api.start(&station).await,
                Submission::Stop => api.stop().await,
                Submission::EmergencyStop => api.emergency_stop().await,
            };
            TaskDone::Command(kind, outcome)
        });
    }

    fn on_joined(&mut self, joined: Result<TaskDone, JoinError>) {
        match joined {
            Ok(done) => self.handle_completion(done),
            Err(e) if e.is_cancelled() => debug!("ClientCore: task cancelled"),
            Err(e) => error!("ClientCore: task failed: {}", e),
        }
    }

    fn handle_completion(&mut self, done: TaskDone) {
        match done {
            TaskDone::Catalog(Ok(response)) => {
                info!("ClientCore: {} stations available", response.stations.len());
                if let Some(count) = response.count.filter(|&c| c != response.stations.len()) {
                    warn!("ClientCore: server reported count={} for the station list", count);
                }
                self.session.catalog = CatalogState::Ready(response.stations);
                self.refresh();
            }
            TaskDone::Catalog(Err(e)) => {
                error!("ClientCore: station catalog failed to load: {}", e);
                self.session.catalog = CatalogState::Failed;
                self.surface_error(CATALOG_FAILED);
            }

            TaskDone::Poll(outcome) => {
                let ctx = local_context(&self.session.catalog, self.session.selection.as_ref());
                self.session.sync.reconcile(outcome, ctx);
                if self.session.sync.cycle.on_complete() {
                    self.spawn_poll();
                }
            }

            TaskDone::Command(kind, outcome) => {
                let followup = self.session.dispatcher.on_complete(kind, outcome);
                if let Some(message) = followup.banner {
                    self.surface_error(message);
                }
                if let Some(message) = followup.acknowledge {
                    self.prompt.acknowledge(message);
                }
                if followup.resync && self.session.sync.cycle.request_resync() {
                    self.spawn_poll();
                }
            }

            TaskDone::Confirmation(confirmed) => {
                let outcome = self.session.dispatcher.on_confirmation(confirmed);
                self.apply(outcome);
            }
        }
        self.publish();
    }
}
