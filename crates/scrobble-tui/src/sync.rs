//! Status synchronizer: the poll cycle and the reconciliation of each poll
//! result into `DisplayState`.
//!
//! The synchronizer is the only writer of `DisplayState`.  Everyone else
//! either asks for a resync or hands it a message for the error banner.

use chrono::{DateTime, Local};
use tracing::{debug, info, trace, warn};

use scrobble_proto::client::ApiError;
use scrobble_proto::protocol::SessionStatus;

use crate::display::{DisplayState, LocalContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Running,
    Stopped,
}

/// Bookkeeping for the recurring poll.  Guarantees at most one poll in flight.
#[derive(Debug, Clone)]
pub struct PollCycle {
    state: CycleState,
    in_flight: bool,
    /// A resync was requested while a poll was already out.
    resync_pending: bool,
    issued: u64,
}

impl PollCycle {
    pub fn new() -> Self {
        Self {
            state: CycleState::Running,
            in_flight: false,
            resync_pending: false,
            issued: 0,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    fn claim(&mut self) -> bool {
        if self.state == CycleState::Stopped || self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.issued += 1;
        true
    }

    /// Timer tick.  Returns `true` when a poll must be issued now; a tick that
    /// lands while a poll is out is dropped.
    pub fn on_tick(&mut self) -> bool {
        let issue = self.claim();
        if !issue {
            trace!("poll tick skipped (state={:?}, in_flight={})", self.state, self.in_flight);
        }
        issue
    }

    /// Immediate resync after a command.  If a poll is already out its result
    /// may predate the command, so another poll follows it.
    pub fn request_resync(&mut self) -> bool {
        if self.state == CycleState::Stopped {
            return false;
        }
        if self.in_flight {
            debug!("resync deferred until the in-flight poll completes");
            self.resync_pending = true;
            return false;
        }
        self.claim()
    }

    /// A poll finished.  Returns `true` when a deferred resync must go out now.
    pub fn on_complete(&mut self) -> bool {
        self.in_flight = false;
        if self.resync_pending {
            self.resync_pending = false;
            return self.claim();
        }
        false
    }

    pub fn stop(&mut self) {
        if self.state == CycleState::Running {
            info!("poll cycle stopped after {} polls", self.issued);
        }
        self.state = CycleState::Stopped;
        self.resync_pending = false;
    }
}

impl Default for PollCycle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusSynchronizer {
    pub cycle: PollCycle,
    snapshot: Option<SessionStatus>,
    banner: Option<String>,
    display: DisplayState,
    last_success: Option<DateTime<Local>>,
}

impl StatusSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn snapshot(&self) -> Option<&SessionStatus> {
        self.snapshot.as_ref()
    }

    /// Wall-clock time of the last successfully parsed poll.
    pub fn last_success(&self) -> Option<DateTime<Local>> {
        self.last_success
    }

    /// Apply one poll result.  Returns `true` when the display changed.
    pub fn reconcile(
        &mut self,
        outcome: Result<SessionStatus, ApiError>,
        ctx: LocalContext<'_>,
    ) -> bool {
        let status = match outcome {
            Ok(status) => status,
            Err(e) => {
                // Transient: keep showing the last known state, no banner.
                warn!("status poll failed: {}", e);
                return false;
            }
        };

        if self.snapshot.as_ref().map(|s| s.is_active) != Some(status.is_active) {
            info!(
                "session {} (station {:?})",
                if status.is_active { "active" } else { "inactive" },
                status.station_name.as_ref().map(|s| s.as_str())
            );
        }

        self.banner = status.error.clone();
        self.snapshot = Some(status);
        self.last_success = Some(Local::now());
        self.refresh(ctx)
    }

    /// Show `message` in the error banner until the next error-free poll.
    pub fn surface_error(&mut self, message: impl Into<String>, ctx: LocalContext<'_>) {
        let message = message.into();
        debug!("error banner: {}", message);
        self.banner = Some(message);
        self.refresh(ctx);
    }

    /// Recompute after a local change (selection, catalog).  Returns `true`
    /// when the display changed.
    pub fn refresh(&mut self, ctx: LocalContext<'_>) -> bool {
        let next = DisplayState::project(self.snapshot.as_ref(), ctx, self.banner.clone());
        if next == self.display {
            return false;
        }
        self.display = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ConnectionStatus;
    use scrobble_proto::client::StatusCode;
    use scrobble_proto::protocol::{Station, Track};

    fn ctx(selection: Option<&Station>) -> LocalContext<'_> {
        LocalContext {
            selection,
            catalog_ready: true,
        }
    }

    fn transport_error() -> ApiError {
        ApiError::Status(StatusCode::SERVICE_UNAVAILABLE)
    }

    fn active_snapshot() -> SessionStatus {
        SessionStatus {
            is_active: true,
            station_name: Some(Station::from("fipjazz")),
            current_track: Some(Track::new("Bill Evans", "Peace Piece")),
            last_scrobbled: None,
            error: None,
        }
    }

    #[test]
    fn test_cycle_allows_one_poll_in_flight() {
        let mut cycle = PollCycle::new();
        assert!(cycle.on_tick());
        assert!(!cycle.on_tick());
        assert!(!cycle.on_tick());
        assert!(!cycle.on_complete());
        assert!(cycle.on_tick());
        assert_eq!(cycle.issued(), 2);
    }

    #[test]
    fn test_resync_during_poll_is_deferred_once() {
        let mut cycle = PollCycle::new();
        assert!(cycle.on_tick());
        assert!(!cycle.request_resync());
        assert!(!cycle.request_resync());
        // Completion releases exactly one follow-up poll.
        assert!(cycle.on_complete());
        assert!(cycle.in_flight());
        assert!(!cycle.on_complete());
        assert_eq!(cycle.issued(), 2);
    }

    #[test]
    fn test_stopped_cycle_never_polls() {
        let mut cycle = PollCycle::new();
        assert!(cycle.on_tick());
        assert!(!cycle.request_resync());
        cycle.stop();
        assert!(!cycle.on_complete());
        assert!(!cycle.on_tick());
        assert!(!cycle.request_resync());
        assert_eq!(cycle.state(), CycleState::Stopped);
    }

    #[test]
    fn test_reconcile_active_snapshot() {
        let mut sync = StatusSynchronizer::new();
        assert!(sync.reconcile(Ok(active_snapshot()), ctx(None)));
        let display = sync.display();
        assert_eq!(display.connection_status, ConnectionStatus::Active);
        assert_eq!(
            display.current_track,
            Some(Track::new("Bill Evans", "Peace Piece"))
        );
        assert!(display.last_scrobbled.is_none());
        assert!(sync.last_success().is_some());
    }

    #[test]
    fn test_same_snapshot_twice_is_idempotent() {
        let mut sync = StatusSynchronizer::new();
        sync.reconcile(Ok(active_snapshot()), ctx(None));
        let first = sync.display().clone();
        assert!(!sync.reconcile(Ok(active_snapshot()), ctx(None)));
        assert_eq!(sync.display(), &first);
    }

    #[test]
    fn test_transport_failure_leaves_display_untouched() {
        let mut sync = StatusSynchronizer::new();
        sync.reconcile(
            Ok(SessionStatus {
                error: Some("rate limited".to_string()),
                ..active_snapshot()
            }),
            ctx(None),
        );
        let before = sync.display().clone();

        assert!(!sync.reconcile(Err(transport_error()), ctx(None)));
        assert_eq!(sync.display(), &before);
        assert_eq!(sync.display().error_banner.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_transport_failure_adds_no_banner() {
        let mut sync = StatusSynchronizer::new();
        sync.reconcile(Ok(active_snapshot()), ctx(None));
        sync.reconcile(Err(transport_error()), ctx(None));
        assert!(sync.display().error_banner.is_none());
        assert!(sync.display().connection_status.is_active());
    }

    #[test]
    fn test_server_error_coexists_with_active() {
        let mut sync = StatusSynchronizer::new();
        sync.reconcile(
            Ok(SessionStatus {
                is_active: true,
                error: Some("rate limited".to_string()),
                ..Default::default()
            }),
            ctx(None),
        );
        assert_eq!(sync.display().error_banner.as_deref(), Some("rate limited"));
        assert!(sync.display().connection_status.is_active());
        assert!(sync.display().can_emergency_stop);
    }

    #[test]
    fn test_clean_poll_clears_surfaced_error() {
        let station = Station::from("superfly");
        let mut sync = StatusSynchronizer::new();
        sync.surface_error("Failed to start scrobbling", ctx(Some(&station)));
        assert_eq!(
            sync.display().error_banner.as_deref(),
            Some("Failed to start scrobbling")
        );

        sync.reconcile(Ok(SessionStatus::default()), ctx(Some(&station)));
        assert!(sync.display().error_banner.is_none());
        assert!(sync.display().can_start);
    }

    #[test]
    fn test_refresh_picks_up_selection() {
        let station = Station::from("fipjazz");
        let mut sync = StatusSynchronizer::new();
        sync.reconcile(Ok(SessionStatus::default()), ctx(None));
        assert!(!sync.display().can_start);
        assert!(sync.refresh(ctx(Some(&station))));
        assert!(sync.display().can_start);
    }
}
