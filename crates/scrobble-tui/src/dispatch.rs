//! Control dispatcher: validates operator intents, decides which network
//! command (if any) to issue, and turns command replies into follow-ups.
//!
//! The dispatcher never touches `DisplayState`.  Its outputs are plain values
//! (`Dispatch`, `Followup`) that the core routes to the network, the status
//! synchronizer, or the operator prompt.

use tracing::{debug, info, warn};

use scrobble_proto::client::ApiError;
use scrobble_proto::protocol::{CommandResponse, Station};

use crate::display::DisplayState;
use crate::intent::{CommandBoard, CommandKind, UserIntent};

pub const EMERGENCY_CONFIRM_PROMPT: &str =
    "Are you sure you want to EMERGENCY STOP? This will immediately halt all scrobbling.";
pub const EMERGENCY_ACK: &str = "Emergency stop activated! All scrobbling has been halted.";

const NO_STATION_SELECTED: &str = "Please select a station";
const START_REFUSED: &str = "Failed to start scrobbling";
const START_UNREACHABLE: &str = "Failed to start scrobbling. Please try again.";
const STOP_UNREACHABLE: &str = "Failed to stop scrobbling. Please try again.";
const EMERGENCY_REFUSED: &str = "Emergency stop was refused by the server";
const EMERGENCY_UNREACHABLE: &str = "Failed to emergency stop. Please try again.";

/// A network command ready to go out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Start(Station),
    Stop,
    EmergencyStop,
}

impl Submission {
    pub fn kind(&self) -> CommandKind {
        match self {
            Submission::Start(_) => CommandKind::Start,
            Submission::Stop => CommandKind::Stop,
            Submission::EmergencyStop => CommandKind::EmergencyStop,
        }
    }
}

/// What the core has to do in response to an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing; the intent does not apply right now.
    Ignored,
    /// Local-only selection change.
    Select(Option<Station>),
    /// Local validation failed; show this in the banner.
    Reject(String),
    /// Ask the operator before the emergency stop goes out.
    Confirm,
    Submit(Submission),
}

/// What has to happen after a command reply was processed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Followup {
    pub resync: bool,
    pub banner: Option<String>,
    pub acknowledge: Option<&'static str>,
}

/// Read-only view of session state the dispatcher validates against.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub selection: Option<&'a Station>,
    /// `None` until the catalog has loaded.
    pub catalog: Option<&'a [Station]>,
    pub display: &'a DisplayState,
}

#[derive(Debug, Clone, Default)]
pub struct ControlDispatcher {
    commands: CommandBoard,
}

impl ControlDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &CommandBoard {
        &self.commands
    }

    pub fn on_intent(&mut self, intent: UserIntent, ctx: DispatchContext<'_>) -> Dispatch {
        match intent {
            UserIntent::SelectStation(choice) => select(choice, ctx),

            UserIntent::Start => {
                if self.commands.start.is_busy() {
                    debug!("start already in flight, ignoring");
                    return Dispatch::Ignored;
                }
                match ctx.selection.filter(|s| !s.is_empty()) {
                    Some(station) => {
                        self.commands.start.begin_submit();
                        Dispatch::Submit(Submission::Start(station.clone()))
                    }
                    None => Dispatch::Reject(NO_STATION_SELECTED.to_string()),
                }
            }

            UserIntent::Stop => {
                if self.commands.stop.is_busy() {
                    debug!("stop already in flight, ignoring");
                    return Dispatch::Ignored;
                }
                self.commands.stop.begin_submit();
                Dispatch::Submit(Submission::Stop)
            }

            // Deliberately blind to start/stop state: this is the kill switch.
            UserIntent::EmergencyStop => {
                if self.commands.emergency_stop.is_busy() {
                    debug!("emergency stop already pending, ignoring");
                    return Dispatch::Ignored;
                }
                self.commands.emergency_stop.begin_confirm();
                Dispatch::Confirm
            }
        }
    }

    /// The operator answered the emergency-stop confirmation.
    pub fn on_confirmation(&mut self, confirmed: bool) -> Dispatch {
        if !self.commands.emergency_stop.is_confirming() {
            warn!("confirmation answer with no emergency stop pending");
            return Dispatch::Ignored;
        }
        if confirmed {
            warn!("emergency stop confirmed by operator");
            self.commands.emergency_stop.begin_submit();
            Dispatch::Submit(Submission::EmergencyStop)
        } else {
            info!("emergency stop declined by operator");
            self.commands.emergency_stop.finish();
            Dispatch::Ignored
        }
    }

    /// A command reply (or transport failure) arrived.
    pub fn on_complete(
        &mut self,
        kind: CommandKind,
        outcome: Result<CommandResponse, ApiError>,
    ) -> Followup {
        let elapsed = self.commands.get_mut(kind).finish();

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!("{} failed after {:?}: {}", kind.label(), elapsed, e);
                let banner = match kind {
                    CommandKind::Start => START_UNREACHABLE,
                    CommandKind::Stop => STOP_UNREACHABLE,
                    CommandKind::EmergencyStop => EMERGENCY_UNREACHABLE,
                };
                return Followup {
                    banner: Some(banner.to_string()),
                    ..Followup::default()
                };
            }
        };

        if reply.success {
            info!(
                "{} acknowledged after {:?}: {}",
                kind.label(),
                elapsed,
                reply.message.as_deref().unwrap_or("ok")
            );
            return Followup {
                resync: true,
                banner: None,
                acknowledge: (kind == CommandKind::EmergencyStop).then_some(EMERGENCY_ACK),
            };
        }

        warn!("{} refused by server: {:?}", kind.label(), reply.error);
        let banner = match kind {
            CommandKind::Start => Some(reply.error.unwrap_or_else(|| START_REFUSED.to_string())),
            CommandKind::Stop => None,
            CommandKind::EmergencyStop => {
                Some(reply.error.unwrap_or_else(|| EMERGENCY_REFUSED.to_string()))
            }
        };
        Followup {
            banner,
            ..Followup::default()
        }
    }
}

fn select(choice: Option<Station>, ctx: DispatchContext<'_>) -> Dispatch {
    let Some(catalog) = ctx.catalog else {
        debug!("station catalog not loaded, selection ignored");
        return Dispatch::Ignored;
    };
    if !ctx.display.station_select_enabled {
        debug!("station selection disabled, ignoring");
        return Dispatch::Ignored;
    }
    match choice {
        None => Dispatch::Select(None),
        Some(station) if catalog.contains(&station) => Dispatch::Select(Some(station)),
        Some(station) => {
            warn!("station {} is not in the catalog", station);
            Dispatch::Ignored
        }
    }
}
