//! User intents and per-command submission tracking.
//!
//! Every command the operator can issue runs through a small state machine:
//! ```text
//!  Idle ──request──▶ Submitting ──response──▶ Idle
//!  Idle ──request──▶ Confirming ──yes──▶ Submitting ──response──▶ Idle   (emergency stop)
//!                               └─no──▶ Idle
//! ```
//! A command is never left outstanding from the UI's point of view: any
//! response, success or failure, brings it back to `Idle`.

use std::time::{Duration, Instant};

use scrobble_proto::protocol::Station;

/// Everything the operator can ask the client to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Pick a station from the catalog (`None` clears the selection).
    SelectStation(Option<Station>),
    Start,
    Stop,
    EmergencyStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Start,
    Stop,
    EmergencyStop,
}

impl CommandKind {
    pub fn label(self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::Stop => "stop",
            CommandKind::EmergencyStop => "emergency stop",
        }
    }
}

/// Where one command currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandState {
    #[default]
    Idle,
    /// Waiting for the operator to confirm (emergency stop only).
    Confirming,
    /// Request sent; waiting for the server's answer.
    Submitting { since: Instant },
}

impl CommandState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, Self::Confirming)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    /// True while the command is anywhere but `Idle`.
    pub fn is_busy(&self) -> bool {
        !self.is_idle()
    }

    pub fn begin_confirm(&mut self) {
        *self = Self::Confirming;
    }

    pub fn begin_submit(&mut self) {
        *self = Self::Submitting {
            since: Instant::now(),
        };
    }

    /// Back to `Idle`.  Returns how long the request was in flight, if it was.
    pub fn finish(&mut self) -> Option<Duration> {
        let elapsed = match self {
            Self::Submitting { since } => Some(since.elapsed()),
            _ => None,
        };
        *self = Self::Idle;
        elapsed
    }
}

/// One `CommandState` per command kind.  Kinds never gate each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandBoard {
    pub start: CommandState,
    pub stop: CommandState,
    pub emergency_stop: CommandState,
}

impl CommandBoard {
    pub fn get(&self, kind: CommandKind) -> &CommandState {
        match kind {
            CommandKind::Start => &self.start,
            CommandKind::Stop => &self.stop,
            CommandKind::EmergencyStop => &self.emergency_stop,
        }
    }

    pub fn get_mut(&mut self, kind: CommandKind) -> &mut CommandState {
        match kind {
            CommandKind::Start => &mut self.start,
            CommandKind::Stop => &mut self.stop,
            CommandKind::EmergencyStop => &mut self.emergency_stop,
        }
    }

    /// The first command currently waiting on the network, if any.
    pub fn submitting(&self) -> Option<CommandKind> {
        [
            CommandKind::EmergencyStop,
            CommandKind::Start,
            CommandKind::Stop,
        ]
        .into_iter()
        .find(|&kind| self.get(kind).is_submitting())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_then_finish_returns_to_idle() {
        let mut state = CommandState::default();
        assert!(state.is_idle());
        state.begin_submit();
        assert!(state.is_submitting());
        assert!(state.finish().is_some());
        assert!(state.is_idle());
    }

    #[test]
    fn test_finish_from_confirming_has_no_elapsed() {
        let mut state = CommandState::default();
        state.begin_confirm();
        assert!(state.is_busy());
        assert_eq!(state.finish(), None);
        assert!(state.is_idle());
    }

    #[test]
    fn test_board_tracks_kinds_independently() {
        let mut board = CommandBoard::default();
        board.get_mut(CommandKind::Start).begin_submit();
        assert!(board.stop.is_idle());
        assert!(board.emergency_stop.is_idle());
        assert_eq!(board.submitting(), Some(CommandKind::Start));

        board.get_mut(CommandKind::EmergencyStop).begin_submit();
        assert_eq!(board.submitting(), Some(CommandKind::EmergencyStop));
    }
}
