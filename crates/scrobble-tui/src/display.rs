//! DisplayState: the client-side projection that drives every control and panel.
//!
//! Recomputed from scratch on each reconciliation; never persisted, never
//! patched field by field.

use scrobble_proto::protocol::{SessionStatus, Station, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    Active,
    #[default]
    Inactive,
}

impl ConnectionStatus {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Locally known facts that feed the projection alongside the server snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalContext<'a> {
    pub selection: Option<&'a Station>,
    pub catalog_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayState {
    pub connection_status: ConnectionStatus,
    /// Station the server reports as being scrobbled.
    pub active_station: Option<Station>,
    pub can_start: bool,
    pub can_stop: bool,
    pub can_emergency_stop: bool,
    pub station_select_enabled: bool,
    /// `Some` iff the current-track panel is visible.
    pub current_track: Option<Track>,
    /// `Some` iff the last-scrobbled panel is visible.
    pub last_scrobbled: Option<Track>,
    pub error_banner: Option<String>,
}

impl DisplayState {
    /// Project a snapshot (or its absence, before the first successful poll)
    /// plus local context into display state.
    pub fn project(
        snapshot: Option<&SessionStatus>,
        ctx: LocalContext<'_>,
        error_banner: Option<String>,
    ) -> Self {
        let is_active = snapshot.is_some_and(|s| s.is_active);
        let has_selection = ctx.selection.is_some_and(|s| !s.is_empty());

        let (connection_status, can_start, can_stop, station_select_enabled) = if is_active {
            (ConnectionStatus::Active, false, true, false)
        } else {
            (
                ConnectionStatus::Inactive,
                ctx.catalog_ready && has_selection,
                false,
                ctx.catalog_ready,
            )
        };

        Self {
            connection_status,
            active_station: snapshot.and_then(|s| s.station_name.clone()),
            can_start,
            can_stop,
            can_emergency_stop: can_stop,
            station_select_enabled,
            current_track: visible_track(snapshot.and_then(|s| s.current_track.as_ref())),
            last_scrobbled: visible_track(snapshot.and_then(|s| s.last_scrobbled.as_ref())),
            error_banner,
        }
    }

    /// `Scrobbling: FIP Jazz` / `Not scrobbling`
    pub fn status_line(&self) -> String {
        match (self.connection_status, &self.active_station) {
            (ConnectionStatus::Active, Some(station)) => {
                format!("Scrobbling: {}", station.display_name())
            }
            (ConnectionStatus::Active, None) => "Scrobbling".to_string(),
            (ConnectionStatus::Inactive, _) => "Not scrobbling".to_string(),
        }
    }
}

fn visible_track(track: Option<&Track>) -> Option<Track> {
    track.filter(|t| t.is_complete()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(station: &str) -> SessionStatus {
        SessionStatus {
            is_active: true,
            station_name: Some(Station::from(station)),
            ..Default::default()
        }
    }

    #[test]
    fn test_before_first_poll_everything_but_selection_is_off() {
        let display = DisplayState::project(
            None,
            LocalContext {
                selection: None,
                catalog_ready: true,
            },
            None,
        );
        assert_eq!(display.connection_status, ConnectionStatus::Inactive);
        assert!(display.station_select_enabled);
        assert!(!display.can_start);
        assert!(!display.can_stop);
        assert!(!display.can_emergency_stop);
    }

    #[test]
    fn test_active_disables_start_and_selection() {
        let station = Station::from("fipjazz");
        let display = DisplayState::project(
            Some(&active("fipjazz")),
            LocalContext {
                selection: Some(&station),
                catalog_ready: true,
            },
            None,
        );
        assert!(display.connection_status.is_active());
        assert!(display.can_stop);
        assert!(display.can_emergency_stop);
        assert!(!display.can_start);
        assert!(!display.station_select_enabled);
        assert_eq!(display.status_line(), "Scrobbling: FIP Jazz");
    }

    #[test]
    fn test_inactive_start_needs_selection_and_catalog() {
        let station = Station::from("superfly");
        let snapshot = SessionStatus::default();

        let no_catalog = DisplayState::project(
            Some(&snapshot),
            LocalContext {
                selection: Some(&station),
                catalog_ready: false,
            },
            None,
        );
        assert!(!no_catalog.can_start);
        assert!(!no_catalog.station_select_enabled);

        let ready = DisplayState::project(
            Some(&snapshot),
            LocalContext {
                selection: Some(&station),
                catalog_ready: true,
            },
            None,
        );
        assert!(ready.can_start);
        assert_eq!(ready.status_line(), "Not scrobbling");
    }

    #[test]
    fn test_panels_need_complete_tracks() {
        let snapshot = SessionStatus {
            is_active: true,
            current_track: Some(Track {
                artist: Some("Sun Ra".to_string()),
                title: Some(String::new()),
            }),
            last_scrobbled: Some(Track::new("Sun Ra", "Space Is the Place")),
            ..Default::default()
        };
        let display = DisplayState::project(Some(&snapshot), LocalContext::default(), None);
        assert!(display.current_track.is_none());
        assert_eq!(
            display.last_scrobbled,
            Some(Track::new("Sun Ra", "Space Is the Place"))
        );
    }
}
