//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this for client state, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use scrobble_proto::protocol::Station;

use crate::core::ClientView;
use crate::display::DisplayState;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Latest view published by the client core.
    pub view: ClientView,
    /// Server the client talks to, shown in the header.
    pub server_url: String,
    pub show_keys_bar: bool,
}

impl AppState {
    pub fn new(server_url: impl Into<String>, show_keys_bar: bool) -> Self {
        Self {
            view: ClientView::default(),
            server_url: server_url.into(),
            show_keys_bar,
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.view.display
    }

    pub fn stations(&self) -> &[Station] {
        self.view.catalog.stations().unwrap_or(&[])
    }

    pub fn selection(&self) -> Option<&Station> {
        self.view.selection.as_ref()
    }
}
