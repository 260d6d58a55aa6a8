use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP endpoints exposed by the scrobbler server, relative to its base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Stations,
    Start,
    Stop,
    EmergencyStop,
    Status,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Stations => "/api/stations",
            Endpoint::Start => "/api/start",
            Endpoint::Stop => "/api/stop",
            Endpoint::EmergencyStop => "/api/emergency-stop",
            Endpoint::Status => "/api/status",
        }
    }
}

/// Opaque station token as understood by the server (e.g. `fipjazz`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Station(String);

impl Station {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Human label for a station token: `fipjazz` → `FIP Jazz`,
    /// `superfly` → `Superfly`, `radioNova` → `Radio Nova`.  Only a leading
    /// `fip` is expanded; one inside the token is left as written.
    pub fn display_name(&self) -> String {
        let raw = self.0.trim();
        let (prefix, rest) = match raw.strip_prefix("fip") {
            Some(rest) => ("FIP ", rest),
            None => ("", raw),
        };

        let mut spaced = String::with_capacity(rest.len() + 4);
        for (i, c) in rest.chars().enumerate() {
            if i > 0 && c.is_uppercase() {
                spaced.push(' ');
            }
            spaced.push(c);
        }

        let mut chars = spaced.chars();
        let body: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{}{}", prefix, body).trim().to_string()
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Station {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A track as reported by the server.  Either side may be null on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Track {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            title: Some(title.into()),
        }
    }

    /// Both artist and title present and non-empty.
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.artist) && filled(&self.title)
    }
}

/// Snapshot returned by `GET /api/status`.  Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    pub is_active: bool,
    #[serde(default)]
    pub station_name: Option<Station>,
    #[serde(default)]
    pub current_track: Option<Track>,
    #[serde(default)]
    pub last_scrobbled: Option<Track>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/stations`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StationsResponse {
    pub stations: Vec<Station>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// Body of `POST /api/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub station: Station,
}

/// Reply to every command endpoint (start, stop, emergency-stop).
///
/// Error replies may omit `success` entirely (`{"error": "..."}`), which
/// reads as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
