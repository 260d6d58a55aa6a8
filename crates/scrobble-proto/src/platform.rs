use std::path::PathBuf;

const APP_DIR: &str = "scrobctl";

/// `~/.local/share/scrobctl` on unix, the local app-data dir elsewhere.
pub fn data_dir() -> PathBuf {
    #[cfg(unix)]
    let base = dirs::home_dir().map(|home| home.join(".local").join("share"));
    #[cfg(not(unix))]
    let base = dirs::data_local_dir();

    base.unwrap_or_else(std::env::temp_dir).join(APP_DIR)
}

/// `~/.config/scrobctl` on unix (macOS included), the roaming config dir elsewhere.
pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    let base = dirs::home_dir().map(|home| home.join(".config"));
    #[cfg(not(unix))]
    let base = dirs::config_dir();

    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// Default location of the client log file.
pub fn log_file() -> PathBuf {
    data_dir().join("scrobctl.log")
}
