use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the tracker backend, including the `/api` prefix.
    pub api_url: String,
    /// JSON file backing the local key/value store (streak and goals).
    pub data_path: PathBuf,
    pub notifications: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let api_url = lookup("TRACKER_API_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/state.json"));

        let notifications = lookup("TRACKER_NOTIFICATIONS")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("granted"));

        Self {
            port,
            api_url,
            data_path,
            notifications,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
