//! Application configuration loaded from a TOML file.
//!
//! The config file defines the lock service credentials, the shared
//! front door lock, and the fixed set of rooms with their lock ids and
//! iCal feed URLs. Example:
//!
//! ```toml
//! api_base_url = "https://euapi.ttlock.com"
//! client_id = "..."
//! access_token = "..."
//! front_door_lock_id = 20641052
//!
//! [[rooms]]
//! name = "Room 1"
//! lock_id = 21318606
//! feed_url = "https://example.com/rooms/room-1/ical.ics"
//! ```

use std::collections::HashSet;
use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

fn default_api_base_url() -> String {
    "https://euapi.ttlock.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Debug, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    pub lock_id: u64,
    pub feed_url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    pub client_id: String,
    pub access_token: String,
    pub front_door_lock_id: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub rooms: Vec<RoomConfig>,
}

impl AppConfig {
    /// Load and validate configuration. The `DOORMAN_CONFIG` env var
    /// overrides the path given on the command line.
    pub fn load(path: &str) -> Result<Self> {
        let path = env::var("DOORMAN_CONFIG").unwrap_or_else(|_| path.to_string());
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.rooms.is_empty() {
            bail!("Config must define at least one room");
        }
        let mut seen = HashSet::new();
        for room in &self.rooms {
            if !seen.insert(room.name.as_str()) {
                bail!("Duplicate room name in config: {}", room.name);
            }
        }
        Ok(())
    }

    /// Lock id for a room, if the room is configured.
    pub fn room_lock_id(&self, room: &str) -> Option<u64> {
        self.rooms.iter().find(|r| r.name == room).map(|r| r.lock_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> &'static str {
        r#"
client_id = "client-123"
access_token = "token-456"
front_door_lock_id = 20641052

[[rooms]]
name = "Room 1"
lock_id = 21318606
feed_url = "https://example.com/rooms/room-1/ical.ics"

[[rooms]]
name = "Room 2"
lock_id = 21321678
feed_url = "https://example.com/rooms/room-2/ical.ics"
"#
    }

    #[test]
    fn it_parses_a_valid_config() {
        let config: AppConfig = toml::from_str(sample_config()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.api_base_url, "https://euapi.ttlock.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.front_door_lock_id, 20641052);
        assert_eq!(config.rooms.len(), 2);
        assert_eq!(config.room_lock_id("Room 2"), Some(21321678));
        assert_eq!(config.room_lock_id("Room 9"), None);
    }

    #[test]
    fn it_rejects_an_empty_room_set() {
        let config: AppConfig = toml::from_str(
            r#"
client_id = "c"
access_token = "t"
front_door_lock_id = 1
rooms = []
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn it_rejects_duplicate_room_names() {
        let config: AppConfig = toml::from_str(
            r#"
client_id = "c"
access_token = "t"
front_door_lock_id = 1

[[rooms]]
name = "Room 1"
lock_id = 2
feed_url = "https://example.com/a.ics"

[[rooms]]
name = "Room 1"
lock_id = 3
feed_url = "https://example.com/b.ics"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
