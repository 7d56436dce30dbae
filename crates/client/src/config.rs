//! Client configuration loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ledger::Sequence;
use protocol::Address;

use crate::sync::PollConfig;

/// Configuration for a hunt client.
#[derive(Debug, Clone)]
pub struct HuntConfig {
    /// Ledgers an authorization entry stays valid after signing.
    pub auth_ttl: Sequence,
    pub poll_interval: Duration,
    pub poll_deadline: Duration,
    pub max_transport_failures: u32,
    /// Base directory for board snapshots.
    pub data_dir: PathBuf,
    /// Funded account standing in for the counterparty during Step A
    /// simulation. Must differ from both session parties.
    pub placeholder: Option<Address>,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            auth_ttl: 50,
            poll_interval: Duration::from_millis(500),
            poll_deadline: Duration::from_secs(30),
            max_transport_failures: 5,
            data_dir: default_data_dir(),
            placeholder: None,
        }
    }
}

impl HuntConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `HUNT_AUTH_TTL` - authorization validity window in ledgers (default: 50)
    /// - `HUNT_POLL_INTERVAL_MS` - polling interval (default: 500)
    /// - `HUNT_POLL_DEADLINE_MS` - polling deadline (default: 30000)
    /// - `HUNT_TRANSPORT_CEILING` - consecutive transport failures tolerated (default: 5)
    /// - `HUNT_DATA_DIR` - board snapshot directory (default: platform-specific)
    /// - `HUNT_PLACEHOLDER` - hex-encoded placeholder address (default: unset)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ttl) = read_env::<Sequence>("HUNT_AUTH_TTL") {
            config.auth_ttl = ttl.max(1);
        }
        if let Some(ms) = read_env::<u64>("HUNT_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("HUNT_POLL_DEADLINE_MS") {
            config.poll_deadline = Duration::from_millis(ms.max(1));
        }
        if let Some(ceiling) = read_env::<u32>("HUNT_TRANSPORT_CEILING") {
            config.max_transport_failures = ceiling.max(1);
        }
        if let Ok(dir) = env::var("HUNT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.placeholder = env::var("HUNT_PLACEHOLDER")
            .ok()
            .and_then(|text| parse_address(&text));

        config
    }

    pub fn poll(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval,
            deadline: self.poll_deadline,
            max_transport_failures: self.max_transport_failures,
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "hunt")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".hunt"))
}

fn parse_address(text: &str) -> Option<Address> {
    let bytes = hex::decode(text.trim()).ok()?;
    let bytes: [u8; 32] = bytes.try_into().ok()?;
    Some(Address::from_bytes(bytes))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = HuntConfig::default();
        assert_eq!(config.auth_ttl, 50);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.poll_deadline, Duration::from_secs(30));
        assert!(config.placeholder.is_none());
    }

    #[test]
    fn addresses_parse_from_hex() {
        let text = "ab".repeat(32);
        assert_eq!(
            parse_address(&text),
            Some(Address::from_bytes([0xAB; 32]))
        );
        assert_eq!(parse_address("abcd"), None);
        assert_eq!(parse_address("not hex"), None);
    }
}
