use log::{error, warn};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

use crate::models::DeviceAddress;
use crate::registry::{NotifyFn, SensorRegistry};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RUUVI_BEACONS environment variable not set")]
    MissingBeacons,
}

/// One configured beacon: its MAC and an optional display name.
#[derive(Debug, Clone)]
pub struct BeaconEntry {
    pub mac: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BeaconConfig {
    pub beacons: HashMap<String, BeaconEntry>,
}

impl BeaconConfig {
    /// Load the beacon map from the `RUUVI_BEACONS` environment variable,
    /// reading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let raw = env::var("RUUVI_BEACONS").map_err(|_| ConfigError::MissingBeacons)?;
        Ok(Self::parse(&raw))
    }

    /// Parse comma-separated `key=MAC[=display name]` entries, e.g.
    /// `living_room=AA:BB:CC:DD:EE:FF=Living Room,sauna=11:22:33:44:55:66`.
    ///
    /// Entries without a MAC field are skipped here; MAC validation itself
    /// happens at binding time.
    pub fn parse(raw: &str) -> Self {
        let mut beacons = HashMap::new();

        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let mut fields = entry.splitn(3, '=');
            let key = fields.next().unwrap_or_default().trim();
            let Some(mac) = fields.next() else {
                warn!("Skipping malformed beacon entry: {:?}", entry);
                continue;
            };
            if key.is_empty() {
                warn!("Skipping beacon entry without a key: {:?}", entry);
                continue;
            }
            let name = fields
                .next()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty());
            beacons.insert(
                key.to_string(),
                BeaconEntry {
                    mac: mac.trim().to_string(),
                    name,
                },
            );
        }

        BeaconConfig { beacons }
    }
}

/// Build the sensor registry from validated configuration entries.
///
/// Entries with a malformed address are logged and dropped without aborting
/// the rest; the display name falls back to the entry key. Callers must not
/// start a monitor when the resulting registry is empty.
pub fn bind_registry(config: &BeaconConfig, notify: NotifyFn) -> SensorRegistry {
    let mut registry = SensorRegistry::new(notify);

    for (key, entry) in &config.beacons {
        match DeviceAddress::parse(&entry.mac) {
            Ok(address) => {
                let display_name = entry.name.as_deref().unwrap_or(key);
                registry.add_beacon(address, display_name);
            }
            Err(e) => {
                error!("Error in config for {}: {}. Device will not be added", key, e);
            }
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_notify() -> NotifyFn {
        Box::new(|_| {})
    }

    #[test]
    fn parses_entries_with_and_without_display_name() {
        let config = BeaconConfig::parse(
            "living_room=AA:BB:CC:DD:EE:FF=Living Room, sauna=11:22:33:44:55:66",
        );
        assert_eq!(config.beacons.len(), 2);
        assert_eq!(
            config.beacons["living_room"].name.as_deref(),
            Some("Living Room")
        );
        assert_eq!(config.beacons["sauna"].mac, "11:22:33:44:55:66");
        assert!(config.beacons["sauna"].name.is_none());
    }

    #[test]
    fn valid_beacon_binds_three_sensors() {
        let config = BeaconConfig::parse("sauna=AA:BB:CC:DD:EE:FF");
        let registry = bind_registry(&config, noop_notify());

        assert_eq!(registry.len(), 3);
        assert!(registry.sensors().all(|s| s.state().is_none()));
        let names: Vec<_> = registry.sensors().map(|s| s.name().to_string()).collect();
        for expected in ["sauna_temperature", "sauna_humidity", "sauna_pressure"] {
            assert!(names.contains(&expected.to_string()));
        }
    }

    #[test]
    fn invalid_address_is_dropped_but_valid_entries_remain() {
        let config = BeaconConfig::parse("broken=AA:BB:CC,sauna=11:22:33:44:55:66");
        let registry = bind_registry(&config, noop_notify());

        assert_eq!(registry.len(), 3);
        assert!(registry
            .sensors()
            .all(|s| s.address().as_str() == "11:22:33:44:55:66"));
    }

    #[test]
    fn all_invalid_entries_yield_an_empty_registry() {
        let config = BeaconConfig::parse("a=too-short,b=also");
        let registry = bind_registry(&config, noop_notify());
        assert!(registry.is_empty());
    }

    #[test]
    fn display_name_defaults_to_entry_key() {
        let config = BeaconConfig::parse("bedroom=AA:BB:CC:DD:EE:FF");
        let registry = bind_registry(&config, noop_notify());
        assert!(registry
            .sensors()
            .any(|s| s.name() == "bedroom_temperature"));
    }
}
