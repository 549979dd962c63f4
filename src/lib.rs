//! RuuviTag beacon monitor.
//!
//! The binary (`src/main.rs`) wires configuration, logging and lifecycle.
//! The monitoring core lives in [`monitor`] where it can be tested
//! deterministically with an injected advertisement source.

pub mod bluetooth;
pub mod config;
pub mod models;
pub mod monitor;
pub mod registry;
pub mod sensor;

// Re-export commonly used types at the crate root
pub use bluetooth::{decode_advertisement, AdvertisementSource, BluerScanner, DecodeError, ScanError};
pub use config::{bind_registry, BeaconConfig, BeaconEntry, ConfigError};
pub use models::{AddressSet, BeaconReading, DeviceAddress};
pub use monitor::{Monitor, MonitorState};
pub use registry::{NotifyFn, SensorRegistry};
pub use sensor::{LogicalSensor, SensorKind};
