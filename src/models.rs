use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// Length of a colon-separated BLE MAC address string, e.g. "AA:BB:CC:DD:EE:FF".
pub const ADDRESS_LEN: usize = 17;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid device address {value:?}: must be exactly {ADDRESS_LEN} characters")]
pub struct AddressError {
    pub value: String,
}

/// Hardware address of a beacon, normalized to uppercase.
///
/// Malformed addresses are rejected at configuration time; a `DeviceAddress`
/// that exists is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn parse(value: &str) -> Result<Self, AddressError> {
        if value.len() != ADDRESS_LEN {
            return Err(AddressError {
                value: value.to_string(),
            });
        }
        Ok(DeviceAddress(value.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of addresses the monitor scans for each cycle.
pub type AddressSet = HashSet<DeviceAddress>;

/// One decoded advertisement snapshot. `None` means the beacon reported the
/// field as not available. A new reading replaces the previous one whole.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconReading {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub pressure: Option<f32>,
}

impl BeaconReading {
    pub const DEVICE: &'static str = "RuuviTag";
    pub const MODEL: u8 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_address_and_uppercases() {
        let addr = DeviceAddress::parse("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(addr.as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn rejects_short_address() {
        let err = DeviceAddress::parse("AA:BB:CC").unwrap_err();
        assert_eq!(err.value, "AA:BB:CC");
    }

    #[test]
    fn rejects_overlong_address() {
        assert!(DeviceAddress::parse("AA:BB:CC:DD:EE:FF:00").is_err());
    }
}
