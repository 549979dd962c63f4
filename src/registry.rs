/// Registry mapping beacon addresses to their logical sensors
use log::debug;

use std::collections::HashMap;

use crate::models::{AddressSet, BeaconReading, DeviceAddress};
use crate::sensor::{LogicalSensor, SENSOR_KINDS};

/// Callback invoked once per sensor whose state was replaced. The host is
/// expected to pull the sensor's current state after being notified.
pub type NotifyFn = Box<dyn FnMut(&LogicalSensor) + Send>;

/// Owns all logical sensors, indexed by beacon address.
///
/// Only the monitor task mutates sensor state, so no locking is needed;
/// an update and its notification always happen back to back.
pub struct SensorRegistry {
    sensors: HashMap<DeviceAddress, [LogicalSensor; 3]>,
    notify: NotifyFn,
}

impl SensorRegistry {
    pub fn new(notify: NotifyFn) -> Self {
        SensorRegistry {
            sensors: HashMap::new(),
            notify,
        }
    }

    /// Create the three sensors for one validated beacon entry.
    pub fn add_beacon(&mut self, address: DeviceAddress, display_name: &str) {
        let trio = SENSOR_KINDS
            .map(|kind| LogicalSensor::new(display_name, address.clone(), kind));
        self.sensors.insert(address, trio);
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sensors.len() * SENSOR_KINDS.len()
    }

    /// Addresses the monitor should scan for.
    pub fn addresses(&self) -> AddressSet {
        self.sensors.keys().cloned().collect()
    }

    pub fn sensors(&self) -> impl Iterator<Item = &LogicalSensor> {
        self.sensors.values().flatten()
    }

    /// Apply a fresh reading to the sensors bound to `address`.
    ///
    /// Each sensor's state is replaced before its notification fires, and
    /// notifications are issued one sensor at a time since each is an
    /// independently observable entity. Addresses without bound sensors can
    /// show up in stale scan results and are ignored.
    pub fn update(&mut self, address: &DeviceAddress, reading: &BeaconReading) {
        let Some(trio) = self.sensors.get_mut(address) else {
            debug!("Ignoring reading from unbound address {}", address);
            return;
        };
        for sensor in trio.iter_mut() {
            sensor.apply(reading);
            (self.notify)(sensor);
        }
    }
}
