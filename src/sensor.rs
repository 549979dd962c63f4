/// Logical sensor entities exposed to the host
use crate::models::{BeaconReading, DeviceAddress};

/// The three measurable quantities a beacon exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Pressure,
}

/// Every kind a single beacon fans out into, in fixed order.
pub const SENSOR_KINDS: [SensorKind; 3] = [
    SensorKind::Temperature,
    SensorKind::Humidity,
    SensorKind::Pressure,
];

impl SensorKind {
    /// Unit the sensor's state is expressed in.
    pub fn unit_of_measurement(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Humidity => "%",
            SensorKind::Pressure => "hPa",
        }
    }

    /// Suffix appended to the configured display name, e.g. "living_room_temperature".
    pub fn name_suffix(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::Pressure => "pressure",
        }
    }

    /// Select this kind's field from a decoded reading.
    pub fn select(&self, reading: &BeaconReading) -> Option<f32> {
        match self {
            SensorKind::Temperature => reading.temperature,
            SensorKind::Humidity => reading.humidity,
            SensorKind::Pressure => reading.pressure,
        }
    }
}

/// Static attributes the host pulls alongside a sensor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAttributes {
    pub device: &'static str,
    pub model: u8,
}

/// One exposed quantity of one physical beacon.
///
/// Created once at binding time and kept for the process lifetime. The state
/// starts out unknown and is only ever replaced whole from a fresh reading;
/// `None` is the explicit "unknown" value, there is no absent state.
#[derive(Debug, Clone)]
pub struct LogicalSensor {
    name: String,
    address: DeviceAddress,
    kind: SensorKind,
    state: Option<f32>,
}

impl LogicalSensor {
    pub fn new(display_name: &str, address: DeviceAddress, kind: SensorKind) -> Self {
        LogicalSensor {
            name: format!("{}_{}", display_name, kind.name_suffix()),
            address,
            kind,
            state: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Last known value, `None` until the first successful decode.
    pub fn state(&self) -> Option<f32> {
        self.state
    }

    pub fn unit_of_measurement(&self) -> &'static str {
        self.kind.unit_of_measurement()
    }

    pub fn device_attributes(&self) -> DeviceAttributes {
        DeviceAttributes {
            device: BeaconReading::DEVICE,
            model: BeaconReading::MODEL,
        }
    }

    /// Replace the state with this sensor's field of `reading`.
    pub(crate) fn apply(&mut self, reading: &BeaconReading) {
        self.state = self.kind.select(reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> DeviceAddress {
        DeviceAddress::parse("AA:BB:CC:DD:EE:FF").unwrap()
    }

    #[test]
    fn units_follow_kind() {
        assert_eq!(SensorKind::Temperature.unit_of_measurement(), "°C");
        assert_eq!(SensorKind::Humidity.unit_of_measurement(), "%");
        assert_eq!(SensorKind::Pressure.unit_of_measurement(), "hPa");
    }

    #[test]
    fn new_sensor_starts_unknown() {
        let sensor = LogicalSensor::new("sauna", addr(), SensorKind::Humidity);
        assert_eq!(sensor.name(), "sauna_humidity");
        assert_eq!(sensor.state(), None);
    }

    #[test]
    fn apply_selects_matching_field() {
        let reading = BeaconReading {
            temperature: Some(21.5),
            humidity: Some(40.0),
            pressure: Some(1013.0),
        };
        for (kind, expected) in SENSOR_KINDS.iter().zip([21.5, 40.0, 1013.0]) {
            let mut sensor = LogicalSensor::new("sauna", addr(), *kind);
            sensor.apply(&reading);
            assert_eq!(sensor.state(), Some(expected));
        }
    }

    #[test]
    fn device_attributes_are_fixed() {
        let sensor = LogicalSensor::new("sauna", addr(), SensorKind::Temperature);
        let attrs = sensor.device_attributes();
        assert_eq!(attrs.device, "RuuviTag");
        assert_eq!(attrs.model, 1);
    }
}
