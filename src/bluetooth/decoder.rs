/// RuuviTag manufacturer payload decoding
use thiserror::Error;

use crate::models::BeaconReading;

const DATA_FORMAT_3: u8 = 3; // RAWv1
const DATA_FORMAT_5: u8 = 5; // RAWv2

const FORMAT_3_LEN: usize = 14;
const FORMAT_5_LEN: usize = 24;

// Format 5 "not available" field codes.
const TEMPERATURE_INVALID: i16 = i16::MIN;
const HUMIDITY_INVALID: u16 = u16::MAX;
const PRESSURE_INVALID: u16 = u16::MAX;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is empty")]
    Empty,
    #[error("unsupported data format {0}")]
    UnsupportedFormat(u8),
    #[error("format {format} payload must be {expected} bytes, got {len}")]
    BadLength {
        format: u8,
        expected: usize,
        len: usize,
    },
}

/// Decode strategy for one RuuviTag data format. Pure and stateless.
pub trait PayloadDecoder {
    fn decode(&self, raw: &[u8]) -> Result<BeaconReading, DecodeError>;
}

/// Decode a raw advertisement, selecting the strategy by the format header.
pub fn decode_advertisement(raw: &[u8]) -> Result<BeaconReading, DecodeError> {
    let format = *raw.first().ok_or(DecodeError::Empty)?;
    let decoder: &dyn PayloadDecoder = match format {
        DATA_FORMAT_3 => &Format3Decoder,
        DATA_FORMAT_5 => &Format5Decoder,
        other => return Err(DecodeError::UnsupportedFormat(other)),
    };
    decoder.decode(raw)
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// RuuviTag data format 5 (RAWv2), a 24-byte payload:
/// - Byte 0: Data format (5)
/// - Bytes 1-2: Temperature (signed 16-bit, 0.005°C resolution)
/// - Bytes 3-4: Humidity (unsigned 16-bit, 0.0025% resolution)
/// - Bytes 5-6: Pressure (unsigned 16-bit, +50000 Pa offset, 1 Pa resolution)
/// - Bytes 7-17: Acceleration, battery, movement, sequence (not used here)
/// - Bytes 18-23: MAC address (not used here, we get it from BLE)
///
/// All-ones (or minimum-signed) field values mean the beacon could not
/// measure that quantity and map to an unknown state.
pub struct Format5Decoder;

impl PayloadDecoder for Format5Decoder {
    fn decode(&self, raw: &[u8]) -> Result<BeaconReading, DecodeError> {
        if raw.len() != FORMAT_5_LEN {
            return Err(DecodeError::BadLength {
                format: DATA_FORMAT_5,
                expected: FORMAT_5_LEN,
                len: raw.len(),
            });
        }

        // Temperature: signed 16-bit integer * 0.005°C
        let temperature = match i16::from_be_bytes([raw[1], raw[2]]) {
            TEMPERATURE_INVALID => None,
            value => Some(round2(value as f32 * 0.005)),
        };

        // Humidity: unsigned 16-bit integer * 0.0025%, capped at 100%
        let humidity = match u16::from_be_bytes([raw[3], raw[4]]) {
            HUMIDITY_INVALID => None,
            value => Some(round2((value as f32 * 0.0025).min(100.0))),
        };

        // Pressure: unsigned 16-bit integer + 50000 Pa, converted to hPa
        let pressure = match u16::from_be_bytes([raw[5], raw[6]]) {
            PRESSURE_INVALID => None,
            value => Some(round2((value as f32 + 50000.0) / 100.0)),
        };

        Ok(BeaconReading {
            temperature,
            humidity,
            pressure,
        })
    }
}

/// RuuviTag data format 3 (RAWv1), a 14-byte payload:
/// - Byte 0: Data format (3)
/// - Byte 1: Humidity (unsigned, 0.5% resolution)
/// - Byte 2: Temperature integer part (bit 7 is the sign)
/// - Byte 3: Temperature fraction (1/100°C)
/// - Bytes 4-5: Pressure (unsigned 16-bit, +50000 Pa offset)
/// - Bytes 6-13: Acceleration and battery (not used here)
pub struct Format3Decoder;

impl PayloadDecoder for Format3Decoder {
    fn decode(&self, raw: &[u8]) -> Result<BeaconReading, DecodeError> {
        if raw.len() != FORMAT_3_LEN {
            return Err(DecodeError::BadLength {
                format: DATA_FORMAT_3,
                expected: FORMAT_3_LEN,
                len: raw.len(),
            });
        }

        let humidity = round2(raw[1] as f32 * 0.5);

        let magnitude = (raw[2] & 0x7F) as f32 + raw[3] as f32 / 100.0;
        let temperature = if raw[2] & 0x80 != 0 {
            -magnitude
        } else {
            magnitude
        };

        let pressure = round2((u16::from_be_bytes([raw[4], raw[5]]) as f32 + 50000.0) / 100.0);

        Ok(BeaconReading {
            temperature: Some(round2(temperature)),
            humidity: Some(humidity),
            pressure: Some(pressure),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 21.5°C, 40.0%, 1013.0 hPa in format 5 field encoding.
    fn format5_payload() -> Vec<u8> {
        let mut raw = vec![0u8; FORMAT_5_LEN];
        raw[0] = DATA_FORMAT_5;
        raw[1..3].copy_from_slice(&4300i16.to_be_bytes()); // 21.5 / 0.005
        raw[3..5].copy_from_slice(&16000u16.to_be_bytes()); // 40.0 / 0.0025
        raw[5..7].copy_from_slice(&51300u16.to_be_bytes()); // 101300 Pa - 50000
        raw
    }

    #[test]
    fn decodes_format_5() {
        let reading = decode_advertisement(&format5_payload()).unwrap();
        assert_eq!(reading.temperature, Some(21.5));
        assert_eq!(reading.humidity, Some(40.0));
        assert_eq!(reading.pressure, Some(1013.0));
    }

    #[test]
    fn format_5_invalid_fields_become_unknown() {
        let mut raw = format5_payload();
        raw[1..3].copy_from_slice(&TEMPERATURE_INVALID.to_be_bytes());
        raw[3..5].copy_from_slice(&HUMIDITY_INVALID.to_be_bytes());
        raw[5..7].copy_from_slice(&PRESSURE_INVALID.to_be_bytes());

        let reading = decode_advertisement(&raw).unwrap();
        assert_eq!(reading.temperature, None);
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.pressure, None);
    }

    #[test]
    fn format_5_caps_humidity_at_100() {
        let mut raw = format5_payload();
        raw[3..5].copy_from_slice(&50000u16.to_be_bytes()); // 125% before the cap
        let reading = decode_advertisement(&raw).unwrap();
        assert_eq!(reading.humidity, Some(100.0));
    }

    #[test]
    fn decodes_format_3_including_negative_temperature() {
        let mut raw = vec![0u8; FORMAT_3_LEN];
        raw[0] = DATA_FORMAT_3;
        raw[1] = 80; // 40.0%
        raw[2] = 0x80 | 5; // -5.25°C
        raw[3] = 25;
        raw[4..6].copy_from_slice(&51300u16.to_be_bytes());

        let reading = decode_advertisement(&raw).unwrap();
        assert_eq!(reading.temperature, Some(-5.25));
        assert_eq!(reading.humidity, Some(40.0));
        assert_eq!(reading.pressure, Some(1013.0));
    }

    #[test]
    fn rejects_empty_payload() {
        assert_eq!(decode_advertisement(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn rejects_unknown_format() {
        assert_eq!(
            decode_advertisement(&[7, 0, 0]),
            Err(DecodeError::UnsupportedFormat(7))
        );
    }

    #[test]
    fn rejects_truncated_format_5() {
        let err = decode_advertisement(&[DATA_FORMAT_5, 1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::BadLength {
                format: DATA_FORMAT_5,
                expected: FORMAT_5_LEN,
                len: 4
            }
        );
    }
}
