//! Advertisement decoding pipeline.
//!
//! One call to [`Decoder::decode`] takes everything a BLE scanner observed in
//! a single advertisement event and either produces a [`Reading`], reports
//! why the advertisement was ignored, or fails with
//! [`Error::UnknownDeviceType`]. The pipeline is a pure function: no scratch
//! state survives a call, and a `Decoder` may be shared freely between
//! threads.

use crate::calibration::{self, TankHeights};
use crate::device::DeviceType;
use crate::error::Error;
use crate::frame::{RawFrame, FRAME_LEN, SERVICE_UUID};
use log::trace;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// One decoded sensor reading.
///
/// Produced fresh per decode and owned by the caller; the decoder keeps no
/// reference to it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reading {
    /// Product line that produced the frame.
    pub device_type: DeviceType,
    /// Vendor model code.
    pub model: &'static str,
    /// Human readable device name.
    pub display_name: &'static str,
    /// Battery charge in percent, 0.0 to 100.0, one decimal place.
    pub battery_percent: f32,
    /// Temperature in degrees Celsius.
    pub temperature_celsius: i32,
    /// Tank liquid level in millimeters.
    pub tank_level_mm: i32,
    /// Tank level as percent of the configured tank height. Not clamped to
    /// 0..=100; out of range values signal a reading outside the configured
    /// working range.
    pub tank_level_percent: i32,
    /// Ultrasonic echo quality, 0 (unusable) to 3 (reliable).
    pub quality_stars: u8,
    /// Raw X axis orientation count, 0 to 255. Conversion to a mounting
    /// angle is left to the caller.
    pub x_position: u8,
    /// Raw Y axis orientation count, 0 to 255.
    pub y_position: u8,
}

impl Reading {
    /// Caller-facing title: the display name plus the short form of the
    /// device's BLE address.
    pub fn title(&self, address: &str) -> String {
        self.device_type.descriptor().title(address)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: level {} mm ({} %), {} °C, battery {:.1} %, quality {}/3, orientation x={} y={}",
            self.model,
            self.tank_level_mm,
            self.tank_level_percent,
            self.temperature_celsius,
            self.battery_percent,
            self.quality_stars,
            self.x_position,
            self.y_position
        )
    }
}

/// Why an advertisement was ignored rather than decoded.
///
/// These are expected, frequent outcomes for advertisements that are not
/// (yet) valid frames from this sensor family. None of them is an error; the
/// next advertisement cycle may deliver a valid frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The advertisement does not carry the sensor service UUID.
    NotTargetService,
    /// The advertisement carries no manufacturer specific data.
    NoManufacturerData,
    /// The reconstructed frame is not exactly [`FRAME_LEN`] bytes long.
    UnexpectedLength {
        /// Length of the rejected frame.
        len: usize,
    },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IgnoreReason::NotTargetService => write!(f, "sensor service UUID not advertised"),
            IgnoreReason::NoManufacturerData => write!(f, "no manufacturer specific data"),
            IgnoreReason::UnexpectedLength { len } => {
                write!(f, "frame length {len}, expected {FRAME_LEN}")
            }
        }
    }
}

/// Outcome of decoding one advertisement event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoded {
    /// The advertisement carried a valid sensor frame.
    Reading(Reading),
    /// The advertisement is not a valid frame from this sensor family.
    Ignored(IgnoreReason),
}

/// Stateless decoder for Mopeka BLE advertisements.
///
/// Holds only the configured [`TankHeights`]; every decode call is a pure,
/// O(1) function of its inputs. Events may arrive out of order or duplicated
/// and are decoded independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    heights: TankHeights,
}

impl Decoder {
    /// Creates a decoder with the given tank height bounds.
    pub fn new(heights: TankHeights) -> Self {
        Self { heights }
    }

    /// Configured tank height bounds.
    pub fn heights(&self) -> &TankHeights {
        &self.heights
    }

    /// Decodes one advertisement event.
    ///
    /// `service_uuids` are the service UUIDs advertised in the event and
    /// `manufacturer_data` maps each manufacturer identifier observed in the
    /// event to its payload.
    ///
    /// When several manufacturer data entries are present, the entry with the
    /// numerically greatest identifier wins. Upstream BLE stacks append
    /// vendor blocks in increasing identifier order, so the highest id is the
    /// most recently added block; the rule is kept as is for
    /// interoperability with deployed devices.
    ///
    /// Returns [`Decoded::Ignored`] for advertisements that fail a structural
    /// check and [`Error::UnknownDeviceType`] for a well formed frame naming
    /// an unrecognized product.
    ///
    /// # Examples
    ///
    /// ```
    /// use mopeka_ble_lib::decoder::{Decoded, Decoder};
    /// use std::collections::HashMap;
    ///
    /// let decoder = Decoder::default();
    /// let manufacturer_data = HashMap::from([(0x0059, vec![0x03; 10])]);
    /// // No service UUIDs advertised: not ours.
    /// assert!(matches!(
    ///     decoder.decode(&[], &manufacturer_data),
    ///     Ok(Decoded::Ignored(_))
    /// ));
    /// ```
    pub fn decode(
        &self,
        service_uuids: &[Uuid],
        manufacturer_data: &HashMap<u16, Vec<u8>>,
    ) -> Result<Decoded, Error> {
        if !service_uuids.contains(&SERVICE_UUID) {
            trace!("advertisement without service UUID {SERVICE_UUID}, not ours");
            return Ok(Decoded::Ignored(IgnoreReason::NotTargetService));
        }
        let Some((&id, payload)) = manufacturer_data.iter().max_by_key(|(id, _)| **id) else {
            trace!("advertisement without manufacturer data");
            return Ok(Decoded::Ignored(IgnoreReason::NoManufacturerData));
        };

        let mut bytes = Vec::with_capacity(FRAME_LEN);
        bytes.extend_from_slice(&id.to_le_bytes());
        bytes.extend_from_slice(payload);
        let Some(frame) = RawFrame::from_bytes(&bytes) else {
            trace!(
                "manufacturer {id:#06x} frame of {} bytes, expected {FRAME_LEN}",
                bytes.len()
            );
            return Ok(Decoded::Ignored(IgnoreReason::UnexpectedLength {
                len: bytes.len(),
            }));
        };

        let device_type = DeviceType::try_from(frame.device_type_id())?;
        let descriptor = device_type.descriptor();
        let tank_level_mm = calibration::tank_level_mm(frame.level_raw(), frame.temperature_raw());

        Ok(Decoded::Reading(Reading {
            device_type,
            model: descriptor.model,
            display_name: descriptor.display_name,
            battery_percent: calibration::battery_percent(frame.battery_raw()),
            temperature_celsius: calibration::temperature_celsius(frame.temperature_raw()),
            tank_level_mm,
            tank_level_percent: self.heights.level_percent(tank_level_mm),
            quality_stars: frame.quality_raw(),
            x_position: frame.x_raw(),
            y_position: frame.y_raw(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // Payload of a Pro Check frame: battery 96 counts (3.0 V), temperature
    // raw 60 (20 degC), level 5000 with quality 3, orientation x=1 y=2.
    const PRO_CHECK_PAYLOAD: [u8; 10] = [0x03, 0x60, 0x3C, 0x88, 0xD3, 0x00, 0x00, 0x00, 0x01, 0x02];

    fn advertisement(entries: &[(u16, &[u8])]) -> HashMap<u16, Vec<u8>> {
        entries
            .iter()
            .map(|(id, payload)| (*id, payload.to_vec()))
            .collect()
    }

    #[test]
    fn missing_service_uuid_is_ignored() {
        let decoder = Decoder::default();
        let data = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD)]);
        assert_eq!(
            decoder.decode(&[], &data),
            Ok(Decoded::Ignored(IgnoreReason::NotTargetService))
        );
        let other_uuid = Uuid::from_u128(0x1234);
        assert_eq!(
            decoder.decode(&[other_uuid], &data),
            Ok(Decoded::Ignored(IgnoreReason::NotTargetService))
        );
    }

    #[test]
    fn missing_manufacturer_data_is_ignored() {
        let decoder = Decoder::default();
        assert_eq!(
            decoder.decode(&[SERVICE_UUID], &HashMap::new()),
            Ok(Decoded::Ignored(IgnoreReason::NoManufacturerData))
        );
    }

    #[test]
    fn wrong_frame_lengths_are_ignored() {
        let decoder = Decoder::default();
        // 9 byte payload -> 11 byte frame, 11 byte payload -> 13 byte frame.
        let short = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD[..9])]);
        assert_eq!(
            decoder.decode(&[SERVICE_UUID], &short),
            Ok(Decoded::Ignored(IgnoreReason::UnexpectedLength { len: 11 }))
        );
        let long = advertisement(&[(0x0059, &[0u8; 11])]);
        assert_eq!(
            decoder.decode(&[SERVICE_UUID], &long),
            Ok(Decoded::Ignored(IgnoreReason::UnexpectedLength { len: 13 }))
        );
    }

    #[test]
    fn unknown_device_type_is_an_error() {
        let decoder = Decoder::default();
        let mut payload = PRO_CHECK_PAYLOAD;
        payload[0] = 0x02;
        let data = advertisement(&[(0x0059, &payload)]);
        assert_matches!(
            decoder.decode(&[SERVICE_UUID], &data),
            Err(Error::UnknownDeviceType(0x02))
        );
    }

    #[test]
    fn full_reading() {
        let decoder = Decoder::default();
        let data = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD)]);
        let decoded = decoder.decode(&[SERVICE_UUID], &data).unwrap();

        let Decoded::Reading(reading) = decoded else {
            panic!("expected a reading, got {decoded:?}");
        };
        assert_eq!(reading.device_type, DeviceType::ProCheck);
        assert_eq!(reading.model, "Mopeka Pro Check");
        assert_eq!(reading.display_name, "Propane Tank");
        assert_eq!(reading.battery_percent, 100.0);
        assert_eq!(reading.temperature_celsius, 20);
        assert_eq!(reading.tank_level_mm, 2572);
        assert_eq!(reading.tank_level_percent, 1162);
        assert_eq!(reading.quality_stars, 3);
        assert_eq!(reading.x_position, 1);
        assert_eq!(reading.y_position, 2);
    }

    #[test]
    fn highest_manufacturer_id_wins() {
        let decoder = Decoder::default();
        let mut air_space = PRO_CHECK_PAYLOAD;
        air_space[0] = 0x04;
        let data = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD), (0x0100, &air_space)]);

        let decoded = decoder.decode(&[SERVICE_UUID], &data).unwrap();
        assert_matches!(
            decoded,
            Decoded::Reading(Reading {
                device_type: DeviceType::AirSpace,
                ..
            })
        );
    }

    #[test]
    fn selection_happens_before_the_length_check() {
        // The winning entry has a bad length even though a lower id carries a
        // valid frame; the policy picks by id, not by validity.
        let decoder = Decoder::default();
        let data = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD), (0x0100, &[0u8; 4])]);
        assert_eq!(
            decoder.decode(&[SERVICE_UUID], &data),
            Ok(Decoded::Ignored(IgnoreReason::UnexpectedLength { len: 6 }))
        );
    }

    #[test]
    fn decode_is_idempotent() {
        let decoder = Decoder::default();
        let uuids = [SERVICE_UUID];
        let data = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD)]);
        assert_eq!(
            decoder.decode(&uuids, &data),
            decoder.decode(&uuids, &data)
        );
    }

    #[test]
    fn custom_heights_change_only_the_percent() {
        let heights = TankHeights::new(100.0, 3000.0).unwrap();
        let decoder = Decoder::new(heights);
        let data = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD)]);

        let Ok(Decoded::Reading(reading)) = decoder.decode(&[SERVICE_UUID], &data) else {
            panic!("expected a reading");
        };
        assert_eq!(reading.tank_level_mm, 2572);
        // floor((2572 - 100) * 100 / 2900) = floor(85.24...)
        assert_eq!(reading.tank_level_percent, 85);
    }

    #[test]
    fn reading_title_uses_the_short_address() {
        let decoder = Decoder::default();
        let data = advertisement(&[(0x0059, &PRO_CHECK_PAYLOAD)]);
        let Ok(Decoded::Reading(reading)) = decoder.decode(&[SERVICE_UUID], &data) else {
            panic!("expected a reading");
        };
        assert_eq!(reading.title("A4:C1:38:12:EE:FF"), "Propane Tank EEFF");
    }
}
