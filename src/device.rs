//! Device type registry for the Mopeka sensor family.
//!
//! Three near identical product lines share one frame layout and are told
//! apart by a single identifier byte. The registry is a fixed table; adding a
//! device type is a data change (one variant, one descriptor), never a
//! structural change to the decoder.

use crate::error::Error;
use std::fmt;

/// Fixed manufacturer label reported alongside every reading.
pub const MANUFACTURER: &str = "Mopeka";

/// Immutable descriptor for one supported product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceDescriptor {
    /// Vendor model code.
    pub model: &'static str,
    /// Human readable display name.
    pub display_name: &'static str,
}

impl DeviceDescriptor {
    /// Caller-facing title: the display name followed by the short form of
    /// the device's BLE address.
    ///
    /// # Examples
    ///
    /// ```
    /// use mopeka_ble_lib::device::DeviceType;
    ///
    /// let descriptor = DeviceType::ProCheck.descriptor();
    /// assert_eq!(descriptor.title("A4:C1:38:12:EE:FF"), "Propane Tank EEFF");
    /// ```
    pub fn title(&self, address: &str) -> String {
        format!("{} {}", self.display_name, short_address(address))
    }
}

static PRO_CHECK: DeviceDescriptor = DeviceDescriptor {
    model: "Mopeka Pro Check",
    display_name: "Propane Tank",
};
static AIR_SPACE: DeviceDescriptor = DeviceDescriptor {
    model: "Mopeka Air Space",
    display_name: "Tank",
};
static PRO_CHECK_WATER: DeviceDescriptor = DeviceDescriptor {
    model: "Mopeka Pro Check Water",
    display_name: "Water Tank",
};

/// Known device type identifiers, found at frame offset 2.
///
/// The set is closed: the frame layout is vendor fixed and every identifier
/// outside this table is rejected with [`Error::UnknownDeviceType`] rather
/// than mapped to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum DeviceType {
    /// Pro Check propane tank sensor.
    ProCheck = 0x03,
    /// Air Space tank sensor.
    AirSpace = 0x04,
    /// Pro Check water tank sensor.
    ProCheckWater = 0x05,
}

impl DeviceType {
    /// Every supported device type, in identifier order.
    pub const ALL: [DeviceType; 3] = [
        DeviceType::ProCheck,
        DeviceType::AirSpace,
        DeviceType::ProCheckWater,
    ];

    /// Descriptor for this device type. The table lives for the whole
    /// process and is never mutated.
    pub fn descriptor(&self) -> &'static DeviceDescriptor {
        match self {
            DeviceType::ProCheck => &PRO_CHECK,
            DeviceType::AirSpace => &AIR_SPACE,
            DeviceType::ProCheckWater => &PRO_CHECK_WATER,
        }
    }
}

impl TryFrom<u8> for DeviceType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0x03 => Ok(DeviceType::ProCheck),
            0x04 => Ok(DeviceType::AirSpace),
            0x05 => Ok(DeviceType::ProCheckWater),
            other => Err(Error::UnknownDeviceType(other)),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.descriptor().model)
    }
}

/// Short human readable form of a BLE address: the last two octets,
/// upper-cased, separators removed.
///
/// Accepts colon or dash separated addresses as well as bare hex strings.
pub fn short_address(address: &str) -> String {
    let hex: String = address
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .collect();
    let tail = hex.len().saturating_sub(4);
    hex[tail..].to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn lookup_known_types() {
        let air_space = DeviceType::try_from(0x04).unwrap();
        assert_eq!(air_space, DeviceType::AirSpace);
        assert_eq!(air_space.descriptor().model, "Mopeka Air Space");
        assert_eq!(air_space.descriptor().display_name, "Tank");

        assert_eq!(
            DeviceType::try_from(0x03).unwrap().descriptor().model,
            "Mopeka Pro Check"
        );
        assert_eq!(
            DeviceType::try_from(0x05).unwrap().descriptor().display_name,
            "Water Tank"
        );
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert_matches!(DeviceType::try_from(0x02), Err(Error::UnknownDeviceType(0x02)));
        assert_matches!(DeviceType::try_from(0x00), Err(Error::UnknownDeviceType(0x00)));
        assert_matches!(DeviceType::try_from(0xFF), Err(Error::UnknownDeviceType(0xFF)));
    }

    #[test]
    fn identifier_values_match_the_frame_encoding() {
        for device_type in DeviceType::ALL {
            assert_eq!(DeviceType::try_from(device_type as u8), Ok(device_type));
        }
    }

    #[test]
    fn short_address_forms() {
        assert_eq!(short_address("A4:C1:38:12:EE:FF"), "EEFF");
        assert_eq!(short_address("a4-c1-38-12-ee-ff"), "EEFF");
        assert_eq!(short_address("A4C13812EEFF"), "EEFF");
        assert_eq!(short_address("AB"), "AB");
        assert_eq!(short_address(""), "");
    }

    #[test]
    fn title_concatenates_name_and_short_address() {
        assert_eq!(
            DeviceType::AirSpace.descriptor().title("00:11:22:33:ab:cd"),
            "Tank ABCD"
        );
    }
}
