//! Error types for the Mopeka advertisement decoder.
//!
//! Only hard failures live here. Advertisements that merely fail a structural
//! check (wrong service UUID, missing manufacturer data, wrong frame length)
//! are not errors; they are reported as
//! [`Decoded::Ignored`](crate::decoder::Decoded::Ignored).

/// Represents all hard failures the decoder can report.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The frame passed all format checks but names a device type identifier
    /// outside the known product table.
    #[error("unknown device type identifier {0:#04x}")]
    UnknownDeviceType(u8),

    /// A tank height must be a positive finite number.
    #[error("tank height {0} is out of range, must be positive and finite")]
    TankHeightOutOfRange(f64),

    /// The maximum tank height must be greater than the minimum.
    #[error("invalid tank heights: minimum {min} is not below maximum {max}")]
    TankHeightOrder {
        /// Rejected minimum height.
        min: f64,
        /// Rejected maximum height.
        max: f64,
    },
}
