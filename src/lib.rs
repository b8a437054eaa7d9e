//! A library for decoding Mopeka tank level sensor BLE advertisements.
//!
//! Mopeka Pro Check sensors broadcast their whole state as manufacturer
//! specific data inside ordinary BLE advertisements. This crate turns one
//! observed advertisement event into typed physical measurements without ever
//! touching the radio: scanning, device registration and delivery of the
//! readings stay with the host application.
//!
//! ## Features
//!
//! - **Frame Decoding**: Reconstruction and validation of the 12 byte sensor
//!   frame from the manufacturer data of one advertisement event, including
//!   the service UUID gate. See [`decoder::Decoder`].
//! - **Device Registry**: Closed table of the supported product lines,
//!   dispatched on the device type byte. See [`device::DeviceType`].
//! - **Calibration Math**: CR2032 battery percent curve, offset encoded
//!   temperature, and the vendor's temperature compensated tank level
//!   polynomial. See [`calibration`].
//! - **Strongly-Typed API**: Utilizes Rust's type system for protocol
//!   correctness (e.g., [`frame::RawFrame`], [`calibration::TankHeights`],
//!   [`decoder::Decoded`]).
//!
//! ## Quick Start
//!
//! ```
//! use mopeka_ble_lib::{
//!     decoder::{Decoded, Decoder},
//!     frame::SERVICE_UUID,
//! };
//! use std::collections::HashMap;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One advertisement event, as delivered by a BLE scanner.
//!     let service_uuids = [SERVICE_UUID];
//!     let manufacturer_data: HashMap<u16, Vec<u8>> = [(
//!         0x0059,
//!         vec![0x03, 0x60, 0x3C, 0x88, 0xD3, 0x00, 0x00, 0x00, 0x01, 0x02],
//!     )]
//!     .into_iter()
//!     .collect();
//!
//!     let decoder = Decoder::default();
//!     match decoder.decode(&service_uuids, &manufacturer_data)? {
//!         Decoded::Reading(reading) => {
//!             println!("{reading}");
//!             assert_eq!(reading.temperature_celsius, 20);
//!             assert_eq!(reading.battery_percent, 100.0);
//!         }
//!         Decoded::Ignored(reason) => println!("not a sensor frame: {reason}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For the frame layout and the calibration constants, see the documentation
//! of the [`frame`] and [`calibration`] modules.

pub mod calibration;
pub mod decoder;
pub mod device;
pub mod error;
pub mod frame;
