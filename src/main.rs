//! Mopeka BLE decoder CLI
//!
//! A command-line interface (CLI) application for decoding advertisement
//! frames of Mopeka tank level sensors.
//!
//! This tool allows users to:
//! - Decode a captured advertisement event (manufacturer data entries plus
//!   the advertised service UUIDs) into calibrated readings: battery,
//!   temperature, tank level, echo quality and orientation.
//! - Override the tank height bounds used for the percent-of-full value.
//! - List the supported device types.
//!
//! The CLI leverages the `mopeka_ble_lib` crate for the frame layout,
//! device registry and calibration math. It never touches the radio; capture
//! the advertisement with any BLE scanner and paste the bytes here.

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use log::*;
use mopeka_ble_lib::{
    calibration::TankHeights,
    decoder::{Decoded, Decoder},
    device::{DeviceType, MANUFACTURER},
    frame::SERVICE_UUID,
};
use std::collections::HashMap;
use std::panic;

mod commandline;

fn logging_init(loglevel: LevelFilter) -> LoggerHandle {
    let log_handle = Logger::try_with_env_or_str(loglevel.as_str())
        .expect("Cannot init logging")
        .start()
        .expect("Cannot start logging");

    panic::set_hook(Box::new(|panic_info| {
        let (filename, line, column) = panic_info
            .location()
            .map(|loc| (loc.file(), loc.line(), loc.column()))
            .unwrap_or(("<unknown_file>", 0, 0));

        let cause_str = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            *s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "<unknown_panic_cause>"
        };

        error!(
            target: "panic",
            "Thread '{}' panicked at '{}': {}:{} - Cause: {}",
            std::thread::current().name().unwrap_or("<unnamed>"),
            filename,
            line,
            column,
            cause_str
        );
    }));
    log_handle
}

fn handle_decode(
    entries: &[commandline::DataEntry],
    uuids: &[uuid::Uuid],
    min_height: f64,
    max_height: f64,
    address: Option<&str>,
) -> Result<()> {
    let heights = TankHeights::new(min_height, max_height)
        .with_context(|| format!("Invalid tank heights {min_height}..{max_height}"))?;
    let decoder = Decoder::new(heights);

    let service_uuids = if uuids.is_empty() {
        vec![SERVICE_UUID]
    } else {
        uuids.to_vec()
    };
    let manufacturer_data: HashMap<u16, Vec<u8>> = entries
        .iter()
        .map(|entry| (entry.id, entry.payload.clone()))
        .collect();

    match decoder
        .decode(&service_uuids, &manufacturer_data)
        .with_context(|| "Cannot decode advertisement")?
    {
        Decoded::Reading(reading) => {
            match address {
                Some(address) => println!("{} ({})", reading.title(address), MANUFACTURER),
                None => println!("{} ({})", reading.display_name, MANUFACTURER),
            }
            println!("{reading}");
        }
        Decoded::Ignored(reason) => println!("Advertisement ignored: {reason}"),
    }
    Ok(())
}

fn handle_devices() {
    println!("{:<6} {:<24} Display name", "Id", "Model");
    for device_type in DeviceType::ALL {
        let descriptor = device_type.descriptor();
        println!(
            "{:#04x}  {:<24} {}",
            device_type as u8,
            descriptor.model,
            descriptor.display_name
        );
    }
}

fn main() -> Result<()> {
    let args = commandline::CliArgs::parse();

    let _log_handle = logging_init(args.verbose.log_level_filter());
    info!(
        "Mopeka CLI started. Log level: {}",
        args.verbose.log_level_filter()
    );

    match &args.command {
        commandline::CliCommands::Decode {
            entries,
            uuids,
            min_height,
            max_height,
            address,
        } => {
            info!("Executing: Decode ({} manufacturer data entries)", entries.len());
            handle_decode(entries, uuids, *min_height, *max_height, address.as_deref())?;
        }
        commandline::CliCommands::Devices => {
            info!("Executing: List supported device types");
            handle_devices();
        }
    }

    Ok(())
}
