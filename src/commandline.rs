use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use mopeka_ble_lib::calibration::TankHeights;
use uuid::Uuid;

/// One manufacturer specific data entry given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntry {
    pub id: u16,
    pub payload: Vec<u8>,
}

fn parse_hex_payload(s: &str) -> Result<Vec<u8>, String> {
    if !s.is_ascii() {
        return Err("payload must be a hex string".to_string());
    }
    if s.len() % 2 != 0 {
        return Err(format!(
            "hex payload must have an even number of digits, got {}",
            s.len()
        ));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| format!("invalid hex payload byte '{}': {e}", &s[i..i + 2]))
        })
        .collect()
}

fn parse_entry(s: &str) -> Result<DataEntry, String> {
    let (id_str, payload_str) = s
        .split_once(':')
        .ok_or_else(|| "expected ID:HEXPAYLOAD, e.g. 0x0059:03603C88D30000000102".to_string())?;
    let id = clap_num::maybe_hex::<u16>(id_str)
        .map_err(|e| format!("invalid manufacturer identifier: {e}"))?;
    let payload = parse_hex_payload(payload_str)?;
    Ok(DataEntry { id, payload })
}

fn parse_uuid(s: &str) -> Result<Uuid, String> {
    Uuid::parse_str(s).map_err(|e| format!("invalid service UUID: {e}"))
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommands {
    /// Decode one advertisement event given on the command line.
    /// Each manufacturer data entry is written as ID:HEXPAYLOAD, where ID is
    /// the 16-bit manufacturer identifier (decimal or hex) and HEXPAYLOAD the
    /// raw payload bytes. When several entries are given, the one with the
    /// numerically greatest identifier is decoded, exactly as for a live
    /// advertisement.
    #[clap(verbatim_doc_comment)]
    Decode {
        /// Manufacturer data entries observed in the advertisement event.
        /// Example: "0x0059:03603C88D30000000102".
        #[arg(value_parser = parse_entry, required = true, verbatim_doc_comment)]
        entries: Vec<DataEntry>,

        /// Service UUIDs advertised in the event.
        /// May be repeated; defaults to the Mopeka sensor service UUID, so a
        /// bare `decode` behaves like an advertisement from a real sensor.
        #[arg(long = "uuid", value_parser = parse_uuid, verbatim_doc_comment)]
        uuids: Vec<Uuid>,

        /// Minimum tank height used for the percent-of-full computation.
        #[arg(long, default_value_t = TankHeights::DEFAULT_MIN_HEIGHT)]
        min_height: f64,

        /// Maximum tank height used for the percent-of-full computation.
        #[arg(long, default_value_t = TankHeights::DEFAULT_MAX_HEIGHT)]
        max_height: f64,

        /// BLE address of the sensor, used to render the device title.
        /// Example: "A4:C1:38:12:EE:FF".
        #[arg(long, verbatim_doc_comment)]
        address: Option<String>,
    },

    /// List the supported device types.
    Devices,
}

const fn about_text() -> &'static str {
    "Mopeka BLE decoder CLI - Decode tank level sensor advertisement frames."
}

#[derive(Parser, Debug)]
#[command(name="mopeka", author, version, about=about_text(), long_about = None, propagate_version = true)]
pub struct CliArgs {
    /// Configure verbosity of logging output.
    /// -v for info, -vv for debug, -vvv for trace. Default is off.
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: CliCommands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_entry_accepts_hex_and_decimal_ids() {
        let entry = parse_entry("0x0059:03603C88D30000000102").unwrap();
        assert_eq!(entry.id, 0x0059);
        assert_eq!(entry.payload.len(), 10);
        assert_eq!(entry.payload[0], 0x03);

        let entry = parse_entry("89:0102").unwrap();
        assert_eq!(entry.id, 89);
        assert_eq!(entry.payload, vec![0x01, 0x02]);
    }

    #[test]
    fn parse_entry_rejects_malformed_input() {
        assert_matches!(parse_entry("0x0059"), Err(_));
        assert_matches!(parse_entry("zz:0102"), Err(_));
        assert_matches!(parse_entry("0x0059:012"), Err(_));
        assert_matches!(parse_entry("0x0059:01gg"), Err(_));
    }
}
