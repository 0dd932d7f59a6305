//! Command-line argument definitions for solo-export
//!
//! This module defines the complete CLI interface using the clap derive API.
//! Section flags select which parts of the file to print; format flags only
//! affect the data section.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the Geo Solo II data exporter
///
/// Decodes a SOLOII.DAT binary data file and prints its header entries,
/// opaque extra data, or decoded readings in one of several formats.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "solo-export",
    version,
    about = "Export data from a Geo Solo II SOLOII.DAT binary data file",
    long_about = "Decodes the proprietary SOLOII.DAT telemetry file written by a Geo Solo II \
                  home energy monitor. Reconstructs the calendar timestamp of every reading \
                  from the file's two truncated time counters and prints readings in a choice \
                  of formats. Diagnostics go to stderr; decoded output goes to stdout."
)]
pub struct Args {
    /// SOLOII.DAT binary file to read
    #[arg(value_name = "FILE")]
    pub filename: PathBuf,

    /// Print decoded header entries
    ///
    /// Shows tariff rates, the yearly budget, and the tariff time windows of
    /// each header entry. Unclassified header bytes are not interpreted.
    #[arg(short = 'H', long = "header", help = "Read header entries")]
    pub header: bool,

    /// Hex-dump the opaque regions around and after the header area
    ///
    /// Covers the pre-header bytes, the header trailer, and the 4 KiB extra
    /// data region whose format is unknown.
    #[arg(short = 'E', long = "extra", help = "Read header extra data")]
    pub extra: bool,

    /// Print decoded data records
    ///
    /// This is the default when neither --header nor --extra is given.
    #[arg(short = 'D', long = "data", help = "Read data entries (default)")]
    pub data: bool,

    /// Output format for data records
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format for data records"
    )]
    pub format: OutputFormat,

    /// Measurement name used by the influxdb format
    #[arg(
        short = 'm',
        long = "measurement",
        value_name = "NAME",
        default_value = "solo",
        help = "Measurement name for influxdb output"
    )]
    pub measurement: String,

    /// Shift every reconstructed timestamp by this many hours
    ///
    /// Applied after timestamp reconstruction, before output. Useful when
    /// the device clock was set to local time instead of UTC.
    #[arg(
        short = 't',
        long = "time-shift",
        value_name = "HOURS",
        default_value_t = 0,
        allow_hyphen_values = true,
        help = "Shift entry timestamps by HOURS"
    )]
    pub time_shift: i64,

    /// Print debug information to stderr
    #[arg(short = 'd', long = "debug", help = "Print debug information to stderr")]
    pub debug: bool,

    /// Increase verbosity (can be used multiple times)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: u8,
}

/// Output formats for the data section
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable aligned columns with bar graphs
    Table,
    /// Quoted CSV with a header row
    Csv,
    /// JSON array of reading objects
    Json,
    /// InfluxDB line protocol
    Influxdb,
    /// energynote.eu detailedReadings.csv dialect
    Energynote,
}

impl Args {
    /// Whether the data section should be printed.
    ///
    /// Data is the default output when no section flag selects otherwise.
    pub fn wants_data(&self) -> bool {
        self.data || !(self.header || self.extra)
    }

    /// Tracing filter level derived from the debug/verbose flags
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                _ => "debug",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_is_default_section() {
        let args = Args::parse_from(["solo-export", "SOLOII.DAT"]);
        assert!(args.wants_data());
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[test]
    fn test_header_flag_disables_default_data() {
        let args = Args::parse_from(["solo-export", "-H", "SOLOII.DAT"]);
        assert!(args.header);
        assert!(!args.wants_data());
    }

    #[test]
    fn test_explicit_data_with_header() {
        let args = Args::parse_from(["solo-export", "-H", "-D", "SOLOII.DAT"]);
        assert!(args.header);
        assert!(args.wants_data());
    }

    #[test]
    fn test_format_and_shift_parsing() {
        let args = Args::parse_from([
            "solo-export",
            "-f",
            "influxdb",
            "-m",
            "house",
            "-t",
            "-2",
            "SOLOII.DAT",
        ]);
        assert_eq!(args.format, OutputFormat::Influxdb);
        assert_eq!(args.measurement, "house");
        assert_eq!(args.time_shift, -2);
    }

    #[test]
    fn test_log_levels() {
        let args = Args::parse_from(["solo-export", "SOLOII.DAT"]);
        assert_eq!(args.log_level(), "warn");
        let args = Args::parse_from(["solo-export", "-v", "SOLOII.DAT"]);
        assert_eq!(args.log_level(), "info");
        let args = Args::parse_from(["solo-export", "-d", "SOLOII.DAT"]);
        assert_eq!(args.log_level(), "debug");
    }
}
