//! Command execution for the solo-export CLI
//!
//! Wires the decoder to stdout: sets up the diagnostic channel on stderr,
//! opens and validates the file, and walks whichever sections the flags
//! selected. A consumer closing stdout early is a normal end of output, not
//! a failure.

use std::io::Write;

use tracing::{debug, info};

use crate::app::services::decoder::SoloDecoder;
use crate::app::services::solo_file::SoloFile;
use crate::cli::args::{Args, OutputFormat};
use crate::constants::{EXTRA_DATA_OFFSET, EXTRA_DUMP_ROW_LEN, HEADER_TRAILER_OFFSET, PRE_HEADER_OFFSET};
use crate::output::{
    CsvSink, EnergynoteSink, InfluxSink, JsonSink, RecordSink, TableSink,
};
use crate::{Error, Result};

/// Run the selected section walks against the given file.
///
/// Only a signature mismatch or an I/O failure aborts the run; every
/// section-local condition is reported on stderr and decoding continues.
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args);

    debug!(?args, "starting solo-export");

    let mut file = SoloFile::open(&args.filename)?;
    info!(path = %file.path().display(), "file signature valid");

    let mut decoder = SoloDecoder::new(args.time_shift);

    if args.header {
        print_headers(&mut file, &mut decoder)?;
    }

    if args.extra {
        print_extra(&mut file)?;
    }

    if args.wants_data() {
        file.seek_data_area()?;
        let mut reader = std::io::BufReader::new(&mut file);
        let mut sink = make_sink(&args);
        decoder.decode_data(&mut reader, sink.as_mut())?;

        let stats = decoder.stats();
        info!(
            records_read = stats.records_read,
            records_emitted = stats.records_emitted,
            gap_rows = stats.gap_rows,
            gap_runs = stats.gap_runs,
            unresolved_dates = stats.unresolved_dates,
            "data walk finished"
        );
    }

    Ok(())
}

/// Build the sink for the chosen data output format
fn make_sink(args: &Args) -> Box<dyn RecordSink> {
    let stdout = std::io::stdout();
    match args.format {
        OutputFormat::Table => Box::new(TableSink::new(stdout)),
        OutputFormat::Csv => Box::new(CsvSink::new(stdout)),
        OutputFormat::Json => Box::new(JsonSink::new(stdout)),
        OutputFormat::Influxdb => Box::new(InfluxSink::new(stdout, args.measurement.clone())),
        OutputFormat::Energynote => Box::new(EnergynoteSink::new(stdout)),
    }
}

/// Decode and print the header entries
fn print_headers(file: &mut SoloFile, decoder: &mut SoloDecoder) -> Result<()> {
    file.seek_header_area()?;
    let mut reader = std::io::BufReader::new(file);
    let entries = decoder.read_header_entries(&mut reader)?;

    let mut out = std::io::stdout();
    for (n, entry) in entries.iter().enumerate() {
        let line = format!(
            "Header {:3}: tariff_1={} tariff_2={} tariff_3={} std_charge={} budget_yearly={} \
             times={}-{},{}-{},{}-{} index={}",
            n + 1,
            entry.tariff_1,
            entry.tariff_2,
            entry.tariff_3,
            entry.std_charge,
            entry.budget_yearly,
            entry.time_1_start,
            entry.time_1_end,
            entry.time_2_start,
            entry.time_2_end,
            entry.time_3_start,
            entry.time_3_end,
            entry.index,
        );
        if !print_line(&mut out, &line)? {
            return Ok(());
        }
    }
    Ok(())
}

/// Hex-dump the opaque regions: pre-header, header trailer, and extra data
fn print_extra(file: &mut SoloFile) -> Result<()> {
    let mut out = std::io::stdout();

    let pre_header = file.pre_header()?;
    if !print_line(
        &mut out,
        &format!("Data {}-8:  {}", PRE_HEADER_OFFSET, hex_row(&pre_header)),
    )? {
        return Ok(());
    }

    let trailer = file.header_trailer()?;
    if !print_line(
        &mut out,
        &format!("Data {}: {}", HEADER_TRAILER_OFFSET, hex_row(&trailer)),
    )? {
        return Ok(());
    }

    let extra = file.extra_data()?;
    for (i, chunk) in extra.chunks(EXTRA_DUMP_ROW_LEN).enumerate() {
        let offset = EXTRA_DATA_OFFSET + (i * EXTRA_DUMP_ROW_LEN) as u64;
        if !print_line(&mut out, &format!("Data {offset}: {}", hex_row(chunk)))? {
            return Ok(());
        }
    }
    Ok(())
}

fn hex_row(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write one line to stdout; returns false when the consumer closed its end
fn print_line(out: &mut impl Write, line: &str) -> Result<bool> {
    match writeln!(out, "{line}") {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            debug!("stdout closed, stopping cleanly");
            Ok(false)
        }
        Err(e) => Err(Error::output("stdout write failed", e)),
    }
}

/// Configure the stderr diagnostic channel from the CLI flags
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("solo_export={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_row() {
        assert_eq!(hex_row(&[0x00, 0xFF, 0x1A]), "00 ff 1a");
        assert_eq!(hex_row(&[]), "");
    }

    #[test]
    fn test_print_line_swallows_broken_pipe() {
        struct BrokenPipe;
        impl Write for BrokenPipe {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        assert!(!print_line(&mut BrokenPipe, "row").unwrap());
    }
}
