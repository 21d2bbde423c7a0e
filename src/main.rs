//! # txconv CLI - Text File Encoding Converter
//!
//! Command-line interface converting a text file between ANSI, UTF-8,
//! UTF-16LE and UTF-16BE, writing to a file or to stdout.

#[cfg(feature = "cli")]
use std::fs::File;
#[cfg(feature = "cli")]
use std::io::{self, BufReader, BufWriter, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::time::Instant;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use txconv::{Decoder, Detection, Encoder, Encoding, EncodingDetector, Session, Stats};

/// Bytes of input shown in the verbose report
#[cfg(feature = "cli")]
const PREVIEW_LEN: usize = 8;

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// txconv: convert text files between ANSI, UTF-8 and UTF-16
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "txconv")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file
    input: PathBuf,

    /// Output file (stdout if not specified)
    output: Option<PathBuf>,

    /// Input format: AUTO, ANSI, UTF8, UTF16, UTF16BE
    #[arg(short = 'i', long = "informat", default_value = "auto", value_parser = parse_source)]
    informat: Encoding,

    /// Output format: ANSI, UTF8, UTF16, UTF16BE
    #[arg(short = 'o', long = "outformat", default_value = "ansi", value_parser = parse_target)]
    outformat: Encoding,

    /// Print a conversion report to stderr and enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Report format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
fn parse_source(s: &str) -> Result<Encoding> {
    Ok(s.parse::<Encoding>()?)
}

#[cfg(feature = "cli")]
fn parse_target(s: &str) -> Result<Encoding> {
    match s.parse::<Encoding>()? {
        Encoding::Auto => anyhow::bail!("AUTO is only valid as an input format"),
        encoding => Ok(encoding),
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionReport {
    input_file: String,
    input_length: u64,
    input_format: Encoding,
    bom_detected: bool,
    first_bytes: String,
    output_file: Option<String>,
    output_format: Encoding,
    lines_processed: usize,
    chars_processed: usize,
    bytes_written: u64,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    convert_command(&cli)
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "cli")]
fn convert_command(cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    let file = File::open(&cli.input)
        .with_context(|| format!("Failed to open input file: {}", cli.input.display()))?;
    let input_length = file
        .metadata()
        .with_context(|| format!("Failed to read input file: {}", cli.input.display()))?
        .len();
    let mut input = BufReader::new(file);

    // Resolve the input format before the output file is touched.
    let detection = EncodingDetector::new()
        .sniff(&mut input)
        .with_context(|| format!("Failed to read input file: {}", cli.input.display()))?;
    let from = detection.resolve(cli.informat).with_context(|| {
        format!(
            "Cannot determine format of {}, use --informat",
            cli.input.display()
        )
    })?;

    if cli.verbose && matches!(cli.format, OutputFormat::Text) {
        print_header(cli, input_length, from, &detection);
    }

    let decoder = Decoder::new(input, from)?.starting_at(detection.bom_len as u64);
    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file: {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let encoder = Encoder::new(sink, cli.outformat)?;

    let mut session = Session::new(decoder, encoder);
    let stats = session.run().context("Conversion failed")?;
    let processing_time = start_time.elapsed();

    match cli.format {
        OutputFormat::Json => {
            let report = ConversionReport {
                input_file: cli.input.display().to_string(),
                input_length,
                input_format: from,
                bom_detected: detection.bom_detected(),
                first_bytes: hex_preview(&detection.sample),
                output_file: cli.output.as_ref().map(|p| p.display().to_string()),
                output_format: cli.outformat,
                lines_processed: stats.lines,
                chars_processed: stats.chars,
                bytes_written: stats.bytes_written,
                processing_time_ms: processing_time.as_millis() as u64,
            };
            eprintln!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if cli.verbose {
                print_totals(&stats);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_header(cli: &Cli, input_length: u64, from: Encoding, detection: &Detection) {
    let output = cli
        .output
        .as_ref()
        .map(|p| format!("\"{}\"", p.display()))
        .unwrap_or_else(|| "(stdout)".to_string());
    let preview = &detection.sample[..detection.sample.len().min(PREVIEW_LEN)];

    eprintln!("Input file:    \"{}\"", cli.input.display());
    eprintln!("Input length:  {} bytes", input_length);
    eprintln!("Input format:  {}", from);
    eprintln!("Output file:   {}", output);
    eprintln!("Output format: {}", cli.outformat);
    eprintln!("First {} bytes:  {}", preview.len(), hex_preview(preview));
}

#[cfg(feature = "cli")]
fn print_totals(stats: &Stats) {
    eprintln!("Lines processed:  {}", stats.lines);
    eprintln!("Chars processed:  {}", stats.chars);
}

#[cfg(feature = "cli")]
fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(PREVIEW_LEN)
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
