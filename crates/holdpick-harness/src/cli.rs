#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::{HarnessError, Result};
use crate::replay::{ReplayReport, replay};
use crate::trace::Trace;

#[derive(Debug, Parser)]
#[command(
    name = "holdpick-harness",
    about = "Deterministic replay and checksum verification of holdpick gesture traces",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a trace and print its observations and checksum.
    Replay(ReplayArgs),

    /// Replay a trace and compare its checksum with an expected value.
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSONL trace file.
    pub path: PathBuf,

    /// Print the full report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// JSONL trace file.
    pub path: PathBuf,

    /// Expected checksum, hex (optionally `0x`-prefixed).
    #[arg(long)]
    pub checksum: String,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    let stdout = io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(&args, out),
        Commands::Verify(args) => run_verify(&args, out),
    }
}

fn run_replay(args: &ReplayArgs, out: &mut dyn Write) -> Result<()> {
    let report = replay(&Trace::load(&args.path)?)?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write_summary(&report, out)?;
    }
    Ok(())
}

fn run_verify(args: &VerifyArgs, out: &mut dyn Write) -> Result<()> {
    let expected = parse_checksum(&args.checksum)?;
    let report = replay(&Trace::load(&args.path)?)?;
    if report.checksum != expected {
        return Err(HarnessError::ChecksumMismatch {
            expected,
            actual: report.checksum,
        });
    }
    writeln!(out, "ok {}", report.checksum_hex())?;
    Ok(())
}

fn write_summary(report: &ReplayReport, out: &mut dyn Write) -> Result<()> {
    for observation in &report.observations {
        writeln!(out, "{}", observation.summary())?;
    }
    writeln!(
        out,
        "steps={} ignored_inputs={} final_phase={:?} attachment={}",
        report.steps,
        report.ignored_inputs,
        report.final_phase,
        report.attachment.as_deref().unwrap_or("-")
    )?;
    writeln!(out, "checksum {}", report.checksum_hex())?;
    Ok(())
}

/// Parse a 64-bit hex checksum.
pub fn parse_checksum(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HarnessError::InvalidChecksum {
            value: raw.to_owned(),
        });
    }
    u64::from_str_radix(digits, 16).map_err(|_| HarnessError::InvalidChecksum {
        value: raw.to_owned(),
    })
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_parsing() {
        assert_eq!(parse_checksum("ff").unwrap(), 0xff);
        assert_eq!(parse_checksum(" 0xCBF29CE484222325 ").unwrap(), 0xcbf29ce484222325);
        assert!(matches!(
            parse_checksum("xyz"),
            Err(HarnessError::InvalidChecksum { .. })
        ));
        assert!(parse_checksum("").is_err());
        assert!(parse_checksum("0x").is_err());
        assert!(parse_checksum("11112222333344445").is_err());
        assert!(parse_checksum("+1").is_err());
    }

    #[test]
    fn missing_trace_is_read_error() {
        let mut out = Vec::new();
        let err = run(
            Cli {
                log_json: false,
                command: Commands::Replay(ReplayArgs {
                    path: PathBuf::from("/nonexistent/holdpick/trace.jsonl"),
                    json: false,
                }),
            },
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, HarnessError::ReadTrace { .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "holdpick-harness",
            "--log-json",
            "verify",
            "trace.jsonl",
            "--checksum",
            "0xabc",
        ])
        .expect("parse");
        assert!(cli.log_json);
        assert!(matches!(
            cli.command,
            Commands::Verify(VerifyArgs { ref checksum, .. }) if checksum == "0xabc"
        ));
    }
}
