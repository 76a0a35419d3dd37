//! CLI binary for pdf2xapi.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints the extracted schema.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2xapi::{extract, write_json, ExtractionConfig, SectionTitles};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract the schema to stdout
  pdf2xapi api-reference-guide.pdf

  # Extract to a file, with the event schema included
  pdf2xapi roomos-111.pdf --events event.xml -o schema.json

  # Download the manual directly
  pdf2xapi https://example.com/api-reference-guide-roomos-111.pdf -o schema.json

  # A manual with non-default chapter titles
  pdf2xapi manual.pdf --statuses-title "xStatus reference" --end-title "Appendices"

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library
  RUST_LOG          Tracing filter, overrides -v/-q (e.g. pdf2xapi=debug)
"#;

/// Extract a machine-readable xAPI schema from a typeset reference-manual PDF.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2xapi",
    version,
    about = "Extract a machine-readable xAPI schema from a device reference-manual PDF",
    long_about = "Extract the xAPI schema (configurations, commands, statuses, and optionally \
events) from a vendor reference-manual PDF. The manual's typography is the grammar: any page \
layout the parser does not recognise is a fatal, structured error rather than a silently wrong \
schema.",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the JSON schema to this file instead of stdout.
    #[arg(short, long, env = "PDF2XAPI_OUTPUT")]
    output: Option<PathBuf>,

    /// Event schema XML file; events are omitted without it.
    #[arg(long, env = "PDF2XAPI_EVENTS")]
    events: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Outline title of the configurations chapter.
    #[arg(long, default_value = "xConfiguration commands")]
    configurations_title: String,

    /// Outline title of the commands chapter.
    #[arg(long, default_value = "xCommand commands")]
    commands_title: String,

    /// Outline title of the statuses chapter.
    #[arg(long, default_value = "xStatus commands")]
    statuses_title: String,

    /// Outline title of the first chapter after the schema material.
    #[arg(long, default_value = "Command overview")]
    end_title: String,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2XAPI_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    let schema = extract(&cli.input, &config)
        .await
        .context("Extraction failed")?;

    if let Some(ref output_path) = cli.output {
        write_json(&schema, output_path, cli.pretty)
            .await
            .context("Failed to write output file")?;
        if !cli.quiet {
            eprintln!("Wrote {}", output_path.display());
        }
    } else {
        let json = if cli.pretty {
            serde_json::to_string_pretty(&schema)
        } else {
            serde_json::to_string(&schema)
        }
        .context("Failed to serialise schema")?;

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    }

    if !cli.quiet {
        eprintln!(
            "{} configurations, {} commands, {} statuses, {} events",
            schema.configurations.len(),
            schema.commands.len(),
            schema.statuses.len(),
            schema.events.len(),
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .section_titles(SectionTitles {
            configurations: cli.configurations_title.clone(),
            commands: cli.commands_title.clone(),
            statuses: cli.statuses_title.clone(),
            end: cli.end_title.clone(),
        })
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref events) = cli.events {
        builder = builder.events_xml(events);
    }

    builder.build().context("Invalid configuration")
}
