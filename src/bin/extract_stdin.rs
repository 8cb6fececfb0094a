//! Read HTML from stdin and print the extraction record as JSON.
//!
//! Runs the markup strategy only; there is no browser behind stdin.

use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use rs_harvest::{extract_html_response, Format, Options};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "extract_stdin", version, about = "Extract the main content of an HTML document read from stdin")]
struct Args {
    /// Output format: text, markdown or html.
    #[arg(long, default_value = "markdown")]
    format: Format,

    /// URL the document was served from, for canonical resolution.
    #[arg(long)]
    url: Option<String>,

    /// Attach title, author, date and related metadata.
    #[arg(long)]
    metadata: bool,

    /// Emit compact JSON on one line.
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut bytes = Vec::new();
    if let Err(err) = io::stdin().read_to_end(&mut bytes) {
        eprintln!("failed to read stdin: {err}");
        return ExitCode::FAILURE;
    }
    let html = rs_harvest::encoding::decode_html(&bytes);

    let options = Options {
        format: args.format,
        url: args.url,
        include_metadata: args.metadata,
        ..Options::default()
    };

    let response = match extract_html_response(&html, &options) {
        Ok(response) => response,
        Err(err) => {
            eprintln!("extraction failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let json = if args.compact {
        serde_json::to_string(&response).map_err(rs_harvest::Error::from)
    } else {
        response.to_json_pretty()
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to serialize response: {err}");
            ExitCode::FAILURE
        }
    }
}
