//! # struk
//!
//! Command-line front end for the receipt encoder.
//!
//! ## Usage
//!
//! ```bash
//! # Base64 of the ESC/POS buffer
//! struk encode --file receipt.json
//!
//! # RawBT URIs (primary, then fallback)
//! cat receipt.json | struk uris
//!
//! # Raw bytes for a serial or network printer
//! struk raw --file receipt.json --output receipt.bin
//!
//! # Preview-page fragment, handed to the print app
//! struk dispatch --fragment '#data=eyJzdG9yZSI6...'
//! ```

mod config;
mod launcher;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use struk_printer::{
    PrintDispatcher, PrintPayload, ReceiptData, ReceiptRenderer, TextPolicy, decode_fragment,
};

use config::Config;
use launcher::CommandLauncher;

/// struk - ESC/POS receipts for RawBT thermal printers
#[derive(Parser, Debug)]
#[command(name = "struk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    input: InputArgs,

    /// Printable columns (overrides STRUK_PAPER_WIDTH)
    #[arg(long, global = true)]
    width: Option<usize>,

    /// Unprintable character handling: lossy | strict (overrides STRUK_TEXT_POLICY)
    #[arg(long, global = true)]
    policy: Option<TextPolicy>,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Receipt JSON file (stdin when neither --file nor --fragment is given)
    #[arg(long, global = true, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Preview fragment of the form `#data=<base64 JSON>`
    #[arg(long, global = true, value_name = "FRAGMENT")]
    fragment: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the base64 encoded buffer
    Encode,
    /// Print the primary and fallback RawBT URIs
    Uris,
    /// Write the raw ESC/POS bytes to a file
    Raw {
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Hand the buffer to the print app
    Dispatch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries the output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "struk=info,struk_printer=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(width) = cli.width {
        config.paper_width = width;
    }
    if let Some(policy) = cli.policy {
        config.text_policy = policy;
    }
    tracing::debug!(?config, "configuration loaded");

    let receipt = read_receipt(&cli.input)?;
    tracing::info!(kind = %receipt.kind(), "receipt loaded");

    let bytes = ReceiptRenderer::new(config.paper_width)
        .with_policy(config.text_policy)
        .with_footer(config.footer.clone())
        .render(&receipt)?;

    match cli.command {
        Commands::Encode => {
            println!("{}", PrintPayload::new(&bytes, &config.rawbt_package).base64);
        }
        Commands::Uris => {
            let payload = PrintPayload::new(&bytes, &config.rawbt_package);
            println!("{}", payload.primary);
            println!("{}", payload.fallback);
        }
        Commands::Raw { output } => {
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            tracing::info!(bytes = bytes.len(), path = %output.display(), "raw buffer written");
        }
        Commands::Dispatch => {
            let dispatcher =
                PrintDispatcher::new(CommandLauncher::new(&config.launch_cmd), config.dispatch());
            dispatcher.dispatch(&bytes).await?;
        }
    }

    Ok(())
}

fn read_receipt(input: &InputArgs) -> anyhow::Result<ReceiptData> {
    if let Some(fragment) = &input.fragment {
        if input.file.is_some() {
            anyhow::bail!("--file and --fragment cannot be used together");
        }
        return Ok(decode_fragment(fragment)?);
    }

    let json = match &input.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading receipt from stdin")?;
            buf
        }
    };

    Ok(ReceiptData::from_json(&json)?)
}
