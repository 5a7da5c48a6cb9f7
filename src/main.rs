use clap::Parser;

use logsieve::runtime::{boot, run};

/// Derive structural masks from a log stream and label their tokens.
#[derive(Parser, Debug)]
#[command(name = "logsieve", version, about = "Streaming log masking and token labelling")]
struct Cli {
    /// Input log file (UTF-8, newline-delimited)
    input: String,
    /// Output file receiving one mask per input line
    mask_out: String,
    /// Output file receiving comma-separated tokens per labelled line
    token_out: String,
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<String>,
    /// Write a mask/counter diagnostics report here at shutdown
    #[arg(long)]
    report: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let cli = Cli::parse();

    let state = boot::boot(cli.config.as_deref())?;
    run::run(
        state,
        run::RunPaths {
            input: &cli.input,
            mask_out: &cli.mask_out,
            token_out: &cli.token_out,
            report: cli.report.as_deref(),
        },
    )
    .await
}
