use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sheet_editor::config::EditorConfig;
use sheet_editor::replay::{self, ReplayError};

#[derive(Parser, Debug)]
#[command(name = "sheet-editor-replay", about = "Replay recorded sheet-editor input headlessly")]
struct Cli {
    /// Replay script (JSON).
    script: PathBuf,

    /// Override the script's navigation mode.
    #[arg(long, env = "SHEET_EDITOR_MODE")]
    mode: Option<String>,

    /// Pretty-print the resulting property tree.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "replay failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ReplayError> {
    let mut script = replay::load_script(&cli.script)?;
    if let Some(mode) = cli.mode {
        script.mode = mode;
    }

    let outcome = replay::run(script, EditorConfig::from_env()).await?;
    for failure in &outcome.failures {
        tracing::warn!(error = %failure, code = failure.error_code(), "store failure during replay");
    }
    tracing::info!(selection = ?outcome.selection, "final selection");

    let json = if cli.pretty {
        serde_json::to_string_pretty(&outcome.tree)?
    } else {
        serde_json::to_string(&outcome.tree)?
    };
    println!("{json}");
    Ok(())
}
