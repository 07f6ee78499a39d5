use clap::Parser;
use roster::cli::{self, Command};
use roster::core::config::{self, Diagnostics};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "roster", about = "User directory client")]
struct Args {
    /// Base URL of the users API (overrides config and ROSTER_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Config decides where logs go, so its messages are buffered until the logger exists.
    let mut diagnostics = Diagnostics::new();
    let file_config = match config::load_config(&mut diagnostics) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let resolved = config::resolve(&file_config, args.base_url.as_deref(), &mut diagnostics);

    // Initialize file logger
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    match File::create(&resolved.log_file) {
        Ok(log_file) => {
            let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
        }
        Err(e) => eprintln!(
            "warning: cannot open log file {}: {e}",
            resolved.log_file.display()
        ),
    }

    for warning in diagnostics.warnings() {
        eprintln!("warning: {warning}");
    }
    diagnostics.flush();

    log::info!("Roster starting up against {}", resolved.base_url);

    if let Err(e) = cli::run(args.command, &resolved).await {
        log::error!("Command failed: {}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}
