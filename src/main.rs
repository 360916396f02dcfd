use std::process::ExitCode;

use clap::Parser;

use beauty_rating_lib::bootstrap::{self, tracing::init_tracing_subscriber};
use beauty_rating_lib::{execute, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let data_dir = match bootstrap::data_dir_or_default(cli.data_dir.clone()) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing_subscriber(&data_dir.join("logs")) {
        eprintln!("Failed to initialize tracing: {:#}", e);
    }

    let orchestrator = match bootstrap::build_orchestrator(cli.config.clone(), &data_dir) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "startup failed");
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(&orchestrator, cli.command).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
