//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `wordbook_core` linkage with deterministic output.
//! - With a data directory argument, open its database and print word
//!   counts per scope.

use log::info;
use std::process::ExitCode;
use wordbook_core::{core_version, init_logging_from, ping, AppConfig, WordApp, WordScope};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("wordbook_core ping={}", ping());
    println!("wordbook_core version={}", core_version());

    let Some(data_dir) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    let config = AppConfig::new(data_dir);

    if let Err(err) = init_logging_from(&config) {
        eprintln!("logging disabled: {err}");
    }

    let app = match WordApp::open(&config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("failed to open {}: {err}", config.db_path().display());
            return ExitCode::FAILURE;
        }
    };

    for scope in [WordScope::All, WordScope::Completed, WordScope::Unlearned] {
        match app.repo().list(scope).await {
            Ok(words) => println!("words scope={} count={}", scope.as_str(), words.len()),
            Err(err) => {
                eprintln!("failed to list {} words: {err}", scope.as_str());
                return ExitCode::FAILURE;
            }
        }
    }

    info!("event=cli_probe module=cli status=ok");
    ExitCode::SUCCESS
}
