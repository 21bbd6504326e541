use std::process::ExitCode;

use opsdesk_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use opsdesk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // Command output owns stdout, so logs go to stderr.
    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .compact()
                .init();
        }
        Pretty => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .pretty()
                .init();
        }
        Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .json()
                .init();
        }
    }
}

fn main() -> ExitCode {
    // A broken config still gets logging; the commands report the error.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&config);

    opsdesk_cli::run()
}
