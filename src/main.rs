//! VitalThrob: Cardiovascular risk intake client
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitalthrob::adapters::sanitize::SanitizingMakeWriter;
use vitalthrob::tui::App;
use vitalthrob::{AppConfig, LogMode};

fn main() -> Result<()> {
    let config = AppConfig::from_env();

    // Logs on the terminal would corrupt the alternate screen, so an
    // interactive session logs to a file unless told otherwise.
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => std::io::stdout().is_terminal(),
    };

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    config.log_warnings();
    tracing::info!("Starting VitalThrob (predictor at {})", config.predictor_url);

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("VitalThrob shutdown complete.");
    Ok(())
}
