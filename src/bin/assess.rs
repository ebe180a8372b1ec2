//! Headless assessment: submit one clinical record and print the report.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin assess -- [--record <path>] [--url <url>] [--export] [--print]
//! cargo run --bin assess -- --status
//! ```
//!
//! `--record` takes a JSON object keyed by wire ids, or a previous export
//! (its `formData` is used). Without it the default record is assessed.
//!
//! Exit codes: 0 on success, 1 when the assessment fails, 2 on invalid
//! arguments or an invalid record.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitalthrob::adapters::report::render_text_report;
use vitalthrob::adapters::sanitize::SanitizingMakeWriter;
use vitalthrob::adapters::{FileReportSink, HttpPredictor};
use vitalthrob::application::{
    AssessmentWorkflow, PhaseKind, ReportService, Session, WorkflowError,
};
use vitalthrob::ports::ReportContext;
use vitalthrob::{AppConfig, ClinicalRecord};

const USAGE: &str =
    "Usage: assess [--record <path>] [--url <url>] [--export] [--print] | --status";

#[derive(Debug, Default)]
struct Args {
    record: Option<PathBuf>,
    url: Option<String>,
    status: bool,
    export: bool,
    print: bool,
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--record" => match args.next() {
                Some(p) if !p.is_empty() => parsed.record = Some(PathBuf::from(p)),
                _ => usage_error(),
            },
            "--url" => match args.next() {
                Some(u) if !u.is_empty() => parsed.url = Some(u),
                _ => usage_error(),
            },
            "--status" => parsed.status = true,
            "--export" => parsed.export = true,
            "--print" => parsed.print = true,
            "-h" | "--help" => {
                println!(
                    "{USAGE}\n\nSubmits a clinical record to the prediction service and prints the report.\nThe service URL defaults to VITALTHROB_PREDICTOR_URL; exports go to VITALTHROB_EXPORT_DIR."
                );
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown arg: {arg}\n{USAGE}");
                std::process::exit(2);
            }
        }
    }

    parsed
}

fn usage_error() -> ! {
    eprintln!("{USAGE}");
    std::process::exit(2);
}

fn load_record(path: &PathBuf) -> Result<ClinicalRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record from {}", path.display()))?;
    let mut value: serde_json::Value =
        serde_json::from_str(&text).context("Record file is not valid JSON")?;

    if let Some(form) = value.get_mut("formData") {
        value = form.take();
    }

    serde_json::from_value(value).map_err(|e| anyhow!("Invalid clinical record: {e}"))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(SanitizingMakeWriter::new(std::io::stderr)),
        )
        .init();

    let args = parse_args();
    let mut config = AppConfig::from_env();
    config.log_warnings();
    if let Some(url) = args.url {
        config.predictor_url = url;
    }

    let predictor = HttpPredictor::new(&config.predictor_url, config.timeout)?;

    if args.status {
        let status = predictor.status()?;
        println!("{}", status.message);
        println!("Status:       {}", status.status);
        println!("Model loaded: {}", status.model_loaded);
        println!("Features:     {}", status.expected_features.join(", "));
        return Ok(());
    }

    let mut session = match &args.record {
        Some(path) => match load_record(path) {
            Ok(record) => Session::with_record(record),
            Err(e) => {
                eprintln!("{e:#}");
                std::process::exit(2);
            }
        },
        None => Session::new(),
    };

    let workflow = AssessmentWorkflow::new(Arc::new(predictor));
    match workflow.submit(&mut session) {
        Ok(PhaseKind::Success) => {}
        Ok(_) => {
            eprintln!(
                "Assessment failed: {}",
                session.last_error().unwrap_or("unknown error")
            );
            std::process::exit(1);
        }
        Err(WorkflowError::Validation(violations)) => {
            for violation in violations {
                eprintln!("{violation}");
            }
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    }

    let result = session
        .result()
        .ok_or_else(|| anyhow!("Assessment finished without a result"))?;
    print!(
        "{}",
        render_text_report(&ReportContext {
            record: session.record(),
            result,
            response_time: session.response_time(),
        })
    );

    if args.export || args.print {
        let reports = ReportService::new(Arc::new(FileReportSink::new(&config.export_dir)));
        if args.export {
            println!("\nExported to {}", reports.export(&session)?.display());
        }
        if args.print {
            println!("Report written to {}", reports.print(&session)?.display());
        }
    }

    Ok(())
}
