//! `mobgate`: fail a CI job when a mobile binary violates MASVS.

mod paths;

use clap::{ArgAction, Parser};
use mobgate_client::config::DEFAULT_API_KEY;
use mobgate_client::{AuditConfig, AuditRequest, ComplianceAuditRunner};
use mobgate_compliance::{RunSummary, StepSummarySink};
use mobgate_core::MobgateError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mobgate", version, about = "Run MobSF MASVS compliance checks.")]
struct Cli {
    /// Path to the mobile binary (APK, AAB, or IPA) to analyse.
    #[arg(long)]
    app: PathBuf,

    /// Required MASVS level (e.g. L1, L2, RL2).
    #[arg(long, default_value = "L2")]
    masvs_level: String,

    /// Fail with a non-zero exit code if any MASVS controls are violated.
    #[arg(
        long,
        action = ArgAction::Set,
        default_value = "true",
        value_parser = parse_bool_like,
    )]
    fail_on_violation: bool,

    /// MobSF base URL (defaults to MOBSF_URL or http://127.0.0.1:8000).
    #[arg(long)]
    mobsf_url: Option<String>,

    /// MobSF API key (defaults to MOBSF_API_KEY or the MobSF default key).
    #[arg(long)]
    api_key: Option<String>,

    /// Optional path to write the raw MASVS JSON output.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    /// Environment settings with command-line overrides applied.
    fn audit_config(&self) -> AuditConfig {
        let mut config = AuditConfig::from_env();
        if let Some(url) = &self.mobsf_url {
            config = config.with_base_url(url);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        config
    }
}

/// `1`, `true` and `yes` (any case) are true; anything else is false.
fn parse_bool_like(value: &str) -> Result<bool, String> {
    Ok(matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes"
    ))
}

/// The line printed and summarised for a fatal error.
fn failure_message(err: &MobgateError) -> String {
    if err.is_network() {
        format!("Networking failure while communicating with MobSF: {err}")
    } else {
        err.to_string()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = cli.audit_config();
    let home = paths::home_dir();
    let request = AuditRequest {
        app_path: paths::resolve_user_path(&cli.app, home.as_deref()),
        level: cli.masvs_level.clone(),
        fail_on_violation: cli.fail_on_violation,
        output_path: cli
            .output
            .as_deref()
            .map(|p| paths::resolve_user_path(p, home.as_deref())),
    };
    debug!(
        base_url = %config.base_url,
        default_key = config.api_key == DEFAULT_API_KEY,
        level = %request.level,
        "Starting MASVS audit"
    );

    let sink = StepSummarySink::from_env();
    let outcome = match ComplianceAuditRunner::new(config) {
        Ok(runner) => runner.run(&request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            let summary = RunSummary::completed(&result, request.output_path.as_deref());
            sink.append(&summary.to_string()).await;
            ExitCode::SUCCESS
        }
        Err(e) => {
            let message = failure_message(&e);
            eprintln!("[ERROR] {message}");
            sink.append(&RunSummary::failed(&message).to_string()).await;
            ExitCode::FAILURE
        }
    }
}
