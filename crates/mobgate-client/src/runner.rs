use crate::client::MobsfClient;
use crate::config::AuditConfig;
use mobgate_compliance::{parse_masvs, render_failures, save_raw_report, ComplianceResult};
use mobgate_core::{MobgateError, MobgateResult};
use std::path::PathBuf;
use tracing::info;

/// What to audit and how to judge it.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    /// Path to the APK, AAB or IPA to upload.
    pub app_path: PathBuf,
    /// MASVS level to check against (e.g. `L1`, `L2`).
    pub level: String,
    /// Fail the run when any control is violated.
    pub fail_on_violation: bool,
    /// Where to write the raw MASVS payload, if anywhere.
    pub output_path: Option<PathBuf>,
}

/// Drives one MobSF compliance run from readiness probe to classification.
///
/// Steps run strictly in sequence; progress is printed to stdout.
pub struct ComplianceAuditRunner {
    client: MobsfClient,
    config: AuditConfig,
}

impl ComplianceAuditRunner {
    /// Creates a runner for the service described by `config`.
    pub fn new(config: AuditConfig) -> MobgateResult<Self> {
        let client = MobsfClient::new(config.base_url.clone(), &config.api_key)?;
        Ok(Self { client, config })
    }

    /// The configuration this runner was built with.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Runs the audit.
    ///
    /// Returns the classified result. Fails with
    /// [`MobgateError::PolicyViolation`] when controls failed and
    /// `fail_on_violation` is set.
    pub async fn run(&self, request: &AuditRequest) -> MobgateResult<ComplianceResult> {
        if !request.app_path.exists() {
            return Err(MobgateError::AppNotFound(request.app_path.clone()));
        }

        self.client
            .wait_until_ready(self.config.ready_timeout, self.config.ready_interval)
            .await?;
        println!("✅ MobSF server is reachable at {}", self.client.base_url());

        let meta = self.client.upload(&request.app_path).await?;
        println!("⬆️  Uploaded {} (hash: {})", meta.file_name, meta.hash);

        self.client.trigger_scan(&meta).await?;
        println!("🔍 MobSF analysis started, waiting for completion...");
        self.client
            .wait_for_scan(&meta, self.config.poll_delay, self.config.poll_timeout)
            .await?;
        info!(hash = %meta.hash, "Analysis complete");

        let raw = self.client.fetch_masvs(&meta, &request.level).await?;
        if let Some(path) = &request.output_path {
            save_raw_report(path, &raw).await?;
            println!("📝 Raw MASVS report saved to {}", path.display());
        }

        let data: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            MobgateError::MalformedResponse(format!("MASVS report is not valid JSON: {e}"))
        })?;
        let result = parse_masvs(&data, &request.level)?;

        println!(
            "📋 MASVS level {} summary: {} controls passed, {} controls failed.",
            result.level,
            result.passed,
            result.failed.len()
        );

        if result.is_compliant() {
            println!("✅ All MASVS controls passed.");
        } else {
            println!("❌ Non-compliant controls detected:");
            println!("{}", render_failures(&result.failed));
            if request.fail_on_violation {
                return Err(MobgateError::PolicyViolation);
            }
        }

        Ok(result)
    }
}
