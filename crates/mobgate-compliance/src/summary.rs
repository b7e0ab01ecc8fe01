use crate::masvs::ComplianceResult;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Environment variable naming the CI step summary file.
pub const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

const HEADING: &str = "## MobSF MASVS scan";

/// Overall outcome of a run, as shown in the CI summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every control passed.
    Success,
    /// The run finished but some controls failed.
    CompletedWithWarnings,
    /// The run aborted.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "✅ Success"),
            RunStatus::CompletedWithWarnings => write!(f, "⚠️ Completed with warnings"),
            RunStatus::Failed => write!(f, "❌ Failed"),
        }
    }
}

/// A short Markdown status block describing one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    status: RunStatus,
    body: Vec<String>,
}

impl RunSummary {
    /// Summary of a run that completed and classified the report.
    pub fn completed(result: &ComplianceResult, report_path: Option<&Path>) -> Self {
        let status = if result.is_compliant() {
            RunStatus::Success
        } else {
            RunStatus::CompletedWithWarnings
        };

        let mut body = vec![
            format!("- MASVS level: {}", result.level),
            format!("- Passed controls: {}", result.passed),
            format!("- Failed controls: {}", result.failed.len()),
        ];
        if let Some(path) = report_path {
            body.push(format!("- Report: `{}`", path.display()));
        }

        Self { status, body }
    }

    /// Summary of a run that aborted with `message`.
    pub fn failed(message: impl fmt::Display) -> Self {
        Self {
            status: RunStatus::Failed,
            body: vec![format!("- Error: {message}")],
        }
    }

    /// The run's status.
    pub fn status(&self) -> RunStatus {
        self.status
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HEADING}\n- Status: {}", self.status)?;
        for line in &self.body {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

/// Append-only destination for run summaries.
///
/// Writes are best-effort: an unset path or any I/O failure is ignored.
#[derive(Debug, Clone, Default)]
pub struct StepSummarySink {
    path: Option<PathBuf>,
}

impl StepSummarySink {
    /// A sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// A sink at the path named by [`STEP_SUMMARY_ENV`], if set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var_os(STEP_SUMMARY_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::disabled(),
        }
    }

    /// Appends `summary`, adding a trailing newline when missing.
    pub async fn append(&self, summary: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if summary.is_empty() {
            return;
        }

        let mut text = summary.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }

        if let Err(e) = append_to(path, &text).await {
            debug!(path = %path.display(), error = %e, "Step summary not written");
        }
    }
}

async fn append_to(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}
