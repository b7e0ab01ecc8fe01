use std::path::PathBuf;

/// Top-level error type for a mobgate run.
///
/// Every variant except [`MobgateError::Network`] is a tool-specific failure.
/// `Network` carries raw transport failures from the HTTP client so the
/// binary can report them under a distinct prefix.
#[derive(Debug, thiserror::Error)]
pub enum MobgateError {
    /// The service root never answered with a success status in time.
    #[error("MobSF server at {base_url} did not become ready within {waited_secs} seconds.")]
    NotReady {
        /// Base URL that was probed.
        base_url: String,
        /// Seconds spent waiting before giving up.
        waited_secs: u64,
    },

    /// An API call answered with a non-success status.
    #[error("{context} failed with status {status}: {body}")]
    Status {
        /// Human-readable name of the call (e.g. `Upload`).
        context: String,
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// A response arrived but did not have the expected shape.
    #[error("{0}")]
    MalformedResponse(String),

    /// The analysis did not finish before the poll deadline.
    #[error(
        "Timed out waiting for MobSF to finish analysis; \
         consider increasing MOBSF_POLL_TIMEOUT_SECONDS if binaries are large."
    )]
    PollTimeout,

    /// The binary to upload does not exist.
    #[error("App binary not found at {}", .0.display())]
    AppNotFound(PathBuf),

    /// Violations were found and the run was asked to fail on them.
    #[error("MASVS compliance check failed due to policy violations.")]
    PolicyViolation,

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// A transport-level failure from the HTTP client.
    #[error("{0}")]
    Network(String),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MobgateError {
    /// Returns `true` for raw transport failures, as opposed to tool-specific ones.
    pub fn is_network(&self) -> bool {
        matches!(self, MobgateError::Network(_))
    }
}

/// A convenience `Result` alias using [`MobgateError`].
pub type MobgateResult<T> = Result<T, MobgateError>;
