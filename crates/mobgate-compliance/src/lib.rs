//! MASVS compliance interpretation for mobgate.
//!
//! Turns the compliance payloads MobSF returns into a uniform pass/fail
//! result, renders failed controls for humans, persists raw reports, and
//! writes the short run summary CI systems display.
//!
//! # Main types
//!
//! - [`ComplianceResult`]: Passed count and failed controls at one MASVS level.
//! - [`ControlViolation`]: A failed control, kept verbatim.
//! - [`RunSummary`]: Markdown status block for a run.
//! - [`StepSummarySink`]: Best-effort append-only summary destination.

/// MASVS payload classification.
pub mod masvs;
/// Raw report persistence.
pub mod persistence;
/// Human-readable rendering of failed controls.
pub mod render;
/// CI step summaries.
pub mod summary;

pub use masvs::{parse_masvs, ComplianceResult, ControlViolation, PASS_TOKENS};
pub use persistence::save_raw_report;
pub use render::render_failures;
pub use summary::{RunStatus, RunSummary, StepSummarySink, STEP_SUMMARY_ENV};
