//! MobSF REST client and compliance audit runner.
//!
//! # Main types
//!
//! - [`AuditConfig`]: Service location, credentials and polling bounds.
//! - [`MobsfClient`]: Readiness probe, upload, scan, completion poll and MASVS fetch.
//! - [`ComplianceAuditRunner`]: Runs those calls in order and classifies the result.

/// MobSF API client.
pub mod client;
/// Environment-driven configuration.
pub mod config;
/// End-to-end audit orchestration.
pub mod runner;

pub use client::MobsfClient;
pub use config::AuditConfig;
pub use runner::{AuditRequest, ComplianceAuditRunner};
