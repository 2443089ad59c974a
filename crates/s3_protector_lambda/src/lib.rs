//! AWS-facing side of the S3 ACL protector.
//!
//! This crate owns the collaborator traits and their AWS SDK adapters, the
//! remediation handler, runtime configuration, and the Lambda and fixture
//! replay binaries. Classification and detection live in `s3_protector_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;

#[cfg(test)]
mod test_support;
