//! Pure decision logic for the S3 ACL protector.
//!
//! Owns the change-event contract, event classification and violation
//! detection. Nothing here talks to AWS or the Lambda runtime.

pub mod classify;
pub mod contract;
pub mod detect;
