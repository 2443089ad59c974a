//! Runtime configuration for the protector binaries.
//!
//! All configuration is driven by environment variables; anything unset falls
//! back to [`ProtectorConfig::default`].

use std::str::FromStr;

pub const DEFAULT_SERVICE_NAME: &str = "s3-protector";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {variable}: expected one of {expected}")]
    InvalidValue {
        variable: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to initialize logging: {0}")]
    Telemetry(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            _ => Err(()),
        }
    }
}

/// Where `PutBucketAcl` remediation writes are addressed.
///
/// `OwnerId` reproduces the earlier handler, which passed the owner's
/// canonical id as the bucket name. It is kept selectable until that
/// behaviour is confirmed to be a defect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketAclWriteTarget {
    #[default]
    BucketName,
    OwnerId,
}

impl FromStr for BucketAclWriteTarget {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bucket-name" | "bucket" => Ok(Self::BucketName),
            "owner-id" | "owner" => Ok(Self::OwnerId),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectorConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
    /// Attached to every log line as the `service` field.
    pub service_name: String,
    pub bucket_acl_write_target: BucketAclWriteTarget,
}

impl Default for ProtectorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            bucket_acl_write_target: BucketAclWriteTarget::default(),
        }
    }
}

impl ProtectorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("LOG_LEVEL") {
            config.log_level = value;
        }
        if let Some(value) = lookup("LOG_FORMAT") {
            config.log_format = parse_value("LOG_FORMAT", value, "json, text")?;
        }
        if let Some(value) = lookup("PROTECTOR_SERVICE_NAME").filter(|v| !v.trim().is_empty()) {
            config.service_name = value;
        }
        if let Some(value) = lookup("PROTECTOR_BUCKET_ACL_WRITE_TARGET") {
            config.bucket_acl_write_target = parse_value(
                "PROTECTOR_BUCKET_ACL_WRITE_TARGET",
                value,
                "bucket-name, owner-id",
            )?;
        }

        Ok(config)
    }
}

fn parse_value<T: FromStr>(
    variable: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        variable,
        value,
        expected,
    })
}
