use serde_json::Value;

use crate::contract::{
    CannedAcl, ChangeEvent, ChangeEventDetail, PublicAccessBlockConfiguration, RequestParameters,
    BUCKET_NAME_PARAMETER, OBJECT_KEY_PARAMETER, PUBLIC_ACCESS_BLOCK_PARAMETER,
};

/// The four S3 mutations the protector reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PutBucketAcl,
    PutObjectAcl,
    PutBucketPublicAccessBlock,
    PutAccountPublicAccessBlock,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        Self::PutBucketAcl,
        Self::PutObjectAcl,
        Self::PutBucketPublicAccessBlock,
        Self::PutAccountPublicAccessBlock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PutBucketAcl => "PutBucketAcl",
            Self::PutObjectAcl => "PutObjectAcl",
            Self::PutBucketPublicAccessBlock => "PutBucketPublicAccessBlock",
            Self::PutAccountPublicAccessBlock => "PutAccountPublicAccessBlock",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized mutation with its payload parsed out of `requestParameters`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    PutBucketAcl {
        bucket: String,
        requested_acl: Option<String>,
    },
    PutObjectAcl {
        bucket: String,
        key: String,
        requested_acl: Option<String>,
    },
    PutBucketPublicAccessBlock {
        bucket: String,
        configuration: PublicAccessBlockConfiguration,
    },
    PutAccountPublicAccessBlock {
        configuration: PublicAccessBlockConfiguration,
    },
}

impl MutationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PutBucketAcl { .. } => EventKind::PutBucketAcl,
            Self::PutObjectAcl { .. } => EventKind::PutObjectAcl,
            Self::PutBucketPublicAccessBlock { .. } => EventKind::PutBucketPublicAccessBlock,
            Self::PutAccountPublicAccessBlock { .. } => EventKind::PutAccountPublicAccessBlock,
        }
    }

    pub fn bucket(&self) -> Option<&str> {
        match self {
            Self::PutBucketAcl { bucket, .. }
            | Self::PutObjectAcl { bucket, .. }
            | Self::PutBucketPublicAccessBlock { bucket, .. } => Some(bucket),
            Self::PutAccountPublicAccessBlock { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    MissingDetail,
    MissingEventName,
    UnrecognizedEventName(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortCircuitReason {
    /// The mutation itself requested the `private` canned ACL.
    AlreadyPrivate,
    /// The mutation failed upstream; this also swallows the events produced
    /// by our own remediation writes when they are rejected.
    UpstreamCallFailed {
        error_code: Option<String>,
        error_message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Ignored(IgnoreReason),
    ShortCircuited {
        kind: EventKind,
        reason: ShortCircuitReason,
    },
    Dispatch(MutationEvent),
}

/// A recognized event whose `requestParameters` lack what its branch needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEvent {
    #[error("{kind} event has no requestParameters")]
    MissingRequestParameters { kind: EventKind },
    #[error("{kind} event has no requestParameters.{field}")]
    MissingField {
        kind: EventKind,
        field: &'static str,
    },
    #[error("{kind} event has an invalid requestParameters.{field}: {message}")]
    InvalidField {
        kind: EventKind,
        field: &'static str,
        message: String,
    },
}

pub fn classify(event: &ChangeEvent) -> Result<Classification, MalformedEvent> {
    let Some(detail) = event.detail.as_ref() else {
        return Ok(Classification::Ignored(IgnoreReason::MissingDetail));
    };

    let Some(event_name) = detail.event_name.as_deref().filter(|name| !name.is_empty()) else {
        return Ok(Classification::Ignored(IgnoreReason::MissingEventName));
    };

    let Some(kind) = EventKind::from_event_name(event_name) else {
        return Ok(Classification::Ignored(
            IgnoreReason::UnrecognizedEventName(event_name.to_string()),
        ));
    };

    if detail.requested_canned_acl() == Some(CannedAcl::Private.as_str()) {
        return Ok(Classification::ShortCircuited {
            kind,
            reason: ShortCircuitReason::AlreadyPrivate,
        });
    }

    if detail.has_upstream_error() {
        return Ok(Classification::ShortCircuited {
            kind,
            reason: ShortCircuitReason::UpstreamCallFailed {
                error_code: detail.error_code.clone(),
                error_message: detail.error_message.clone(),
            },
        });
    }

    parse_mutation(kind, detail).map(Classification::Dispatch)
}

fn parse_mutation(
    kind: EventKind,
    detail: &ChangeEventDetail,
) -> Result<MutationEvent, MalformedEvent> {
    let parameters = detail
        .request_parameters
        .as_ref()
        .ok_or(MalformedEvent::MissingRequestParameters { kind })?;
    let requested_acl = detail.requested_canned_acl().map(str::to_string);

    let event = match kind {
        EventKind::PutBucketAcl => MutationEvent::PutBucketAcl {
            bucket: required_string(kind, parameters, BUCKET_NAME_PARAMETER)?,
            requested_acl,
        },
        EventKind::PutObjectAcl => MutationEvent::PutObjectAcl {
            bucket: required_string(kind, parameters, BUCKET_NAME_PARAMETER)?,
            key: required_string(kind, parameters, OBJECT_KEY_PARAMETER)?,
            requested_acl,
        },
        EventKind::PutBucketPublicAccessBlock => MutationEvent::PutBucketPublicAccessBlock {
            bucket: required_string(kind, parameters, BUCKET_NAME_PARAMETER)?,
            configuration: access_block_configuration(kind, parameters)?,
        },
        EventKind::PutAccountPublicAccessBlock => MutationEvent::PutAccountPublicAccessBlock {
            configuration: access_block_configuration(kind, parameters)?,
        },
    };

    Ok(event)
}

fn required_string(
    kind: EventKind,
    parameters: &RequestParameters,
    field: &'static str,
) -> Result<String, MalformedEvent> {
    match parameters.get(field) {
        None | Some(Value::Null) => Err(MalformedEvent::MissingField { kind, field }),
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        Some(Value::String(_)) => Err(MalformedEvent::InvalidField {
            kind,
            field,
            message: "value is empty".to_string(),
        }),
        Some(other) => Err(MalformedEvent::InvalidField {
            kind,
            field,
            message: format!("expected a string, got {other}"),
        }),
    }
}

fn access_block_configuration(
    kind: EventKind,
    parameters: &RequestParameters,
) -> Result<PublicAccessBlockConfiguration, MalformedEvent> {
    let field = PUBLIC_ACCESS_BLOCK_PARAMETER;
    let value = match parameters.get(field) {
        None | Some(Value::Null) => return Err(MalformedEvent::MissingField { kind, field }),
        Some(value) => value.clone(),
    };

    serde_json::from_value(value).map_err(|error| MalformedEvent::InvalidField {
        kind,
        field,
        message: error.to_string(),
    })
}
