use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CANNED_ACL_PARAMETER: &str = "x-amz-acl";
pub const BUCKET_NAME_PARAMETER: &str = "bucketName";
pub const OBJECT_KEY_PARAMETER: &str = "key";
pub const PUBLIC_ACCESS_BLOCK_PARAMETER: &str = "PublicAccessBlockConfiguration";

pub const ALL_USERS_GROUP_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";
pub const AUTHENTICATED_USERS_GROUP_URI: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";
pub const LOG_DELIVERY_GROUP_URI: &str = "http://acs.amazonaws.com/groups/s3/LogDelivery";

pub const ALL_USERS_MARKER: &str = "AllUsers";
pub const AUTHENTICATED_USERS_MARKER: &str = "AuthenticatedUsers";
pub const LOG_DELIVERY_MARKER: &str = "LogDelivery";

pub type RequestParameters = Map<String, Value>;

/// CloudTrail record as delivered through EventBridge.
///
/// Only the fields the protector reads are modelled; the rest of the envelope
/// (`id`, `source`, `account`, `region`, ...) is ignored on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    #[serde(default)]
    pub detail: Option<ChangeEventDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEventDetail {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub request_parameters: Option<RequestParameters>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ChangeEventDetail {
    pub fn has_upstream_error(&self) -> bool {
        let non_empty = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        non_empty(&self.error_code) || non_empty(&self.error_message)
    }

    /// First element of `x-amz-acl`, the canned ACL the mutation asked for.
    pub fn requested_canned_acl(&self) -> Option<&str> {
        match self.request_parameters.as_ref()?.get(CANNED_ACL_PARAMETER)? {
            Value::Array(values) => values.first().and_then(Value::as_str),
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CannedAcl {
    #[serde(rename = "private")]
    Private,
}

impl CannedAcl {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
        }
    }
}

impl std::fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GranteeType {
    CanonicalUser,
    Group,
    AmazonCustomerByEmail,
}

impl GranteeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanonicalUser => "CanonicalUser",
            Self::Group => "Group",
            Self::AmazonCustomerByEmail => "AmazonCustomerByEmail",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CanonicalUser" => Some(Self::CanonicalUser),
            "Group" => Some(Self::Group),
            "AmazonCustomerByEmail" => Some(Self::AmazonCustomerByEmail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    FullControl,
    Read,
    ReadAcp,
    Write,
    WriteAcp,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullControl => "FULL_CONTROL",
            Self::Read => "READ",
            Self::ReadAcp => "READ_ACP",
            Self::Write => "WRITE",
            Self::WriteAcp => "WRITE_ACP",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FULL_CONTROL" => Some(Self::FullControl),
            "READ" => Some(Self::Read),
            "READ_ACP" => Some(Self::ReadAcp),
            "WRITE" => Some(Self::Write),
            "WRITE_ACP" => Some(Self::WriteAcp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Grantee {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub grantee_type: Option<GranteeType>,
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "URI", default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl Grantee {
    pub fn canonical_user(id: impl Into<String>) -> Self {
        Self {
            grantee_type: Some(GranteeType::CanonicalUser),
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn group(uri: impl Into<String>) -> Self {
        Self {
            grantee_type: Some(GranteeType::Group),
            uri: Some(uri.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Grant {
    #[serde(default)]
    pub grantee: Option<Grantee>,
    #[serde(default)]
    pub permission: Option<Permission>,
}

impl Grant {
    pub fn new(grantee: Grantee, permission: Permission) -> Self {
        Self {
            grantee: Some(grantee),
            permission: Some(permission),
        }
    }

    pub fn grantee_uri(&self) -> Option<&str> {
        self.grantee.as_ref()?.uri.as_deref()
    }

    pub fn grantee_id(&self) -> Option<&str> {
        self.grantee.as_ref()?.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Owner {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Owner and grant list of a bucket or object at inspection time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessControlSnapshot {
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl AccessControlSnapshot {
    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref()?.id.as_deref()
    }
}

/// The four public-access-block flags. An absent flag counts as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicAccessBlockConfiguration {
    #[serde(default)]
    pub block_public_acls: Option<bool>,
    #[serde(default)]
    pub ignore_public_acls: Option<bool>,
    #[serde(default)]
    pub block_public_policy: Option<bool>,
    #[serde(default)]
    pub restrict_public_buckets: Option<bool>,
}

impl PublicAccessBlockConfiguration {
    pub fn fully_blocked() -> Self {
        Self {
            block_public_acls: Some(true),
            ignore_public_acls: Some(true),
            block_public_policy: Some(true),
            restrict_public_buckets: Some(true),
        }
    }

    pub fn is_fully_blocked(&self) -> bool {
        [
            self.block_public_acls,
            self.ignore_public_acls,
            self.block_public_policy,
            self.restrict_public_buckets,
        ]
        .iter()
        .all(|flag| flag.unwrap_or(false))
    }
}
