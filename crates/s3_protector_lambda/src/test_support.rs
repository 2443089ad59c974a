//! Recording fakes for the AWS collaborators.
//!
//! One [`FakeAws`] implements both collaborator traits so tests can assert on
//! the exact order of calls across S3, S3 Control and STS.

use std::sync::Mutex;

use async_trait::async_trait;
use s3_protector_core::contract::{
    AccessControlSnapshot, CannedAcl, Grant, Grantee, Owner, Permission,
    PublicAccessBlockConfiguration,
};

use crate::adapters::{BucketAclUpdate, IdentityResolver, RemoteCallError, StorageControlPlane};

pub const OWNER_ID: &str = "79a59df900b949e55d96a1e698fbacedfd6e09d98eacf8f8d5218e7cd47ef2be";
pub const ACCOUNT_ID: &str = "123456789012";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetBucketAcl {
        bucket: String,
    },
    PutBucketAcl {
        bucket: String,
        update: BucketAclUpdate,
    },
    GetObjectAcl {
        bucket: String,
        key: String,
    },
    PutObjectAcl {
        bucket: String,
        key: String,
        acl: CannedAcl,
    },
    PutBucketPublicAccessBlock {
        bucket: String,
        configuration: PublicAccessBlockConfiguration,
    },
    PutAccountPublicAccessBlock {
        account_id: String,
        configuration: PublicAccessBlockConfiguration,
    },
    GetCallerIdentity,
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::PutBucketAcl { .. }
                | Self::PutObjectAcl { .. }
                | Self::PutBucketPublicAccessBlock { .. }
                | Self::PutAccountPublicAccessBlock { .. }
        )
    }
}

pub struct FakeAws {
    calls: Mutex<Vec<Call>>,
    bucket_acl: Result<AccessControlSnapshot, RemoteCallError>,
    object_acl: Result<AccessControlSnapshot, RemoteCallError>,
    account_id: Result<String, RemoteCallError>,
    write_error: Option<RemoteCallError>,
}

impl FakeAws {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            bucket_acl: Ok(owner_only_acl()),
            object_acl: Ok(owner_only_acl()),
            account_id: Ok(ACCOUNT_ID.to_string()),
            write_error: None,
        }
    }

    pub fn with_bucket_acl(mut self, snapshot: AccessControlSnapshot) -> Self {
        self.bucket_acl = Ok(snapshot);
        self
    }

    pub fn with_object_acl(mut self, snapshot: AccessControlSnapshot) -> Self {
        self.object_acl = Ok(snapshot);
        self
    }

    pub fn failing_reads(mut self, error: RemoteCallError) -> Self {
        self.bucket_acl = Err(error.clone());
        self.object_acl = Err(error);
        self
    }

    pub fn failing_identity(mut self, error: RemoteCallError) -> Self {
        self.account_id = Err(error);
        self
    }

    pub fn failing_writes(mut self, error: RemoteCallError) -> Self {
        self.write_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("poisoned mutex").push(call);
    }

    fn write(&self, call: Call) -> Result<(), RemoteCallError> {
        self.record(call);
        match &self.write_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StorageControlPlane for FakeAws {
    async fn get_bucket_acl(&self, bucket: &str) -> Result<AccessControlSnapshot, RemoteCallError> {
        self.record(Call::GetBucketAcl {
            bucket: bucket.to_string(),
        });
        self.bucket_acl.clone()
    }

    async fn put_bucket_acl(
        &self,
        bucket: &str,
        update: &BucketAclUpdate,
    ) -> Result<(), RemoteCallError> {
        self.write(Call::PutBucketAcl {
            bucket: bucket.to_string(),
            update: update.clone(),
        })
    }

    async fn get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<AccessControlSnapshot, RemoteCallError> {
        self.record(Call::GetObjectAcl {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        self.object_acl.clone()
    }

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: CannedAcl,
    ) -> Result<(), RemoteCallError> {
        self.write(Call::PutObjectAcl {
            bucket: bucket.to_string(),
            key: key.to_string(),
            acl,
        })
    }

    async fn put_bucket_public_access_block(
        &self,
        bucket: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError> {
        self.write(Call::PutBucketPublicAccessBlock {
            bucket: bucket.to_string(),
            configuration: *configuration,
        })
    }

    async fn put_account_public_access_block(
        &self,
        account_id: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError> {
        self.write(Call::PutAccountPublicAccessBlock {
            account_id: account_id.to_string(),
            configuration: *configuration,
        })
    }
}

#[async_trait]
impl IdentityResolver for FakeAws {
    async fn caller_account_id(&self) -> Result<String, RemoteCallError> {
        self.record(Call::GetCallerIdentity);
        self.account_id.clone()
    }
}

pub fn owner() -> Owner {
    Owner {
        id: Some(OWNER_ID.to_string()),
        display_name: Some("ops".to_string()),
    }
}

pub fn owner_grant() -> Grant {
    Grant::new(Grantee::canonical_user(OWNER_ID), Permission::FullControl)
}

pub fn owner_only_acl() -> AccessControlSnapshot {
    acl_with(vec![owner_grant()])
}

pub fn acl_with(grants: Vec<Grant>) -> AccessControlSnapshot {
    AccessControlSnapshot {
        owner: Some(owner()),
        grants,
    }
}
