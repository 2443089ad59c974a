use async_trait::async_trait;
use s3_protector_core::contract::{AccessControlSnapshot, CannedAcl, PublicAccessBlockConfiguration};

use super::error::RemoteCallError;

/// Replacement ACL written to a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketAclUpdate {
    Canned(CannedAcl),
    /// Explicit grant list plus owner.
    Policy(AccessControlSnapshot),
}

/// The S3 and S3 Control operations the protector reads and writes through.
#[async_trait]
pub trait StorageControlPlane: Send + Sync {
    async fn get_bucket_acl(&self, bucket: &str) -> Result<AccessControlSnapshot, RemoteCallError>;

    async fn put_bucket_acl(
        &self,
        bucket: &str,
        update: &BucketAclUpdate,
    ) -> Result<(), RemoteCallError>;

    async fn get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<AccessControlSnapshot, RemoteCallError>;

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: CannedAcl,
    ) -> Result<(), RemoteCallError>;

    async fn put_bucket_public_access_block(
        &self,
        bucket: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError>;

    async fn put_account_public_access_block(
        &self,
        account_id: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError>;
}
