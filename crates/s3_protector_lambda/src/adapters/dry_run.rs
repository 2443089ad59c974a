use async_trait::async_trait;
use s3_protector_core::contract::{AccessControlSnapshot, CannedAcl, PublicAccessBlockConfiguration};
use tracing::info;

use super::control_plane::{BucketAclUpdate, StorageControlPlane};
use super::error::RemoteCallError;

/// Forwards reads to `inner` and only logs writes.
#[derive(Debug, Clone)]
pub struct DryRunControlPlane<C> {
    inner: C,
}

impl<C> DryRunControlPlane<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: StorageControlPlane> StorageControlPlane for DryRunControlPlane<C> {
    async fn get_bucket_acl(&self, bucket: &str) -> Result<AccessControlSnapshot, RemoteCallError> {
        self.inner.get_bucket_acl(bucket).await
    }

    async fn put_bucket_acl(
        &self,
        bucket: &str,
        update: &BucketAclUpdate,
    ) -> Result<(), RemoteCallError> {
        info!(dry_run = true, bucket, ?update, "Skipping PutBucketAcl");
        Ok(())
    }

    async fn get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<AccessControlSnapshot, RemoteCallError> {
        self.inner.get_object_acl(bucket, key).await
    }

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: CannedAcl,
    ) -> Result<(), RemoteCallError> {
        info!(dry_run = true, bucket, key, %acl, "Skipping PutObjectAcl");
        Ok(())
    }

    async fn put_bucket_public_access_block(
        &self,
        bucket: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError> {
        info!(dry_run = true, bucket, ?configuration, "Skipping PutPublicAccessBlock");
        Ok(())
    }

    async fn put_account_public_access_block(
        &self,
        account_id: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError> {
        info!(
            dry_run = true,
            account_id,
            ?configuration,
            "Skipping PutAccountPublicAccessBlock"
        );
        Ok(())
    }
}
