use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types::{
    AccessControlPolicy, BucketCannedAcl, Grant as S3Grant, Grantee as S3Grantee,
    ObjectCannedAcl, Owner as S3Owner, Permission as S3Permission, Type as S3GranteeType,
};
use s3_protector_core::contract::{
    AccessControlSnapshot, CannedAcl, Grant, Grantee, GranteeType, Owner, Permission,
    PublicAccessBlockConfiguration,
};

use super::control_plane::{BucketAclUpdate, StorageControlPlane};
use super::error::RemoteCallError;
use super::identity::IdentityResolver;

/// S3 and S3 Control clients built from the ambient AWS configuration.
#[derive(Debug, Clone)]
pub struct AwsStorageControlPlane {
    s3_client: aws_sdk_s3::Client,
    s3control_client: aws_sdk_s3control::Client,
}

impl AwsStorageControlPlane {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            s3_client: aws_sdk_s3::Client::new(config),
            s3control_client: aws_sdk_s3control::Client::new(config),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AwsIdentityResolver {
    sts_client: aws_sdk_sts::Client,
}

impl AwsIdentityResolver {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            sts_client: aws_sdk_sts::Client::new(config),
        }
    }
}

#[async_trait]
impl StorageControlPlane for AwsStorageControlPlane {
    async fn get_bucket_acl(&self, bucket: &str) -> Result<AccessControlSnapshot, RemoteCallError> {
        let output = self
            .s3_client
            .get_bucket_acl()
            .bucket(bucket)
            .send()
            .await
            .map_err(|error| remote_error("GetBucketAcl", error))?;

        Ok(snapshot_from_s3(output.owner(), output.grants()))
    }

    async fn put_bucket_acl(
        &self,
        bucket: &str,
        update: &BucketAclUpdate,
    ) -> Result<(), RemoteCallError> {
        let request = self.s3_client.put_bucket_acl().bucket(bucket);
        let request = match update {
            BucketAclUpdate::Canned(acl) => request.acl(BucketCannedAcl::from(acl.as_str())),
            BucketAclUpdate::Policy(snapshot) => {
                request.access_control_policy(policy_to_s3(snapshot)?)
            }
        };

        request
            .send()
            .await
            .map(|_| ())
            .map_err(|error| remote_error("PutBucketAcl", error))
    }

    async fn get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<AccessControlSnapshot, RemoteCallError> {
        let output = self
            .s3_client
            .get_object_acl()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| remote_error("GetObjectAcl", error))?;

        Ok(snapshot_from_s3(output.owner(), output.grants()))
    }

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        acl: CannedAcl,
    ) -> Result<(), RemoteCallError> {
        self.s3_client
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| remote_error("PutObjectAcl", error))
    }

    async fn put_bucket_public_access_block(
        &self,
        bucket: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError> {
        let configuration = aws_sdk_s3::types::PublicAccessBlockConfiguration::builder()
            .set_block_public_acls(configuration.block_public_acls)
            .set_ignore_public_acls(configuration.ignore_public_acls)
            .set_block_public_policy(configuration.block_public_policy)
            .set_restrict_public_buckets(configuration.restrict_public_buckets)
            .build();

        self.s3_client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(configuration)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| remote_error("PutPublicAccessBlock", error))
    }

    async fn put_account_public_access_block(
        &self,
        account_id: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Result<(), RemoteCallError> {
        let configuration = aws_sdk_s3control::types::PublicAccessBlockConfiguration::builder()
            .set_block_public_acls(configuration.block_public_acls)
            .set_ignore_public_acls(configuration.ignore_public_acls)
            .set_block_public_policy(configuration.block_public_policy)
            .set_restrict_public_buckets(configuration.restrict_public_buckets)
            .build();

        self.s3control_client
            .put_public_access_block()
            .account_id(account_id)
            .public_access_block_configuration(configuration)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| remote_error("PutAccountPublicAccessBlock", error))
    }
}

#[async_trait]
impl IdentityResolver for AwsIdentityResolver {
    async fn caller_account_id(&self) -> Result<String, RemoteCallError> {
        let output = self
            .sts_client
            .get_caller_identity()
            .send()
            .await
            .map_err(|error| remote_error("GetCallerIdentity", error))?;

        output.account().map(str::to_string).ok_or_else(|| {
            RemoteCallError::new("GetCallerIdentity", "response did not include an account id")
        })
    }
}

fn remote_error<E>(operation: &'static str, error: SdkError<E>) -> RemoteCallError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status_code = error.raw_response().map(|response| response.status().as_u16());
    let code = error.code().map(str::to_string);
    let mut remote = RemoteCallError::new(operation, DisplayErrorContext(&error).to_string());
    if let Some(status_code) = status_code {
        remote = remote.with_status(status_code);
    }
    if let Some(code) = code {
        remote = remote.with_code(code);
    }
    remote
}

fn snapshot_from_s3(owner: Option<&S3Owner>, grants: &[S3Grant]) -> AccessControlSnapshot {
    AccessControlSnapshot {
        owner: owner.map(|owner| Owner {
            id: owner.id().map(str::to_string),
            display_name: owner.display_name().map(str::to_string),
        }),
        grants: grants
            .iter()
            .map(|grant| Grant {
                grantee: grant.grantee().map(|grantee| Grantee {
                    grantee_type: GranteeType::from_name(grantee.r#type().as_str()),
                    id: grantee.id().map(str::to_string),
                    display_name: grantee.display_name().map(str::to_string),
                    uri: grantee.uri().map(str::to_string),
                    email_address: grantee.email_address().map(str::to_string),
                }),
                permission: grant
                    .permission()
                    .and_then(|permission| Permission::from_name(permission.as_str())),
            })
            .collect(),
    }
}

fn policy_to_s3(snapshot: &AccessControlSnapshot) -> Result<AccessControlPolicy, RemoteCallError> {
    let mut grants = Vec::with_capacity(snapshot.grants.len());
    for grant in &snapshot.grants {
        let grantee = grant
            .grantee
            .as_ref()
            .map(grantee_to_s3)
            .transpose()?;
        grants.push(
            S3Grant::builder()
                .set_grantee(grantee)
                .set_permission(
                    grant
                        .permission
                        .map(|permission| S3Permission::from(permission.as_str())),
                )
                .build(),
        );
    }

    let owner = snapshot.owner.as_ref().map(|owner| {
        S3Owner::builder()
            .set_id(owner.id.clone())
            .set_display_name(owner.display_name.clone())
            .build()
    });

    Ok(AccessControlPolicy::builder()
        .set_grants(Some(grants))
        .set_owner(owner)
        .build())
}

fn grantee_to_s3(grantee: &Grantee) -> Result<S3Grantee, RemoteCallError> {
    let grantee_type = grantee
        .grantee_type
        .as_ref()
        .map(GranteeType::as_str)
        .or_else(|| grantee.uri.as_ref().map(|_| GranteeType::Group.as_str()))
        .unwrap_or(GranteeType::CanonicalUser.as_str());

    S3Grantee::builder()
        .r#type(S3GranteeType::from(grantee_type))
        .set_id(grantee.id.clone())
        .set_display_name(grantee.display_name.clone())
        .set_uri(grantee.uri.clone())
        .set_email_address(grantee.email_address.clone())
        .build()
        .map_err(|error| RemoteCallError::new("PutBucketAcl", error.to_string()))
}

#[cfg(test)]
mod tests {
    use s3_protector_core::contract::{ALL_USERS_GROUP_URI, LOG_DELIVERY_GROUP_URI};

    use super::*;

    #[test]
    fn converts_s3_grants_into_snapshot() {
        let owner = S3Owner::builder().id("owner-1").display_name("ops").build();
        let grantee = S3Grantee::builder()
            .r#type(S3GranteeType::Group)
            .uri(ALL_USERS_GROUP_URI)
            .build()
            .expect("grantee should build");
        let grants = vec![S3Grant::builder()
            .grantee(grantee)
            .permission(S3Permission::Read)
            .build()];

        let snapshot = snapshot_from_s3(Some(&owner), &grants);

        assert_eq!(snapshot.owner_id(), Some("owner-1"));
        assert_eq!(snapshot.grants.len(), 1);
        assert_eq!(snapshot.grants[0].grantee_uri(), Some(ALL_USERS_GROUP_URI));
        assert_eq!(snapshot.grants[0].permission, Some(Permission::Read));
        assert_eq!(
            snapshot.grants[0]
                .grantee
                .as_ref()
                .and_then(|grantee| grantee.grantee_type.clone()),
            Some(GranteeType::Group)
        );
    }

    #[test]
    fn policy_keeps_log_delivery_grants_and_owner() {
        let snapshot = AccessControlSnapshot {
            owner: Some(Owner {
                id: Some("owner-1".to_string()),
                display_name: None,
            }),
            grants: vec![Grant::new(
                Grantee::group(LOG_DELIVERY_GROUP_URI),
                Permission::Write,
            )],
        };

        let policy = policy_to_s3(&snapshot).expect("policy should convert");

        assert_eq!(
            policy.owner().and_then(|owner| owner.id()),
            Some("owner-1")
        );
        let grants = policy.grants();
        assert_eq!(grants.len(), 1);
        let grantee = grants[0].grantee().expect("grantee should be set");
        assert_eq!(grantee.r#type(), &S3GranteeType::Group);
        assert_eq!(grantee.uri(), Some(LOG_DELIVERY_GROUP_URI));
        assert_eq!(grants[0].permission(), Some(&S3Permission::Write));
    }

    #[test]
    fn untyped_uri_grantee_is_sent_as_group() {
        let grantee = Grantee {
            uri: Some(LOG_DELIVERY_GROUP_URI.to_string()),
            ..Grantee::default()
        };
        let converted = grantee_to_s3(&grantee).expect("grantee should convert");
        assert_eq!(converted.r#type(), &S3GranteeType::Group);
    }
}
