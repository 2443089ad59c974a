use s3_protector_core::classify::{
    classify, Classification, IgnoreReason, MalformedEvent, MutationEvent, ShortCircuitReason,
};
use s3_protector_core::contract::{
    AccessControlSnapshot, CannedAcl, ChangeEvent, PublicAccessBlockConfiguration,
};
use s3_protector_core::detect::{
    access_block_violation, bucket_acl_violation, log_delivery_grants, object_acl_is_private,
};
use tracing::{error, info, warn};

use crate::adapters::{BucketAclUpdate, IdentityResolver, RemoteCallError, StorageControlPlane};
use crate::config::BucketAclWriteTarget;

/// Terminal state reached by one change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    ShortCircuited,
    Compliant,
    Remediated,
    /// The corrective write was rejected or never reached the service.
    RemediationFailed,
    /// Current state could not be read, so nothing was attempted.
    InspectionFailed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::ShortCircuited => "short_circuited",
            Self::Compliant => "compliant",
            Self::Remediated => "remediated",
            Self::RemediationFailed => "remediation_failed",
            Self::InspectionFailed => "inspection_failed",
        }
    }
}

/// Classifies change events and reverts the ones that expose data.
pub struct Remediator<'a> {
    control_plane: &'a dyn StorageControlPlane,
    identity: &'a dyn IdentityResolver,
    bucket_acl_write_target: BucketAclWriteTarget,
}

impl<'a> Remediator<'a> {
    pub fn new(
        control_plane: &'a dyn StorageControlPlane,
        identity: &'a dyn IdentityResolver,
    ) -> Self {
        Self {
            control_plane,
            identity,
            bucket_acl_write_target: BucketAclWriteTarget::default(),
        }
    }

    pub fn with_bucket_acl_write_target(mut self, target: BucketAclWriteTarget) -> Self {
        self.bucket_acl_write_target = target;
        self
    }

    pub async fn process(&self, event: &ChangeEvent) -> Result<Outcome, MalformedEvent> {
        let mutation = match classify(event)? {
            Classification::Ignored(reason) => {
                log_ignored(&reason);
                return Ok(Outcome::Ignored);
            }
            Classification::ShortCircuited { kind, reason } => {
                log_event_banner(kind.as_str());
                log_short_circuit(&reason);
                return Ok(Outcome::ShortCircuited);
            }
            Classification::Dispatch(mutation) => mutation,
        };

        log_event_banner(mutation.kind().as_str());
        let outcome = match &mutation {
            MutationEvent::PutBucketAcl {
                bucket,
                requested_acl,
            } => {
                if let Some(acl) = requested_acl {
                    info!(bucket = %bucket, requested_acl = %acl, "ACL is currently {acl}");
                }
                self.remediate_bucket_acl(bucket).await
            }
            MutationEvent::PutObjectAcl { bucket, key, .. } => {
                self.remediate_object_acl(bucket, key).await
            }
            MutationEvent::PutBucketPublicAccessBlock {
                bucket,
                configuration,
            } => {
                self.remediate_bucket_access_block(bucket, configuration)
                    .await
            }
            MutationEvent::PutAccountPublicAccessBlock { configuration } => {
                self.remediate_account_access_block(configuration).await
            }
        };

        info!(
            event_name = mutation.kind().as_str(),
            outcome = outcome.as_str(),
            "Change event handled"
        );
        Ok(outcome)
    }

    async fn remediate_bucket_acl(&self, bucket: &str) -> Outcome {
        info!(bucket, "Describing the current ACL: s3://{bucket}");
        let snapshot = match self.control_plane.get_bucket_acl(bucket).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log_inspection_failure(&error);
                return Outcome::InspectionFailed;
            }
        };
        for grant in snapshot.grants.iter().filter(|grant| grant.grantee_uri().is_some()) {
            info!(bucket, ?grant, "Found grant");
        }

        if !bucket_acl_violation(&snapshot) {
            info!(bucket, "ACL is correctly already private");
            return Outcome::Compliant;
        }
        info!(bucket, "Violation found. Grant ACL greater than private");

        let Some(target) = self.bucket_acl_target(bucket, &snapshot) else {
            error!(
                bucket,
                "Bucket ACL has no owner id to address the write to. Manual followup recommended"
            );
            return Outcome::RemediationFailed;
        };

        let preserved = log_delivery_grants(&snapshot);
        let (update, success_message) = if preserved.is_empty() {
            info!(bucket, "Resetting ACL to private");
            (
                BucketAclUpdate::Canned(CannedAcl::Private),
                "Bucket ACL has been changed to private",
            )
        } else {
            info!(bucket, preserved = ?preserved, "Resetting ACL to LogDelivery");
            (
                BucketAclUpdate::Policy(AccessControlSnapshot {
                    owner: snapshot.owner.clone(),
                    grants: preserved,
                }),
                "Reverted to only contain LogDelivery",
            )
        };

        info!(bucket, "Attempting automatic resolution");
        match self.control_plane.put_bucket_acl(target, &update).await {
            Ok(()) => {
                info!(bucket, "{success_message}");
                Outcome::Remediated
            }
            Err(error) => {
                log_write_failure(&error);
                Outcome::RemediationFailed
            }
        }
    }

    fn bucket_acl_target<'s>(
        &self,
        bucket: &'s str,
        snapshot: &'s AccessControlSnapshot,
    ) -> Option<&'s str> {
        match self.bucket_acl_write_target {
            BucketAclWriteTarget::BucketName => Some(bucket),
            BucketAclWriteTarget::OwnerId => {
                let owner_id = snapshot.owner_id()?;
                warn!(
                    bucket,
                    owner_id, "Addressing PutBucketAcl to the owner id instead of the bucket name"
                );
                Some(owner_id)
            }
        }
    }

    async fn remediate_object_acl(&self, bucket: &str, key: &str) -> Outcome {
        info!(bucket, key, "Describing the ACL: s3://{bucket}/{key}");
        let snapshot = match self.control_plane.get_object_acl(bucket, key).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log_inspection_failure(&error);
                return Outcome::InspectionFailed;
            }
        };

        if object_acl_is_private(&snapshot) {
            info!(bucket, key, "Object ACL is already private");
            return Outcome::Compliant;
        }
        if snapshot.grants.len() > 1 {
            info!(bucket, key, grants = snapshot.grants.len(), "Greater than one grant");
        } else {
            info!(
                bucket,
                key,
                owner = ?snapshot.owner_id(),
                grantee = ?snapshot.grants.first().and_then(|grant| grant.grantee_id()),
                "Owner and grantee do not match"
            );
        }

        info!(bucket, key, "Making s3://{bucket}/{key} private");
        match self
            .control_plane
            .put_object_acl(bucket, key, CannedAcl::Private)
            .await
        {
            Ok(()) => Outcome::Remediated,
            Err(error) => {
                log_write_failure(&error);
                Outcome::RemediationFailed
            }
        }
    }

    async fn remediate_bucket_access_block(
        &self,
        bucket: &str,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Outcome {
        info!(bucket, ?configuration, "Public access block requested");
        if !access_block_violation(configuration) {
            return Outcome::Compliant;
        }

        info!(bucket, "s3://{bucket} now not private, fixing...");
        match self
            .control_plane
            .put_bucket_public_access_block(
                bucket,
                &PublicAccessBlockConfiguration::fully_blocked(),
            )
            .await
        {
            Ok(()) => {
                info!(bucket, "Bucket public access block restored");
                Outcome::Remediated
            }
            Err(error) => {
                log_write_failure(&error);
                Outcome::RemediationFailed
            }
        }
    }

    async fn remediate_account_access_block(
        &self,
        configuration: &PublicAccessBlockConfiguration,
    ) -> Outcome {
        info!(?configuration, "Account public access block requested");
        if !access_block_violation(configuration) {
            return Outcome::Compliant;
        }

        let account_id = match self.identity.caller_account_id().await {
            Ok(account_id) => account_id,
            Err(error) => {
                log_inspection_failure(&error);
                return Outcome::InspectionFailed;
            }
        };
        info!(account_id = %account_id, "Account now not private, fixing...");

        match self
            .control_plane
            .put_account_public_access_block(
                &account_id,
                &PublicAccessBlockConfiguration::fully_blocked(),
            )
            .await
        {
            Ok(()) => {
                info!(account_id = %account_id, "Account public access block restored");
                Outcome::Remediated
            }
            Err(error) => {
                log_write_failure(&error);
                Outcome::RemediationFailed
            }
        }
    }
}

fn log_event_banner(event_name: &str) {
    info!("======================================================================================");
    info!(event_name, "eventName: {event_name}");
}

fn log_ignored(reason: &IgnoreReason) {
    match reason {
        IgnoreReason::MissingDetail => info!("Event has no detail. Ignoring"),
        IgnoreReason::MissingEventName => info!("Event has no eventName. Ignoring"),
        IgnoreReason::UnrecognizedEventName(name) => {
            info!(event_name = %name, "Event is not tracked. Ignoring")
        }
    }
}

fn log_short_circuit(reason: &ShortCircuitReason) {
    match reason {
        ShortCircuitReason::AlreadyPrivate => info!("ACL is already private. Ending"),
        ShortCircuitReason::UpstreamCallFailed {
            error_code,
            error_message,
        } => info!(
            error_code = ?error_code,
            error_message = ?error_message,
            "Previous API call resulted in an error. Ending"
        ),
    }
}

fn log_inspection_failure(error: &RemoteCallError) {
    error!(
        operation = error.operation,
        status_code = ?error.status_code,
        code = ?error.code,
        "Error was: {{{error}}} Manual followup recommended"
    );
}

fn log_write_failure(error: &RemoteCallError) {
    if error.is_rejection() {
        error!(
            operation = error.operation,
            status_code = ?error.status_code,
            code = ?error.code,
            "{} failed. Manual followup",
            error.operation
        );
    } else {
        error!(
            operation = error.operation,
            %error,
            "Unable to resolve violation automatically"
        );
    }
}
