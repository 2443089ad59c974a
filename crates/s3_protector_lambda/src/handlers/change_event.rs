use s3_protector_core::classify::MalformedEvent;
use s3_protector_core::contract::ChangeEvent;
use serde_json::Value;

use super::remediation::Remediator;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid change event payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error(transparent)]
    Malformed(#[from] MalformedEvent),
}

/// Lambda entry point.
///
/// Returns `Ok(true)` for every handled path, including ignored events and
/// remediation failures that were logged. Only payloads that do not look like
/// a change event at all, or recognized events missing required parameters,
/// surface as errors.
pub async fn handle_change_event(
    payload: Value,
    remediator: &Remediator<'_>,
) -> Result<bool, HandlerError> {
    let event: ChangeEvent = serde_json::from_value(payload)?;
    remediator.process(&event).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use s3_protector_core::contract::{
        CannedAcl, Grant, Grantee, Permission, ALL_USERS_GROUP_URI,
    };
    use serde_json::json;

    use super::*;
    use crate::adapters::{BucketAclUpdate, RemoteCallError};
    use crate::test_support::{acl_with, owner_grant, Call, FakeAws, ACCOUNT_ID};

    fn fixture(contents: &str) -> Value {
        serde_json::from_str(contents).expect("fixture should be valid JSON")
    }

    #[tokio::test]
    async fn bucket_acl_fixture_resets_public_bucket() {
        let aws = FakeAws::new().with_bucket_acl(acl_with(vec![
            owner_grant(),
            Grant::new(Grantee::group(ALL_USERS_GROUP_URI), Permission::Read),
        ]));
        let payload = fixture(include_str!("../../fixtures/putBucketAcl.json"));

        let handled = handle_change_event(payload, &Remediator::new(&aws, &aws))
            .await
            .expect("fixture should be handled");

        assert!(handled);
        assert_eq!(
            aws.writes(),
            vec![Call::PutBucketAcl {
                bucket: "p6-reports".to_string(),
                update: BucketAclUpdate::Canned(CannedAcl::Private),
            }]
        );
    }

    #[tokio::test]
    async fn object_acl_fixture_checks_the_named_object() {
        let aws = FakeAws::new();
        let payload = fixture(include_str!("../../fixtures/putObjectAcl.json"));

        let handled = handle_change_event(payload, &Remediator::new(&aws, &aws))
            .await
            .expect("fixture should be handled");

        assert!(handled);
        assert_eq!(
            aws.calls(),
            vec![Call::GetObjectAcl {
                bucket: "p6-reports".to_string(),
                key: "exports/2026-10-12.csv".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn access_block_fixtures_restore_every_flag() {
        let aws = FakeAws::new();
        let remediator = Remediator::new(&aws, &aws);

        for contents in [
            include_str!("../../fixtures/putBucketPublicAccessBlock.json"),
            include_str!("../../fixtures/putAccountPublicAccessBlock.json"),
        ] {
            let handled = handle_change_event(fixture(contents), &remediator)
                .await
                .expect("fixture should be handled");
            assert!(handled);
        }

        let writes = aws.writes();
        assert_eq!(writes.len(), 2);
        assert!(matches!(
            &writes[0],
            Call::PutBucketPublicAccessBlock { bucket, configuration }
                if bucket == "p6-reports" && configuration.is_fully_blocked()
        ));
        assert!(matches!(
            &writes[1],
            Call::PutAccountPublicAccessBlock { account_id, configuration }
                if account_id == ACCOUNT_ID && configuration.is_fully_blocked()
        ));
    }

    #[tokio::test]
    async fn ignored_and_failed_paths_still_report_success() {
        let aws = FakeAws::new().failing_reads(RemoteCallError::new("GetBucketAcl", "timeout"));
        let remediator = Remediator::new(&aws, &aws);

        for payload in [
            json!({}),
            json!({"detail": {}}),
            json!({"detail": {"eventName": "DeleteBucket"}}),
            json!({"detail": {"eventName": "PutBucketAcl", "requestParameters": {"bucketName": "reports"}}}),
        ] {
            let handled = handle_change_event(payload, &remediator)
                .await
                .expect("payload should be handled");
            assert!(handled);
        }

        assert!(aws.writes().is_empty());
    }

    #[tokio::test]
    async fn non_object_payload_is_an_error() {
        let aws = FakeAws::new();
        let error = handle_change_event(json!("PutBucketAcl"), &Remediator::new(&aws, &aws))
            .await
            .expect_err("string payload should fail");

        assert!(matches!(error, HandlerError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn malformed_recognized_event_is_an_error() {
        let aws = FakeAws::new();
        let error = handle_change_event(
            json!({"detail": {"eventName": "PutBucketPublicAccessBlock", "requestParameters": {"bucketName": "reports"}}}),
            &Remediator::new(&aws, &aws),
        )
        .await
        .expect_err("missing configuration should fail");

        assert_eq!(
            error.to_string(),
            "PutBucketPublicAccessBlock event has no requestParameters.PublicAccessBlockConfiguration"
        );
        assert!(aws.calls().is_empty());
    }
}
