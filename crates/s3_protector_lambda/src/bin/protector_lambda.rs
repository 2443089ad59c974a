use lambda_runtime::{service_fn, Error, LambdaEvent};
use s3_protector_lambda::adapters::aws::{AwsIdentityResolver, AwsStorageControlPlane};
use s3_protector_lambda::config::ProtectorConfig;
use s3_protector_lambda::handlers::{handle_change_event, Remediator};
use s3_protector_lambda::telemetry::init_tracing;
use serde_json::Value;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = ProtectorConfig::from_env()?;
    init_tracing(&config)?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let control_plane = AwsStorageControlPlane::new(&aws_config);
    let identity = AwsIdentityResolver::new(&aws_config);
    let remediator = Remediator::new(&control_plane, &identity)
        .with_bucket_acl_write_target(config.bucket_acl_write_target);
    let remediator = &remediator;

    let span = tracing::info_span!("protector", service = %config.service_name);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_change_event(event.payload, remediator)
            .await
            .map_err(Error::from)
    }))
    .instrument(span)
    .await
}
