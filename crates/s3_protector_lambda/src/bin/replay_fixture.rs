//! Feeds a recorded change event through the handler from a workstation.
//!
//! `--dry-run` keeps the real reads but swaps every write for a log line.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use s3_protector_lambda::adapters::aws::{AwsIdentityResolver, AwsStorageControlPlane};
use s3_protector_lambda::adapters::dry_run::DryRunControlPlane;
use s3_protector_lambda::adapters::StorageControlPlane;
use s3_protector_lambda::config::ProtectorConfig;
use s3_protector_lambda::handlers::{handle_change_event, Remediator};
use s3_protector_lambda::telemetry::init_tracing;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

#[derive(Parser)]
#[command(name = "replay_fixture", about = "Replay a change event fixture")]
struct Args {
    /// Change event JSON file to replay
    #[arg(long, env = "PROTECTOR_FIXTURE", default_value = "fixtures/putBucketAcl.json")]
    fixture: PathBuf,
    /// Read current state but skip every corrective write
    #[arg(long)]
    dry_run: bool,
}

#[derive(Serialize)]
struct ReplayReport {
    fixture: String,
    dry_run: bool,
    handled: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ProtectorConfig::from_env()?;
    init_tracing(&config)?;

    let contents = std::fs::read_to_string(&args.fixture)
        .with_context(|| format!("failed to read fixture {}", args.fixture.display()))?;
    let payload: Value = serde_json::from_str(&contents)
        .with_context(|| format!("fixture {} is not valid JSON", args.fixture.display()))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let identity = AwsIdentityResolver::new(&aws_config);
    let (live, dry_run);
    let control_plane: &dyn StorageControlPlane = if args.dry_run {
        dry_run = DryRunControlPlane::new(AwsStorageControlPlane::new(&aws_config));
        &dry_run
    } else {
        live = AwsStorageControlPlane::new(&aws_config);
        &live
    };

    let remediator = Remediator::new(control_plane, &identity)
        .with_bucket_acl_write_target(config.bucket_acl_write_target);
    let span = tracing::info_span!(
        "replay",
        service = %config.service_name,
        dry_run = args.dry_run
    );
    let handled = handle_change_event(payload, &remediator)
        .instrument(span)
        .await
        .with_context(|| format!("fixture {} was rejected", args.fixture.display()))?;

    let report = ReplayReport {
        fixture: args.fixture.display().to_string(),
        dry_run: args.dry_run,
        handled,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
