//! Simple SDK Example
//!
//! Demonstrates the job lifecycle against a live workspace.
//!
//! # Usage
//!
//! 1. Export the workspace settings:
//!    ```bash
//!    export QUASAR_SUBSCRIPTION_ID=... QUASAR_RESOURCE_GROUP=... \
//!           QUASAR_WORKSPACE_NAME=... QUASAR_LOCATION=westus \
//!           QUASAR_ACCESS_TOKEN=...
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple -- <container-uri> <input-data-uri>
//!    ```

use quasar_sdk::{
    cancellation_channel, connect, ClientConfig, JobDetails, JobFilter, PayloadLocation,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Quasar SDK - Simple Example");
    println!("===========================\n");

    let config = match ClientConfig::from_env() {
        Ok(config) => config.with_app_id("simple-example"),
        Err(e) if e.is_not_configured() => {
            println!("Inconclusive: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut args = std::env::args().skip(1);
    let (container_uri, input_data_uri) = match (args.next(), args.next()) {
        (Some(c), Some(i)) => (c, i),
        _ => anyhow::bail!("usage: simple <container-uri> <input-data-uri>"),
    };

    // 1. Connect
    println!("1. Connecting to {}...", config.workspace);
    let client = connect(config)?;
    println!("   ✓ Diagnostic id: '{}'\n", client.diagnostic_id());

    // 2. Submit a job
    println!("2. Submitting a job...");
    let details = JobDetails::new(
        "microsoft.paralleltempering-parameterfree.cpu",
        "Microsoft",
        "microsoft.qio.v2",
        "microsoft.qio-results.v2",
    )
    .with_name("simple-example")
    .with_input_param("timeout", 100);
    let job_id = format!("simple-{}", std::process::id());
    let mut job = client
        .submit(
            PayloadLocation::new(container_uri, input_data_uri),
            job_id,
            details,
        )
        .await?;
    println!("   ✓ Job {} is {}\n", job.id(), job.status());

    // 3. Wait, Ctrl-C stops waiting but leaves the job running
    println!("3. Waiting for completion (Ctrl-C to stop waiting)...");
    let (source, token) = cancellation_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            source.cancel();
        }
    });
    match job
        .wait_until_terminal(Some(Duration::from_secs(600)), &token)
        .await
    {
        Ok(status) => println!("   ✓ Finished: {}\n", status),
        Err(e) => println!("   ⚠ Stopped waiting: {}\n", e),
    }

    // 4. Cancel if still running
    if !job.is_terminal() {
        println!("4. Cancelling job...");
        match job.cancel().await {
            Ok(()) => println!("   ✓ Job cancelled"),
            Err(e) if e.is_conflict() => println!("   ⚠ Job was already finished"),
            Err(e) => return Err(e.into()),
        }
    }

    // 5. List a few recent jobs
    println!("\n5. Recent jobs:");
    for job in client.list_jobs(JobFilter::default()).take(5).await? {
        println!("     - {} {}", job.id(), job.status());
    }

    println!("\n✓ Example completed successfully!");
    Ok(())
}
