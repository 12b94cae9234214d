//! Runs one voice verification from the terminal.
//!
//! The callee's entered digits are read from stdin, one attempt per line.
//! An optional first argument names the run; reusing the name of an
//! unfinished run resumes it when the checkpoint backend is durable.

use anyhow::Context;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use vv_core::domain::entities::RunStatus;
use vv_core::domain::value_objects::InstanceId;
use vv_infra::telemetry::init_tracing;
use vv_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging())?;

    info!(environment = %config.environment, "Starting voice verification");

    let runtime = vv_infra::initialize(config).await?;

    let requested = std::env::args().nth(1).map(InstanceId::from);
    let resumed = runtime.host.resume_pending().await?;
    let instance_id = match requested {
        Some(id) if resumed.contains(&id) => id,
        requested => runtime.host.start_run(requested)?,
    };
    println!("Verification run {} started, enter the code you hear:", instance_id);

    let verifier = runtime.verifier.clone();
    let reader_id = instance_id.clone();
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match verifier.submit_response(&reader_id, &line).await {
                Ok(true) => println!("Code accepted"),
                Ok(false) => println!("Code rejected, try again"),
                Err(e) => {
                    warn!(error = %e, "Response not delivered");
                    break;
                }
            }
        }
    });

    let status = runtime.host.wait_for_completion(&instance_id).await?;
    reader.abort();

    match status {
        RunStatus::Completed { authorized: true } => {
            println!("Verification succeeded");
            Ok(ExitCode::SUCCESS)
        }
        RunStatus::Completed { authorized: false } => {
            println!("Verification failed: no matching code before attempts ran out");
            Ok(ExitCode::from(1))
        }
        other => {
            println!("Verification did not complete: {:?}", other);
            Ok(ExitCode::from(2))
        }
    }
}
