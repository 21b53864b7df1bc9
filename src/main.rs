use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pds_core::{PatientDemographics, PdsClient, PdsConfig, PdsError, ReqwestTransport};

/// One output line per requested NHS number.
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum LookupLine {
    Found {
        input: String,
        context: String,
        patient: PatientDemographics,
    },
    AccessDenied {
        nhs_number: String,
    },
    Failed {
        input: String,
        error: String,
    },
}

/// Batch enrichment runner.
///
/// Looks up every NHS number given on the command line concurrently and prints one JSON line
/// per result, in argument order.
///
/// # Environment Variables
/// - `PDS_ENVIRONMENT`: `sandbox` (default), `int` or `prod`
/// - `PDS_ACCESS_TOKEN`: bearer token, required for `int` and `prod`
/// - `PDS_TIMEOUT_SECS`: per-request timeout (default: 30)
///
/// # Errors
/// Returns an error if logging cannot be initialised, the configuration is invalid, or no NHS
/// numbers were supplied. Individual lookup failures are reported as output lines.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pds_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        anyhow::bail!("usage: pds-run <nhs-number>...");
    }

    let config = PdsConfig::from_env_values(
        std::env::var("PDS_ENVIRONMENT").ok(),
        std::env::var("PDS_ACCESS_TOKEN").ok(),
        std::env::var("PDS_TIMEOUT_SECS").ok(),
    )?;

    tracing::info!(
        "++ Starting PDS lookups against {} ({} requested)",
        config.environment(),
        inputs.len()
    );

    let client = Arc::new(PdsClient::with_config(config, ReqwestTransport::new()));

    let mut tasks = JoinSet::new();
    for (index, input) in inputs.into_iter().enumerate() {
        let client = Arc::clone(&client);
        tasks.spawn(async move {
            let result = client.lookup_patient(&input).await;
            (index, to_line(input, result))
        });
    }

    let mut lines = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        lines.push(joined?);
    }
    lines.sort_by_key(|(index, _)| *index);

    for (_, line) in lines {
        println!("{}", serde_json::to_string(&line)?);
    }

    Ok(())
}

fn to_line(input: String, result: Result<PatientDemographics, PdsError>) -> LookupLine {
    match result {
        Ok(patient) => LookupLine::Found {
            input,
            context: patient.context_summary(),
            patient,
        },
        Err(PdsError::Restricted(restricted)) => LookupLine::AccessDenied {
            nhs_number: restricted.nhs_number().to_string(),
        },
        Err(e) => LookupLine::Failed {
            input,
            error: e.to_string(),
        },
    }
}
