use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use setnode::{
    config::Config,
    engine::{
        executor::SetNodeExecutor, expression::DataLogicExpressionResolver,
        failure_policy::failure_policy,
    },
    item::Item,
    validation::Validator,
};
use std::{env, sync::Arc};
use tokio::io::AsyncReadExt;
use tracing_subscriber::prelude::*;

/// A job read from a file or stdin.
#[derive(Deserialize)]
struct Job {
    parameters: Value,
    #[serde(default)]
    items: Vec<Item>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let version = setnode::config::version()?;

    env::args().for_each(|arg| {
        if arg == "--version" {
            println!("{version}");
            std::process::exit(0);
        }
    });

    let config = Config::new()?;

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "setnode=info".into()),
    );

    // Output items go to stdout, so logs are written to stderr.
    let fmt_layer = if std::env::var("JSON_LOGS").is_ok() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!(version = %version, "Starting setnode");

    let job_file = env::args().nth(1);
    let job_text = match &job_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read job file {}", path))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("failed to read job from stdin")?;
            buffer
        }
    };

    let job: Job = serde_json::from_str(&job_text).context("job is not valid JSON")?;
    let parameters =
        Validator::validate_parameters_with_defaults(&job.parameters, config.default_options())?;

    tracing::info!(
        fields = parameters.fields.len(),
        items = job.items.len(),
        continue_on_fail = config.continue_on_fail(),
        "Running set node job"
    );

    let resolver = Arc::new(DataLogicExpressionResolver::from_items(&job.items));
    let executor = SetNodeExecutor::new(
        parameters,
        resolver,
        failure_policy(config.continue_on_fail()),
    );

    let output = executor.execute_items(&job.items).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    tracing::info!(items = output.len(), "Set node job complete");

    Ok(())
}
