//! Quasar CLI - Command-line interface for a remote compute workspace

mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;
use tabled::Table;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quasar_core::domain::APP_ID_ENV_VAR;
use quasar_sdk::{
    cancellation_channel, connect, CancellationToken, ClientConfig, ClientError, JobClient,
    JobDetails, JobFilter, JobStatus, PayloadLocation, ENV_ACCESS_TOKEN, ENV_ENDPOINT,
    ENV_LOCATION, ENV_RESOURCE_GROUP, ENV_SUBSCRIPTION_ID, ENV_WORKSPACE_NAME,
};

use output::{JobRow, QuotaRow, TargetRow};

const DEFAULT_APP_ID: &str = "quasar-cli";
const LOG_FORMAT_ENV_VAR: &str = "QUASAR_LOG_FORMAT";

#[derive(Parser)]
#[command(name = "quasar")]
#[command(about = "Quasar workspace job client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = ENV_SUBSCRIPTION_ID, global = true)]
    subscription_id: Option<String>,

    #[arg(long, env = ENV_RESOURCE_GROUP, global = true)]
    resource_group: Option<String>,

    /// Workspace name
    #[arg(long, env = ENV_WORKSPACE_NAME, global = true)]
    workspace: Option<String>,

    /// Workspace region, used to derive the endpoint
    #[arg(long, env = ENV_LOCATION, global = true)]
    location: Option<String>,

    /// Explicit service endpoint
    #[arg(long, env = ENV_ENDPOINT, global = true)]
    endpoint: Option<String>,

    /// Pre-acquired bearer token
    #[arg(long, env = ENV_ACCESS_TOKEN, hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// Application id reported in the User-Agent (max 24 characters)
    #[arg(long, default_value = DEFAULT_APP_ID, global = true)]
    app_id: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job whose payload is already uploaded
    Submit {
        /// Target (e.g., microsoft.paralleltempering.cpu)
        #[arg(short, long)]
        target: String,

        /// Provider id (e.g., Microsoft)
        #[arg(short, long)]
        provider: String,

        #[arg(long)]
        input_format: String,

        #[arg(long)]
        output_format: String,

        /// Storage container holding the payload
        #[arg(long)]
        container_uri: String,

        /// Payload blob
        #[arg(long)]
        input_uri: String,

        /// Job id (default: random UUID)
        #[arg(long)]
        job_id: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        /// Input parameter as key=value, value parsed as JSON when possible
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, serde_json::Value)>,

        /// Wait for the job to finish
        #[arg(short, long)]
        wait: bool,

        /// Wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show a job
    Get {
        job_id: String,

        /// Print the raw job details as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cancel a job
    Cancel { job_id: String },

    /// Wait until a job reaches a terminal status (Ctrl-C stops waiting)
    Wait {
        job_id: String,

        /// Timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List jobs
    Jobs {
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        target: Option<String>,

        #[arg(long)]
        provider: Option<String>,

        /// Only jobs whose name contains this fragment
        #[arg(long)]
        name: Option<String>,

        /// Maximum number of jobs to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Show workspace quotas
    Quotas,

    /// Show provider and target availability
    Providers,
}

fn parse_param(raw: &str) -> std::result::Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", raw));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn init_tracing() -> Result<()> {
    let log_format = std::env::var(LOG_FORMAT_ENV_VAR).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("quasar=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
    Ok(())
}

impl Cli {
    fn client_config(&self) -> quasar_sdk::Result<ClientConfig> {
        let config = ClientConfig::from_lookup(|key| match key {
            ENV_SUBSCRIPTION_ID => self.subscription_id.clone(),
            ENV_RESOURCE_GROUP => self.resource_group.clone(),
            ENV_WORKSPACE_NAME => self.workspace.clone(),
            ENV_LOCATION => self.location.clone(),
            ENV_ENDPOINT => self.endpoint.clone(),
            ENV_ACCESS_TOKEN => self.access_token.clone(),
            APP_ID_ENV_VAR => std::env::var(APP_ID_ENV_VAR).ok(),
            _ => None,
        })?;
        Ok(config.with_app_id(self.app_id.clone()))
    }
}

fn wait_timeout(secs: Option<u64>) -> Option<Duration> {
    secs.map(Duration::from_secs)
}

/// Token fired by the first Ctrl-C
fn ctrl_c_token() -> CancellationToken {
    let (source, token) = cancellation_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl-C received, stopping wait");
            source.cancel();
        }
    });
    token
}

fn styled_status(status: &JobStatus) -> String {
    match status {
        JobStatus::Succeeded => status.to_string().green().bold().to_string(),
        JobStatus::Failed => status.to_string().red().bold().to_string(),
        JobStatus::Cancelled => status.to_string().yellow().bold().to_string(),
        _ => status.to_string().cyan().to_string(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config()?;
    let client: JobClient = connect(config)?;
    info!(diagnostic_id = %client.diagnostic_id(), workspace = %client.workspace(), "Client ready");

    match cli.command {
        Commands::Submit {
            target,
            provider,
            input_format,
            output_format,
            container_uri,
            input_uri,
            job_id,
            name,
            params,
            wait,
            timeout,
        } => {
            let mut details = JobDetails::new(target, provider, input_format, output_format);
            if let Some(name) = name {
                details = details.with_name(name);
            }
            for (key, value) in params {
                details = details.with_input_param(key, value);
            }
            let job_id = job_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            let mut job = client
                .submit(PayloadLocation::new(container_uri, input_uri), job_id, details)
                .await
                .context("Failed to submit job")?;

            println!("{}", "✓ Job submitted successfully".green().bold());
            println!();
            println!("{}", Table::new(vec![JobRow::from(job.details())]));

            if wait {
                let status = job
                    .wait_until_terminal(wait_timeout(timeout), &ctrl_c_token())
                    .await?;
                println!();
                println!("  {} {}", "Final status:".bold(), styled_status(&status));
            }
        }

        Commands::Get { job_id, json } => {
            let job = client.get(job_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(job.details())?);
            } else {
                println!("{}", Table::new(vec![JobRow::from(job.details())]));
                if let Some(error) = &job.details().error_data {
                    println!();
                    println!("  {} {}: {}", "Error:".red().bold(), error.code, error.message);
                }
                if let Some(output) = &job.details().output_data_uri {
                    println!("  {} {}", "Output:".bold(), output);
                }
            }
        }

        Commands::Cancel { job_id } => {
            let mut job = client.get(job_id).await?;
            match client.cancel(&mut job).await {
                Ok(()) => println!(
                    "{} ({})",
                    format!("✓ Job {} cancelled", job.id()).green().bold(),
                    styled_status(job.status())
                ),
                Err(e) if e.is_conflict() => {
                    println!(
                        "{}",
                        format!("⚠ Job {} already finished: {}", job.id(), e).yellow()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Wait { job_id, timeout } => {
            let mut job = client.get(job_id).await?;
            println!(
                "{}",
                format!("Waiting for job {} (Ctrl-C to stop)...", job.id()).cyan().bold()
            );
            match job
                .wait_until_terminal(wait_timeout(timeout), &ctrl_c_token())
                .await
            {
                Ok(status) => {
                    println!("  {} {}", "Final status:".bold(), styled_status(&status));
                }
                Err(e @ (ClientError::Timeout(_) | ClientError::OperationCancelled)) => {
                    println!(
                        "  {} {} (last known: {})",
                        "⚠".yellow(),
                        e,
                        styled_status(job.status())
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Jobs {
            status,
            target,
            provider,
            name,
            limit,
        } => {
            let mut filter = JobFilter::default();
            if let Some(status) = status {
                filter = filter.with_status(JobStatus::from(status));
            }
            if let Some(target) = target {
                filter = filter.with_target(target);
            }
            if let Some(provider) = provider {
                filter = filter.with_provider(provider);
            }
            if let Some(name) = name {
                filter = filter.with_name_containing(name);
            }

            let mut lister = client.list_jobs(filter);
            let jobs = lister.take(limit).await?;
            debug!(pages = lister.pages_fetched(), count = jobs.len(), "Jobs listed");

            if jobs.is_empty() {
                println!("{}", "No jobs found".yellow());
            } else {
                let rows: Vec<JobRow> = jobs.iter().map(|job| JobRow::from(job.details())).collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Quotas => {
            let quotas = client.list_quotas().try_collect_all().await?;
            if quotas.is_empty() {
                println!("{}", "No quotas reported".yellow());
            } else {
                println!("{}", Table::new(quotas.iter().map(QuotaRow::from)));
            }
        }

        Commands::Providers => {
            let providers = client.list_provider_status().try_collect_all().await?;
            for provider in &providers {
                println!(
                    "{} {}",
                    provider.id.cyan().bold(),
                    format!("({})", provider.current_availability).dimmed()
                );
                if !provider.targets.is_empty() {
                    println!("{}", Table::new(provider.targets.iter().map(TargetRow::from)));
                }
                println!();
            }
            if providers.is_empty() {
                println!("{}", "No providers reported".yellow());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    match run(Cli::parse()).await {
        Err(e) => match e.downcast_ref::<ClientError>() {
            Some(client_error) if client_error.is_not_configured() => {
                println!(
                    "{} {}",
                    "Inconclusive:".yellow().bold(),
                    client_error.to_string().yellow()
                );
                Ok(())
            }
            _ => Err(e),
        },
        ok => ok,
    }
}
