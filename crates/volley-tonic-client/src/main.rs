use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use volley_tonic_client::config::{CliArgs, ClientConfig, Procedure};
use volley_tonic_client::{channel, invoker, procedures};

fn init_telemetry() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry();
    let config = ClientConfig::try_from(args)?;

    let channel = channel::connect(&config.channel)
        .await
        .with_context(|| format!("connecting to {}", config.channel.target_addr))?;

    // Smoke-check the channel with a single greeting before generating load,
    // bounded by the same per-call deadline the run will use.
    let greeting =
        procedures::greet_within(channel.clone(), &config.name, config.call_deadline).await?;
    tracing::info!(trust = %config.channel.trust, "connected: {greeting}");

    let plan = config.plan;
    let deadline = config.call_deadline;
    tracing::info!(
        workers = plan.worker_count,
        loops = plan.loops_per_worker,
        total = plan.total_calls(),
        ?deadline,
        "starting run"
    );

    let outcome = match config.procedure {
        Procedure::Greet => {
            let name = config.name.clone();
            invoker::run(channel, plan, deadline, config.policy, move |channel, _| {
                procedures::greet(channel, name.clone())
            })
            .await
        }
        Procedure::Delay => {
            let duration_ms = config.delay_ms;
            invoker::run(channel, plan, deadline, config.policy, move |channel, _| {
                procedures::delay(channel, duration_ms)
            })
            .await
        }
        Procedure::Ingest => {
            let payload = procedures::make_payload(plan.payload_size_bytes);
            invoker::run(channel, plan, deadline, config.policy, move |channel, _| {
                procedures::ingest(channel, payload.clone())
            })
            .await
        }
    };

    print!("{outcome}");

    if !outcome.is_success() {
        anyhow::bail!(
            "{} of {} workers reported failures",
            outcome.errors.len(),
            plan.worker_count
        );
    }
    Ok(())
}
