mod ai;
mod config;
mod constants;
mod digest;
mod error;
mod mail;
mod scheduler;

use anyhow::{Context, Result};
use std::env;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ai::OpenAiClient;
use crate::config::Config;
use crate::digest::{DigestContent, DigestPipeline};
use crate::mail::SmtpClient;
use crate::scheduler::Scheduler;

type Pipeline = DigestPipeline<OpenAiClient, SmtpClient>;

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jobdigest=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_usage() {
    eprintln!(
        r#"jobdigest - Daily AI-generated job listing digests by email

Usage: jobdigest [command]

Commands:
    (none), run         Start the scheduler and run forever
    once                Run every topic now, then exit
    preview [topic]     Print the HTML digest for a topic without sending it
    help                Show this help message

Environment:
    OPENAI_API_KEY, EMAIL_SENDER, EMAIL_PASSWORD,
    DATA_SCIENCE_RECIPIENT, CHEMISTRY_RECIPIENT (a .env file is read too)

Configuration file: ~/.config/jobdigest/config.toml (or $JOBDIGEST_CONFIG)
"#
    );
}

fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let completer = OpenAiClient::new(&config.ai)?;
    let mailer = SmtpClient::new(&config.smtp);
    Ok(DigestPipeline::new(
        completer,
        mailer,
        config.smtp.subject.clone(),
        config.topic_requests(),
    ))
}

async fn run_scheduler(config: &Config) -> Result<()> {
    let pipeline = Rc::new(build_pipeline(config)?);
    let poll_interval = Duration::from_secs(config.schedule.poll_interval_secs.max(1));

    let mut scheduler = Scheduler::new(poll_interval);
    scheduler
        .schedule_daily(
            "job digests",
            &config.schedule.time,
            &config.schedule.timezone,
            move || {
                let pipeline = pipeline.clone();
                async move { pipeline.run_all().await }
            },
        )
        .context("Invalid schedule configuration")?;

    tracing::info!(
        "Job digest scheduler started with {} topics",
        config.topics.len()
    );
    scheduler.run_forever().await
}

async fn run_preview(config: &Config, topic: Option<&str>) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let topic = match topic {
        Some(name) => pipeline
            .topics()
            .iter()
            .find(|t| t.name == name)
            .with_context(|| format!("Unknown topic: {}", name))?,
        None => pipeline.topics().first().context("No topics configured")?,
    };

    match pipeline.build_digest(&topic.prompt).await {
        DigestContent::Ready(digest) => {
            tracing::info!(
                "Preview of '{}' has {} listings",
                topic.name,
                digest.listing_count
            );
            println!("{}", digest.html);
            Ok(())
        }
        DigestContent::Unavailable { reason } => {
            anyhow::bail!("No digest for '{}': {}", topic.name, reason)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("once") => {
            setup_logging();
            let config = Config::load()?;
            build_pipeline(&config)?.run_all().await;
            Ok(())
        }
        Some("preview") => {
            setup_logging();
            let config = Config::load()?;
            run_preview(&config, args.get(2).map(|s| s.as_str())).await
        }
        Some("run") | None => {
            setup_logging();
            let config = Config::load()?;
            run_scheduler(&config).await
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
    }
}
