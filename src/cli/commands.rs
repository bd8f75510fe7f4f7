//! CLI command definitions for examforge.

use std::sync::Arc;

use clap::Parser;

use crate::config::AppConfig;
use crate::generator::AgentRuntimeClient;
use crate::memory::{AgentMemoryClient, RecencyTracker};
use crate::notify::{Notifier, WebhookNotifier};
use crate::pipeline::{GenerateRequest, PipelineResponse, QuestionPipeline};
use crate::quality::QualityValidator;

/// Quality-gated AWS certification exam question generator.
#[derive(Parser)]
#[command(name = "examforge")]
#[command(about = "Generate quality-gated AWS certification exam questions")]
#[command(version)]
#[command(
    long_about = "examforge generates AWS certification exam questions through a \
managed agent runtime, steers generation away from recently used topics, gates \
output on a deterministic quality rubric with a single regeneration budget, and \
posts results to a Teams webhook.\n\nExample usage:\n  examforge generate --exam AWS-SAP --count 1"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate one or more questions for an exam.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// List the topics recently used for an exam.
    RecentTopics(RecentTopicsArgs),
}

/// Arguments for `examforge generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Exam identifier, e.g. AWS-SAP.
    #[arg(short, long, env = "EXAMFORGE_EXAM_ID")]
    pub exam: String,

    /// Number of questions to generate (1-5).
    #[arg(short, long, default_value = "1")]
    pub count: u32,
}

/// Arguments for `examforge recent-topics`.
#[derive(Parser, Debug)]
pub struct RecentTopicsArgs {
    /// Exam identifier, e.g. AWS-SAP.
    #[arg(short, long, env = "EXAMFORGE_EXAM_ID")]
    pub exam: String,
}

/// Parses command-line arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the CLI with parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => run_generate(args).await,
        Commands::RecentTopics(args) => run_recent_topics(args).await,
    }
}

/// Wires the production collaborators and runs one pipeline invocation.
async fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    if !(1..=5).contains(&args.count) {
        let response = PipelineResponse::error(format!(
            "count must be between 1 and 5, got {}",
            args.count
        ));
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let config = AppConfig::from_env()?;

    let store = Arc::new(AgentMemoryClient::new(
        &config.memory_endpoint,
        &config.memory_store_id,
        crate::memory::client::DEFAULT_STORE_TIMEOUT,
    )?);
    let recency = RecencyTracker::new(
        store,
        &config.actor_id,
        config.recency_window,
        config.recency_max_events,
    );

    let generator = Arc::new(AgentRuntimeClient::new(
        &config.runtime_endpoint,
        config.runtime_api_key.clone(),
        config.generation_timeout,
    )?);

    let notifier: Option<Arc<dyn Notifier>> =
        if config.webhook_url.is_some() || config.webhook_token.is_some() {
            match WebhookNotifier::from_config(&config) {
                Ok(notifier) => Some(Arc::new(notifier)),
                Err(e) => {
                    // Partial webhook configuration is a caller-visible
                    // error, rendered in the same envelope as every other
                    // failure.
                    let response = PipelineResponse::error(e.to_string());
                    println!("{}", serde_json::to_string_pretty(&response)?);
                    return Ok(());
                }
            }
        } else {
            tracing::info!("No webhook configured, results will not be delivered");
            None
        };

    let pipeline = QuestionPipeline::new(generator, recency, QualityValidator::new(), notifier);

    let request = GenerateRequest::new(args.exam, args.count);
    let response = pipeline.run(&request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Prints the deduplicated recent topics and their frequencies.
async fn run_recent_topics(args: RecentTopicsArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let store = Arc::new(AgentMemoryClient::new(
        &config.memory_endpoint,
        &config.memory_store_id,
        crate::memory::client::DEFAULT_STORE_TIMEOUT,
    )?);
    let recency = RecencyTracker::new(
        store,
        &config.actor_id,
        config.recency_window,
        config.recency_max_events,
    );

    let context = recency.recent_topics(&args.exam).await;
    if context.is_empty() {
        println!("No topics recorded for {} in the current window", args.exam);
        return Ok(());
    }

    for (topic, count) in &context.frequency_counts {
        println!("{}: {}", topic, count);
    }
    Ok(())
}
