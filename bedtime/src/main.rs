//! Bedtime story generator.
//!
//! ```bash
//! cargo run -p bedtime -- "A story about a bunny and a kitten"
//! ```
//!
//! Reads OPENAI_API_KEY (or ANTHROPIC_API_KEY with `--provider anthropic`)
//! from the environment or a `.env` file.

mod cli;

use bedtime_core::{PipelineConfig, Resolution, StoryPipeline, StoryRequest};
use bedtime_llm::{Client, RetryPolicy};
use clap::Parser;
use cli::Cli;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = Client::from_env(cli.provider)?
        .with_retry(RetryPolicy::new(cli.retries, RETRY_BASE_DELAY));
    if let Some(model) = &cli.model {
        client = client.with_model(model);
    }
    if let Some(base_url) = &cli.base_url {
        client = client.with_base_url(base_url);
    }
    info!(provider = %client.provider(), model = client.model(), "using model");

    let config = PipelineConfig::default()
        .with_max_revisions(cli.max_revisions)
        .with_strict_arc(!cli.lenient_arc);
    let pipeline = StoryPipeline::new(client, config);

    let prompt = match cli.prompt_text() {
        Some(prompt) => prompt,
        None => ask("What kind of story do you want to hear? ")?,
    };
    let request = StoryRequest::or_default(&prompt);

    let outcome = pipeline.run(request).await?;
    if outcome.resolution == Resolution::Exhausted {
        info!("story did not pass the judge; showing the last revision");
    }
    println!("{}", outcome.draft);

    let feedback = if cli.no_feedback {
        None
    } else if let Some(feedback) = cli.feedback.clone() {
        Some(feedback)
    } else {
        println!();
        Some(ask(
            "Want changes? (shorter/funnier/more magical/different ending) Press Enter to keep: ",
        )?)
    };

    let finished = pipeline.finish(outcome, feedback.as_deref()).await?;
    if let Some(revised) = &finished.revised {
        println!("\nREVISED STORY:\n");
        println!("{revised}");
    }

    Ok(())
}

/// Prompt on stderr and read one line from stdin. EOF reads as empty.
fn ask(question: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{question}")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
