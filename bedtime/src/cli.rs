//! Command-line arguments.

use bedtime_core::DEFAULT_MAX_REVISIONS;
use bedtime_llm::Provider;
use clap::{ArgAction, Parser};

/// Generate a bedtime story for ages 5–10.
///
/// The prompt is taken from the arguments, or read from standard input when
/// none is given. The story is printed to standard output; logs go to
/// standard error.
#[derive(Debug, Parser)]
#[command(name = "bedtime", version, about)]
pub struct Cli {
    /// What the story should be about
    pub prompt: Vec<String>,

    /// Model provider (openai or anthropic)
    #[arg(long, env = "BEDTIME_PROVIDER", default_value = "openai")]
    pub provider: Provider,

    /// Model name (defaults to the provider's default)
    #[arg(long, env = "BEDTIME_MODEL")]
    pub model: Option<String>,

    /// API base URL, for OpenAI-compatible servers
    #[arg(long, env = "BEDTIME_BASE_URL")]
    pub base_url: Option<String>,

    /// Maximum automatic revisions after the first draft
    #[arg(long, env = "BEDTIME_MAX_REVISIONS", default_value_t = DEFAULT_MAX_REVISIONS)]
    pub max_revisions: usize,

    /// Attempts per model call; transient failures are retried
    #[arg(long, env = "BEDTIME_RETRIES", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Use a default outline instead of failing on an unusable arc
    #[arg(long)]
    pub lenient_arc: bool,

    /// Apply this feedback instead of asking for it
    #[arg(long, conflicts_with = "no_feedback")]
    pub feedback: Option<String>,

    /// Do not ask for feedback
    #[arg(long)]
    pub no_feedback: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The prompt from the arguments, if one was given.
    pub fn prompt_text(&self) -> Option<String> {
        let prompt = self.prompt.join(" ");
        let prompt = prompt.trim();
        (!prompt.is_empty()).then(|| prompt.to_string())
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["bedtime"]).unwrap();
        assert!(cli.prompt_text().is_none());
        assert_eq!(cli.max_revisions, 3);
        assert_eq!(cli.retries, 1);
        assert!(!cli.lenient_arc);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_prompt_and_flags() {
        let cli = Cli::try_parse_from([
            "bedtime",
            "--provider",
            "claude",
            "--max-revisions",
            "1",
            "-vv",
            "a",
            "sleepy",
            "owl",
        ])
        .unwrap();
        assert_eq!(cli.provider, Provider::Anthropic);
        assert_eq!(cli.max_revisions, 1);
        assert_eq!(cli.prompt_text().as_deref(), Some("a sleepy owl"));
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_flags_after_prompt_words() {
        let cli = Cli::try_parse_from(["bedtime", "a", "bunny", "--no-feedback", "-v"]).unwrap();
        assert!(cli.no_feedback);
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.prompt_text().as_deref(), Some("a bunny"));

        let cli = Cli::try_parse_from(["bedtime", "an", "owl", "--feedback", "shorter", "story"])
            .unwrap();
        assert_eq!(cli.feedback.as_deref(), Some("shorter"));
        assert_eq!(cli.prompt_text().as_deref(), Some("an owl story"));
    }

    #[test]
    fn test_rejects_zero_retries_and_conflicting_feedback() {
        assert!(Cli::try_parse_from(["bedtime", "--retries", "0"]).is_err());
        let conflicting = ["bedtime", "--feedback", "shorter", "--no-feedback"];
        assert!(Cli::try_parse_from(conflicting).is_err());
    }
}
