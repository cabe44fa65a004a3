//! Minimal chat client for text generation.
//!
//! This crate provides a focused client for single-prompt completions with:
//! - OpenAI-compatible chat completions (`/chat/completions`)
//! - Anthropic's Messages API (`/messages`)
//! - An opt-in retry policy for transient failures

mod anthropic;
mod openai;
mod retry;

pub use retry::RetryPolicy;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_TOKENS: usize = 3000;

/// Errors that can occur when calling a model.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured, set {0}")]
    NoApiKey(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Giving up after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether a retry could plausibly succeed.
    ///
    /// Network failures, rate limiting and server-side errors count; auth
    /// failures, bad requests and unparseable bodies do not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Which vendor API the client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// OpenAI or any server exposing the same chat completions API.
    #[default]
    OpenAi,
    /// Anthropic Claude.
    Anthropic,
}

impl Provider {
    /// Environment variable holding the credential for this provider.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => openai::DEFAULT_MODEL,
            Provider::Anthropic => anthropic::DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => openai::API_BASE,
            Provider::Anthropic => anthropic::API_BASE,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            other => Err(Error::Config(format!(
                "unknown provider `{other}` (expected `openai` or `anthropic`)"
            ))),
        }
    }
}

/// A single-prompt completion request.
#[derive(Debug, Clone)]
pub struct Completion {
    pub prompt: String,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
}

impl Completion {
    /// Create a completion request for one user prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }
}

/// Text generation client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    provider: Provider,
    api_key: String,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl Client {
    /// Create a client for `provider` with the given API key.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::NoApiKey(provider.api_key_var()));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            provider,
            api_key: api_key.trim().to_string(),
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client reading the provider's API key from the environment.
    pub fn from_env(provider: Provider) -> Result<Self, Error> {
        let var = provider.api_key_var();
        let api_key = std::env::var(var).map_err(|_| Error::NoApiKey(var))?;
        Self::new(provider, api_key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different server speaking the same API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request and return the generated text.
    pub async fn complete(&self, completion: &Completion) -> Result<String, Error> {
        self.retry.run(|| self.send(completion)).await
    }

    async fn send(&self, completion: &Completion) -> Result<String, Error> {
        debug!(
            provider = %self.provider,
            model = %self.model,
            prompt_chars = completion.prompt.len(),
            "sending completion"
        );

        let request = match self.provider {
            Provider::OpenAi => self
                .http
                .post(openai::endpoint(&self.base_url))
                .bearer_auth(&self.api_key)
                .json(&openai::ApiRequest::new(&self.model, completion)),
            Provider::Anthropic => self
                .http
                .post(anthropic::endpoint(&self.base_url))
                .headers(anthropic::headers(&self.api_key)?)
                .json(&anthropic::ApiRequest::new(&self.model, completion)),
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let text = match self.provider {
            Provider::OpenAi => response
                .json::<openai::ApiResponse>()
                .await
                .map_err(|e| Error::Parse(e.to_string()))?
                .into_text(),
            Provider::Anthropic => response
                .json::<anthropic::ApiResponse>()
                .await
                .map_err(|e| Error::Parse(e.to_string()))?
                .into_text(),
        };

        match text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(Error::EmptyResponse),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
