use std::time::Duration;

use crate::error::{AgentError, Result};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL_CHAIN: &[&str] = &[
    "openai/gpt-4.1-mini",
    "openai/gpt-4o-mini",
    "anthropic/claude-3.5-haiku",
];

/// Pricing constants for the stopover programme.
///
/// All amounts are whole currency units; `avios_conversion_rate` converts the
/// cash total into Avios exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Fallback nightly rate, used only before a hotel is chosen; a selected
    /// hotel is billed at its own catalog rate.
    pub rate_per_night: i64,
    pub flight_fare_difference: i64,
    pub transfer_price: i64,
    pub avios_conversion_rate: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rate_per_night: 150,
            flight_fare_difference: 115,
            transfer_price: 60,
            avios_conversion_rate: 125,
        }
    }
}

/// Explicit configuration handed to the orchestrator at construction.
///
/// Nothing reads ambient process state at call time; tests build one of these
/// directly.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub base_url: String,
    /// Primary model first, fallbacks in order. Total attempts per turn are
    /// bounded by this chain's length.
    pub model_chain: Vec<String>,
    pub request_timeout: Duration,
    pub max_tokens: Option<u32>,
    /// Upper bound on model round-trips within a single chat turn.
    pub max_turn_iterations: usize,
    /// Messages retained per conversation, oldest evicted first.
    pub message_retention: usize,
    /// Conversations idle longer than this are garbage collected.
    pub session_ttl: Duration,
    pub pricing: PricingConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_chain: DEFAULT_MODEL_CHAIN.iter().map(|m| m.to_string()).collect(),
            request_timeout: Duration::from_secs(60),
            max_tokens: Some(1000),
            max_turn_iterations: 8,
            message_retention: 50,
            session_ttl: Duration::from_secs(24 * 60 * 60),
            pricing: PricingConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model_chain(mut self, chain: Vec<String>) -> Self {
        self.model_chain = chain;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    /// Build from the environment. Call `dotenvy::dotenv()` first in the
    /// binary if a `.env` file should be honored.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AgentError::Config(
                "OPENAI_API_KEY environment variable must be set before starting the orchestrator"
                    .to_string(),
            )
        })?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) =
            std::env::var("OPENAI_BASE_URL").or_else(|_| std::env::var("OPENROUTER_BASE_URL"))
        {
            config.base_url = base_url;
        }

        if let Ok(chain) = std::env::var("STOPOVER_MODEL_CHAIN") {
            let models: Vec<String> = chain
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if models.is_empty() {
                return Err(AgentError::Config(
                    "STOPOVER_MODEL_CHAIN must name at least one model".to_string(),
                ));
            }
            config.model_chain = models;
        }

        Ok(config)
    }
}
