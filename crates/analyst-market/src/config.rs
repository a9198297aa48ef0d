//! Configuration for market data caching and scoring

use std::time::Duration;

use analyst_utils::env_var;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};

/// Environment variable overriding the company listing TTL, in seconds
pub const COMPANY_TTL_VAR: &str = "ANALYST_COMPANY_TTL_SECS";
/// Environment variable overriding the quote history TTL, in seconds
pub const QUOTE_TTL_VAR: &str = "ANALYST_QUOTE_TTL_SECS";
/// Environment variable overriding the statement bundle TTL, in seconds
pub const STATEMENT_TTL_VAR: &str = "ANALYST_STATEMENT_TTL_SECS";

/// Windows and thresholds of the technical indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub bollinger_window: usize,
    pub bollinger_std_devs: f64,
    /// Number of trailing OBV deltas averaged for the verdict
    pub obv_lookback: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            bollinger_window: 20,
            bollinger_std_devs: 2.0,
            obv_lookback: 5,
        }
    }
}

impl IndicatorSettings {
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("rsi_period", self.rsi_period),
            ("bollinger_window", self.bollinger_window),
            ("obv_lookback", self.obv_lookback),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, value)| *value == 0) {
            return Err(MarketError::Config(format!("{name} must be greater than 0")));
        }

        if self.macd_fast >= self.macd_slow {
            return Err(MarketError::Config(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }

        if self.bollinger_window < 2 {
            return Err(MarketError::Config(
                "bollinger_window must be at least 2".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(MarketError::Config(format!(
                "RSI thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                self.rsi_oversold, self.rsi_overbought
            )));
        }

        if self.bollinger_std_devs.is_nan() || self.bollinger_std_devs <= 0.0 {
            return Err(MarketError::Config(
                "bollinger_std_devs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Thresholds of the price-action sentiment signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSettings {
    /// Total return beyond which momentum is directional (0.05 = 5%)
    pub momentum_threshold: f64,
    /// Number of trailing sessions compared against the whole window
    pub volume_window: usize,
    /// Recent/average volume ratio considered elevated
    pub volume_ratio: f64,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            momentum_threshold: 0.05,
            volume_window: 5,
            volume_ratio: 1.2,
        }
    }
}

impl SentimentSettings {
    pub fn validate(&self) -> Result<()> {
        if self.momentum_threshold.is_nan() || self.momentum_threshold < 0.0 {
            return Err(MarketError::Config(
                "momentum_threshold must not be negative".to_string(),
            ));
        }
        if self.volume_window == 0 {
            return Err(MarketError::Config(
                "volume_window must be greater than 0".to_string(),
            ));
        }
        if self.volume_ratio.is_nan() || self.volume_ratio <= 0.0 {
            return Err(MarketError::Config(
                "volume_ratio must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for market data caching and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Cache TTL for the company listing
    pub company_ttl: Duration,

    /// Cache TTL for quote histories
    pub quote_ttl: Duration,

    /// Cache TTL for statement bundles
    pub statement_ttl: Duration,

    pub indicators: IndicatorSettings,

    pub sentiment: SentimentSettings,

    /// Minimum aggregated confidence for a buy or sell action
    pub min_action_confidence: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            company_ttl: Duration::from_secs(24 * 3600), // 1 day
            quote_ttl: Duration::from_secs(300),         // 5 minutes
            statement_ttl: Duration::from_secs(3600),    // 1 hour
            indicators: IndicatorSettings::default(),
            sentiment: SentimentSettings::default(),
            min_action_confidence: 0.5,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Defaults with TTLs overridden from the environment
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env_ttls()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, ttl) in [
            ("company_ttl", self.company_ttl),
            ("quote_ttl", self.quote_ttl),
            ("statement_ttl", self.statement_ttl),
        ] {
            if ttl.is_zero() {
                return Err(MarketError::Config(format!("{name} must be greater than 0")));
            }
        }

        if !(0.0..=1.0).contains(&self.min_action_confidence) {
            return Err(MarketError::Config(format!(
                "min_action_confidence must be within [0, 1], got {}",
                self.min_action_confidence
            )));
        }

        self.indicators.validate()?;
        self.sentiment.validate()
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    company_ttl: Option<Duration>,
    quote_ttl: Option<Duration>,
    statement_ttl: Option<Duration>,
    indicators: Option<IndicatorSettings>,
    sentiment: Option<SentimentSettings>,
    min_action_confidence: Option<f64>,
}

impl MarketConfigBuilder {
    /// Set cache TTL for the company listing
    pub fn company_ttl(mut self, duration: Duration) -> Self {
        self.company_ttl = Some(duration);
        self
    }

    /// Set cache TTL for quote histories
    pub fn quote_ttl(mut self, duration: Duration) -> Self {
        self.quote_ttl = Some(duration);
        self
    }

    /// Set cache TTL for statement bundles
    pub fn statement_ttl(mut self, duration: Duration) -> Self {
        self.statement_ttl = Some(duration);
        self
    }

    pub fn indicators(mut self, settings: IndicatorSettings) -> Self {
        self.indicators = Some(settings);
        self
    }

    pub fn sentiment(mut self, settings: SentimentSettings) -> Self {
        self.sentiment = Some(settings);
        self
    }

    pub fn min_action_confidence(mut self, confidence: f64) -> Self {
        self.min_action_confidence = Some(confidence);
        self
    }

    /// Override TTLs from `ANALYST_*_TTL_SECS` environment variables
    ///
    /// Unset variables leave the current value alone; malformed ones are an
    /// error.
    pub fn with_env_ttls(mut self) -> Result<Self> {
        if let Some(secs) = env_var::<u64>(COMPANY_TTL_VAR)? {
            self.company_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = env_var::<u64>(QUOTE_TTL_VAR)? {
            self.quote_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = env_var::<u64>(STATEMENT_TTL_VAR)? {
            self.statement_ttl = Some(Duration::from_secs(secs));
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            company_ttl: self.company_ttl.unwrap_or(defaults.company_ttl),
            quote_ttl: self.quote_ttl.unwrap_or(defaults.quote_ttl),
            statement_ttl: self.statement_ttl.unwrap_or(defaults.statement_ttl),
            indicators: self.indicators.unwrap_or(defaults.indicators),
            sentiment: self.sentiment.unwrap_or(defaults.sentiment),
            min_action_confidence: self
                .min_action_confidence
                .unwrap_or(defaults.min_action_confidence),
        };

        config.validate()?;
        Ok(config)
    }
}
