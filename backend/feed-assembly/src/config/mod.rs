use crate::error::{FeedError, Result};
use serde::{Deserialize, Serialize};

/// Tunables for feed generation.
///
/// Every field can be overridden with a `FEED_`-prefixed environment
/// variable, e.g. `FEED_INLINE_DISCOVERY_RATIO=0.4`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_block_min_inline")]
    pub block_min_inline: usize,
    #[serde(default = "default_block_max_inline")]
    pub block_max_inline: usize,
    /// Probability an inline slot tries the unvisited-content path
    #[serde(default = "default_inline_discovery_ratio")]
    pub inline_discovery_ratio: f64,
    #[serde(default = "default_special_card_every_n")]
    pub special_card_every_n: usize,
    /// Probability a special card is an advert rather than a discover card
    #[serde(default = "default_ads_to_discover_ratio")]
    pub ads_to_discover_ratio: f64,
    #[serde(default = "default_discover_card_size")]
    pub discover_card_size: usize,

    #[serde(default = "default_source_subscribed_min")]
    pub source_subscribed_min: f64,
    #[serde(default = "default_channel_subscribed_min")]
    pub channel_subscribed_min: f64,
    #[serde(default = "default_channel_visits_min")]
    pub channel_visits_min: f64,
    #[serde(default = "default_channel_visits_max")]
    pub channel_visits_max: f64,
    #[serde(default = "default_source_visits_min")]
    pub source_visits_min: f64,

    #[serde(default = "default_top_news_channel")]
    pub top_news_channel: String,
    /// Hard stop for the step loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_block_min_inline() -> usize {
    1
}

fn default_block_max_inline() -> usize {
    5
}

fn default_inline_discovery_ratio() -> f64 {
    0.25
}

fn default_special_card_every_n() -> usize {
    2
}

fn default_ads_to_discover_ratio() -> f64 {
    0.5
}

fn default_discover_card_size() -> usize {
    3
}

fn default_source_subscribed_min() -> f64 {
    1e-5
}

fn default_channel_subscribed_min() -> f64 {
    0.01
}

fn default_channel_visits_min() -> f64 {
    0.5
}

fn default_channel_visits_max() -> f64 {
    1.0
}

fn default_source_visits_min() -> f64 {
    0.2
}

fn default_top_news_channel() -> String {
    "Top News".to_string()
}

fn default_max_iterations() -> usize {
    10_000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            block_min_inline: default_block_min_inline(),
            block_max_inline: default_block_max_inline(),
            inline_discovery_ratio: default_inline_discovery_ratio(),
            special_card_every_n: default_special_card_every_n(),
            ads_to_discover_ratio: default_ads_to_discover_ratio(),
            discover_card_size: default_discover_card_size(),
            source_subscribed_min: default_source_subscribed_min(),
            channel_subscribed_min: default_channel_subscribed_min(),
            channel_visits_min: default_channel_visits_min(),
            channel_visits_max: default_channel_visits_max(),
            source_visits_min: default_source_visits_min(),
            top_news_channel: default_top_news_channel(),
            max_iterations: default_max_iterations(),
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config: FeedConfig = envy::prefixed("FEED_").from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("inline_discovery_ratio", self.inline_discovery_ratio),
            ("ads_to_discover_ratio", self.ads_to_discover_ratio),
            ("source_subscribed_min", self.source_subscribed_min),
            ("channel_subscribed_min", self.channel_subscribed_min),
            ("source_visits_min", self.source_visits_min),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(FeedError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.block_min_inline > self.block_max_inline {
            return Err(FeedError::InvalidConfig(format!(
                "block_min_inline ({}) exceeds block_max_inline ({})",
                self.block_min_inline, self.block_max_inline
            )));
        }

        if self.channel_visits_min > self.channel_visits_max {
            return Err(FeedError::InvalidConfig(format!(
                "channel_visits_min ({}) exceeds channel_visits_max ({})",
                self.channel_visits_min, self.channel_visits_max
            )));
        }

        if self.special_card_every_n == 0 {
            return Err(FeedError::InvalidConfig(
                "special_card_every_n must be positive".to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(FeedError::InvalidConfig(
                "max_iterations must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tunables for deriving signals from history and subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsConfig {
    #[serde(default = "default_pop_recency_half_life_hours")]
    pub pop_recency_half_life_hours: f64,
    /// Articles younger than this get `fresh_multiplier`
    #[serde(default = "default_fresh_window_hours")]
    pub fresh_window_hours: i64,
    #[serde(default = "default_fresh_multiplier")]
    pub fresh_multiplier: f64,
    /// Popularity assumed for articles without a score
    #[serde(default = "default_popularity")]
    pub default_popularity: f64,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_pop_recency_half_life_hours() -> f64 {
    18.0
}

fn default_fresh_window_hours() -> i64 {
    5
}

fn default_fresh_multiplier() -> f64 {
    2.0
}

fn default_popularity() -> f64 {
    50.0
}

fn default_locale() -> String {
    "en_US".to_string()
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            pop_recency_half_life_hours: default_pop_recency_half_life_hours(),
            fresh_window_hours: default_fresh_window_hours(),
            fresh_multiplier: default_fresh_multiplier(),
            default_popularity: default_popularity(),
            locale: default_locale(),
        }
    }
}

impl SignalsConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(envy::prefixed("FEED_SIGNALS_").from_env()?)
    }
}
