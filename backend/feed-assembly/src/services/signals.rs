// ============================================
// Signal Builder
// ============================================
//
// Derives the per-article and per-channel signals the weight model reads
// from browsing history and subscription state.
//
// - source_visits:  publisher's share of all publisher visits
// - channel_visits: channel's share of all channel visits (configured locale only)
// - pop_recency:    popularity * fresh boost * 0.5^(age_hours / half_life)
//
// Both visit totals start at 1 so a user with no history never divides by zero.

use crate::config::SignalsConfig;
use crate::models::{Article, Channel, Publisher, Signal, Signals, UserEnabled};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};
use url::Url;

/// Host part of `raw`, accepting bare hosts as well as full URLs.
pub fn host_of(raw: &str) -> Option<String> {
    if let Ok(url) = Url::parse(raw) {
        if let Some(host) = url.host_str() {
            return Some(host.to_string());
        }
    }
    Url::parse(&format!("https://{}", raw))
        .ok()
        .and_then(|url| url.host_str().map(|h| h.to_string()))
}

/// Counts history entries per host. Entries without a host are ignored.
pub fn visits_by_host<'a, I>(history: I) -> HashMap<String, u32>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = HashMap::new();
    for entry in history {
        if let Some(host) = host_of(entry) {
            let count = counts.entry(host).or_insert(0u32);
            *count = count.saturating_add(1);
        }
    }
    counts
}

/// Channels the user subscribed to, per locale.
#[derive(Debug, Clone, Default)]
pub struct ChannelSubscriptions {
    by_locale: HashMap<String, HashSet<String>>,
}

impl ChannelSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, locale: &str, channel: &str) {
        self.by_locale
            .entry(locale.to_string())
            .or_default()
            .insert(channel.to_string());
    }

    pub fn is_subscribed(&self, locale: &str, channel: &str) -> bool {
        self.by_locale
            .get(locale)
            .map(|channels| channels.contains(channel))
            .unwrap_or(false)
    }
}

/// Channel names listed by any publisher for `locale`, sorted.
pub fn channels_from_publishers(
    publishers: &HashMap<String, Publisher>,
    locale: &str,
) -> Vec<Channel> {
    let names: BTreeSet<&str> = publishers
        .values()
        .flat_map(|p| p.locales.iter())
        .filter(|l| l.locale == locale)
        .flat_map(|l| l.channels.iter().map(|c| c.as_str()))
        .collect();
    names.into_iter().map(Channel::new).collect()
}

pub struct SignalsBuilder {
    config: SignalsConfig,
    now: DateTime<Utc>,
}

impl SignalsBuilder {
    pub fn new(config: SignalsConfig) -> Self {
        Self {
            config,
            now: Utc::now(),
        }
    }

    /// Fix the clock used for recency decay
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Decayed popularity of an article.
    ///
    /// Articles without a publish time get neither the fresh boost nor decay.
    pub fn pop_recency(&self, article: &Article) -> f64 {
        let popularity = if article.score == 0.0 {
            self.config.default_popularity
        } else {
            article.score
        };

        let publish_time = match article.publish_time {
            Some(t) => t,
            None => return popularity,
        };

        let fresh_since = self.now - Duration::hours(self.config.fresh_window_hours);
        let multiplier = if publish_time > fresh_since {
            self.config.fresh_multiplier
        } else {
            1.0
        };

        let age_hours = (self.now - publish_time).num_hours().max(0) as f64;
        multiplier
            * popularity
            * 0.5f64.powf(age_hours / self.config.pop_recency_half_life_hours)
    }

    pub fn build(
        &self,
        publishers: &HashMap<String, Publisher>,
        articles: &[Article],
        history_hosts: &HashMap<String, u32>,
        subscriptions: &ChannelSubscriptions,
    ) -> Signals {
        let locale = self.config.locale.as_str();

        let mut total_publisher_visits: u32 = 1;
        let mut total_channel_visits: u32 = 1;
        let mut publisher_visits: HashMap<&str, u32> = HashMap::new();
        let mut channel_visits: HashMap<&str, u32> = HashMap::new();

        for (publisher_id, publisher) in publishers {
            let visits = host_of(&publisher.site_url)
                .and_then(|host| history_hosts.get(&host).copied())
                .unwrap_or(0);
            publisher_visits.insert(publisher_id.as_str(), visits);
            if visits == 0 {
                continue;
            }

            total_publisher_visits = total_publisher_visits.saturating_add(visits);

            if let Some(locale_info) = publisher.locales.iter().find(|l| l.locale == locale) {
                for channel in &locale_info.channels {
                    total_channel_visits = total_channel_visits.saturating_add(visits);
                    let count = channel_visits.entry(channel.as_str()).or_insert(0);
                    *count = count.saturating_add(visits);
                }
            }
        }

        let mut signals = Signals::new();

        for article in articles {
            let publisher = match publishers.get(&article.publisher_id) {
                Some(p) => p,
                None => {
                    warn!(
                        article_id = %article.id,
                        publisher_id = %article.publisher_id,
                        "Article references unknown publisher"
                    );
                    continue;
                }
            };

            let channel_subscribed = publisher.locales.iter().any(|l| {
                l.channels
                    .iter()
                    .any(|c| subscriptions.is_subscribed(&l.locale, c))
            });

            let visits = publisher_visits
                .get(article.publisher_id.as_str())
                .copied()
                .unwrap_or(0);

            signals.insert(
                article.url.clone(),
                Signal {
                    blocked: publisher.user_enabled_status == UserEnabled::Disabled,
                    channel_subscribed,
                    channel_visits: 0.0,
                    source_subscribed: publisher.user_enabled_status == UserEnabled::Enabled,
                    source_visits: visits as f64 / total_publisher_visits as f64,
                    pop_recency: self.pop_recency(article),
                },
            );
        }

        for channel in channels_from_publishers(publishers, locale) {
            let visits = channel_visits
                .get(channel.channel_name.as_str())
                .copied()
                .unwrap_or(0);
            signals.insert(
                channel.channel_name.clone(),
                Signal {
                    blocked: false,
                    channel_subscribed: subscriptions.is_subscribed(locale, &channel.channel_name),
                    channel_visits: visits as f64 / total_channel_visits as f64,
                    source_subscribed: false,
                    source_visits: 0.0,
                    pop_recency: 0.0,
                },
            );
        }

        debug!(
            signals = signals.len(),
            total_publisher_visits = total_publisher_visits,
            total_channel_visits = total_channel_visits,
            "Built signals"
        );

        signals
    }
}
