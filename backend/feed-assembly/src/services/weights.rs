// ============================================
// Signal → sampling weight
// ============================================
//
// article weight = visits term * pop_recency * source term * channel term
//
//   visits term:  source_visits_min + source_visits * (1 - source_visits_min)
//   source term:  1 if the publisher is subscribed, else source_subscribed_min
//   channel term: 1 if a channel of the article is subscribed, else channel_subscribed_min
//
// channel weight = subscribed term * project(channel_visits, visits_min, visits_max)
//
// Missing or blocked signals weigh 0 and are never sampled.

use super::sampler::project;
use crate::config::FeedConfig;
use crate::models::{Article, Channel, Signals};

pub fn article_weight(article: &Article, signals: &Signals, config: &FeedConfig) -> f64 {
    let signal = match signals.get(&article.url) {
        Some(signal) if !signal.blocked => signal,
        _ => return 0.0,
    };

    let visits = config.source_visits_min + signal.source_visits * (1.0 - config.source_visits_min);
    let source = if signal.source_subscribed {
        1.0
    } else {
        config.source_subscribed_min
    };
    let channel = if signal.channel_subscribed {
        1.0
    } else {
        config.channel_subscribed_min
    };

    visits * signal.pop_recency * source * channel
}

pub fn channel_weight(channel: &Channel, signals: &Signals, config: &FeedConfig) -> f64 {
    let signal = match signals.get(&channel.channel_name) {
        Some(signal) if !signal.blocked => signal,
        _ => return 0.0,
    };

    let subscribed = if signal.channel_subscribed {
        1.0
    } else {
        config.channel_subscribed_min
    };

    subscribed
        * project(
            signal.channel_visits,
            config.channel_visits_min,
            config.channel_visits_max,
        )
}

/// An article is unvisited when it has no signal or its publisher has no visits.
pub fn is_unvisited(article: &Article, signals: &Signals) -> bool {
    signals
        .get(&article.url)
        .map(|s| s.source_visits == 0.0)
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Signal;

    fn article(url: &str) -> Article {
        Article {
            id: url.to_string(),
            publisher_id: "p1".to_string(),
            url: url.to_string(),
            score: 1.0,
            publish_time: None,
        }
    }

    fn signals(entries: Vec<(&str, Signal)>) -> Signals {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn subscribed_signal(source_visits: f64, pop_recency: f64) -> Signal {
        Signal {
            blocked: false,
            channel_subscribed: true,
            channel_visits: 0.0,
            source_subscribed: true,
            source_visits,
            pop_recency,
        }
    }

    #[test]
    fn test_article_weight_missing_signal_is_zero() {
        let config = FeedConfig::default();
        assert_eq!(article_weight(&article("u1"), &Signals::new(), &config), 0.0);
    }

    #[test]
    fn test_article_weight_blocked_is_zero() {
        let config = FeedConfig::default();
        let mut signal = subscribed_signal(1.0, 1.0);
        signal.blocked = true;
        let signals = signals(vec![("u1", signal)]);
        assert_eq!(article_weight(&article("u1"), &signals, &config), 0.0);
    }

    #[test]
    fn test_article_weight_unvisited_keeps_floor() {
        let config = FeedConfig::default();
        let signals = signals(vec![("u1", subscribed_signal(0.0, 1.0))]);
        let weight = article_weight(&article("u1"), &signals, &config);
        assert!((weight - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_article_weight_full_visits() {
        let config = FeedConfig::default();
        let signals = signals(vec![("u1", subscribed_signal(1.0, 0.5))]);
        let weight = article_weight(&article("u1"), &signals, &config);
        assert!((weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_article_weight_unsubscribed_multipliers() {
        let config = FeedConfig::default();
        let mut signal = subscribed_signal(1.0, 1.0);
        signal.source_subscribed = false;
        signal.channel_subscribed = false;
        let signals = signals(vec![("u1", signal)]);
        let weight = article_weight(&article("u1"), &signals, &config);
        assert!((weight - 1e-5 * 0.01).abs() < 1e-15);
        assert!(weight > 0.0);
    }

    #[test]
    fn test_article_weight_is_deterministic() {
        let config = FeedConfig::default();
        let signals = signals(vec![("u1", subscribed_signal(0.3, 0.7))]);
        let a = article("u1");
        assert_eq!(
            article_weight(&a, &signals, &config),
            article_weight(&a, &signals, &config)
        );
    }

    #[test]
    fn test_channel_weight() {
        let config = FeedConfig::default();
        let tech = Channel::new("Tech");

        assert_eq!(channel_weight(&tech, &Signals::new(), &config), 0.0);

        let mut signal = Signal {
            channel_subscribed: true,
            channel_visits: 0.0,
            ..Signal::default()
        };
        let weight = channel_weight(&tech, &signals(vec![("Tech", signal.clone())]), &config);
        assert!((weight - 0.5).abs() < 1e-12);

        signal.channel_visits = 1.0;
        let weight = channel_weight(&tech, &signals(vec![("Tech", signal.clone())]), &config);
        assert!((weight - 1.0).abs() < 1e-12);

        signal.channel_subscribed = false;
        let weight = channel_weight(&tech, &signals(vec![("Tech", signal.clone())]), &config);
        assert!((weight - 0.01).abs() < 1e-12);

        signal.blocked = true;
        assert_eq!(
            channel_weight(&tech, &signals(vec![("Tech", signal)]), &config),
            0.0
        );
    }

    #[test]
    fn test_is_unvisited() {
        let signals = signals(vec![
            ("visited", subscribed_signal(0.4, 1.0)),
            ("fresh", subscribed_signal(0.0, 1.0)),
        ]);
        assert!(!is_unvisited(&article("visited"), &signals));
        assert!(is_unvisited(&article("fresh"), &signals));
        assert!(is_unvisited(&article("unknown"), &signals));
    }
}
