use super::block::{generate_block, BlockScope};
use super::sampler::pick_weighted_index;
use super::weights::channel_weight;
use crate::config::FeedConfig;
use crate::models::{ClusterType, Element, FeedSnapshot};
use rand::Rng;
use tracing::debug;

/// Channel-scoped block wrapped as a cluster. `None` when the channel has no
/// remaining articles, so empty clusters never reach the feed.
pub fn generate_cluster<R: Rng + ?Sized>(
    snapshot: &mut FeedSnapshot,
    channel: &str,
    config: &FeedConfig,
    rng: &mut R,
) -> Option<Element> {
    let elements = generate_block(
        snapshot,
        &BlockScope::Channel(channel.to_string()),
        config,
        rng,
    );
    if elements.is_empty() {
        return None;
    }

    debug!(channel = channel, size = elements.len(), "Generated cluster");

    Some(Element::Cluster {
        cluster_type: ClusterType::Channel(channel.to_string()),
        elements,
    })
}

/// Picks a channel weighted by engagement and builds a cluster for it.
pub fn generate_random_cluster<R: Rng + ?Sized>(
    snapshot: &mut FeedSnapshot,
    config: &FeedConfig,
    rng: &mut R,
) -> Option<Element> {
    let index = match pick_weighted_index(&snapshot.channels, rng, |c| {
        channel_weight(c, &snapshot.signals, config)
    }) {
        Ok(index) => index,
        Err(e) => {
            debug!(error = %e, "No channel available for cluster");
            return None;
        }
    };

    let channel = snapshot.channels[index].channel_name.clone();
    generate_cluster(snapshot, &channel, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Channel, LocaleInfo, Publisher, Signal, UserEnabled};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot() -> FeedSnapshot {
        let mut snapshot = FeedSnapshot::default();
        for (id, channel) in [("tech", "Tech"), ("sport", "Sports")] {
            snapshot.publishers.insert(
                id.to_string(),
                Publisher {
                    publisher_id: id.to_string(),
                    publisher_name: id.to_string(),
                    site_url: format!("{}.example", id),
                    locales: vec![LocaleInfo {
                        locale: "en_US".to_string(),
                        channels: vec![channel.to_string()],
                    }],
                    user_enabled_status: UserEnabled::NotModified,
                },
            );
            for i in 0..3 {
                let url = format!("https://{}.example/{}", id, i);
                snapshot.articles.push(Article {
                    id: format!("{}-{}", id, i),
                    publisher_id: id.to_string(),
                    url: url.clone(),
                    score: 1.0,
                    publish_time: None,
                });
                snapshot.signals.insert(
                    url,
                    Signal {
                        channel_subscribed: true,
                        source_subscribed: true,
                        pop_recency: 1.0,
                        ..Signal::default()
                    },
                );
            }
        }
        snapshot
    }

    fn channel_signal(subscribed: bool, blocked: bool) -> Signal {
        Signal {
            blocked,
            channel_subscribed: subscribed,
            channel_visits: 0.5,
            ..Signal::default()
        }
    }

    #[test]
    fn test_generate_cluster_tags_channel() {
        let config = FeedConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = snapshot();

        let cluster = generate_cluster(&mut snapshot, "Tech", &config, &mut rng).unwrap();

        match cluster {
            Element::Cluster {
                cluster_type,
                elements,
            } => {
                assert_eq!(cluster_type, ClusterType::Channel("Tech".to_string()));
                assert!(!elements.is_empty());
                assert!(elements.iter().all(|e| e.article().publisher_id == "tech"));
            }
            other => panic!("expected cluster, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_cluster_empty_channel_yields_none() {
        let config = FeedConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = snapshot();

        assert!(generate_cluster(&mut snapshot, "Weather", &config, &mut rng).is_none());
        assert_eq!(snapshot.articles.len(), 6);
    }

    #[test]
    fn test_random_cluster_skips_blocked_channel() {
        let config = FeedConfig::default();
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut snapshot = snapshot();
            snapshot.channels = vec![Channel::new("Tech"), Channel::new("Sports")];
            snapshot
                .signals
                .insert("Tech".to_string(), channel_signal(true, true));
            snapshot
                .signals
                .insert("Sports".to_string(), channel_signal(true, false));

            match generate_random_cluster(&mut snapshot, &config, &mut rng) {
                Some(Element::Cluster { cluster_type, .. }) => {
                    assert_eq!(cluster_type, ClusterType::Channel("Sports".to_string()))
                }
                other => panic!("expected Sports cluster, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_random_cluster_without_channel_signals() {
        let config = FeedConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = snapshot();
        snapshot.channels = vec![Channel::new("Tech")];

        assert!(generate_random_cluster(&mut snapshot, &config, &mut rng).is_none());
        assert_eq!(snapshot.articles.len(), 6);
    }
}
