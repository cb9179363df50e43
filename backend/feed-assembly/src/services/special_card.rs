use super::sampler::toss_coin;
use crate::config::FeedConfig;
use crate::models::{Element, FeedSnapshot};
use rand::Rng;
use tracing::debug;

/// Advert or discover card, only on iterations that are a multiple of
/// `special_card_every_n`. A zero interval disables cards.
///
/// Discover cards take up to `discover_card_size` publishers from the front
/// of the suggestion pool; an exhausted pool yields an empty card.
pub fn generate_special_card<R: Rng + ?Sized>(
    snapshot: &mut FeedSnapshot,
    iteration: usize,
    config: &FeedConfig,
    rng: &mut R,
) -> Option<Element> {
    if config.special_card_every_n == 0 || iteration % config.special_card_every_n != 0 {
        return None;
    }

    if toss_coin(rng, config.ads_to_discover_ratio) {
        debug!(iteration = iteration, "Generated advert");
        return Some(Element::Advert);
    }

    let take = config.discover_card_size.min(snapshot.suggested.len());
    let publishers: Vec<_> = snapshot.suggested.drain(..take).collect();

    debug!(
        iteration = iteration,
        publishers = publishers.len(),
        remaining = snapshot.suggested.len(),
        "Generated discover card"
    );

    Some(Element::Discover { publishers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Publisher, UserEnabled};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn suggested(count: usize) -> Vec<Publisher> {
        (0..count)
            .map(|i| Publisher {
                publisher_id: format!("s{}", i),
                publisher_name: format!("Suggested {}", i),
                site_url: String::new(),
                locales: Vec::new(),
                user_enabled_status: UserEnabled::NotModified,
            })
            .collect()
    }

    fn discover_only() -> FeedConfig {
        FeedConfig {
            ads_to_discover_ratio: 0.0,
            ..FeedConfig::default()
        }
    }

    #[test]
    fn test_odd_iteration_is_noop() {
        let config = FeedConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = FeedSnapshot {
            suggested: suggested(5),
            ..FeedSnapshot::default()
        };

        for iteration in [1, 3, 5, 7] {
            assert!(generate_special_card(&mut snapshot, iteration, &config, &mut rng).is_none());
        }
        assert_eq!(snapshot.suggested.len(), 5);
    }

    #[test]
    fn test_zero_interval_disables_cards() {
        let config = FeedConfig {
            special_card_every_n: 0,
            ..discover_only()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = FeedSnapshot {
            suggested: suggested(5),
            ..FeedSnapshot::default()
        };

        for iteration in 0..6 {
            assert!(generate_special_card(&mut snapshot, iteration, &config, &mut rng).is_none());
        }
        assert_eq!(snapshot.suggested.len(), 5);
    }

    #[test]
    fn test_advert_when_coin_always_heads() {
        let config = FeedConfig {
            ads_to_discover_ratio: 1.0,
            ..FeedConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = FeedSnapshot {
            suggested: suggested(5),
            ..FeedSnapshot::default()
        };

        let card = generate_special_card(&mut snapshot, 4, &config, &mut rng);
        assert_eq!(card, Some(Element::Advert));
        assert_eq!(snapshot.suggested.len(), 5);
    }

    #[test]
    fn test_discover_consumes_suggestions_in_order() {
        let config = discover_only();
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = FeedSnapshot {
            suggested: suggested(5),
            ..FeedSnapshot::default()
        };

        let first = generate_special_card(&mut snapshot, 0, &config, &mut rng);
        match first {
            Some(Element::Discover { publishers }) => {
                let ids: Vec<&str> = publishers.iter().map(|p| p.publisher_id.as_str()).collect();
                assert_eq!(ids, vec!["s0", "s1", "s2"]);
            }
            other => panic!("expected discover card, got {:?}", other),
        }

        let second = generate_special_card(&mut snapshot, 2, &config, &mut rng);
        match second {
            Some(Element::Discover { publishers }) => assert_eq!(publishers.len(), 2),
            other => panic!("expected discover card, got {:?}", other),
        }

        let third = generate_special_card(&mut snapshot, 4, &config, &mut rng);
        assert_eq!(
            third,
            Some(Element::Discover {
                publishers: Vec::new()
            })
        );
        assert!(snapshot.suggested.is_empty());
    }

    #[test]
    fn test_mixed_cards_over_many_iterations() {
        let config = FeedConfig::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut snapshot = FeedSnapshot {
            suggested: suggested(300),
            ..FeedSnapshot::default()
        };

        let mut adverts = 0;
        let mut discovers = 0;
        for iteration in (0..400).step_by(2) {
            match generate_special_card(&mut snapshot, iteration, &config, &mut rng) {
                Some(Element::Advert) => adverts += 1,
                Some(Element::Discover { .. }) => discovers += 1,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(adverts > 50);
        assert!(discovers > 50);
    }
}
