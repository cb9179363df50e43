use super::sampler::{normal, pick_weighted, pick_weighted_index, project, toss_coin};
use super::weights::{article_weight, is_unvisited};
use crate::config::FeedConfig;
use crate::models::{ArticleElement, FeedSnapshot};
use rand::Rng;
use std::fmt;
use tracing::{debug, warn};

/// Which part of the candidate pool a block may draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockScope {
    /// Every remaining candidate
    Default,
    /// Candidates whose publisher lists the channel in any locale
    Channel(String),
}

impl fmt::Display for BlockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockScope::Default => write!(f, "default"),
            BlockScope::Channel(name) => write!(f, "channel:{}", name),
        }
    }
}

/// Number of inline slots for the next block, within the configured bounds.
pub fn inline_count<R: Rng + ?Sized>(rng: &mut R, config: &FeedConfig) -> usize {
    // Centre the normal draw on the middle of the range.
    let value = 0.5 + normal(rng) / 4.0;
    project(
        value,
        config.block_min_inline as f64,
        config.block_max_inline as f64,
    )
    .round() as usize
}

/// Builds one block: a hero followed by up to `inline_count` inline articles.
///
/// Picked articles are removed from `snapshot.articles` before returning.
/// An empty scope yields an empty block and leaves the pool untouched.
pub fn generate_block<R: Rng + ?Sized>(
    snapshot: &mut FeedSnapshot,
    scope: &BlockScope,
    config: &FeedConfig,
    rng: &mut R,
) -> Vec<ArticleElement> {
    let pool = &snapshot.articles;
    let signals = &snapshot.signals;

    let mut eligible: Vec<usize> = match scope {
        BlockScope::Default => (0..pool.len()).collect(),
        BlockScope::Channel(channel) => (0..pool.len())
            .filter(|&i| {
                snapshot
                    .publishers
                    .get(&pool[i].publisher_id)
                    .map(|p| p.in_channel(channel))
                    .unwrap_or(false)
            })
            .collect(),
    };

    if eligible.is_empty() {
        warn!(scope = %scope, "No articles for block");
        return Vec::new();
    }

    let count = inline_count(rng, config);
    let weight = |&i: &usize| article_weight(&pool[i], signals, config);

    let hero = match pick_weighted(&mut eligible, rng, weight) {
        Ok(index) => index,
        Err(e) => {
            warn!(scope = %scope, error = %e, "Could not pick hero article");
            return Vec::new();
        }
    };

    let mut picked: Vec<(usize, Option<bool>)> = vec![(hero, None)];

    for _ in 0..count {
        if eligible.is_empty() {
            break;
        }

        if toss_coin(rng, config.inline_discovery_ratio) {
            let discoverable: Vec<usize> = (0..eligible.len())
                .filter(|&slot| is_unvisited(&pool[eligible[slot]], signals))
                .collect();

            if !discoverable.is_empty() {
                // Discover picks rank by raw relevance, not engagement.
                if let Ok(choice) =
                    pick_weighted_index(&discoverable, rng, |&slot| pool[eligible[slot]].score)
                {
                    let index = eligible.remove(discoverable[choice]);
                    picked.push((index, Some(true)));
                    continue;
                }
            }
        }

        match pick_weighted(&mut eligible, rng, weight) {
            Ok(index) => picked.push((index, Some(false))),
            Err(e) => {
                debug!(scope = %scope, error = %e, "No weighted inline candidates left");
                break;
            }
        }
    }

    let elements: Vec<ArticleElement> = picked
        .iter()
        .map(|&(index, discover)| {
            let article = pool[index].clone();
            match discover {
                None => ArticleElement::Hero { article },
                Some(is_discover) => ArticleElement::Inline {
                    article,
                    is_discover,
                },
            }
        })
        .collect();

    let mut consumed: Vec<usize> = picked.into_iter().map(|(index, _)| index).collect();
    consumed.sort_unstable_by(|a, b| b.cmp(a));
    for index in consumed {
        snapshot.articles.remove(index);
    }

    debug!(
        scope = %scope,
        target_inline = count,
        produced = elements.len(),
        remaining = snapshot.articles.len(),
        "Generated block"
    );

    elements
}
