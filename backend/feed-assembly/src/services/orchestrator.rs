// ============================================
// Feed Orchestrator
// ============================================
//
// Fixed step machine driven by pool exhaustion:
//
//   Opening → TopNews → Default → Cluster → SpecialCard → Default → ...
//
// 1. Drop every article whose weight is 0 (one pass, before the loop)
// 2. Run the current step's generator against the shrinking pool
// 3. Append what it produced, advance the step, bump the iteration
// 4. Stop when the pool is empty, when `max_iterations` is reached, or
//    when a full steady-state cycle (3 → 4 → 5) consumes nothing

use super::block::{generate_block, BlockScope};
use super::cluster::generate_random_cluster;
use super::special_card::generate_special_card;
use super::weights::article_weight;
use crate::config::FeedConfig;
use crate::error::Result;
use crate::models::{Element, FeedSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Default block opening the feed
    Opening,
    /// Block scoped to the top news channel
    TopNews,
    /// Default block
    Default,
    /// Cluster for a weighted-random channel
    Cluster,
    /// Advert or discover card
    SpecialCard,
}

impl Step {
    pub const INITIAL: Step = Step::Opening;

    /// `(from, to)` for every step.
    pub const TRANSITIONS: [(Step, Step); 5] = [
        (Step::Opening, Step::TopNews),
        (Step::TopNews, Step::Default),
        (Step::Default, Step::Cluster),
        (Step::Cluster, Step::SpecialCard),
        (Step::SpecialCard, Step::Default),
    ];

    /// Steps repeated once the opening steps are done.
    pub const CYCLE: [Step; 3] = [Step::Default, Step::Cluster, Step::SpecialCard];

    pub fn next(self) -> Step {
        match self {
            Step::Opening => Step::TopNews,
            Step::TopNews => Step::Default,
            Step::Default => Step::Cluster,
            Step::Cluster => Step::SpecialCard,
            Step::SpecialCard => Step::Default,
        }
    }

    /// 1-based step number.
    pub fn number(self) -> u8 {
        match self {
            Step::Opening => 1,
            Step::TopNews => 2,
            Step::Default => 3,
            Step::Cluster => 4,
            Step::SpecialCard => 5,
        }
    }
}

/// What one loop iteration did.
#[derive(Debug, Clone, Serialize)]
pub struct StepTrace {
    pub iteration: usize,
    pub step: Step,
    pub pool_before: usize,
    pub pool_after: usize,
    pub produced: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedRun {
    pub elements: Vec<Element>,
    pub iterations: usize,
    /// Articles removed from the pool by generators
    pub consumed: usize,
    /// Articles dropped by the zero-weight pre-filter
    pub filtered_out: usize,
    /// True when the loop stopped with articles still in the pool
    pub terminated_by_bound: bool,
    pub steps: Vec<StepTrace>,
}

fn run_step<R: Rng + ?Sized>(
    step: Step,
    iteration: usize,
    snapshot: &mut FeedSnapshot,
    config: &FeedConfig,
    rng: &mut R,
) -> Vec<Element> {
    match step {
        Step::Opening | Step::Default => {
            generate_block(snapshot, &BlockScope::Default, config, rng)
                .into_iter()
                .map(Element::from)
                .collect()
        }
        Step::TopNews => generate_block(
            snapshot,
            &BlockScope::Channel(config.top_news_channel.clone()),
            config,
            rng,
        )
        .into_iter()
        .map(Element::from)
        .collect(),
        Step::Cluster => generate_random_cluster(snapshot, config, rng)
            .into_iter()
            .collect(),
        Step::SpecialCard => generate_special_card(snapshot, iteration, config, rng)
            .into_iter()
            .collect(),
    }
}

/// Runs the step machine over `snapshot` until its pool is drained.
pub fn run_feed<R: Rng + ?Sized>(
    mut snapshot: FeedSnapshot,
    config: &FeedConfig,
    rng: &mut R,
) -> FeedRun {
    let before_filter = snapshot.articles.len();
    {
        let signals = &snapshot.signals;
        snapshot
            .articles
            .retain(|a| article_weight(a, signals, config) > 0.0);
    }

    let mut run = FeedRun {
        filtered_out: before_filter - snapshot.articles.len(),
        ..FeedRun::default()
    };

    let mut step = Step::INITIAL;
    let mut idle_steps = 0;

    while !snapshot.articles.is_empty() {
        if run.iterations >= config.max_iterations || idle_steps >= Step::CYCLE.len() {
            warn!(
                iterations = run.iterations,
                idle_steps = idle_steps,
                remaining = snapshot.articles.len(),
                "Stopping feed generation with articles left in pool"
            );
            run.terminated_by_bound = true;
            break;
        }

        let pool_before = snapshot.articles.len();
        let produced = run_step(step, run.iterations, &mut snapshot, config, rng);
        let pool_after = snapshot.articles.len();

        debug!(
            iteration = run.iterations,
            step = step.number(),
            produced = produced.len(),
            remaining = pool_after,
            "Feed step completed"
        );

        if pool_after < pool_before {
            idle_steps = 0;
        } else {
            idle_steps += 1;
        }

        run.consumed += pool_before - pool_after;
        run.steps.push(StepTrace {
            iteration: run.iterations,
            step,
            pool_before,
            pool_after,
            produced: produced.len(),
        });
        run.elements.extend(produced);

        step = step.next();
        run.iterations += 1;
    }

    info!(
        elements = run.elements.len(),
        iterations = run.iterations,
        consumed = run.consumed,
        filtered_out = run.filtered_out,
        "Feed generated"
    );

    run
}

/// Builds the feed for `snapshot` and returns only its elements.
pub fn generate_feed<R: Rng + ?Sized>(
    snapshot: FeedSnapshot,
    config: &FeedConfig,
    rng: &mut R,
) -> Vec<Element> {
    run_feed(snapshot, config, rng).elements
}

/// Owns the config and RNG for repeated runs.
pub struct FeedBuilder {
    config: FeedConfig,
    rng: StdRng,
}

impl FeedBuilder {
    pub fn new(config: FeedConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn build(&mut self, snapshot: FeedSnapshot) -> FeedRun {
        run_feed(snapshot, &self.config, &mut self.rng)
    }
}
