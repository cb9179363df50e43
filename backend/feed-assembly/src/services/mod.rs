pub mod block;
pub mod cluster;
pub mod orchestrator;
pub mod sampler;
pub mod signals;
pub mod special_card;
pub mod weights;

pub use block::{generate_block, BlockScope};
pub use cluster::{generate_cluster, generate_random_cluster};
pub use orchestrator::{generate_feed, run_feed, FeedBuilder, FeedRun, Step, StepTrace};
pub use signals::{ChannelSubscriptions, SignalsBuilder};
pub use special_card::generate_special_card;
pub use weights::{article_weight, channel_weight, is_unvisited};
