pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::{FeedConfig, SignalsConfig};
pub use error::{FeedError, Result};
pub use models::{Article, Channel, Element, FeedSnapshot, Publisher, Signal};
pub use services::{generate_feed, FeedBuilder, FeedRun, SignalsBuilder};
