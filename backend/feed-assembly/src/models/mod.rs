use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether the user explicitly enabled or disabled a publisher.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserEnabled {
    #[default]
    NotModified,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleInfo {
    pub locale: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Publisher {
    pub publisher_id: String,
    pub publisher_name: String,
    /// Host the publisher serves from, matched against browsing history
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub locales: Vec<LocaleInfo>,
    #[serde(default)]
    pub user_enabled_status: UserEnabled,
}

impl Publisher {
    /// True if any of the publisher's locales lists `channel`.
    pub fn in_channel(&self, channel: &str) -> bool {
        self.locales
            .iter()
            .flat_map(|l| l.channels.iter())
            .any(|c| c == channel)
    }
}

/// A candidate content item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub publisher_id: String,
    /// Join key into the signal map
    pub url: String,
    /// Precomputed relevance score
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub publish_time: Option<DateTime<Utc>>,
}

/// Engagement record for one article (keyed by url) or one channel (keyed by name).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub channel_subscribed: bool,
    /// Fraction of channel visits, only meaningful for channel signals
    #[serde(default)]
    pub channel_visits: f64,
    #[serde(default)]
    pub source_subscribed: bool,
    /// Fraction of publisher visits, only meaningful for article signals
    #[serde(default)]
    pub source_visits: f64,
    #[serde(default)]
    pub pop_recency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub channel_name: String,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            channel_name: name.into(),
        }
    }
}

pub type Signals = HashMap<String, Signal>;

/// Everything one generation run reads.
///
/// A run takes the snapshot by value: `articles` is the candidate pool and
/// `suggested` the suggestion pool, both drained in place while the feed is
/// built. Concurrent runs each need their own snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub publishers: HashMap<String, Publisher>,
    #[serde(default)]
    pub suggested: Vec<Publisher>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub signals: Signals,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

// ============================================
// Output elements
// ============================================

/// Hero or inline article, the two shapes a block is made of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArticleElement {
    Hero {
        article: Article,
    },
    Inline {
        article: Article,
        is_discover: bool,
    },
}

impl ArticleElement {
    pub fn article(&self) -> &Article {
        match self {
            ArticleElement::Hero { article } | ArticleElement::Inline { article, .. } => article,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ClusterType {
    Channel(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Hero {
        article: Article,
    },
    Inline {
        article: Article,
        is_discover: bool,
    },
    Cluster {
        cluster_type: ClusterType,
        elements: Vec<ArticleElement>,
    },
    Advert,
    Discover {
        publishers: Vec<Publisher>,
    },
}

impl From<ArticleElement> for Element {
    fn from(element: ArticleElement) -> Self {
        match element {
            ArticleElement::Hero { article } => Element::Hero { article },
            ArticleElement::Inline {
                article,
                is_discover,
            } => Element::Inline {
                article,
                is_discover,
            },
        }
    }
}

impl Element {
    /// Articles carried by this element, including those nested in a cluster.
    pub fn articles(&self) -> Vec<&Article> {
        match self {
            Element::Hero { article } | Element::Inline { article, .. } => vec![article],
            Element::Cluster { elements, .. } => elements.iter().map(|e| e.article()).collect(),
            Element::Advert | Element::Discover { .. } => Vec::new(),
        }
    }

    pub fn is_special_card(&self) -> bool {
        matches!(self, Element::Advert | Element::Discover { .. })
    }
}
