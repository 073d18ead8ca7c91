// ABOUTME: FeedConfig - endpoints, contract addresses, paging and timing knobs.
// ABOUTME: Built with setters or loaded from FEED_* environment variables.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Gateway origin used for content-addressed avatar fetches.
pub const DEFAULT_GATEWAY_ORIGIN: &str = "https://purple-wonderful-jay-289.mypinata.cloud";

/// Settings shared by the coordinator, submitter and dashboard.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// JSON-RPC endpoint of the ledger node or wallet bridge.
    pub rpc_url: String,

    /// Address of the post contract.
    pub post_contract: String,

    /// Address of the user registry contract (usernames and avatar CIDs).
    pub registry_contract: String,

    /// Origin of the pinning gateway, without trailing slash.
    pub gateway_origin: String,

    /// Origin that share links point at.
    pub share_origin: String,

    /// Posts per page.
    pub page_size: u64,

    /// Upper bound for every single ledger or gateway call.
    pub request_timeout: Duration,

    /// How many posts of a page are enriched at once.
    pub fetch_concurrency: usize,

    /// Distance in pixels from the bottom that triggers the next page.
    pub scroll_threshold: f64,

    /// How long a notification stays visible.
    pub notice_ttl: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            post_contract: String::new(),
            registry_contract: String::new(),
            gateway_origin: DEFAULT_GATEWAY_ORIGIN.to_string(),
            share_origin: "http://localhost:8000".to_string(),
            page_size: 10,
            request_timeout: Duration::from_secs(30),
            fetch_concurrency: 4,
            scroll_threshold: 500.0,
            notice_ttl: Duration::from_millis(3000),
        }
    }
}

impl FeedConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON-RPC endpoint.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    /// Set the post and registry contract addresses.
    pub fn contracts(mut self, post: impl Into<String>, registry: impl Into<String>) -> Self {
        self.post_contract = post.into();
        self.registry_contract = registry.into();
        self
    }

    /// Set the pinning gateway origin.
    pub fn gateway_origin(mut self, origin: impl Into<String>) -> Self {
        self.gateway_origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the origin used in share links.
    pub fn share_origin(mut self, origin: impl Into<String>) -> Self {
        self.share_origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the page size. Zero is bumped to one.
    pub fn page_size(mut self, size: u64) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Set the per-call timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the enrichment concurrency. Zero is bumped to one.
    pub fn fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }

    /// Load settings from `FEED_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FEED_RPC_URL") {
            reqwest::Url::parse(&url).map_err(|e| ConfigError::Invalid {
                key: "FEED_RPC_URL",
                message: e.to_string(),
            })?;
            config.rpc_url = url;
        }
        if let Some(addr) = lookup("FEED_POST_CONTRACT") {
            config.post_contract = addr;
        }
        if let Some(addr) = lookup("FEED_REGISTRY_CONTRACT") {
            config.registry_contract = addr;
        }
        if let Some(origin) = lookup("FEED_GATEWAY_ORIGIN") {
            config = config.gateway_origin(origin);
        }
        if let Some(origin) = lookup("FEED_SHARE_ORIGIN") {
            config = config.share_origin(origin);
        }
        if let Some(size) = parse(&lookup, "FEED_PAGE_SIZE")? {
            if size == 0 {
                return Err(ConfigError::Invalid {
                    key: "FEED_PAGE_SIZE",
                    message: "must be at least 1".to_string(),
                });
            }
            config.page_size = size;
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "FEED_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse::<usize, _>(&lookup, "FEED_FETCH_CONCURRENCY")? {
            config = config.fetch_concurrency(n);
        }
        if let Some(px) = parse(&lookup, "FEED_SCROLL_THRESHOLD")? {
            config.scroll_threshold = px;
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "FEED_NOTICE_TTL_MS")? {
            config.notice_ttl = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Fails if either contract address is unset.
    pub fn require_contracts(&self) -> Result<(), ConfigError> {
        if self.post_contract.is_empty() {
            return Err(ConfigError::Missing("FEED_POST_CONTRACT"));
        }
        if self.registry_contract.is_empty() {
            return Err(ConfigError::Missing("FEED_REGISTRY_CONTRACT"));
        }
        Ok(())
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                key,
                message: e.to_string(),
            }),
    }
}
