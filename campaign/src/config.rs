//! Campaign configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file by
//! the binary). Every setting has a default so a development setup runs
//! without any configuration at all.

use crate::error::{CampaignError, Result};
use crate::state::GroupRef;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default membership cache TTL.
pub const DEFAULT_MEMBERSHIP_TTL: Duration = Duration::from_secs(300);

/// How long notices posted by the group guard stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeTtls {
    /// Notice after removing a non-member who joined (default 30s).
    pub join_rejected: Duration,
    /// Welcome for an eligible joiner (default 10s).
    pub join_welcome: Duration,
    /// Warning after deleting a non-member's message (default 10s).
    pub message_warning: Duration,
}

impl Default for NoticeTtls {
    fn default() -> Self {
        Self {
            join_rejected: Duration::from_secs(30),
            join_welcome: Duration::from_secs(10),
            message_warning: Duration::from_secs(10),
        }
    }
}

/// Campaign configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignConfig {
    /// Discussion group participants must join.
    pub target_chat: GroupRef,

    /// Broadcast channel participants must subscribe to.
    pub target_channel: GroupRef,

    /// Public link to the discussion group (rendered as a join control).
    pub chat_url: String,

    /// Public link to the channel (rendered as a subscribe control).
    pub channel_url: String,

    /// Human-readable draw date shown on the profile screen.
    pub close_date: Option<String>,

    /// Promotional image attached to the required-condition screen.
    pub promo_asset: Option<PathBuf>,

    /// Staleness bound for cached membership results.
    ///
    /// Default: 300 seconds
    pub membership_ttl: Duration,

    /// Lifetimes of the group guard's self-deleting notices.
    pub notice_ttls: NoticeTtls,

    /// Address for the Prometheus scrape endpoint, if metrics are exported.
    pub metrics_addr: Option<SocketAddr>,
}

impl CampaignConfig {
    /// Create a configuration for the given group and channel.
    #[must_use]
    pub fn new(target_chat: GroupRef, target_channel: GroupRef) -> Self {
        let chat_url = handle_url(&target_chat);
        let channel_url = handle_url(&target_channel);
        Self {
            target_chat,
            target_channel,
            chat_url,
            channel_url,
            close_date: None,
            promo_asset: None,
            membership_ttl: DEFAULT_MEMBERSHIP_TTL,
            notice_ttls: NoticeTtls::default(),
            metrics_addr: None,
        }
    }

    /// Set the membership cache TTL.
    #[must_use]
    pub const fn with_membership_ttl(mut self, ttl: Duration) -> Self {
        self.membership_ttl = ttl;
        self
    }

    /// Set the draw date shown to participants.
    #[must_use]
    pub fn with_close_date(mut self, date: impl Into<String>) -> Self {
        self.close_date = Some(date.into());
        self
    }

    /// Set the promotional image.
    #[must_use]
    pub fn with_promo_asset(mut self, path: impl Into<PathBuf>) -> Self {
        self.promo_asset = Some(path.into());
        self
    }

    /// Set the group guard's notice lifetimes.
    #[must_use]
    pub const fn with_notice_ttls(mut self, ttls: NoticeTtls) -> Self {
        self.notice_ttls = ttls;
        self
    }

    /// The two groups whose membership is required, chat first.
    #[must_use]
    pub fn required_groups(&self) -> [GroupRef; 2] {
        [self.target_chat.clone(), self.target_channel.clone()]
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::Config`] if a numeric or address value does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::Config`] if a numeric or address value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_chat = GroupRef::new(
            lookup("GIVEAWAY_TARGET_CHAT").unwrap_or_else(|| "@giveaway_chat".to_string()),
        );
        let target_channel = GroupRef::new(
            lookup("GIVEAWAY_TARGET_CHANNEL").unwrap_or_else(|| "@giveaway_news".to_string()),
        );
        let mut config = Self::new(target_chat, target_channel);

        if let Some(url) = lookup("GIVEAWAY_CHAT_URL") {
            config.chat_url = url;
        }
        if let Some(url) = lookup("GIVEAWAY_CHANNEL_URL") {
            config.channel_url = url;
        }
        config.close_date = lookup("GIVEAWAY_CLOSE_DATE").filter(|date| !date.trim().is_empty());
        config.promo_asset = lookup("GIVEAWAY_PROMO_ASSET").map(PathBuf::from);

        if let Some(raw) = lookup("GIVEAWAY_MEMBERSHIP_TTL_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| CampaignError::Config {
                key: "GIVEAWAY_MEMBERSHIP_TTL_SECS".to_string(),
                reason: e.to_string(),
            })?;
            config.membership_ttl = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("GIVEAWAY_METRICS_ADDR") {
            let addr = raw.trim().parse::<SocketAddr>().map_err(|e| CampaignError::Config {
                key: "GIVEAWAY_METRICS_ADDR".to_string(),
                reason: e.to_string(),
            })?;
            config.metrics_addr = Some(addr);
        }

        Ok(config)
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self::new(GroupRef::new("@giveaway_chat"), GroupRef::new("@giveaway_news"))
    }
}

/// `https://t.me/<handle>` for `@handle` references, empty for numeric ids.
fn handle_url(group: &GroupRef) -> String {
    group
        .as_str()
        .strip_prefix('@')
        .map(|handle| format!("https://t.me/{handle}"))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_builder() {
        let config = CampaignConfig::default()
            .with_membership_ttl(Duration::from_secs(60))
            .with_close_date("December 31")
            .with_promo_asset("story.png");

        assert_eq!(config.membership_ttl, Duration::from_secs(60));
        assert_eq!(config.close_date.as_deref(), Some("December 31"));
        assert_eq!(config.promo_asset, Some(PathBuf::from("story.png")));
    }

    #[test]
    fn test_default_config() {
        let config = CampaignConfig::default();
        assert_eq!(config.membership_ttl, DEFAULT_MEMBERSHIP_TTL);
        assert_eq!(config.notice_ttls.join_rejected, Duration::from_secs(30));
        assert_eq!(config.notice_ttls.join_welcome, Duration::from_secs(10));
        assert_eq!(config.chat_url, "https://t.me/giveaway_chat");
        assert!(config.metrics_addr.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = CampaignConfig::from_lookup(lookup_from(&[
            ("GIVEAWAY_TARGET_CHAT", "@market_chat"),
            ("GIVEAWAY_TARGET_CHANNEL", "-100200300"),
            ("GIVEAWAY_CLOSE_DATE", "  "),
            ("GIVEAWAY_MEMBERSHIP_TTL_SECS", "120"),
            ("GIVEAWAY_METRICS_ADDR", "127.0.0.1:9090"),
        ]))
        .unwrap();

        assert_eq!(config.target_chat.as_str(), "@market_chat");
        assert_eq!(config.chat_url, "https://t.me/market_chat");
        assert_eq!(config.channel_url, "");
        assert_eq!(config.close_date, None);
        assert_eq!(config.membership_ttl, Duration::from_secs(120));
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9090".parse().unwrap()));
    }

    #[test]
    fn malformed_ttl_is_a_config_error() {
        let err = CampaignConfig::from_lookup(lookup_from(&[(
            "GIVEAWAY_MEMBERSHIP_TTL_SECS",
            "five minutes",
        )]))
        .unwrap_err();

        assert!(matches!(err, CampaignError::Config { ref key, .. } if key == "GIVEAWAY_MEMBERSHIP_TTL_SECS"));
    }
}
