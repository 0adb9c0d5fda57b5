//! Social channels and the channel eligibility filter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A social platform a participant can post a story on.
///
/// Declaration order is the canonical channel order used everywhere a list of
/// channels is offered to the participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SocialChannel {
    /// Telegram stories.
    Telegram,
    /// WhatsApp status.
    WhatsApp,
    /// Instagram stories.
    Instagram,
}

impl SocialChannel {
    /// Every channel, in canonical order.
    pub const ALL: [Self; 3] = [Self::Telegram, Self::WhatsApp, Self::Instagram];

    /// Number of channels in the campaign.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable lowercase identifier (used in callback data and metric labels).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::WhatsApp => "whatsapp",
            Self::Instagram => "instagram",
        }
    }

    /// Parse the identifier produced by [`SocialChannel::as_str`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.as_str() == raw)
    }
}

impl fmt::Display for SocialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Telegram => "Telegram",
            Self::WhatsApp => "WhatsApp",
            Self::Instagram => "Instagram",
        };
        f.write_str(name)
    }
}

/// Channels still available for a boost.
///
/// `AllChannels − {required} − used`, in canonical order. An empty result is
/// the terminal state of the boost flow.
#[must_use]
pub fn remaining_channels<'a>(
    required: Option<SocialChannel>,
    used: impl IntoIterator<Item = &'a SocialChannel> + Clone,
) -> Vec<SocialChannel> {
    SocialChannel::ALL
        .into_iter()
        .filter(|channel| Some(*channel) != required)
        .filter(|channel| !used.clone().into_iter().any(|u| u == channel))
        .collect()
}
