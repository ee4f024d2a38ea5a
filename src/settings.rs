//! Operator-tunable settings
//!
//! A single settings record governs the whole deployment: how long host
//! sessions live, how reveal timing behaves on the shared device, and how
//! many packs a new category must bring. The timers themselves run in the
//! surrounding application; the core only validates and carries the values.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants::settings as defaults;

/// The global configuration record, one per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GlobalSettings {
    /// Minutes of inactivity before a host session expires and its nickname
    /// becomes claimable again
    #[garde(range(min = 1, max = defaults::MAX_SESSION_MINUTES))]
    pub session_minutes: u64,
    /// Minutes before expiry at which the host is warned
    #[garde(range(min = 1, max = defaults::MAX_WARNING_MINUTES))]
    pub warning_minutes: u64,
    /// Minutes of inactivity before a host is displayed as away
    #[garde(range(min = 1, max = defaults::MAX_AFK_DISPLAY_MINUTES))]
    pub afk_display_minutes: u64,
    /// Seconds each player gets to look at their reveal card
    #[garde(range(min = 1, max = defaults::MAX_REVEAL_SECONDS))]
    pub reveal_seconds: u64,
    /// Minimum number of word packs required to create a category
    #[garde(range(min = 1, max = defaults::MAX_MIN_PACKS_PER_CATEGORY))]
    pub min_packs_per_category: usize,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            session_minutes: defaults::DEFAULT_SESSION_MINUTES,
            warning_minutes: defaults::DEFAULT_WARNING_MINUTES,
            afk_display_minutes: defaults::DEFAULT_AFK_DISPLAY_MINUTES,
            reveal_seconds: defaults::DEFAULT_REVEAL_SECONDS,
            min_packs_per_category: defaults::DEFAULT_MIN_PACKS_PER_CATEGORY,
        }
    }
}
