//! Match configuration and game modifiers
//!
//! This module defines the options a host submits when starting a match.
//! Configuration arrives from an untrusted form on the shared device, so
//! deserialization is deliberately lenient: a malformed impostor count or
//! modifier flag falls back to its documented default instead of failing
//! the whole request.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::catalog::CategoryId;

/// Deserializes a boolean flag, falling back to `fallback` on anything that
/// is not a boolean.
fn lenient_flag<'de, D>(deserializer: D, fallback: bool) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer) {
        Ok(serde_json::Value::Bool(value)) => value,
        _ => fallback,
    })
}

/// Lenient flag deserializer defaulting to off
fn flag_default_off<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_flag(deserializer, false)
}

/// Lenient flag deserializer defaulting to on
fn flag_default_on<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_flag(deserializer, true)
}

/// Deserializes the impostor count from numbers or numeric strings,
/// recovering to the safe default of 1 on anything unusable.
fn lenient_impostor_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer).unwrap_or(serde_json::Value::Null);
    let count = match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(1),
        serde_json::Value::String(s) => s.trim().parse::<i64>().unwrap_or(1),
        _ => 1,
    };
    Ok(usize::try_from(count).unwrap_or(0).max(1))
}

fn on() -> bool {
    true
}

/// Optional rule tweaks for one match
///
/// All modifiers are independent booleans. `decoy_knows_role` and
/// `sibling_impostors` default to on, the rest to off, matching what the
/// configuration screen preselects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Modifiers {
    /// Impostors receive the pack's `related_b` word instead of nothing
    #[garde(skip)]
    #[serde(default, deserialize_with = "flag_default_off")]
    pub hard_mode: bool,
    /// One innocent-aligned player receives `related_a` instead of the secret word
    #[garde(skip)]
    #[serde(default, deserialize_with = "flag_default_off")]
    pub use_decoy: bool,
    /// Whether the decoy's reveal card tells them they are the decoy
    #[garde(skip)]
    #[serde(default = "on", deserialize_with = "flag_default_on")]
    pub decoy_knows_role: bool,
    /// Whether impostors learn who their fellow impostors are
    #[garde(skip)]
    #[serde(default = "on", deserialize_with = "flag_default_on")]
    pub sibling_impostors: bool,
    /// Disables the anti-repeat bias so the same player may open as impostor
    /// round after round
    #[garde(skip)]
    #[serde(default, deserialize_with = "flag_default_off")]
    pub compulsive_impostor: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            hard_mode: false,
            use_decoy: false,
            decoy_knows_role: true,
            sibling_impostors: true,
            compulsive_impostor: false,
        }
    }
}

/// Everything a host submits to start one match
///
/// The impostor count here is the *requested* number; the final count is
/// clamped against the roster size when roles are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MatchConfig {
    /// The category to draw a word pack from
    #[garde(skip)]
    pub category: CategoryId,
    /// Requested number of impostors, at least 1
    #[garde(range(min = 1))]
    #[serde(
        default = "MatchConfig::default_impostor_count",
        deserialize_with = "lenient_impostor_count"
    )]
    pub impostor_count: usize,
    /// Rule tweaks for this match
    #[garde(dive)]
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl MatchConfig {
    fn default_impostor_count() -> usize {
        1
    }

    /// Creates a configuration with one impostor and default modifiers
    pub fn new(category: CategoryId) -> Self {
        Self {
            category,
            impostor_count: Self::default_impostor_count(),
            modifiers: Modifiers::default(),
        }
    }

    /// The effective impostor count for a roster of `player_count` players
    ///
    /// Clamped to `min(requested, player_count - 1)` so at least one player
    /// is never an impostor. A single-player roster yields 0.
    pub fn clamped_impostor_count(&self, player_count: usize) -> usize {
        self.impostor_count.min(player_count.saturating_sub(1))
    }
}
