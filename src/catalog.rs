//! Categories and their word packs
//!
//! This module defines the word catalog the game draws from: categories
//! identified by a case-insensitively unique name, each owning a set of
//! immutable word packs. A pack is a triple of words from which the
//! role-specific words of one round are derived.

use std::{fmt::Display, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

/// A unique identifier for a category
///
/// Categories keep their identity even when renamed, so packs, matches and
/// play counters reference them by ID rather than by name.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Creates a new random category ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CategoryId {
    /// Creates a new random category ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CategoryId {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CategoryId {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A triple of words belonging to a category
///
/// One pack is chosen at random per round. Innocents see `principal`, the
/// decoy sees `related_a`, and impostors see `related_b` when hard mode is
/// on (nothing otherwise). Packs are immutable once created; empty strings
/// are accepted as-is, only lengths are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WordPack {
    /// The secret word revealed to innocents
    #[garde(length(max = crate::constants::word_pack::MAX_WORD_LENGTH))]
    pub principal: String,
    /// The decoy's word, a close relative of the principal word
    #[garde(length(max = crate::constants::word_pack::MAX_WORD_LENGTH))]
    pub related_a: String,
    /// The impostors' word in hard mode, a more distant relative
    #[garde(length(max = crate::constants::word_pack::MAX_WORD_LENGTH))]
    pub related_b: String,
}

impl WordPack {
    /// Creates a pack from its three words
    pub fn new(
        principal: impl Into<String>,
        related_a: impl Into<String>,
        related_b: impl Into<String>,
    ) -> Self {
        Self {
            principal: principal.into(),
            related_a: related_a.into(),
            related_b: related_b.into(),
        }
    }
}

/// Errors that can occur when recording a category vote
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteError {
    /// The vote value falls outside the accepted 1..=5 range
    #[error("vote must be between 1 and 5")]
    OutOfRange,
}

/// A named collection of word packs
///
/// Category names are unique case-insensitively; the store enforces this
/// through [`Category::name_key`]. The vote aggregates derive a display
/// rating, and the play counter tracks how often the category was used to
/// start a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Category {
    /// Display name of the category
    #[garde(length(min = 1, max = crate::constants::category::MAX_NAME_LENGTH))]
    pub name: String,
    /// Whether the category was created from the moderation panel
    #[garde(skip)]
    pub created_by_admin: bool,
    /// Whether the category is visible to every host
    #[garde(skip)]
    pub public: bool,
    /// Attribution shown next to community categories
    #[garde(length(max = crate::constants::category::MAX_AUTHOR_LENGTH))]
    pub author: String,
    /// Sum of all vote values received
    #[garde(skip)]
    pub vote_sum: u64,
    /// Number of votes received
    #[garde(skip)]
    pub vote_count: u64,
    /// Number of matches started with this category
    #[garde(skip)]
    pub play_count: u64,
}

impl Category {
    /// Creates a fresh community category with no votes or plays
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_by_admin: false,
            public: true,
            author: author.into(),
            vote_sum: 0,
            vote_count: 0,
            play_count: 0,
        }
    }

    /// The case-folded key under which name uniqueness is enforced
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Average rating rounded to one decimal place, or 0 with no votes
    pub fn rating(&self) -> f64 {
        if self.vote_count == 0 {
            return 0.0;
        }
        let average = self.vote_sum as f64 / self.vote_count as f64;
        (average * 10.0).round() / 10.0
    }

    /// Records one vote of `points` into the aggregates
    ///
    /// # Errors
    ///
    /// Returns [`VoteError::OutOfRange`] when `points` is not within 1..=5;
    /// the aggregates are left untouched in that case.
    pub fn add_vote(&mut self, points: u8) -> Result<(), VoteError> {
        if !(crate::constants::vote::MIN_POINTS..=crate::constants::vote::MAX_POINTS)
            .contains(&points)
        {
            return Err(VoteError::OutOfRange);
        }
        self.vote_sum += u64::from(points);
        self.vote_count += 1;
        Ok(())
    }
}
