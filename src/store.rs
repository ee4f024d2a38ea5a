//! The storage seam and an in-memory reference implementation
//!
//! The core never talks to a database directly. Everything it needs from the
//! outside world goes through the [`Store`] trait: word packs per category,
//! the host's anti-repeat memory, the single active match per host, and the
//! category play counter. [`InMemoryStore`] implements the trait for tests
//! and single-process embedders; a real deployment backs it with whatever
//! persistence the application already has.

use std::{
    collections::HashMap,
    fmt::Display,
    str::FromStr,
};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::{Category, CategoryId, WordPack},
    game::MatchState,
    player::Player,
};

/// A unique identifier for a host (game-master) session
///
/// Each host device drives exactly one match at a time; the host ID is the
/// key under which that match and the anti-repeat memory are stored.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct HostId(Uuid);

impl HostId {
    /// Creates a new random host ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HostId {
    /// Creates a new random host ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for HostId {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for HostId {
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

/// A unique identifier for one match
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct MatchId(Uuid);

impl MatchId {
    /// Creates a new random match ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    /// Creates a new random match ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MatchId {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MatchId {
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

/// Errors that can occur when maintaining the category catalog
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    /// Another category already uses this name (compared case-insensitively)
    #[error("category name is already taken")]
    DuplicateName,
    /// The referenced category does not exist
    #[error("category does not exist")]
    UnknownCategory,
}

/// What the match core consumes from the surrounding application's storage
///
/// Implementations hold the word catalog, one optional active match per
/// host, that match's players, and the per-host anti-repeat memory. All
/// operations address a single row; no transactional coupling between them
/// is assumed.
pub trait Store {
    /// Lists all word packs belonging to a category
    ///
    /// An unknown category yields an empty list, which the engine reports
    /// as [`NoPacksAvailable`](crate::assign::Error::NoPacksAvailable).
    fn list_word_packs(&self, category: CategoryId) -> Vec<WordPack>;

    /// Reads the host's anti-repeat memory: the name of the previous
    /// round's first impostor, if any round completed before
    fn host_memory(&self, host: HostId) -> Option<String>;

    /// Overwrites the host's anti-repeat memory
    ///
    /// The memory is never cleared, only replaced by the next assignment.
    fn set_host_memory(&mut self, host: HostId, name: &str);

    /// Stores a new match for the host and returns its ID
    ///
    /// A host has at most one match; any previous match for the same host
    /// is replaced together with its players.
    fn create_match(&mut self, host: HostId, state: MatchState) -> MatchId;

    /// Deletes the host's match and its players, if present
    fn delete_match(&mut self, host: HostId);

    /// Looks up the host's match
    fn match_for_host(&self, host: HostId) -> Option<(MatchId, MatchState)>;

    /// Stores the finalized players of a match, roles and words included
    fn create_players(&mut self, match_id: MatchId, players: Vec<Player>);

    /// Reads the players of a match (in no particular order)
    fn players(&self, match_id: MatchId) -> Vec<Player>;

    /// Adds one play to the category's counter
    ///
    /// Different hosts may start matches with the same category at the same
    /// time, so backing stores must implement this as a single atomic
    /// increment rather than read-modify-write.
    fn increment_play_count(&mut self, category: CategoryId);
}

/// An in-memory [`Store`] for tests and single-process embedders
#[derive(Debug, Default)]
pub struct InMemoryStore {
    categories: HashMap<CategoryId, Category>,
    packs: HashMap<CategoryId, Vec<WordPack>>,
    matches: HashMap<HostId, (MatchId, MatchState)>,
    players: HashMap<MatchId, Vec<Player>>,
    memories: HashMap<HostId, String>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category, enforcing case-insensitive name uniqueness
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateName`] when another category already
    /// uses the name under case folding.
    pub fn add_category(&mut self, category: Category) -> Result<CategoryId, CatalogError> {
        let key = category.name_key();
        if self
            .categories
            .values()
            .any(|existing| existing.name_key() == key)
        {
            return Err(CatalogError::DuplicateName);
        }

        let id = CategoryId::new();
        self.categories.insert(id, category);
        self.packs.insert(id, Vec::new());
        Ok(id)
    }

    /// Adds a word pack to an existing category
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCategory`] when the category does not
    /// exist.
    pub fn add_pack(&mut self, category: CategoryId, pack: WordPack) -> Result<(), CatalogError> {
        self.packs
            .get_mut(&category)
            .ok_or(CatalogError::UnknownCategory)?
            .push(pack);
        Ok(())
    }

    /// Looks up a category by ID
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }
}

impl Store for InMemoryStore {
    fn list_word_packs(&self, category: CategoryId) -> Vec<WordPack> {
        self.packs.get(&category).cloned().unwrap_or_default()
    }

    fn host_memory(&self, host: HostId) -> Option<String> {
        self.memories.get(&host).cloned()
    }

    fn set_host_memory(&mut self, host: HostId, name: &str) {
        self.memories.insert(host, name.to_owned());
    }

    fn create_match(&mut self, host: HostId, state: MatchState) -> MatchId {
        let id = MatchId::new();
        if let Some((previous, _)) = self.matches.insert(host, (id, state)) {
            self.players.remove(&previous);
        }
        id
    }

    fn delete_match(&mut self, host: HostId) {
        if let Some((id, _)) = self.matches.remove(&host) {
            self.players.remove(&id);
        }
    }

    fn match_for_host(&self, host: HostId) -> Option<(MatchId, MatchState)> {
        self.matches.get(&host).cloned()
    }

    fn create_players(&mut self, match_id: MatchId, players: Vec<Player>) {
        self.players.insert(match_id, players);
    }

    fn players(&self, match_id: MatchId) -> Vec<Player> {
        self.players.get(&match_id).cloned().unwrap_or_default()
    }

    fn increment_play_count(&mut self, category: CategoryId) {
        if let Some(category) = self.categories.get_mut(&category) {
            category.play_count += 1;
        }
    }
}
