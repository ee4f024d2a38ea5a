//! Match lifecycle and reveal flow
//!
//! This module drives the small state machine around one match: a host
//! configures a roster and options, role assignment runs, and the shared
//! device then walks through the reveal cards in turn order. A host owns at
//! most one match; starting a new one replaces the previous one with no
//! history kept.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    assign,
    catalog::CategoryId,
    config::{MatchConfig, Modifiers},
    player::{self, Role, RosterError},
    store::{HostId, MatchId, Store},
};

/// Where a host currently stands in the match lifecycle
///
/// The phases follow each other in one direction; the only way back from
/// [`Phase::InProgress`] is starting a new match, which replaces the old
/// one and lands in `InProgress` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No match exists for this host
    Idle,
    /// A match record exists but roles have not been dealt
    Configuring,
    /// Roles are dealt and the reveal sequence may run
    InProgress,
}

/// Derives the host's current phase from the stored match
///
/// Callers showing the in-progress screen should redirect to configuration
/// for anything other than [`Phase::InProgress`].
pub fn phase<S: Store>(store: &S, host: HostId) -> Phase {
    match store.match_for_host(host) {
        Some((_, state)) if state.in_progress => Phase::InProgress,
        Some(_) => Phase::Configuring,
        None => Phase::Idle,
    }
}

/// The stored description of one match
///
/// Created when the host submits the configuration form, mutated exactly
/// once by role assignment, read by the reveal screens, and deleted when
/// the host starts the next match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// The category the match draws from
    pub category: CategoryId,
    /// Effective number of impostors after clamping against the roster
    pub impostor_count: usize,
    /// The modifiers the match was started with
    pub modifiers: Modifiers,
    /// Whether roles have been dealt and the reveal may run
    pub in_progress: bool,
    /// Copy of the chosen pack's principal word, kept for display
    pub secret_word: String,
}

/// What the host sees after successfully starting a match
///
/// Deliberately excludes anything secret: who is impostor, who is decoy,
/// and the words stay on the individual reveal cards.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    /// Identifier of the freshly created match
    pub match_id: MatchId,
    /// The category the match plays with
    pub category: CategoryId,
    /// Number of players in the reveal sequence
    pub player_count: usize,
    /// Effective number of impostors after clamping
    pub impostor_count: usize,
}

impl MatchSummary {
    /// Converts the summary to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// One player's screen in the reveal sequence
///
/// Cards come out in turn order. The `role` is what the card *shows*: a
/// decoy who is not supposed to know sees `Innocent` here even though the
/// stored role differs.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealCard {
    /// The player this card belongs to
    pub name: String,
    /// The role displayed to the player
    pub role: Role,
    /// The word displayed to the player (empty for impostors outside hard
    /// mode)
    pub word: String,
    /// Fellow impostors, present only on impostor cards when the
    /// sibling-impostors modifier is on and there is more than one impostor
    pub accomplices: Option<Vec<String>>,
}

impl RevealCard {
    /// Converts the card to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Errors that can occur when starting a match
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// The submitted names do not form a usable roster
    #[error(transparent)]
    Roster(#[from] RosterError),
    /// Role assignment could not run
    #[error(transparent)]
    Assign(#[from] assign::Error),
}

/// Errors that can occur when reading reveal data
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealError {
    /// The host has no match in progress; the caller should return to
    /// configuration
    #[error("no match is in progress for this host")]
    MatchNotFound,
}

/// Starts a match for a host: validates the roster, replaces any previous
/// match, runs role assignment, and persists the outcome
///
/// The transition is all-or-nothing with respect to the new match: when the
/// chosen category has no packs, nothing is persisted and the host ends up
/// with no match at all. The anti-repeat memory is read before assignment
/// and overwritten afterwards — but only when the new match actually has an
/// impostor, so a degenerate single-player match never erases it. The
/// category play counter is incremented exactly once per successful start.
///
/// # Errors
///
/// * [`StartError::Roster`] - the submitted names were unusable; any
///   previous match is left untouched
/// * [`StartError::Assign`] - the category has no word packs; the previous
///   match is already deleted at that point
pub fn start_match<S: Store>(
    store: &mut S,
    rng: &mut fastrand::Rng,
    host: HostId,
    submitted_names: &[String],
    config: &MatchConfig,
) -> Result<MatchSummary, StartError> {
    let roster = player::build_roster(submitted_names)?;

    store.delete_match(host);

    let packs = store.list_word_packs(config.category);
    let memory = store.host_memory(host);
    let assignment = assign::assign(&roster, config, &packs, memory.as_deref(), rng)?;

    let state = MatchState {
        category: config.category,
        impostor_count: assignment.tally[Role::Impostor],
        modifiers: config.modifiers,
        in_progress: true,
        secret_word: assignment.pack.principal.clone(),
    };

    let match_id = store.create_match(host, state);
    let player_count = assignment.players.len();
    let impostor_count = assignment.tally[Role::Impostor];
    store.create_players(match_id, assignment.players);

    if let Some(first) = &assignment.first_impostor {
        store.set_host_memory(host, first);
    }
    store.increment_play_count(config.category);

    tracing::debug!(%host, %match_id, player_count, impostor_count, "match started");

    Ok(MatchSummary {
        match_id,
        category: config.category,
        player_count,
        impostor_count,
    })
}

/// Produces the reveal cards for the host's in-progress match, in turn order
///
/// The cards apply the presentation modifiers: a decoy's card reports
/// `Innocent` when `decoy_knows_role` is off, and impostor cards list their
/// fellow impostors when `sibling_impostors` is on.
///
/// # Errors
///
/// Returns [`RevealError::MatchNotFound`] when the host has no match or the
/// match is not in progress; the caller redirects to configuration.
pub fn reveal_data<S: Store>(store: &S, host: HostId) -> Result<Vec<RevealCard>, RevealError> {
    let (match_id, state) = store
        .match_for_host(host)
        .ok_or(RevealError::MatchNotFound)?;
    if !state.in_progress {
        return Err(RevealError::MatchNotFound);
    }

    let players = store
        .players(match_id)
        .into_iter()
        .sorted_by_key(|player| player.turn_order)
        .collect_vec();

    let impostor_names = players
        .iter()
        .filter(|player| player.role == Role::Impostor)
        .map(|player| player.name.clone())
        .collect_vec();

    let cards = players
        .into_iter()
        .map(|player| {
            let accomplices = (state.modifiers.sibling_impostors
                && player.role == Role::Impostor
                && impostor_names.len() > 1)
                .then(|| {
                    impostor_names
                        .iter()
                        .filter(|name| **name != player.name)
                        .cloned()
                        .collect_vec()
                });

            let role = match player.role {
                Role::Decoy if !state.modifiers.decoy_knows_role => Role::Innocent,
                role => role,
            };

            RevealCard {
                name: player.name,
                role,
                word: player.assigned_word,
                accomplices,
            }
        })
        .collect_vec();

    Ok(cards)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        catalog::{Category, WordPack},
        store::InMemoryStore,
    };

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn seeded_store() -> (InMemoryStore, CategoryId) {
        let mut store = InMemoryStore::new();
        let category = store.add_category(Category::new("Places", "ana")).unwrap();
        store
            .add_pack(category, WordPack::new("beach", "island", "desert"))
            .unwrap();
        (store, category)
    }

    #[test]
    fn test_start_match_happy_path() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(42);

        let summary = start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto", "Carla", "Dani"]),
            &MatchConfig::new(category),
        )
        .unwrap();

        assert_eq!(summary.player_count, 4);
        assert_eq!(summary.impostor_count, 1);
        assert_eq!(summary.category, category);
        assert_eq!(phase(&store, host), Phase::InProgress);
        assert_eq!(store.category(category).unwrap().play_count, 1);

        // Memory now holds the first impostor's name.
        let memory = store.host_memory(host).unwrap();
        assert!(["Ana", "Beto", "Carla", "Dani"].contains(&memory.as_str()));

        let state = store.match_for_host(host).unwrap().1;
        assert!(state.in_progress);
        assert_eq!(state.secret_word, "beach");
    }

    #[test]
    fn test_reveal_cards_in_turn_order() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(42);

        start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto", "Carla", "Dani"]),
            &MatchConfig::new(category),
        )
        .unwrap();

        let cards = reveal_data(&store, host).unwrap();
        let card_names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(card_names, ["Ana", "Beto", "Carla", "Dani"]);

        let impostors = cards.iter().filter(|c| c.role == Role::Impostor).count();
        assert_eq!(impostors, 1);
        for card in &cards {
            match card.role {
                Role::Impostor => assert_eq!(card.word, ""),
                Role::Innocent => assert_eq!(card.word, "beach"),
                Role::Decoy => unreachable!("decoy disabled"),
            }
        }
    }

    #[test]
    fn test_requested_count_clamped_through_lifecycle() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut config = MatchConfig::new(category);
        config.impostor_count = 10;

        let summary = start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["A", "B", "C", "D", "E"]),
            &config,
        )
        .unwrap();

        assert_eq!(summary.impostor_count, 4);
        assert_eq!(store.match_for_host(host).unwrap().1.impostor_count, 4);
    }

    #[test]
    fn test_no_packs_aborts_without_persisting() {
        let mut store = InMemoryStore::new();
        let empty = store.add_category(Category::new("Empty", "ana")).unwrap();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(1);

        let result = start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto"]),
            &MatchConfig::new(empty),
        );

        assert_eq!(
            result.unwrap_err(),
            StartError::Assign(assign::Error::NoPacksAvailable)
        );
        assert_eq!(phase(&store, host), Phase::Idle);
        assert!(store.match_for_host(host).is_none());
        assert_eq!(store.host_memory(host), None);
        assert_eq!(store.category(empty).unwrap().play_count, 0);
    }

    #[test]
    fn test_empty_roster_keeps_previous_match() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(1);

        let first = start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto"]),
            &MatchConfig::new(category),
        )
        .unwrap();

        let result = start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["", "  "]),
            &MatchConfig::new(category),
        );

        assert_eq!(result.unwrap_err(), StartError::Roster(RosterError::Empty));
        assert_eq!(store.match_for_host(host).unwrap().0, first.match_id);
        assert_eq!(phase(&store, host), Phase::InProgress);
    }

    #[test]
    fn test_new_match_replaces_previous() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let roster = names(&["Ana", "Beto", "Carla"]);

        let first = start_match(&mut store, &mut rng, host, &roster, &MatchConfig::new(category))
            .unwrap();
        let second = start_match(&mut store, &mut rng, host, &roster, &MatchConfig::new(category))
            .unwrap();

        assert_ne!(first.match_id, second.match_id);
        assert_eq!(store.match_for_host(host).unwrap().0, second.match_id);
        assert_eq!(store.category(category).unwrap().play_count, 2);
    }

    #[test]
    fn test_anti_repeat_memory_feeds_next_match() {
        // With two players and one impostor, a repeat survives ten
        // reshuffles only once in 2^10 runs, so back-to-back matches almost
        // never open with the same impostor.
        let mut repeats = 0;
        for seed in 0..100 {
            let (mut store, category) = seeded_store();
            let host = HostId::new();
            let mut rng = fastrand::Rng::with_seed(seed);
            let roster = names(&["Ana", "Beto"]);

            start_match(&mut store, &mut rng, host, &roster, &MatchConfig::new(category))
                .unwrap();
            let first = store.host_memory(host).unwrap();

            start_match(&mut store, &mut rng, host, &roster, &MatchConfig::new(category))
                .unwrap();
            let second = store.host_memory(host).unwrap();

            if first == second {
                repeats += 1;
            }
        }

        assert!(repeats < 5, "memory repeated {repeats} times out of 100");
    }

    #[test]
    fn test_reveal_without_match() {
        let store = InMemoryStore::new();
        assert_eq!(
            reveal_data(&store, HostId::new()),
            Err(RevealError::MatchNotFound)
        );
    }

    #[test]
    fn test_reveal_requires_in_progress() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();

        store.create_match(
            host,
            MatchState {
                category,
                impostor_count: 1,
                modifiers: Modifiers::default(),
                in_progress: false,
                secret_word: "beach".to_owned(),
            },
        );

        assert_eq!(phase(&store, host), Phase::Configuring);
        assert_eq!(reveal_data(&store, host), Err(RevealError::MatchNotFound));
    }

    #[test]
    fn test_unaware_decoy_card_shows_innocent() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(17);
        let mut config = MatchConfig::new(category);
        config.modifiers.use_decoy = true;
        config.modifiers.decoy_knows_role = false;

        start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto", "Carla", "Dani"]),
            &config,
        )
        .unwrap();

        let cards = reveal_data(&store, host).unwrap();
        let decoy_card = cards.iter().find(|c| c.word == "island").unwrap();
        assert_eq!(decoy_card.role, Role::Innocent);
        assert!(cards.iter().all(|c| c.role != Role::Decoy));
    }

    #[test]
    fn test_aware_decoy_card_shows_decoy() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(17);
        let mut config = MatchConfig::new(category);
        config.modifiers.use_decoy = true;

        start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto", "Carla", "Dani"]),
            &config,
        )
        .unwrap();

        let cards = reveal_data(&store, host).unwrap();
        let decoy_card = cards.iter().find(|c| c.role == Role::Decoy).unwrap();
        assert_eq!(decoy_card.word, "island");
    }

    #[test]
    fn test_sibling_impostors_see_each_other() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(23);
        let mut config = MatchConfig::new(category);
        config.impostor_count = 3;

        start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto", "Carla", "Dani", "Eva"]),
            &config,
        )
        .unwrap();

        let cards = reveal_data(&store, host).unwrap();
        let impostor_cards: Vec<_> = cards.iter().filter(|c| c.role == Role::Impostor).collect();
        assert_eq!(impostor_cards.len(), 3);

        for card in &impostor_cards {
            let accomplices = card.accomplices.as_ref().unwrap();
            assert_eq!(accomplices.len(), 2);
            assert!(!accomplices.contains(&card.name));
        }
    }

    #[test]
    fn test_lone_wolves_get_no_accomplices() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(23);
        let mut config = MatchConfig::new(category);
        config.impostor_count = 2;
        config.modifiers.sibling_impostors = false;

        start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto", "Carla", "Dani"]),
            &config,
        )
        .unwrap();

        let cards = reveal_data(&store, host).unwrap();
        assert!(cards.iter().all(|c| c.accomplices.is_none()));
    }

    #[test]
    fn test_messages_serialize() {
        let (mut store, category) = seeded_store();
        let host = HostId::new();
        let mut rng = fastrand::Rng::with_seed(42);

        let summary = start_match(
            &mut store,
            &mut rng,
            host,
            &names(&["Ana", "Beto"]),
            &MatchConfig::new(category),
        )
        .unwrap();

        let message = summary.to_message();
        assert!(message.contains("player_count"));

        let cards = reveal_data(&store, host).unwrap();
        let card_message = cards[0].to_message();
        assert!(card_message.contains("Ana"));
        // Absent accomplices are omitted, not serialized as null.
        assert!(!card_message.contains("accomplices"));
    }
}
