//! Role distribution for one match
//!
//! This module is the brain of the game: given the ordered roster, the match
//! configuration, the category's word packs, and the host's anti-repeat
//! memory, it decides who is impostor, who is the decoy, and which word each
//! player sees. The engine is pure — it performs no I/O, takes its random
//! source as a parameter, and leaves persistence to the caller — so every
//! distribution is reproducible from a seed.

use enum_map::EnumMap;
use thiserror::Error;

use crate::{
    catalog::WordPack,
    config::MatchConfig,
    constants,
    player::{Player, Role},
};

/// Errors that can occur during role assignment
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The chosen category has no word packs to draw from
    #[error("category has no word packs")]
    NoPacksAvailable,
}

/// The finalized outcome of one role distribution
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// The word pack the match plays with
    pub pack: WordPack,
    /// All players in submission order, with roles and words filled in
    pub players: Vec<Player>,
    /// Name of the first impostor, `None` only in the degenerate
    /// zero-impostor case; the caller stores this as the host's new
    /// anti-repeat memory when present
    pub first_impostor: Option<String>,
    /// How many players hold each role
    pub tally: EnumMap<Role, usize>,
}

/// Distributes roles and words across the roster
///
/// The procedure, preserved from the deployed game:
///
/// 1. Pick one pack uniformly at random; its `principal` word is the match's
///    secret word.
/// 2. Shuffle a scratch permutation of the roster. The first
///    `impostor_count` entries (clamped to `roster size - 1`) are the
///    impostor candidates. When the anti-repeat memory names one of them and
///    `compulsive_impostor` is off, reshuffle — at most
///    [`MAX_SHUFFLE_ATTEMPTS`](constants::assignment::MAX_SHUFFLE_ATTEMPTS)
///    times, accepting the final shuffle even if it still collides. The
///    bias is best-effort, not a guarantee.
/// 3. Impostors receive no word, or the pack's `related_b` in hard mode.
///    With `use_decoy`, one uniformly random non-impostor becomes the decoy
///    and receives `related_a`. Everyone left is innocent and receives the
///    secret word.
///
/// The returned players keep their submission order: the shuffle only picks
/// *who* is impostor, never the order of the reveal sequence.
///
/// # Arguments
///
/// * `players` - the validated roster, in submission order
/// * `config` - impostor count and modifiers for this match
/// * `packs` - the word packs of the chosen category
/// * `prior_first_impostor` - the host's anti-repeat memory; empty strings
///   are treated as no memory
/// * `rng` - the random source; seed it for reproducible distributions
///
/// # Errors
///
/// Returns [`Error::NoPacksAvailable`] when `packs` is empty. The caller is
/// expected to surface this so the host can pick another category.
pub fn assign(
    players: &[Player],
    config: &MatchConfig,
    packs: &[WordPack],
    prior_first_impostor: Option<&str>,
    rng: &mut fastrand::Rng,
) -> Result<Assignment, Error> {
    if packs.is_empty() {
        return Err(Error::NoPacksAvailable);
    }
    let pack = packs[rng.usize(..packs.len())].clone();

    let impostor_count = config.clamped_impostor_count(players.len());
    let prior = prior_first_impostor.filter(|name| !name.is_empty());

    // The shuffle runs over indices so the output keeps submission order.
    let mut order: Vec<usize> = (0..players.len()).collect();
    for attempt in 1..=constants::assignment::MAX_SHUFFLE_ATTEMPTS {
        rng.shuffle(&mut order);

        if config.modifiers.compulsive_impostor {
            break;
        }
        let Some(prior) = prior else {
            break;
        };
        let repeats = order[..impostor_count]
            .iter()
            .any(|&index| players[index].name == prior);
        if !repeats {
            break;
        }
        if attempt == constants::assignment::MAX_SHUFFLE_ATTEMPTS {
            tracing::warn!(
                attempts = attempt,
                "reshuffle budget exhausted, accepting a repeated first impostor"
            );
        }
    }

    let mut assigned = players.to_vec();

    let impostor_word = if config.modifiers.hard_mode {
        pack.related_b.clone()
    } else {
        String::new()
    };
    for &index in &order[..impostor_count] {
        assigned[index].role = Role::Impostor;
        assigned[index].assigned_word = impostor_word.clone();
    }

    let mut innocent_pool: Vec<usize> = order[impostor_count..].to_vec();
    if config.modifiers.use_decoy && !innocent_pool.is_empty() {
        let chosen = innocent_pool.swap_remove(rng.usize(..innocent_pool.len()));
        assigned[chosen].role = Role::Decoy;
        assigned[chosen].assigned_word = pack.related_a.clone();
    }

    for &index in &innocent_pool {
        assigned[index].role = Role::Innocent;
        assigned[index].assigned_word = pack.principal.clone();
    }

    let first_impostor = order[..impostor_count]
        .first()
        .map(|&index| players[index].name.clone());

    let mut tally: EnumMap<Role, usize> = EnumMap::default();
    for player in &assigned {
        tally[player.role] += 1;
    }

    Ok(Assignment {
        pack,
        players: assigned,
        first_impostor,
        tally,
    })
}
