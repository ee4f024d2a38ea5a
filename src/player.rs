//! Players and their roles within a single match
//!
//! Players are ephemeral: they exist for exactly one match and are discarded
//! when the host starts the next one. This module defines the role taxonomy
//! and the construction of a validated roster from the names typed into the
//! shared device.

use enum_map::Enum;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The secret role a player holds for one match
///
/// Every player holds exactly one role; the partition into impostors, at
/// most one decoy, and innocents is exhaustive and disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Role {
    /// Does not know the secret word (or knows a distant relative of it in
    /// hard mode)
    Impostor,
    /// Innocent-aligned but deliberately given a different word to create
    /// ambiguity
    Decoy,
    /// Knows the secret word
    Innocent,
}

impl Default for Role {
    /// Players start out innocent until roles are assigned
    fn default() -> Self {
        Self::Innocent
    }
}

/// One participant in one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name as typed on the device, trimmed
    pub name: String,
    /// 1-based position in the reveal sequence, equal to submission order
    pub turn_order: usize,
    /// The role assigned to this player
    pub role: Role,
    /// The word shown on this player's reveal card (empty for impostors
    /// outside hard mode)
    pub assigned_word: String,
}

impl Player {
    /// Creates an unassigned player at the given turn position
    pub fn new(name: impl Into<String>, turn_order: usize) -> Self {
        Self {
            name: name.into(),
            turn_order,
            role: Role::default(),
            assigned_word: String::new(),
        }
    }
}

/// Errors that can occur while building a roster from submitted names
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterError {
    /// No usable names were submitted
    #[error("no players were submitted")]
    Empty,
    /// A name exceeds the maximum allowed length
    #[error("player name is too long")]
    TooLong,
    /// A name contains inappropriate content
    #[error("player name is inappropriate")]
    Inappropriate,
    /// More players than one device can reasonably cycle through
    #[error("too many players")]
    TooMany,
}

/// Builds the ordered roster for a match from the submitted names
///
/// Names are trimmed of surrounding whitespace; entries that end up blank
/// are skipped silently, mirroring how the configuration form treats unused
/// input rows. The surviving names get 1-based turn orders in submission
/// order.
///
/// # Errors
///
/// * [`RosterError::Empty`] - zero non-blank names remain
/// * [`RosterError::TooLong`] - a trimmed name exceeds the length cap
/// * [`RosterError::Inappropriate`] - a name trips the content filter
/// * [`RosterError::TooMany`] - the roster exceeds the device cap
pub fn build_roster(submitted_names: &[String]) -> Result<Vec<Player>, RosterError> {
    let mut roster = Vec::new();

    for raw in submitted_names {
        let name = rustrict::trim_whitespace(raw);
        if name.is_empty() {
            continue;
        }
        if name.len() > crate::constants::player::MAX_NAME_LENGTH {
            return Err(RosterError::TooLong);
        }
        if name.is_inappropriate() {
            return Err(RosterError::Inappropriate);
        }
        roster.push(Player::new(name, roster.len() + 1));
    }

    if roster.is_empty() {
        return Err(RosterError::Empty);
    }
    if roster.len() > crate::constants::player::MAX_ROSTER_SIZE {
        return Err(RosterError::TooMany);
    }

    Ok(roster)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_roster_preserves_submission_order() {
        let roster = build_roster(&names(&["Ana", "Beto", "Carla"])).unwrap();

        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].name, "Ana");
        assert_eq!(roster[1].name, "Beto");
        assert_eq!(roster[2].name, "Carla");
        assert_eq!(
            roster.iter().map(|p| p.turn_order).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_roster_trims_and_skips_blanks() {
        let roster = build_roster(&names(&["  Ana  ", "", "   ", "Beto"])).unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].name, "Ana");
        assert_eq!(roster[1].name, "Beto");
        // Turn order counts only the survivors
        assert_eq!(roster[1].turn_order, 2);
    }

    #[test]
    fn test_roster_all_blank_is_empty() {
        assert_eq!(
            build_roster(&names(&["", "   ", "\t"])),
            Err(RosterError::Empty)
        );
        assert_eq!(build_roster(&[]), Err(RosterError::Empty));
    }

    #[test]
    fn test_roster_name_too_long() {
        let long = "a".repeat(crate::constants::player::MAX_NAME_LENGTH + 1);
        assert_eq!(build_roster(&[long]), Err(RosterError::TooLong));
    }

    #[test]
    fn test_roster_name_at_cap_allowed() {
        let max = "a".repeat(crate::constants::player::MAX_NAME_LENGTH);
        assert!(build_roster(&[max]).is_ok());
    }

    #[test]
    fn test_roster_inappropriate_name_rejected() {
        assert_eq!(
            build_roster(&names(&["Ana", "fuck"])),
            Err(RosterError::Inappropriate)
        );
    }

    #[test]
    fn test_roster_too_many_players() {
        let crowd: Vec<String> = (0..=crate::constants::player::MAX_ROSTER_SIZE)
            .map(|i| format!("P{i}"))
            .collect();
        assert_eq!(build_roster(&crowd), Err(RosterError::TooMany));
    }

    #[test]
    fn test_new_player_is_innocent_without_word() {
        let player = Player::new("Ana", 1);
        assert_eq!(player.role, Role::Innocent);
        assert_eq!(player.assigned_word, "");
    }
}
