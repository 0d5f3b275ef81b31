// Draft state: which players are gone, and which of them are ours.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::PlayerId;

/// Where a player stands in the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Not drafted by anyone.
    Available,
    /// Drafted by another team.
    OpponentDrafted,
    /// On the user's roster.
    Mine,
}

impl PlayerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerStatus::Available => "available",
            PlayerStatus::OpponentDrafted => "drafted",
            PlayerStatus::Mine => "mine",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("player {id} cannot be drafted: already {status}")]
    InvalidTransition { id: PlayerId, status: PlayerStatus },

    #[error("roster player {id} is duplicated or missing from the drafted set")]
    InconsistentRoster { id: PlayerId },
}

/// The drafted set and the user's roster for one session.
///
/// Invariant: every id in `roster` is also in `drafted`, and `roster` holds
/// no duplicates. All mutation goes through the transition methods below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DraftStateRepr")]
pub struct DraftState {
    drafted: BTreeSet<PlayerId>,
    /// The user's picks in pick order.
    roster: Vec<PlayerId>,
}

/// Unchecked wire form; deserialized states pass through `TryFrom`.
#[derive(Deserialize)]
struct DraftStateRepr {
    drafted: BTreeSet<PlayerId>,
    roster: Vec<PlayerId>,
}

impl TryFrom<DraftStateRepr> for DraftState {
    type Error = DraftError;

    fn try_from(repr: DraftStateRepr) -> Result<Self, Self::Error> {
        let mut seen = BTreeSet::new();
        for &id in &repr.roster {
            if !repr.drafted.contains(&id) || !seen.insert(id) {
                return Err(DraftError::InconsistentRoster { id });
            }
        }
        Ok(Self {
            drafted: repr.drafted,
            roster: repr.roster,
        })
    }
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, id: PlayerId) -> PlayerStatus {
        if !self.drafted.contains(&id) {
            PlayerStatus::Available
        } else if self.roster.contains(&id) {
            PlayerStatus::Mine
        } else {
            PlayerStatus::OpponentDrafted
        }
    }

    pub fn is_available(&self, id: PlayerId) -> bool {
        !self.drafted.contains(&id)
    }

    /// Draft a player onto the user's roster.
    pub fn draft(&mut self, id: PlayerId) -> Result<(), DraftError> {
        self.require_available(id)?;
        self.drafted.insert(id);
        self.roster.push(id);
        info!("drafted player {} (roster size {})", id, self.roster.len());
        Ok(())
    }

    /// Record another team's pick.
    pub fn mark_drafted(&mut self, id: PlayerId) -> Result<(), DraftError> {
        self.require_available(id)?;
        self.drafted.insert(id);
        info!("marked player {} as drafted by an opponent", id);
        Ok(())
    }

    /// Take back the user's most recent pick, returning the player to the
    /// available pool. Returns `None` (and changes nothing) when the roster
    /// is empty.
    pub fn undo(&mut self) -> Option<PlayerId> {
        let id = self.roster.pop()?;
        self.drafted.remove(&id);
        info!("undid pick of player {}", id);
        Some(id)
    }

    /// Return every player to the available pool.
    pub fn reset(&mut self) {
        info!(
            "resetting draft ({} drafted, {} rostered)",
            self.drafted.len(),
            self.roster.len()
        );
        self.drafted.clear();
        self.roster.clear();
    }

    pub fn drafted_ids(&self) -> &BTreeSet<PlayerId> {
        &self.drafted
    }

    /// The user's picks in pick order.
    pub fn roster_ids(&self) -> &[PlayerId] {
        &self.roster
    }

    fn require_available(&self, id: PlayerId) -> Result<(), DraftError> {
        match self.status(id) {
            PlayerStatus::Available => Ok(()),
            status => {
                warn!("rejected pick of player {}: already {}", id, status);
                Err(DraftError::InvalidTransition { id, status })
            }
        }
    }
}
