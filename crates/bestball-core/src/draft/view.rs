// Filter & view engine: narrows the catalog to what the user asked to see.
//
// Filters are predicates on player columns; the view mode is a predicate on
// draft status. Both keep catalog order and hand back references into the
// catalog, so ids on screen are the ids the draft state understands.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::PlayerRecord;
use crate::draft::state::{DraftState, PlayerStatus};

// ---------------------------------------------------------------------------
// Team rank tiers
// ---------------------------------------------------------------------------

/// Team-rank bands, inclusive and non-overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankTier {
    /// Ranks 1-5.
    Elite,
    /// Ranks 6-10.
    Good,
    /// Ranks 11-20.
    Mid,
    /// Ranks 21-30.
    Weak,
}

impl RankTier {
    pub const ALL: [RankTier; 4] = [RankTier::Elite, RankTier::Good, RankTier::Mid, RankTier::Weak];

    /// Inclusive rank bounds.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            RankTier::Elite => (1, 5),
            RankTier::Good => (6, 10),
            RankTier::Mid => (11, 20),
            RankTier::Weak => (21, 30),
        }
    }

    pub fn contains(&self, team_rank: u32) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&team_rank)
    }

    /// Parse "1-5", "6-10", "11-20", "21-30" or the tier name.
    pub fn from_str_tier(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1-5" | "elite" => Some(RankTier::Elite),
            "6-10" | "good" => Some(RankTier::Good),
            "11-20" | "mid" => Some(RankTier::Mid),
            "21-30" | "weak" => Some(RankTier::Weak),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankTier::Elite => "1-5 (Elite)",
            RankTier::Good => "6-10 (Good)",
            RankTier::Mid => "11-20 (Mid)",
            RankTier::Weak => "21-30 (Weak)",
        }
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// View modes
// ---------------------------------------------------------------------------

/// Which draft statuses a board shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Available,
    /// Everything drafted, the user's own picks included.
    Drafted,
    /// Drafted by other teams only.
    OpponentDrafted,
    MyRoster,
    All,
}

impl ViewMode {
    pub fn includes(&self, status: PlayerStatus) -> bool {
        match self {
            ViewMode::Available => status == PlayerStatus::Available,
            ViewMode::Drafted => status != PlayerStatus::Available,
            ViewMode::OpponentDrafted => status == PlayerStatus::OpponentDrafted,
            ViewMode::MyRoster => status == PlayerStatus::Mine,
            ViewMode::All => true,
        }
    }

    pub fn from_str_mode(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" | "avail" => Some(ViewMode::Available),
            "drafted" => Some(ViewMode::Drafted),
            "opponents" | "opponent" => Some(ViewMode::OpponentDrafted),
            "mine" | "roster" | "my" => Some(ViewMode::MyRoster),
            "all" => Some(ViewMode::All),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Available => "Available Only",
            ViewMode::Drafted => "Drafted Only",
            ViewMode::OpponentDrafted => "Opponent Picks",
            ViewMode::MyRoster => "My Roster",
            ViewMode::All => "All Players",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Column filters
// ---------------------------------------------------------------------------

/// User-selected column filters. Empty sets and an empty search match all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFilter {
    pub positions: BTreeSet<String>,
    pub teams: BTreeSet<String>,
    pub rank_tier: Option<RankTier>,
    pub finals_games: BTreeSet<u32>,
    pub search: String,
}

impl PlayerFilter {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
            && self.teams.is_empty()
            && self.rank_tier.is_none()
            && self.finals_games.is_empty()
            && self.search.trim().is_empty()
    }

    /// Apply every predicate in order: position, team, rank tier, finals
    /// games, then case-insensitive name search.
    pub fn matches(&self, p: &PlayerRecord) -> bool {
        if !self.positions.is_empty()
            && !self.positions.iter().any(|pos| pos.eq_ignore_ascii_case(&p.position))
        {
            return false;
        }
        if !self.teams.is_empty() && !self.teams.iter().any(|t| t.eq_ignore_ascii_case(&p.team)) {
            return false;
        }
        if let Some(tier) = self.rank_tier {
            if !tier.contains(p.team_rank) {
                return false;
            }
        }
        if !self.finals_games.is_empty() && !self.finals_games.contains(&p.finals_games) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !p.name.to_lowercase().contains(&needle) {
            return false;
        }
        true
    }
}

/// Players passing `filter`, in catalog order.
pub fn filter_players<'a>(players: &'a [PlayerRecord], filter: &PlayerFilter) -> Vec<&'a PlayerRecord> {
    players.iter().filter(|p| filter.matches(p)).collect()
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// One visible row: the player and their current draft status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoardRow<'a> {
    pub player: &'a PlayerRecord,
    pub status: PlayerStatus,
}

/// Filtered players restricted to the view mode, tagged with status.
///
/// An empty result is a valid "no match" board, not an error.
pub fn build_board<'a>(
    players: &'a [PlayerRecord],
    filter: &PlayerFilter,
    draft: &DraftState,
    mode: ViewMode,
) -> Vec<BoardRow<'a>> {
    filter_players(players, filter)
        .into_iter()
        .map(|player| BoardRow {
            player,
            status: draft.status(player.id),
        })
        .filter(|row| mode.includes(row.status))
        .collect()
}
