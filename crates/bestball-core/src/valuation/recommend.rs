// On-the-clock recommendations: best value, best stack, safest pick.
//
// Only available players are ever considered. All three lists are sorted
// with explicit tie-breaks so identical inputs always give identical picks.

use serde::{Deserialize, Serialize};

use crate::catalog::PlayerRecord;
use crate::draft::state::DraftState;

// ---------------------------------------------------------------------------
// Stack scoring
// ---------------------------------------------------------------------------

/// Bonus for pairing with exactly one rostered teammate.
pub const STACK_PAIR_BONUS: u32 = 6;
/// Bonus for joining exactly two rostered teammates. Three or more earn
/// nothing, capping intentional stacks at three players.
pub const STACK_TRIPLE_BONUS: u32 = 10;
/// Bonus for a team ranked in the top ten.
pub const TOP_TEAM_BONUS: u32 = 3;
pub const TOP_TEAM_RANK: u32 = 10;
/// Bonus for a four-game finals week.
pub const FOUR_GAME_FINALS_BONUS: u32 = 4;
/// Bonus for a favourable finals multiplier.
pub const FINALS_MULT_BONUS: u32 = 2;
pub const FINALS_MULT_THRESHOLD: f64 = 1.04;

/// Rostered players on the same team as `player`.
pub fn teammates_on_roster(player: &PlayerRecord, roster: &[&PlayerRecord]) -> usize {
    roster
        .iter()
        .filter(|r| r.id != player.id && r.team == player.team)
        .count()
}

/// Stack synergy of adding `player` to `roster`. Zero for an empty roster.
pub fn stack_score(player: &PlayerRecord, roster: &[&PlayerRecord]) -> u32 {
    if roster.is_empty() {
        return 0;
    }
    let mut score = match teammates_on_roster(player, roster) {
        1 => STACK_PAIR_BONUS,
        2 => STACK_TRIPLE_BONUS,
        _ => 0,
    };
    if player.team_rank <= TOP_TEAM_RANK {
        score += TOP_TEAM_BONUS;
    }
    if player.finals_games == 4 {
        score += FOUR_GAME_FINALS_BONUS;
    }
    if player.finals_mult >= FINALS_MULT_THRESHOLD {
        score += FINALS_MULT_BONUS;
    }
    score
}

// ---------------------------------------------------------------------------
// Safety scoring
// ---------------------------------------------------------------------------

/// Floor-oriented score: projection, team strength, finals volume, and low
/// shutdown risk.
pub fn safety_score(p: &PlayerRecord) -> f64 {
    p.final_adj_gpp * 0.6
        + (31.0 - p.team_rank as f64) * 10.0
        + p.finals_games as f64 * 20.0
        + (1.0 - p.shutdown_risk) * 100.0
}

// ---------------------------------------------------------------------------
// Ranked lists
// ---------------------------------------------------------------------------

/// How many picks each list returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationLimits {
    pub value: usize,
    pub stack: usize,
    pub safety: usize,
}

impl Default for RecommendationLimits {
    fn default() -> Self {
        RecommendationLimits {
            value: 5,
            stack: 3,
            safety: 3,
        }
    }
}

/// A recommended player and the score that put them on the list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredPick<'a> {
    pub player: &'a PlayerRecord,
    pub score: f64,
}

/// A stack recommendation, with how many teammates are already rostered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StackPick<'a> {
    pub player: &'a PlayerRecord,
    pub score: u32,
    pub teammates: usize,
}

impl StackPick<'_> {
    /// Size of the stack this pick would create.
    pub fn stack_size(&self) -> usize {
        self.teammates + 1
    }
}

/// The three on-the-clock lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations<'a> {
    pub value: Vec<ScoredPick<'a>>,
    pub stack: Vec<StackPick<'a>>,
    pub safety: Vec<ScoredPick<'a>>,
}

impl Recommendations<'_> {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.stack.is_empty() && self.safety.is_empty()
    }
}

/// Rank the available subset of `candidates`.
///
/// - value: `value_z` descending, then lower `adp_rank`, then id
/// - stack: `stack_score` descending, then id
/// - safety: `safety_score` descending, then id
pub fn recommend<'a>(
    candidates: &[&'a PlayerRecord],
    roster: &[&PlayerRecord],
    draft: &DraftState,
    limits: RecommendationLimits,
) -> Recommendations<'a> {
    let available: Vec<&'a PlayerRecord> = candidates
        .iter()
        .copied()
        .filter(|p| draft.is_available(p.id))
        .collect();

    let mut value: Vec<ScoredPick<'a>> = available
        .iter()
        .map(|&player| ScoredPick {
            player,
            score: player.value_z,
        })
        .collect();
    value.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.player.adp_rank.cmp(&b.player.adp_rank))
            .then(a.player.id.cmp(&b.player.id))
    });
    value.truncate(limits.value);

    let mut stack: Vec<StackPick<'a>> = available
        .iter()
        .map(|&player| StackPick {
            player,
            score: stack_score(player, roster),
            teammates: teammates_on_roster(player, roster),
        })
        .collect();
    stack.sort_by(|a, b| b.score.cmp(&a.score).then(a.player.id.cmp(&b.player.id)));
    stack.truncate(limits.stack);

    let mut safety: Vec<ScoredPick<'a>> = available
        .iter()
        .map(|&player| ScoredPick {
            player,
            score: safety_score(player),
        })
        .collect();
    safety.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.player.id.cmp(&b.player.id)));
    safety.truncate(limits.safety);

    Recommendations {
        value,
        stack,
        safety,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlayerId;
    use crate::test_support::player;

    fn ids_of(picks: &[ScoredPick<'_>]) -> Vec<PlayerId> {
        picks.iter().map(|p| p.player.id).collect()
    }

    #[test]
    fn stack_score_zero_for_empty_roster() {
        let mut p = player(0, "A", "BOS", 100.0, 1.0);
        p.team_rank = 1;
        p.finals_games = 4;
        p.finals_mult = 1.1;
        assert_eq!(stack_score(&p, &[]), 0);
    }

    #[test]
    fn stack_score_grows_to_cap() {
        let candidate = player(0, "Cand", "BOS", 100.0, 1.0);
        let t1 = player(1, "T1", "BOS", 90.0, 2.0);
        let t2 = player(2, "T2", "BOS", 80.0, 3.0);
        let t3 = player(3, "T3", "BOS", 70.0, 4.0);
        let other = player(4, "O", "NYK", 60.0, 5.0);

        assert_eq!(stack_score(&candidate, &[&other]), 0);
        assert_eq!(stack_score(&candidate, &[&other, &t1]), 6);
        assert_eq!(stack_score(&candidate, &[&other, &t1, &t2]), 10);
        // No bonus beyond a three-man stack.
        assert_eq!(stack_score(&candidate, &[&other, &t1, &t2, &t3]), 0);
    }

    #[test]
    fn stack_score_team_bonuses() {
        let mut candidate = player(0, "Cand", "BOS", 100.0, 1.0);
        candidate.team_rank = 10;
        candidate.finals_games = 4;
        candidate.finals_mult = 1.04;
        let other = player(1, "O", "NYK", 60.0, 5.0);
        assert_eq!(stack_score(&candidate, &[&other]), 3 + 4 + 2);

        candidate.team_rank = 11;
        candidate.finals_mult = 1.039;
        assert_eq!(stack_score(&candidate, &[&other]), 4);
    }

    #[test]
    fn safety_score_formula() {
        let mut p = player(0, "A", "BOS", 100.0, 1.0);
        p.team_rank = 1;
        p.finals_games = 4;
        p.shutdown_risk = 0.2;
        // 60 + 300 + 80 + 80
        assert!((safety_score(&p) - 520.0).abs() < 1e-9);
    }

    #[test]
    fn drafted_players_never_recommended() {
        let players: Vec<PlayerRecord> = (0..8)
            .map(|i| player(i, "P", "BOS", 100.0 - i as f64, (i + 1) as f64))
            .collect();
        let candidates: Vec<&PlayerRecord> = players.iter().collect();
        let mut draft = DraftState::new();
        draft.draft(0).unwrap();
        draft.mark_drafted(1).unwrap();
        draft.mark_drafted(5).unwrap();
        let roster = vec![&players[0]];

        let recs = recommend(&candidates, &roster, &draft, RecommendationLimits::default());
        let all_ids = recs
            .value
            .iter()
            .chain(recs.safety.iter())
            .map(|p| p.player.id)
            .chain(recs.stack.iter().map(|p| p.player.id));
        for id in all_ids {
            assert!(draft.is_available(id), "drafted player {id} recommended");
        }
        assert_eq!(recs.value.len(), 5);
        assert_eq!(recs.stack.len(), 3);
        assert_eq!(recs.safety.len(), 3);
    }

    #[test]
    fn value_ties_break_on_adp_rank_then_id() {
        let mut players: Vec<PlayerRecord> = (0..3).map(|i| player(i, "P", "BOS", 50.0, 1.0)).collect();
        players[0].adp_rank = 3;
        players[1].adp_rank = 1;
        players[2].adp_rank = 1;
        let candidates: Vec<&PlayerRecord> = players.iter().collect();

        let recs = recommend(&candidates, &[], &DraftState::new(), RecommendationLimits::default());
        assert_eq!(ids_of(&recs.value), vec![1, 2, 0]);
    }

    #[test]
    fn value_orders_by_value_z() {
        let mut players: Vec<PlayerRecord> = (0..4).map(|i| player(i, "P", "BOS", 50.0, 1.0)).collect();
        players[0].value_z = -0.5;
        players[1].value_z = 1.2;
        players[2].value_z = 0.3;
        players[3].value_z = 2.0;
        let candidates: Vec<&PlayerRecord> = players.iter().collect();
        let limits = RecommendationLimits {
            value: 2,
            ..RecommendationLimits::default()
        };

        let recs = recommend(&candidates, &[], &DraftState::new(), limits);
        assert_eq!(ids_of(&recs.value), vec![3, 1]);
    }

    #[test]
    fn stack_picks_report_stack_size() {
        let mine = player(0, "Mine", "BOS", 100.0, 1.0);
        let mate = player(1, "Mate", "BOS", 90.0, 2.0);
        let stranger = player(2, "Stranger", "NYK", 95.0, 3.0);
        let candidates = vec![&mate, &stranger];
        let mut draft = DraftState::new();
        draft.draft(0).unwrap();

        let recs = recommend(&candidates, &[&mine], &draft, RecommendationLimits::default());
        assert_eq!(recs.stack[0].player.id, 1);
        assert_eq!(recs.stack[0].score, 6);
        assert_eq!(recs.stack[0].stack_size(), 2);
        assert_eq!(recs.stack[1].teammates, 0);
    }

    #[test]
    fn no_candidates_gives_empty_lists() {
        let recs = recommend(&[], &[], &DraftState::new(), RecommendationLimits::default());
        assert!(recs.is_empty());
    }
}
