// Roster-level tournament equity and exposure summaries.
//
// Equity is a linear proxy, not a probability: each rostered player adds
// weighted games-times-multiplier terms for the rounds they can score in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::PlayerRecord;

/// Weight of a round-2 game toward advancing.
pub const R2_WEIGHT: f64 = 1.0;
/// Weight of a round-3 game toward advancing.
pub const R3_WEIGHT: f64 = 1.35;
/// Weight of a finals game toward winning.
pub const FINALS_WEIGHT: f64 = 1.75;

/// Advance and win equity for a roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Equity {
    pub advance: f64,
    pub win: f64,
}

/// Equity expressed as progress toward target values, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityMeter {
    pub advance: f64,
    pub win: f64,
}

impl Equity {
    /// Progress toward the given targets. Non-positive targets read as full.
    pub fn meter(&self, advance_target: f64, win_target: f64) -> EquityMeter {
        EquityMeter {
            advance: progress(self.advance, advance_target),
            win: progress(self.win, win_target),
        }
    }
}

fn progress(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 1.0;
    }
    (value / target).clamp(0.0, 1.0)
}

/// One player's contribution to advance equity.
pub fn advance_contribution(p: &PlayerRecord) -> f64 {
    p.r2_games as f64 * p.r2_mult * R2_WEIGHT + p.r3_games as f64 * p.r3_mult * R3_WEIGHT
}

/// One player's contribution to win equity.
pub fn win_contribution(p: &PlayerRecord) -> f64 {
    p.finals_games as f64 * p.finals_mult * FINALS_WEIGHT
}

/// Sum equity over a roster. An empty roster is `(0, 0)`.
pub fn compute_equity<'a>(roster: impl IntoIterator<Item = &'a PlayerRecord>) -> Equity {
    roster.into_iter().fold(Equity::default(), |acc, p| Equity {
        advance: acc.advance + advance_contribution(p),
        win: acc.win + win_contribution(p),
    })
}

// ---------------------------------------------------------------------------
// Exposure breakdowns
// ---------------------------------------------------------------------------

/// How many rostered players come from one team, with that team's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamExposure {
    pub team: String,
    pub count: usize,
    pub team_rank: u32,
    pub r2_games: u32,
    pub r3_games: u32,
    pub finals_games: u32,
}

/// Per-team roster counts, most-stacked team first.
///
/// Schedule columns come from the earliest-drafted player of each team.
pub fn team_exposure<'a>(roster: impl IntoIterator<Item = &'a PlayerRecord>) -> Vec<TeamExposure> {
    let mut by_team: BTreeMap<&str, TeamExposure> = BTreeMap::new();
    for p in roster {
        by_team
            .entry(p.team.as_str())
            .and_modify(|e| e.count += 1)
            .or_insert_with(|| TeamExposure {
                team: p.team.clone(),
                count: 1,
                team_rank: p.team_rank,
                r2_games: p.r2_games,
                r3_games: p.r3_games,
                finals_games: p.finals_games,
            });
    }
    let mut out: Vec<TeamExposure> = by_team.into_values().collect();
    // Stable sort keeps the BTreeMap's alphabetical order within equal counts.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Number of rostered players at one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCount {
    pub position: String,
    pub count: usize,
}

/// Per-position roster counts, largest first.
pub fn position_breakdown<'a>(roster: impl IntoIterator<Item = &'a PlayerRecord>) -> Vec<PositionCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for p in roster {
        *counts.entry(p.position.as_str()).or_default() += 1;
    }
    let mut out: Vec<PositionCount> = counts
        .into_iter()
        .map(|(position, count)| PositionCount {
            position: position.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::player;

    #[test]
    fn empty_roster_has_zero_equity() {
        let roster: Vec<PlayerRecord> = Vec::new();
        assert_eq!(compute_equity(&roster), Equity { advance: 0.0, win: 0.0 });
    }

    #[test]
    fn single_player_contribution() {
        let mut p = player(0, "A", "BOS", 100.0, 1.0);
        p.r2_games = 2;
        p.r2_mult = 1.1;
        p.r3_games = 1;
        p.r3_mult = 1.0;
        p.finals_games = 0;

        let eq = compute_equity([&p]);
        assert!((eq.advance - 3.55).abs() < 1e-9);
        assert_eq!(eq.win, 0.0);
    }

    #[test]
    fn equity_sums_over_roster() {
        let a = player(0, "A", "BOS", 100.0, 1.0);
        let mut b = player(1, "B", "NYK", 90.0, 2.0);
        b.finals_games = 4;
        b.finals_mult = 1.1;

        let eq = compute_equity([&a, &b]);
        // defaults: 3*1*1.0 + 3*1*1.35 = 7.05 per player
        assert!((eq.advance - 14.1).abs() < 1e-9);
        // 3*1*1.75 + 4*1.1*1.75 = 5.25 + 7.7
        assert!((eq.win - 12.95).abs() < 1e-9);
    }

    #[test]
    fn meter_clamps_to_unit_range() {
        let eq = Equity {
            advance: 250.0,
            win: 450.0,
        };
        let meter = eq.meter(500.0, 300.0);
        assert!((meter.advance - 0.5).abs() < 1e-12);
        assert_eq!(meter.win, 1.0);
        assert_eq!(eq.meter(0.0, 300.0).advance, 1.0);
    }

    #[test]
    fn team_exposure_orders_by_count_then_team() {
        let mut a = player(0, "A", "NYK", 100.0, 1.0);
        a.team_rank = 4;
        let b = player(1, "B", "BOS", 90.0, 2.0);
        let c = player(2, "C", "NYK", 80.0, 3.0);
        let d = player(3, "D", "ATL", 70.0, 4.0);

        let exposure = team_exposure([&a, &b, &c, &d]);
        let teams: Vec<(&str, usize)> = exposure.iter().map(|e| (e.team.as_str(), e.count)).collect();
        assert_eq!(teams, vec![("NYK", 2), ("ATL", 1), ("BOS", 1)]);
        assert_eq!(exposure[0].team_rank, 4);
    }

    #[test]
    fn position_breakdown_counts() {
        let a = player(0, "A", "NYK", 100.0, 1.0);
        let mut b = player(1, "B", "BOS", 90.0, 2.0);
        b.position = "C".into();
        let c = player(2, "C", "NYK", 80.0, 3.0);

        let counts = position_breakdown([&a, &b, &c]);
        assert_eq!(
            counts,
            vec![
                PositionCount {
                    position: "PG".into(),
                    count: 2
                },
                PositionCount {
                    position: "C".into(),
                    count: 1
                },
            ]
        );
    }
}
