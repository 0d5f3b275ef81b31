// Derived metric pass: ranks, value scores, z-scores, alerts, live score.
//
// Every field written here is a pure function of the raw columns plus the
// finals emphasis, so running the pass twice over unchanged inputs yields
// identical records. Emphasis only feeds `live_score`, and has its own
// entry point so a slider change never disturbs the ranks.

use tracing::{debug, warn};

use crate::catalog::PlayerRecord;
use crate::valuation::rank::{min_rank, RankOrder};
use crate::valuation::zscore::{compute_pool_stats, compute_zscore};

pub const DEFAULT_FINALS_EMPHASIS: f64 = 1.0;
pub const MIN_FINALS_EMPHASIS: f64 = 0.8;
pub const MAX_FINALS_EMPHASIS: f64 = 1.4;

/// `value_score` at or above this raises a value alert.
pub const VALUE_ALERT_SCORE: i64 = 12;
/// `value_z` at or above this raises a value alert.
pub const VALUE_ALERT_Z: f64 = 0.75;

/// Result of a metric pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricPass {
    /// Set when either z-score series had zero variance; all z-scores are
    /// then reported as 0.
    pub degraded: bool,
}

/// Whether `emphasis` is inside the accepted slider range.
pub fn emphasis_in_range(emphasis: f64) -> bool {
    (MIN_FINALS_EMPHASIS..=MAX_FINALS_EMPHASIS).contains(&emphasis)
}

/// Recompute all derived fields in place.
pub fn compute_metrics(players: &mut [PlayerRecord], finals_emphasis: f64) -> MetricPass {
    let finals: Vec<f64> = players.iter().map(|p| p.final_adj_gpp).collect();
    let adps: Vec<f64> = players.iter().map(|p| p.adp).collect();
    // Earlier picks are worth more, so ADP is scored negated.
    let neg_adps: Vec<f64> = adps.iter().map(|a| -a).collect();

    let final_ranks = min_rank(&finals, RankOrder::Descending);
    let adp_ranks = min_rank(&adps, RankOrder::Ascending);

    let final_stats = compute_pool_stats(&finals);
    let adp_stats = compute_pool_stats(&neg_adps);
    let degraded = final_stats.is_degenerate() || adp_stats.is_degenerate();
    if degraded {
        warn!(
            "no spread in FinalAdjGPP or ADP across {} players; z-scores set to 0",
            players.len()
        );
    }

    for (i, p) in players.iter_mut().enumerate() {
        p.final_rank = final_ranks[i];
        p.adp_rank = adp_ranks[i];
        p.value_score = p.adp_rank as i64 - p.final_rank as i64;

        if degraded {
            p.z_final = 0.0;
            p.z_adp = 0.0;
        } else {
            p.z_final = compute_zscore(p.final_adj_gpp, &final_stats);
            p.z_adp = compute_zscore(-p.adp, &adp_stats);
        }
        p.value_z = p.z_final - p.z_adp;
        p.value_alert = p.value_score >= VALUE_ALERT_SCORE || p.value_z >= VALUE_ALERT_Z;
    }

    apply_finals_emphasis(players, finals_emphasis);

    debug!(
        "metric pass over {} players, {} value alerts",
        players.len(),
        players.iter().filter(|p| p.value_alert).count()
    );
    MetricPass { degraded }
}

/// Rewrite `live_score` only.
pub fn apply_finals_emphasis(players: &mut [PlayerRecord], finals_emphasis: f64) {
    for p in players.iter_mut() {
        p.live_score = p.final_adj_gpp * finals_emphasis;
    }
}
