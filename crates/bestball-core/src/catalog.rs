// Player catalog: candidate rows, the admission pass, and the typed records
// every downstream computation reads.
//
// Loosely-typed `PlayerRow`s come in from the loader with every column
// optional. `Catalog::from_rows` is the single normalization pass: it drops
// rows that cannot identify a player, coerces malformed numbers to their
// column defaults, imputes missing ADP, assigns ids, and runs the metric
// pass. After that, nothing downstream has to second-guess a field.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::valuation::metrics::{self, DEFAULT_FINALS_EMPHASIS};

/// Catalog-wide player key. Dense and unique within a session.
pub type PlayerId = u32;

// ---------------------------------------------------------------------------
// Column defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_TEAM_RANK: u32 = 15;
pub const DEFAULT_GAMES: u32 = 3;
pub const DEFAULT_MULT: f64 = 1.0;
pub const DEFAULT_SHUTDOWN_RISK: f64 = 0.5;

/// Worst (highest) team rank accepted; ranks run 1..=30.
pub const MAX_TEAM_RANK: u32 = 30;

/// Added to the largest observed ADP to push unranked players to the back.
pub const ADP_MISSING_PENALTY: f64 = 100.0;

/// ADP substituted when no row in the catalog carries one.
pub const ADP_ALL_MISSING: f64 = 999.0;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no valid player rows after admission ({rejected} rejected)")]
    Empty { rejected: usize },
}

// ---------------------------------------------------------------------------
// Candidate rows
// ---------------------------------------------------------------------------

/// A candidate player row as supplied by the loader, before admission.
///
/// Numeric columns are `f64` even where the clean record holds an integer,
/// so that a "3.0" games cell or a stray fractional rank coerces instead of
/// failing the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: Option<PlayerId>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub team: Option<String>,
    pub adp: Option<f64>,
    pub final_adj_gpp: Option<f64>,
    pub team_rank: Option<f64>,
    pub r2_games: Option<f64>,
    pub r3_games: Option<f64>,
    pub finals_games: Option<f64>,
    pub r2_mult: Option<f64>,
    pub r3_mult: Option<f64>,
    pub finals_mult: Option<f64>,
    pub shutdown_risk: Option<f64>,
    /// Data-row index in the source file, when the loader knows it. Used to
    /// number rejections so they line up with the input even if some
    /// records never became rows.
    pub source_row: Option<usize>,
}

// ---------------------------------------------------------------------------
// Clean records
// ---------------------------------------------------------------------------

/// A fully admitted player.
///
/// The derived fields (`final_rank` through `live_score`) are initialized to
/// zero at admission and filled by `valuation::metrics::compute_metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    pub team: String,
    pub adp: f64,
    /// True when `adp` was filled in rather than supplied.
    pub adp_imputed: bool,
    pub final_adj_gpp: f64,
    pub team_rank: u32,
    pub r2_games: u32,
    pub r3_games: u32,
    pub finals_games: u32,
    pub r2_mult: f64,
    pub r3_mult: f64,
    pub finals_mult: f64,
    pub shutdown_risk: f64,

    pub final_rank: u32,
    pub adp_rank: u32,
    pub value_score: i64,
    pub z_final: f64,
    pub z_adp: f64,
    pub value_z: f64,
    pub value_alert: bool,
    pub live_score: f64,
}

// ---------------------------------------------------------------------------
// Admission report
// ---------------------------------------------------------------------------

/// Why a candidate row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    MissingName,
    MissingPosition,
    MissingTeam,
    MissingProjection,
    NonPositiveProjection,
}

impl RejectReason {
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::MissingName => "missing name",
            RejectReason::MissingPosition => "missing position",
            RejectReason::MissingTeam => "missing team",
            RejectReason::MissingProjection => "missing FinalAdjGPP",
            RejectReason::NonPositiveProjection => "FinalAdjGPP <= 0",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A dropped row: its position in the input, the name if it had one, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub row: usize,
    pub name: Option<String>,
    pub reason: RejectReason,
}

/// Outcome of the admission pass, for the caller to report upward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdmissionReport {
    pub admitted: usize,
    pub rejected: Vec<Rejection>,
    pub adp_imputed: usize,
    /// Whether supplied ids were discarded and rows renumbered by load order.
    pub ids_reassigned: bool,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The session's player table with all derived metrics populated.
#[derive(Debug, Clone)]
pub struct Catalog {
    players: Vec<PlayerRecord>,
    index: HashMap<PlayerId, usize>,
    finals_emphasis: f64,
    metrics_degraded: bool,
}

impl Catalog {
    /// Run the admission pass over candidate rows and compute all metrics.
    ///
    /// Rows that cannot identify a player or lack a positive projection are
    /// dropped and listed in the report. Fails only when nothing survives.
    pub fn from_rows(rows: Vec<PlayerRow>) -> Result<(Self, AdmissionReport), CatalogError> {
        let mut report = AdmissionReport::default();
        let mut admitted: Vec<Admitted> = Vec::new();

        // The back of the board counts every supplied ADP, including rows
        // that end up rejected.
        let mut observed_max_adp: Option<f64> = None;

        for (row_idx, row) in rows.into_iter().enumerate() {
            if let Some(adp) = row.adp.filter(|v| v.is_finite()) {
                observed_max_adp = Some(observed_max_adp.map_or(adp, |m| m.max(adp)));
            }
            let source = row.source_row.unwrap_or(row_idx);
            match admit(row) {
                Ok(entry) => admitted.push(entry),
                Err((name, reason)) => {
                    warn!(
                        "dropping row {}{}: {}",
                        source,
                        name.as_deref().map(|n| format!(" ('{n}')")).unwrap_or_default(),
                        reason
                    );
                    report.rejected.push(Rejection {
                        row: source,
                        name,
                        reason,
                    });
                }
            }
        }

        if admitted.is_empty() {
            return Err(CatalogError::Empty {
                rejected: report.rejected.len(),
            });
        }

        // ADP imputation: one past the back of the observed board.
        let fill_adp = match observed_max_adp {
            Some(max) => max + ADP_MISSING_PENALTY,
            None => ADP_ALL_MISSING,
        };

        let supplied_ids: Option<Vec<PlayerId>> = admitted.iter().map(|(id, _, _)| *id).collect();
        let ids: Vec<PlayerId> = match supplied_ids {
            Some(ids) if all_unique(&ids) => ids,
            Some(_) => {
                warn!("duplicate player ids in input; renumbering by load order");
                report.ids_reassigned = true;
                (0..admitted.len() as PlayerId).collect()
            }
            None => {
                if admitted.iter().any(|(id, _, _)| id.is_some()) {
                    warn!("player ids supplied for only some rows; renumbering by load order");
                    report.ids_reassigned = true;
                }
                (0..admitted.len() as PlayerId).collect()
            }
        };

        let mut players = Vec::with_capacity(admitted.len());
        for ((_, mut record, adp), id) in admitted.into_iter().zip(ids) {
            record.id = id;
            match adp {
                Some(v) => record.adp = v,
                None => {
                    record.adp = fill_adp;
                    record.adp_imputed = true;
                    report.adp_imputed += 1;
                }
            }
            players.push(record);
        }
        report.admitted = players.len();

        if report.adp_imputed > 0 {
            info!(
                "imputed ADP {:.1} for {} of {} players",
                fill_adp, report.adp_imputed, report.admitted
            );
        }

        let index = players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();

        let mut catalog = Catalog {
            players,
            index,
            finals_emphasis: DEFAULT_FINALS_EMPHASIS,
            metrics_degraded: false,
        };
        catalog.recompute();

        info!(
            "catalog admitted {} players, rejected {}",
            report.admitted,
            report.rejected.len()
        );
        Ok((catalog, report))
    }

    /// Recompute every derived field from the raw columns. Idempotent.
    pub fn recompute(&mut self) {
        let pass = metrics::compute_metrics(&mut self.players, self.finals_emphasis);
        self.metrics_degraded = pass.degraded;
    }

    /// Change the finals emphasis. Only `live_score` moves; ranks and
    /// z-scores are untouched.
    ///
    /// Range checking is the caller's job (see `Session::set_finals_emphasis`).
    pub fn set_finals_emphasis(&mut self, emphasis: f64) {
        self.finals_emphasis = emphasis;
        metrics::apply_finals_emphasis(&mut self.players, emphasis);
    }

    pub fn finals_emphasis(&self) -> f64 {
        self.finals_emphasis
    }

    /// True when the last metric pass found no variance to score against,
    /// in which case every z-score is zero.
    pub fn metrics_degraded(&self) -> bool {
        self.metrics_degraded
    }

    /// All players in load order.
    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Distinct positions, sorted.
    pub fn positions(&self) -> Vec<String> {
        distinct(self.players.iter().map(|p| p.position.clone()))
    }

    /// Distinct teams, sorted.
    pub fn teams(&self) -> Vec<String> {
        distinct(self.players.iter().map(|p| p.team.clone()))
    }

    /// Distinct finals game counts, sorted.
    pub fn finals_game_counts(&self) -> Vec<u32> {
        distinct(self.players.iter().map(|p| p.finals_games))
    }
}

// ---------------------------------------------------------------------------
// Admission helpers
// ---------------------------------------------------------------------------

type Admitted = (Option<PlayerId>, PlayerRecord, Option<f64>);

/// Validate one row. On success returns the supplied id, a record with
/// placeholder id/ADP, and the observed ADP if any.
fn admit(row: PlayerRow) -> Result<Admitted, (Option<String>, RejectReason)> {
    let name = clean_text(row.name);
    let Some(name) = name else {
        return Err((None, RejectReason::MissingName));
    };
    let Some(position) = clean_text(row.position) else {
        return Err((Some(name), RejectReason::MissingPosition));
    };
    let Some(team) = clean_text(row.team) else {
        return Err((Some(name), RejectReason::MissingTeam));
    };
    let final_adj_gpp = match row.final_adj_gpp {
        Some(v) if v.is_finite() => v,
        _ => return Err((Some(name), RejectReason::MissingProjection)),
    };
    if final_adj_gpp <= 0.0 {
        return Err((Some(name), RejectReason::NonPositiveProjection));
    }

    let adp = row.adp.filter(|v| v.is_finite());

    let team_rank = coerce(&name, "TeamRank", row.team_rank, DEFAULT_TEAM_RANK as f64, |v| {
        (1.0..=MAX_TEAM_RANK as f64).contains(&v.round())
    })
    .round() as u32;
    let r2_games = coerce_games(&name, "R2Games", row.r2_games);
    let r3_games = coerce_games(&name, "R3Games", row.r3_games);
    let finals_games = coerce_games(&name, "FinalsGames", row.finals_games);
    let r2_mult = coerce_mult(&name, "R2Mult", row.r2_mult);
    let r3_mult = coerce_mult(&name, "R3Mult", row.r3_mult);
    let finals_mult = coerce_mult(&name, "FinalsMult", row.finals_mult);
    let shutdown_risk = coerce(&name, "ShutdownRisk", row.shutdown_risk, DEFAULT_SHUTDOWN_RISK, |v| {
        (0.0..=1.0).contains(&v)
    });

    let record = PlayerRecord {
        id: 0,
        name,
        position,
        team,
        adp: 0.0,
        adp_imputed: false,
        final_adj_gpp,
        team_rank,
        r2_games,
        r3_games,
        finals_games,
        r2_mult,
        r3_mult,
        finals_mult,
        shutdown_risk,
        final_rank: 0,
        adp_rank: 0,
        value_score: 0,
        z_final: 0.0,
        z_adp: 0.0,
        value_z: 0.0,
        value_alert: false,
        live_score: 0.0,
    };
    Ok((row.id, record, adp))
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Replace a missing or out-of-domain value with the column default.
fn coerce(name: &str, column: &str, value: Option<f64>, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
    match value {
        Some(v) if v.is_finite() && valid(v) => v,
        Some(v) => {
            debug!("'{}': {} value {} out of range, using default {}", name, column, v, default);
            default
        }
        None => default,
    }
}

fn coerce_games(name: &str, column: &str, value: Option<f64>) -> u32 {
    coerce(name, column, value, DEFAULT_GAMES as f64, |v| v >= 0.0).round() as u32
}

fn coerce_mult(name: &str, column: &str, value: Option<f64>) -> f64 {
    coerce(name, column, value, DEFAULT_MULT, |v| v >= 0.0)
}

fn all_unique(ids: &[PlayerId]) -> bool {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().all(|id| seen.insert(*id))
}

fn distinct<T: Ord>(values: impl Iterator<Item = T>) -> Vec<T> {
    values.collect::<BTreeSet<T>>().into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
