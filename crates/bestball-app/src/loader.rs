// Player data loading: the projection CSV plus optional per-team tables.
//
// Every cell is read as text and parsed here, so one bad number costs a
// field (which the catalog then defaults) rather than the whole row. Rows
// the CSV reader itself cannot split are skipped with a warning.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use bestball_core::catalog::{AdmissionReport, Catalog, CatalogError, PlayerId, PlayerRow};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{Config, DataPaths};

/// Columns a player CSV must carry in its header.
pub const REQUIRED_PLAYER_COLUMNS: [&str; 3] = ["Name", "Position", "Team"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} is missing required column `{column}`")]
    MissingColumn { path: String, column: &'static str },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

// ---------------------------------------------------------------------------
// Raw CSV row types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Position", default)]
    position: Option<String>,
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "ADP", default)]
    adp: Option<String>,
    #[serde(rename = "FinalAdjGPP", default)]
    final_adj_gpp: Option<String>,
    #[serde(rename = "TeamRank", default)]
    team_rank: Option<String>,
    #[serde(rename = "R2Games", default)]
    r2_games: Option<String>,
    #[serde(rename = "R3Games", default)]
    r3_games: Option<String>,
    #[serde(rename = "FinalsGames", default)]
    finals_games: Option<String>,
    #[serde(rename = "R2Mult", default)]
    r2_mult: Option<String>,
    #[serde(rename = "R3Mult", default)]
    r3_mult: Option<String>,
    #[serde(rename = "FinalsMult", default)]
    finals_mult: Option<String>,
    #[serde(rename = "ShutdownRisk", default)]
    shutdown_risk: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeamMultipliers {
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "R2Mult", default)]
    r2_mult: Option<String>,
    #[serde(rename = "R3Mult", default)]
    r3_mult: Option<String>,
    #[serde(rename = "FinalsMult", default)]
    finals_mult: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeamRank {
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "TeamRank", default)]
    team_rank: Option<String>,
}

/// Playoff multipliers for one team. Absent cells leave the player's own
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMultipliers {
    pub r2_mult: Option<f64>,
    pub r3_mult: Option<f64>,
    pub finals_mult: Option<f64>,
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse a numeric cell. Blank is missing; garbage is missing with a warning.
fn parse_number(owner: &str, column: &str, raw: Option<&str>) -> Option<f64> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("'{}': unparseable {} value '{}'", owner, column, text);
            None
        }
    }
}

fn parse_id(owner: &str, raw: Option<&str>) -> Option<PlayerId> {
    let v = parse_number(owner, "ID", raw)?;
    if v >= 0.0 && v.fract() == 0.0 && v <= PlayerId::MAX as f64 {
        Some(v as PlayerId)
    } else {
        warn!("'{}': ID {} is not a non-negative integer", owner, v);
        None
    }
}

fn require_columns(
    headers: &csv::StringRecord,
    required: &[&'static str],
    path: &str,
) -> Result<(), LoadError> {
    for &column in required {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(LoadError::MissingColumn {
                path: path.to_string(),
                column,
            });
        }
    }
    Ok(())
}

fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(false)
        .from_reader(rdr)
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn player_rows_from_reader<R: Read>(rdr: R, path: &str) -> Result<Vec<PlayerRow>, LoadError> {
    let mut reader = csv_reader(rdr);
    let headers = reader.headers().map_err(|e| LoadError::Csv {
        path: path.to_string(),
        source: e,
    })?;
    require_columns(headers, &REQUIRED_PLAYER_COLUMNS, path)?;

    let mut rows = Vec::new();
    for (record_idx, result) in reader.deserialize::<RawPlayer>().enumerate() {
        match result {
            Ok(raw) => {
                let name = non_blank(raw.name);
                let owner = name.clone().unwrap_or_else(|| format!("row {record_idx}"));
                rows.push(PlayerRow {
                    id: parse_id(&owner, raw.id.as_deref()),
                    position: non_blank(raw.position),
                    team: non_blank(raw.team),
                    adp: parse_number(&owner, "ADP", raw.adp.as_deref()),
                    final_adj_gpp: parse_number(&owner, "FinalAdjGPP", raw.final_adj_gpp.as_deref()),
                    team_rank: parse_number(&owner, "TeamRank", raw.team_rank.as_deref()),
                    r2_games: parse_number(&owner, "R2Games", raw.r2_games.as_deref()),
                    r3_games: parse_number(&owner, "R3Games", raw.r3_games.as_deref()),
                    finals_games: parse_number(&owner, "FinalsGames", raw.finals_games.as_deref()),
                    r2_mult: parse_number(&owner, "R2Mult", raw.r2_mult.as_deref()),
                    r3_mult: parse_number(&owner, "R3Mult", raw.r3_mult.as_deref()),
                    finals_mult: parse_number(&owner, "FinalsMult", raw.finals_mult.as_deref()),
                    shutdown_risk: parse_number(&owner, "ShutdownRisk", raw.shutdown_risk.as_deref()),
                    name,
                    source_row: Some(record_idx),
                });
            }
            Err(e) => {
                warn!("skipping malformed player row {}: {}", record_idx, e);
            }
        }
    }
    Ok(rows)
}

fn team_multipliers_from_reader<R: Read>(
    rdr: R,
    path: &str,
) -> Result<HashMap<String, TeamMultipliers>, LoadError> {
    let mut reader = csv_reader(rdr);
    let headers = reader.headers().map_err(|e| LoadError::Csv {
        path: path.to_string(),
        source: e,
    })?;
    require_columns(headers, &["Team"], path)?;

    let mut map = HashMap::new();
    for result in reader.deserialize::<RawTeamMultipliers>() {
        match result {
            Ok(raw) => {
                let Some(team) = non_blank(raw.team) else {
                    warn!("skipping team multiplier row without a team");
                    continue;
                };
                let entry = TeamMultipliers {
                    r2_mult: parse_number(&team, "R2Mult", raw.r2_mult.as_deref()),
                    r3_mult: parse_number(&team, "R3Mult", raw.r3_mult.as_deref()),
                    finals_mult: parse_number(&team, "FinalsMult", raw.finals_mult.as_deref()),
                };
                if map.contains_key(&team) {
                    warn!("duplicate multiplier entry for '{}', using latest value", team);
                }
                map.insert(team, entry);
            }
            Err(e) => {
                warn!("skipping malformed team multiplier row: {}", e);
            }
        }
    }
    Ok(map)
}

fn team_ranks_from_reader<R: Read>(rdr: R, path: &str) -> Result<HashMap<String, f64>, LoadError> {
    let mut reader = csv_reader(rdr);
    let headers = reader.headers().map_err(|e| LoadError::Csv {
        path: path.to_string(),
        source: e,
    })?;
    require_columns(headers, &["Team", "TeamRank"], path)?;

    let mut map = HashMap::new();
    for result in reader.deserialize::<RawTeamRank>() {
        match result {
            Ok(raw) => {
                let Some(team) = non_blank(raw.team) else {
                    warn!("skipping team rank row without a team");
                    continue;
                };
                let Some(rank) = parse_number(&team, "TeamRank", raw.team_rank.as_deref()) else {
                    continue;
                };
                if map.contains_key(&team) {
                    warn!("duplicate team rank entry for '{}', using latest value", team);
                }
                map.insert(team, rank);
            }
            Err(e) => {
                warn!("skipping malformed team rank row: {}", e);
            }
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

/// Left-join team multipliers onto player rows. Returns how many rows matched.
pub fn apply_team_multipliers(
    rows: &mut [PlayerRow],
    table: &HashMap<String, TeamMultipliers>,
) -> usize {
    let mut matched = 0;
    for row in rows.iter_mut() {
        let Some(m) = row.team.as_deref().and_then(|t| table.get(t.trim())) else {
            continue;
        };
        matched += 1;
        if let Some(v) = m.r2_mult {
            row.r2_mult = Some(v);
        }
        if let Some(v) = m.r3_mult {
            row.r3_mult = Some(v);
        }
        if let Some(v) = m.finals_mult {
            row.finals_mult = Some(v);
        }
    }
    matched
}

/// Fill `team_rank` on rows that lack one. Returns how many rows were filled.
pub fn apply_team_ranks(rows: &mut [PlayerRow], table: &HashMap<String, f64>) -> usize {
    let mut filled = 0;
    for row in rows.iter_mut().filter(|r| r.team_rank.is_none()) {
        if let Some(&rank) = row.team.as_deref().and_then(|t| table.get(t.trim())) {
            row.team_rank = Some(rank);
            filled += 1;
        }
    }
    filled
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load candidate player rows from a CSV file.
pub fn load_player_rows(path: &Path) -> Result<Vec<PlayerRow>, LoadError> {
    player_rows_from_reader(open(path)?, &path.display().to_string())
}

/// Load the per-team multiplier table. Returns a map of team → multipliers.
pub fn load_team_multipliers(path: &Path) -> Result<HashMap<String, TeamMultipliers>, LoadError> {
    team_multipliers_from_reader(open(path)?, &path.display().to_string())
}

/// Load the per-team rank table. Returns a map of team → rank.
pub fn load_team_ranks(path: &Path) -> Result<HashMap<String, f64>, LoadError> {
    team_ranks_from_reader(open(path)?, &path.display().to_string())
}

/// Load all player data using paths from the config and build the catalog.
pub fn load_catalog(config: &Config) -> Result<(Catalog, AdmissionReport), LoadError> {
    load_catalog_from_paths(&config.data_paths)
}

/// Load all player data from explicit paths. Exposed for testing and flexibility.
pub fn load_catalog_from_paths(paths: &DataPaths) -> Result<(Catalog, AdmissionReport), LoadError> {
    let mut rows = load_player_rows(Path::new(&paths.players))?;
    info!("read {} player rows from {}", rows.len(), paths.players);

    if let Some(mult_path) = &paths.team_multipliers {
        let table = load_team_multipliers(Path::new(mult_path))?;
        let matched = apply_team_multipliers(&mut rows, &table);
        info!("applied team multipliers to {} of {} rows", matched, rows.len());
    }
    if let Some(rank_path) = &paths.team_ranks {
        let table = load_team_ranks(Path::new(rank_path))?;
        let filled = apply_team_ranks(&mut rows, &table);
        info!("filled team rank for {} rows", filled);
    }

    Ok(Catalog::from_rows(rows)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
