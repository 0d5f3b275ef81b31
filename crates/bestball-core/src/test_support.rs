// Shared fixtures for unit tests.

use crate::catalog::{PlayerId, PlayerRecord};

/// A player with column defaults and zeroed derived fields.
pub fn player(id: PlayerId, name: &str, team: &str, final_adj_gpp: f64, adp: f64) -> PlayerRecord {
    PlayerRecord {
        id,
        name: name.to_string(),
        position: "PG".to_string(),
        team: team.to_string(),
        adp,
        adp_imputed: false,
        final_adj_gpp,
        team_rank: 15,
        r2_games: 3,
        r3_games: 3,
        finals_games: 3,
        r2_mult: 1.0,
        r3_mult: 1.0,
        finals_mult: 1.0,
        shutdown_risk: 0.5,
        final_rank: 0,
        adp_rank: 0,
        value_score: 0,
        z_final: 0.0,
        z_adp: 0.0,
        value_z: 0.0,
        value_alert: false,
        live_score: 0.0,
    }
}
