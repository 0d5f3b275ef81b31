// Plain-text rendering of boards, recommendation lists, and roster summaries.

use std::fmt::Write;

use bestball_core::catalog::{AdmissionReport, PlayerRecord};
use bestball_core::draft::view::BoardRow;
use bestball_core::session::SessionParameters;
use bestball_core::valuation::equity::{Equity, EquityMeter, PositionCount, TeamExposure};
use bestball_core::valuation::recommend::Recommendations;

/// Width of the text equity meters.
const METER_WIDTH: usize = 20;

pub fn board(rows: &[BoardRow<'_>], params: &SessionParameters) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} | {} players | finals emphasis {:.2}",
        params.view,
        rows.len(),
        params.finals_emphasis
    );
    if rows.is_empty() {
        out.push_str("No players match the current filters.\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:>4}  {:<24} {:<4} {:<4} {:>6} {:>4} {:>2}/{:>1}/{:>1} {:>7} {:>4} {:>4} {:>5} {:>6} {:>7}  {:<9}",
        "ID", "Name", "Pos", "Team", "ADP", "TmRk", "R2", "R3", "F", "Proj", "Rk", "ADPk", "Value", "ValZ", "Live", "Status"
    );
    for row in rows {
        let p = row.player;
        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:<4} {:<4} {:>6.1} {:>4} {:>2}/{:>1}/{:>1} {:>7.1} {:>4} {:>4} {:>5} {:>6.2} {:>7.1}  {:<9}{}",
            p.id,
            truncate(&p.name, 24),
            p.position,
            p.team,
            p.adp,
            p.team_rank,
            p.r2_games,
            p.r3_games,
            p.finals_games,
            p.final_adj_gpp,
            p.final_rank,
            p.adp_rank,
            p.value_score,
            p.value_z,
            p.live_score,
            row.status.label(),
            if p.value_alert { " VALUE" } else { "" }
        );
    }
    out
}

pub fn recommendations(recs: &Recommendations<'_>) -> String {
    let mut out = String::new();
    if recs.is_empty() {
        out.push_str("No available players match the current filters.\n");
        return out;
    }

    out.push_str("Best value\n");
    for (i, pick) in recs.value.iter().enumerate() {
        let p = pick.player;
        let _ = writeln!(
            out,
            "  {}. [{}] {} ({} {}) ValueZ {:.2}, ADP {:.1}",
            i + 1,
            p.id,
            p.name,
            p.position,
            p.team,
            pick.score,
            p.adp
        );
    }

    out.push_str("Best stack\n");
    for (i, pick) in recs.stack.iter().enumerate() {
        let p = pick.player;
        let _ = write!(
            out,
            "  {}. [{}] {} ({} {}) stack score {}",
            i + 1,
            p.id,
            p.name,
            p.position,
            p.team,
            pick.score
        );
        if pick.teammates > 0 {
            let _ = write!(out, ", creates a {}-man stack", pick.stack_size());
        }
        out.push('\n');
    }

    out.push_str("Safest\n");
    for (i, pick) in recs.safety.iter().enumerate() {
        let p = pick.player;
        let _ = writeln!(
            out,
            "  {}. [{}] {} ({} {}) safety {:.1}, team rank {}, {} finals games",
            i + 1,
            p.id,
            p.name,
            p.position,
            p.team,
            pick.score,
            p.team_rank,
            p.finals_games
        );
    }
    out
}

pub fn equity(eq: &Equity, meter: &EquityMeter, roster: &[&PlayerRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Roster: {} players", roster.len());
    for p in roster {
        let _ = writeln!(out, "  [{}] {} ({} {})", p.id, p.name, p.position, p.team);
    }
    let _ = writeln!(out, "Advance equity {:>8.1}  {}", eq.advance, bar(meter.advance));
    let _ = writeln!(out, "Win equity     {:>8.1}  {}", eq.win, bar(meter.win));
    out
}

pub fn exposure(teams: &[TeamExposure], positions: &[PositionCount]) -> String {
    let mut out = String::new();
    if teams.is_empty() {
        out.push_str("Roster is empty.\n");
        return out;
    }
    out.push_str("Team exposure\n");
    for t in teams {
        let _ = writeln!(
            out,
            "  {:<4} x{}  rank {:>2}  games {}/{}/{}",
            t.team, t.count, t.team_rank, t.r2_games, t.r3_games, t.finals_games
        );
    }
    out.push_str("Positions\n");
    for p in positions {
        let _ = writeln!(out, "  {:<4} x{}", p.position, p.count);
    }
    out
}

/// One-paragraph summary of a catalog load.
pub fn admission(report: &AdmissionReport) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Loaded {} players ({} rows dropped",
        report.admitted,
        report.rejected.len()
    );
    if report.adp_imputed > 0 {
        let _ = write!(out, ", {} missing ADP", report.adp_imputed);
    }
    if report.ids_reassigned {
        out.push_str(", ids renumbered");
    }
    out.push_str(")\n");
    for r in &report.rejected {
        let _ = writeln!(
            out,
            "  row {}{}: {}",
            r.row,
            r.name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default(),
            r.reason
        );
    }
    out
}

fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * METER_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(METER_WIDTH - filled),
        fraction * 100.0
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).chain(std::iter::once('~')).collect()
    }
}
