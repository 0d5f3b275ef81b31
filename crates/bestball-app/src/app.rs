// Application state and command dispatch.
//
// Owns the draft session and turns each parsed command into either a state
// change or a rendered report. Failures from a single command are reported
// back as text; nothing a user types can end the session except `quit`.

use std::io::{BufRead, Write};

use bestball_core::catalog::PlayerRecord;
use bestball_core::session::{Session, SessionError, SessionParameters};
use bestball_core::valuation::equity::{Equity, EquityMeter, PositionCount, TeamExposure};
use bestball_core::valuation::recommend::Recommendations;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EquityTargets;
use crate::protocol::{self, CommandError, UserCommand};
use crate::report;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// How query results are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result of handling one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Output(String),
    Quit,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the session knows, for `snapshot`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<'a> {
    pub generated_at: DateTime<Utc>,
    pub parameters: &'a SessionParameters,
    pub player_count: usize,
    pub metrics_degraded: bool,
    pub drafted_count: usize,
    pub roster: Vec<&'a PlayerRecord>,
    pub equity: Equity,
    pub meter: EquityMeter,
    pub team_exposure: Vec<TeamExposure>,
    pub positions: Vec<PositionCount>,
    pub recommendations: Recommendations<'a>,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub session: Session,
    pub equity_targets: EquityTargets,
    pub format: OutputFormat,
}

impl AppState {
    pub fn new(session: Session, equity_targets: EquityTargets, format: OutputFormat) -> Self {
        AppState {
            session,
            equity_targets,
            format,
        }
    }

    /// Parse and handle one line. Errors become output, never a quit.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::Output(String::new());
        }
        let result = protocol::parse_command(line)
            .map_err(AppError::from)
            .and_then(|cmd| self.handle_command(cmd));
        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("command '{}' failed: {}", line.trim(), e);
                Reply::Output(format!("error: {e}\n"))
            }
        }
    }

    pub fn handle_command(&mut self, cmd: UserCommand) -> Result<Reply, AppError> {
        debug!("handling {:?}", cmd);
        let text = match cmd {
            UserCommand::Board => self.render_board()?,
            UserCommand::Recommendations => self.render_recommendations()?,
            UserCommand::Equity => self.render_equity()?,
            UserCommand::Exposure => self.render_exposure()?,
            UserCommand::Snapshot => format!("{}\n", serde_json::to_string_pretty(&self.build_snapshot())?),
            UserCommand::Draft(id) => {
                let p = self.session.draft(id)?;
                format!("Drafted {} ({} {})\n", p.name, p.position, p.team)
            }
            UserCommand::MarkDrafted(id) => {
                let p = self.session.mark_drafted(id)?;
                format!("Marked {} ({} {}) as taken\n", p.name, p.position, p.team)
            }
            UserCommand::Undo => match self.session.undo() {
                Some(p) => format!("Returned {} to the pool\n", p.name),
                None => "Nothing to undo\n".to_string(),
            },
            UserCommand::Reset => {
                self.session.reset();
                "Draft reset\n".to_string()
            }
            UserCommand::SetEmphasis(value) => {
                self.session.set_finals_emphasis(value)?;
                format!("Finals emphasis set to {value:.2}\n")
            }
            UserCommand::SetView(view) => {
                self.session.set_view(view);
                format!("View: {view}\n")
            }
            UserCommand::FilterPositions(positions) => {
                self.session.filter_mut().positions = positions;
                self.describe_filter()
            }
            UserCommand::FilterTeams(teams) => {
                self.session.filter_mut().teams = teams;
                self.describe_filter()
            }
            UserCommand::FilterTier(tier) => {
                self.session.filter_mut().rank_tier = tier;
                self.describe_filter()
            }
            UserCommand::FilterFinals(games) => {
                self.session.filter_mut().finals_games = games;
                self.describe_filter()
            }
            UserCommand::Search(text) => {
                self.session.filter_mut().search = text;
                self.describe_filter()
            }
            UserCommand::ClearFilters => {
                self.session.set_filter(Default::default());
                self.describe_filter()
            }
            UserCommand::Help => format!("{}\n", protocol::HELP),
            UserCommand::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Output(text))
    }

    /// Assemble the full session state.
    pub fn build_snapshot(&self) -> SessionSnapshot<'_> {
        let equity = self.session.equity();
        SessionSnapshot {
            generated_at: Utc::now(),
            parameters: self.session.parameters(),
            player_count: self.session.catalog().len(),
            metrics_degraded: self.session.catalog().metrics_degraded(),
            drafted_count: self.session.draft_state().drafted_ids().len(),
            roster: self.session.roster(),
            equity,
            meter: self.meter(&equity),
            team_exposure: self.session.team_exposure(),
            positions: self.session.position_breakdown(),
            recommendations: self.session.recommendations(),
        }
    }

    fn meter(&self, equity: &Equity) -> EquityMeter {
        equity.meter(
            self.equity_targets.advance_target,
            self.equity_targets.win_target,
        )
    }

    fn render_board(&self) -> Result<String, AppError> {
        let rows = self.session.board();
        Ok(match self.format {
            OutputFormat::Text => report::board(&rows, self.session.parameters()),
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&rows)?),
        })
    }

    fn render_recommendations(&self) -> Result<String, AppError> {
        let recs = self.session.recommendations();
        Ok(match self.format {
            OutputFormat::Text => report::recommendations(&recs),
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&recs)?),
        })
    }

    fn render_equity(&self) -> Result<String, AppError> {
        let equity = self.session.equity();
        let meter = self.meter(&equity);
        Ok(match self.format {
            OutputFormat::Text => report::equity(&equity, &meter, &self.session.roster()),
            OutputFormat::Json => format!(
                "{}\n",
                serde_json::to_string_pretty(&serde_json::json!({
                    "equity": equity,
                    "meter": meter,
                }))?
            ),
        })
    }

    fn render_exposure(&self) -> Result<String, AppError> {
        let teams = self.session.team_exposure();
        let positions = self.session.position_breakdown();
        Ok(match self.format {
            OutputFormat::Text => report::exposure(&teams, &positions),
            OutputFormat::Json => format!(
                "{}\n",
                serde_json::to_string_pretty(&serde_json::json!({
                    "teams": teams,
                    "positions": positions,
                }))?
            ),
        })
    }

    fn describe_filter(&self) -> String {
        let f = &self.session.parameters().filter;
        if f.is_empty() {
            return "Filters cleared\n".to_string();
        }
        let mut parts = Vec::new();
        if !f.positions.is_empty() {
            parts.push(format!("pos {}", join(&f.positions)));
        }
        if !f.teams.is_empty() {
            parts.push(format!("team {}", join(&f.teams)));
        }
        if let Some(tier) = f.rank_tier {
            parts.push(format!("tier {tier}"));
        }
        if !f.finals_games.is_empty() {
            parts.push(format!("finals {}", join(&f.finals_games)));
        }
        if !f.search.trim().is_empty() {
            parts.push(format!("search '{}'", f.search.trim()));
        }
        format!("Filters: {}\n", parts.join("; "))
    }
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Input loop
// ---------------------------------------------------------------------------

/// Read commands until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(state: &mut AppState, input: R, out: &mut W) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        match state.handle_line(&line) {
            Reply::Output(text) => {
                out.write_all(text.as_bytes())?;
                out.flush()?;
            }
            Reply::Quit => {
                info!("quit requested");
                return Ok(());
            }
        }
    }
    info!("input closed");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bestball_core::catalog::{Catalog, PlayerRow};
    use bestball_core::draft::state::PlayerStatus;

    fn row(name: &str, pos: &str, team: &str, gpp: f64, adp: f64) -> PlayerRow {
        PlayerRow {
            name: Some(name.into()),
            position: Some(pos.into()),
            team: Some(team.into()),
            final_adj_gpp: Some(gpp),
            adp: Some(adp),
            ..PlayerRow::default()
        }
    }

    fn state(format: OutputFormat) -> AppState {
        let rows = vec![
            row("Luka Doncic", "PG", "DAL", 900.0, 1.0),
            row("Kyrie Irving", "SG", "DAL", 600.0, 20.0),
            row("Jalen Brunson", "PG", "NYK", 650.0, 12.0),
            row("Josh Hart", "SF", "NYK", 400.0, 60.0),
        ];
        let (catalog, _) = Catalog::from_rows(rows).unwrap();
        AppState::new(Session::new(catalog), EquityTargets::default(), format)
    }

    fn output(reply: Reply) -> String {
        match reply {
            Reply::Output(s) => s,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn draft_and_undo_round_trip() {
        let mut app = state(OutputFormat::Text);
        assert!(output(app.handle_line("draft 0")).contains("Drafted Luka Doncic"));
        assert_eq!(app.session.status_of(0), Some(PlayerStatus::Mine));
        assert!(output(app.handle_line("undo")).contains("Returned Luka Doncic"));
        assert_eq!(app.session.status_of(0), Some(PlayerStatus::Available));
        assert_eq!(output(app.handle_line("undo")), "Nothing to undo\n");
    }

    #[test]
    fn errors_do_not_quit() {
        let mut app = state(OutputFormat::Text);
        app.handle_line("mark 1");
        assert!(output(app.handle_line("draft 1")).starts_with("error:"));
        assert!(output(app.handle_line("draft 42")).contains("not in the catalog"));
        assert!(output(app.handle_line("emphasis 2.0")).starts_with("error:"));
        assert!(output(app.handle_line("fly away")).contains("unknown command"));
        assert_eq!(app.handle_line("quit"), Reply::Quit);
    }

    #[test]
    fn blank_line_is_silent() {
        let mut app = state(OutputFormat::Text);
        assert_eq!(app.handle_line("   "), Reply::Output(String::new()));
    }

    #[test]
    fn filters_accumulate_and_clear() {
        let mut app = state(OutputFormat::Text);
        app.handle_line("team nyk");
        let text = output(app.handle_line("pos pg"));
        assert_eq!(text, "Filters: pos PG; team NYK\n");
        let board = app.session.board();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].player.name, "Jalen Brunson");
        assert_eq!(output(app.handle_line("clear")), "Filters cleared\n");
        assert_eq!(app.session.board().len(), 4);
    }

    #[test]
    fn json_board_is_parseable() {
        let mut app = state(OutputFormat::Json);
        app.handle_line("draft 0");
        app.handle_line("view all");
        let text = output(app.handle_line("board"));
        let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["status"], "Mine");
        assert_eq!(rows[0]["player"]["name"], "Luka Doncic");
    }

    #[test]
    fn snapshot_reflects_session() {
        let mut app = state(OutputFormat::Text);
        app.handle_line("draft 0");
        app.handle_line("mark 2");
        app.handle_line("emphasis 1.2");
        let text = output(app.handle_line("snapshot"));
        let snap: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(snap["drafted_count"], 2);
        assert_eq!(snap["player_count"], 4);
        assert_eq!(snap["roster"][0]["name"], "Luka Doncic");
        assert_eq!(snap["parameters"]["finals_emphasis"], 1.2);
        assert!(snap["generated_at"].is_string());
        // Kyrie stacks with Luka.
        assert_eq!(snap["recommendations"]["stack"][0]["player"]["name"], "Kyrie Irving");
    }

    #[test]
    fn run_stops_at_quit() {
        let mut app = state(OutputFormat::Text);
        let input = "draft 0\nquit\ndraft 1\n";
        let mut out = Vec::new();
        run(&mut app, input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Drafted Luka Doncic"));
        assert_eq!(app.session.roster().len(), 1);
    }
}
