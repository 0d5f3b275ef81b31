// Line-oriented command protocol for the interactive session.

use std::collections::BTreeSet;

use bestball_core::catalog::PlayerId;
use bestball_core::draft::view::{RankTier, ViewMode};
use thiserror::Error;

/// One command read from the input stream.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Board,
    Recommendations,
    Equity,
    Exposure,
    Snapshot,
    Draft(PlayerId),
    MarkDrafted(PlayerId),
    Undo,
    Reset,
    SetEmphasis(f64),
    SetView(ViewMode),
    /// Position filter; empty means all positions.
    FilterPositions(BTreeSet<String>),
    FilterTeams(BTreeSet<String>),
    FilterTier(Option<RankTier>),
    FilterFinals(BTreeSet<u32>),
    Search(String),
    ClearFilters,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}

pub const HELP: &str = "\
commands:
  board                      show the board for the current view and filters
  recs                       value / stack / safety picks
  equity                     roster advance and win equity
  exposure                   roster team and position counts
  snapshot                   full session state as JSON
  draft <id>                 draft a player onto your roster
  mark <id>                  mark a player taken by an opponent
  undo                       take back your last pick
  reset                      clear the whole draft
  emphasis <0.8-1.4>         finals emphasis slider
  view <available|drafted|opponents|mine|all>
  pos <PG,SG,..|all>         position filter
  team <BOS,NYK,..|all>      team filter
  tier <1-5|6-10|11-20|21-30|all>
  finals <3,4,..|all>        finals games filter
  search <text>              name search (empty clears)
  clear                      clear every filter
  help                       this text
  quit                       exit";

/// Parse one input line. Blank lines are the caller's concern.
pub fn parse_command(line: &str) -> Result<UserCommand, CommandError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_lowercase().as_str() {
        "board" | "b" => Ok(UserCommand::Board),
        "recs" | "r" => Ok(UserCommand::Recommendations),
        "equity" | "eq" => Ok(UserCommand::Equity),
        "exposure" => Ok(UserCommand::Exposure),
        "snapshot" => Ok(UserCommand::Snapshot),
        "draft" | "d" => parse_id(rest, "draft").map(UserCommand::Draft),
        "mark" | "m" => parse_id(rest, "mark").map(UserCommand::MarkDrafted),
        "undo" | "u" => Ok(UserCommand::Undo),
        "reset" => Ok(UserCommand::Reset),
        "emphasis" => rest
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(UserCommand::SetEmphasis)
            .ok_or(CommandError::BadArgument {
                command: "emphasis",
                expected: "a number between 0.8 and 1.4",
            }),
        "view" => ViewMode::from_str_mode(rest)
            .map(UserCommand::SetView)
            .ok_or(CommandError::BadArgument {
                command: "view",
                expected: "one of available, drafted, opponents, mine, all",
            }),
        "pos" => Ok(UserCommand::FilterPositions(parse_list(rest))),
        "team" => Ok(UserCommand::FilterTeams(parse_list(rest))),
        "tier" => parse_tier(rest).map(UserCommand::FilterTier),
        "finals" => parse_finals(rest).map(UserCommand::FilterFinals),
        "search" | "s" => Ok(UserCommand::Search(rest.to_string())),
        "clear" => Ok(UserCommand::ClearFilters),
        "help" | "?" => Ok(UserCommand::Help),
        "quit" | "exit" | "q" => Ok(UserCommand::Quit),
        _ => Err(CommandError::Unknown(verb.to_string())),
    }
}

fn parse_id(arg: &str, command: &'static str) -> Result<PlayerId, CommandError> {
    arg.parse::<PlayerId>().map_err(|_| CommandError::BadArgument {
        command,
        expected: "a player id",
    })
}

fn is_all(arg: &str) -> bool {
    arg.is_empty() || arg.eq_ignore_ascii_case("all")
}

/// Comma-separated values, uppercased. `all` or nothing clears the filter.
fn parse_list(arg: &str) -> BTreeSet<String> {
    if is_all(arg) {
        return BTreeSet::new();
    }
    arg.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_tier(arg: &str) -> Result<Option<RankTier>, CommandError> {
    if is_all(arg) {
        return Ok(None);
    }
    RankTier::from_str_tier(arg)
        .map(Some)
        .ok_or(CommandError::BadArgument {
            command: "tier",
            expected: "one of 1-5, 6-10, 11-20, 21-30, all",
        })
}

fn parse_finals(arg: &str) -> Result<BTreeSet<u32>, CommandError> {
    if is_all(arg) {
        return Ok(BTreeSet::new());
    }
    arg.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| CommandError::BadArgument {
                command: "finals",
                expected: "comma-separated game counts",
            })
        })
        .collect()
}
