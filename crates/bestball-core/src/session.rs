// A single draft session: one catalog, one draft state, one set of sliders.
//
// Each session owns its state outright. Nothing here is global; a second
// draft is a second `Session`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{Catalog, PlayerId, PlayerRecord};
use crate::draft::state::{DraftError, DraftState, PlayerStatus};
use crate::draft::view::{build_board, filter_players, BoardRow, PlayerFilter, ViewMode};
use crate::valuation::equity::{self, Equity, PositionCount, TeamExposure};
use crate::valuation::metrics::{
    emphasis_in_range, DEFAULT_FINALS_EMPHASIS, MAX_FINALS_EMPHASIS, MIN_FINALS_EMPHASIS,
};
use crate::valuation::recommend::{recommend, RecommendationLimits, Recommendations};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("player {id} is not in the catalog")]
    UnknownPlayer { id: PlayerId },

    #[error(
        "finals emphasis {value} outside [{min}, {max}]",
        min = MIN_FINALS_EMPHASIS,
        max = MAX_FINALS_EMPHASIS
    )]
    EmphasisOutOfRange { value: f64 },
}

/// User-adjustable inputs that shape the board and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParameters {
    pub finals_emphasis: f64,
    pub filter: PlayerFilter,
    pub view: ViewMode,
}

impl Default for SessionParameters {
    fn default() -> Self {
        SessionParameters {
            finals_emphasis: DEFAULT_FINALS_EMPHASIS,
            filter: PlayerFilter::default(),
            view: ViewMode::default(),
        }
    }
}

pub struct Session {
    catalog: Catalog,
    draft: DraftState,
    params: SessionParameters,
    limits: RecommendationLimits,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        let params = SessionParameters {
            finals_emphasis: catalog.finals_emphasis(),
            ..SessionParameters::default()
        };
        Session {
            catalog,
            draft: DraftState::new(),
            params,
            limits: RecommendationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RecommendationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn draft_state(&self) -> &DraftState {
        &self.draft
    }

    pub fn parameters(&self) -> &SessionParameters {
        &self.params
    }

    pub fn limits(&self) -> RecommendationLimits {
        self.limits
    }

    /// Swap in a freshly loaded catalog. The draft starts over; the current
    /// emphasis carries across.
    pub fn reload(&mut self, mut catalog: Catalog) {
        catalog.set_finals_emphasis(self.params.finals_emphasis);
        info!("reloaded catalog with {} players; draft reset", catalog.len());
        self.catalog = catalog;
        self.draft.reset();
    }

    // -- parameters --

    pub fn set_finals_emphasis(&mut self, emphasis: f64) -> Result<(), SessionError> {
        if !emphasis_in_range(emphasis) {
            return Err(SessionError::EmphasisOutOfRange { value: emphasis });
        }
        self.params.finals_emphasis = emphasis;
        self.catalog.set_finals_emphasis(emphasis);
        info!("finals emphasis set to {:.2}", emphasis);
        Ok(())
    }

    pub fn set_filter(&mut self, filter: PlayerFilter) {
        self.params.filter = filter;
    }

    pub fn filter_mut(&mut self) -> &mut PlayerFilter {
        &mut self.params.filter
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.params.view = view;
    }

    // -- draft transitions --

    /// Draft a player onto the user's roster.
    pub fn draft(&mut self, id: PlayerId) -> Result<&PlayerRecord, SessionError> {
        let player = self
            .catalog
            .get(id)
            .ok_or(SessionError::UnknownPlayer { id })?;
        self.draft.draft(id)?;
        Ok(player)
    }

    /// Record an opponent's pick.
    pub fn mark_drafted(&mut self, id: PlayerId) -> Result<&PlayerRecord, SessionError> {
        let player = self
            .catalog
            .get(id)
            .ok_or(SessionError::UnknownPlayer { id })?;
        self.draft.mark_drafted(id)?;
        Ok(player)
    }

    /// Undo the user's last pick, returning who came back.
    pub fn undo(&mut self) -> Option<&PlayerRecord> {
        let id = self.draft.undo()?;
        self.catalog.get(id)
    }

    pub fn reset(&mut self) {
        self.draft.reset();
    }

    // -- queries --

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.catalog.get(id)
    }

    /// Draft status of `id`, or `None` if the id is unknown.
    pub fn status_of(&self, id: PlayerId) -> Option<PlayerStatus> {
        self.catalog.contains(id).then(|| self.draft.status(id))
    }

    /// The board: filtered players in the current view, tagged with status.
    pub fn board(&self) -> Vec<BoardRow<'_>> {
        build_board(
            self.catalog.players(),
            &self.params.filter,
            &self.draft,
            self.params.view,
        )
    }

    /// The user's roster in pick order.
    pub fn roster(&self) -> Vec<&PlayerRecord> {
        self.draft
            .roster_ids()
            .iter()
            .filter_map(|&id| self.catalog.get(id))
            .collect()
    }

    /// Recommendations drawn from the filtered, available players. The view
    /// mode does not apply here; drafted players are always excluded.
    pub fn recommendations(&self) -> Recommendations<'_> {
        let candidates = filter_players(self.catalog.players(), &self.params.filter);
        let roster = self.roster();
        recommend(&candidates, &roster, &self.draft, self.limits)
    }

    pub fn equity(&self) -> Equity {
        equity::compute_equity(self.roster())
    }

    pub fn team_exposure(&self) -> Vec<TeamExposure> {
        equity::team_exposure(self.roster())
    }

    pub fn position_breakdown(&self) -> Vec<PositionCount> {
        equity::position_breakdown(self.roster())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlayerRow;

    fn row(name: &str, team: &str, final_adj_gpp: f64, adp: f64) -> PlayerRow {
        PlayerRow {
            name: Some(name.into()),
            position: Some("PG".into()),
            team: Some(team.into()),
            final_adj_gpp: Some(final_adj_gpp),
            adp: Some(adp),
            ..PlayerRow::default()
        }
    }

    fn session() -> Session {
        let rows = vec![
            row("A", "BOS", 100.0, 5.0),
            row("B", "NYK", 90.0, 1.0),
            row("C", "BOS", 90.0, 2.0),
            row("D", "MIA", 70.0, 4.0),
        ];
        let (catalog, _) = Catalog::from_rows(rows).unwrap();
        Session::new(catalog)
    }

    #[test]
    fn unknown_player_is_rejected() {
        let mut s = session();
        assert_eq!(s.draft(99).unwrap_err(), SessionError::UnknownPlayer { id: 99 });
        assert_eq!(s.mark_drafted(99).unwrap_err(), SessionError::UnknownPlayer { id: 99 });
        assert!(s.draft_state().drafted_ids().is_empty());
        assert_eq!(s.status_of(99), None);
    }

    #[test]
    fn double_draft_surfaces_invalid_transition() {
        let mut s = session();
        s.draft(0).unwrap();
        let err = s.mark_drafted(0).unwrap_err();
        assert_eq!(
            err,
            SessionError::Draft(DraftError::InvalidTransition {
                id: 0,
                status: PlayerStatus::Mine
            })
        );
    }

    #[test]
    fn emphasis_out_of_range_leaves_scores_alone() {
        let mut s = session();
        let before = s.catalog().players().to_vec();
        assert!(matches!(
            s.set_finals_emphasis(1.5),
            Err(SessionError::EmphasisOutOfRange { .. })
        ));
        assert_eq!(s.catalog().players(), before.as_slice());
        assert_eq!(s.parameters().finals_emphasis, 1.0);
    }

    #[test]
    fn emphasis_scales_live_score_only() {
        let mut s = session();
        let before = s.catalog().players().to_vec();
        s.set_finals_emphasis(1.2).unwrap();
        for (old, new) in before.iter().zip(s.catalog().players()) {
            assert_eq!(new.live_score, old.live_score * 1.2);
            assert_eq!(new.final_rank, old.final_rank);
            assert_eq!(new.adp_rank, old.adp_rank);
            assert_eq!(new.value_score, new.adp_rank as i64 - new.final_rank as i64);
            assert_eq!(new.value_z, old.value_z);
        }
    }

    #[test]
    fn recommendations_follow_roster() {
        let mut s = session();
        assert!(s.recommendations().stack.iter().all(|p| p.score == 0));

        s.draft(0).unwrap();
        let recs = s.recommendations();
        assert_eq!(recs.stack[0].player.name, "C");
        assert_eq!(recs.stack[0].score, 6);
        assert!(recs.value.iter().all(|p| p.player.id != 0));
    }

    #[test]
    fn recommendations_respect_filter() {
        let mut s = session();
        s.filter_mut().teams.insert("BOS".into());
        let recs = s.recommendations();
        assert!(recs.value.iter().all(|p| p.player.team == "BOS"));
        assert_eq!(recs.value.len(), 2);
    }

    #[test]
    fn equity_and_exposure_track_roster() {
        let mut s = session();
        assert_eq!(s.equity(), Equity::default());
        s.draft(0).unwrap();
        s.draft(2).unwrap();
        s.mark_drafted(1).unwrap();
        let eq = s.equity();
        assert!((eq.advance - 14.1).abs() < 1e-9);
        assert_eq!(s.team_exposure()[0].count, 2);
        assert_eq!(s.position_breakdown()[0].count, 2);

        assert_eq!(s.undo().map(|p| p.id), Some(2));
        assert_eq!(s.roster().len(), 1);
    }

    #[test]
    fn board_uses_view_mode() {
        let mut s = session();
        s.draft(1).unwrap();
        assert_eq!(s.board().len(), 3);
        s.set_view(ViewMode::MyRoster);
        let board = s.board();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].status, PlayerStatus::Mine);
    }

    #[test]
    fn reload_resets_draft_and_keeps_emphasis() {
        let mut s = session();
        s.set_finals_emphasis(0.9).unwrap();
        s.draft(1).unwrap();

        let (catalog, _) = Catalog::from_rows(vec![row("Z", "DEN", 50.0, 1.0)]).unwrap();
        s.reload(catalog);
        assert!(s.draft_state().drafted_ids().is_empty());
        assert_eq!(s.catalog().len(), 1);
        assert!((s.catalog().players()[0].live_score - 45.0).abs() < 1e-9);
    }
}
