// Library root for the best ball draft engine: player catalog, derived
// metrics, draft state, filtering, and pick recommendations.

pub mod catalog;
pub mod draft;
pub mod session;
pub mod valuation;

pub use catalog::{Catalog, CatalogError, PlayerId, PlayerRecord, PlayerRow};
pub use draft::state::{DraftError, DraftState, PlayerStatus};
pub use draft::view::{BoardRow, PlayerFilter, RankTier, ViewMode};
pub use session::{Session, SessionError, SessionParameters};

#[cfg(test)]
pub(crate) mod test_support;
