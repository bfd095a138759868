//! Domain logic for seal-deal evaluation lives here.

pub mod app_state;
pub mod entities;
pub mod evaluation;
pub mod sorting;
pub mod worlds;

#[allow(unused_imports)]
pub use app_state::{AppState, PersistedState, ScanPhase, SearchSession};
#[allow(unused_imports)]
pub use entities::{
    DealFilters, EvaluatedDeal, ItemCandidate, ItemMarketData, MarketListing, MarketSnapshot,
    QualityFilter,
};
#[allow(unused_imports)]
pub use evaluation::{evaluate_deals, fc_points, seal_value, DealReport, RejectionTally};
#[allow(unused_imports)]
pub use sorting::{sort_deals, SortColumn, SortState};
