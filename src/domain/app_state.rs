use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entities::EvaluatedDeal;
use super::evaluation::RejectionTally;
use super::sorting::SortState;

/// Where the current scan is in its pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ScanPhase {
    #[default]
    Idle,
    SearchingItems,
    FetchingPrices {
        percent: u8,
        candidates: usize,
    },
    Complete,
}

/// The committed outcome of one scan, replaced wholesale by the next one.
///
/// The generation tag keeps a slow scan that finishes late from clobbering a
/// newer one; scans cannot be cancelled, only out-ranked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchSession {
    pub generation: u64,
    pub deals: Vec<EvaluatedDeal>,
    pub sort: SortState,
    pub tally: RejectionTally,
    pub candidates_considered: usize,
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub favorites: HashSet<u32>,
    pub session: SearchSession,
    pub phase: ScanPhase,
    generation_counter: u64,
}

impl AppState {
    /// Reserve the generation token for a scan that is about to start.
    pub fn begin_scan(&mut self) -> u64 {
        self.generation_counter += 1;
        self.generation_counter
    }

    /// Install a finished scan unless a newer one already landed.
    /// Returns false when the session was discarded as stale.
    pub fn commit_session(&mut self, session: SearchSession) -> bool {
        if session.generation >= self.session.generation {
            self.session = session;
            true
        } else {
            false
        }
    }

    /// Flips the favorite flag for an item; returns its new state.
    pub fn toggle_favorite(&mut self, item_id: u32) -> bool {
        if self.favorites.insert(item_id) {
            true
        } else {
            self.favorites.remove(&item_id);
            false
        }
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.favorites = persisted.favorites.into_iter().collect();
    }

    pub fn to_persisted(&self) -> PersistedState {
        let mut favorites: Vec<u32> = self.favorites.iter().copied().collect();
        favorites.sort_unstable();
        PersistedState { favorites }
    }
}

/// The on-disk shape: one array of favorite item ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub favorites: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_scan_cannot_overwrite_newer_session() {
        let mut state = AppState::default();
        let old = state.begin_scan();
        let new = state.begin_scan();

        assert!(state.commit_session(SearchSession {
            generation: new,
            ..SearchSession::default()
        }));
        assert!(!state.commit_session(SearchSession {
            generation: old,
            ..SearchSession::default()
        }));
        assert_eq!(state.session.generation, new);
    }

    #[test]
    fn favorite_toggle_round_trips_through_persistence() {
        let mut state = AppState::default();
        assert!(state.toggle_favorite(39700));
        assert!(state.toggle_favorite(42942));
        assert!(!state.toggle_favorite(39700));

        let persisted = state.to_persisted();
        assert_eq!(persisted.favorites, vec![42942]);

        let mut restored = AppState::default();
        restored.apply_persisted(persisted);
        assert!(restored.favorites.contains(&42942));
    }
}
