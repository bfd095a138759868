use dioxus::{prelude::*, signals::Signal};

use crate::{
    domain::{
        evaluate_deals, sort_deals, AppState, DealFilters, ScanPhase, SearchSession, SortState,
    },
    infra::{universalis::UniversalisClient, xivapi::XivApiClient},
    ui::{
        components::toast::{push_toast, Toast, ToastKind, ToastMessage},
        pages::{ScannerPage, SettingsPage},
        shell::Shell,
    },
    util::{
        assets,
        persistence::{load_favorites, save_favorites},
    },
};

/// Listings requested per item; only the cheapest few matter.
pub const LISTINGS_PER_ITEM: u32 = 10;

/// Inputs captured at the moment the user presses Scan, so later edits to the
/// form cannot leak into a scan already in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanRequest {
    /// World or data center name, exactly as Universalis expects it.
    pub location: String,
    pub min_item_level: u16,
    pub filters: DealFilters,
}

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Scanner {},
    #[route("/settings")]
    Settings {},
}

#[component]
pub fn App() -> Element {
    let state = use_signal(AppState::default);
    use_hook({
        let mut state = state.clone();
        move || {
            if let Some(saved) = load_favorites() {
                state.with_mut(|st| st.apply_persisted(saved));
            }
        }
    });
    use_context_provider(|| state.clone());

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts.clone());

    // Scan trigger shared across routes.
    let scan_request = use_signal(|| None::<ScanRequest>);
    use_context_provider(|| scan_request.clone());

    let _scan = use_resource({
        let state = state.clone();
        let toasts = toasts.clone();
        let scan_request = scan_request.clone();
        move || async move { run_scan(state.clone(), toasts.clone(), scan_request.clone()).await }
    });

    rsx! {
        document::Link { rel: "icon", href: assets::favicon_data_uri() }
        document::Style { "{assets::main_css()}" }
        document::Style { "{assets::tailwind_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

pub fn persist_favorites(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_favorites(&snapshot) {
        println!("Failed to persist favorites: {err}");
    }
}

/// Drives the whole pipeline for one queued `ScanRequest`:
/// candidate search → sequential price fetch → evaluation → commit.
async fn run_scan(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    mut scan_request: Signal<Option<ScanRequest>>,
) -> Option<u64> {
    let Some(request) = scan_request() else {
        return None;
    };

    let generation = state.with_mut(|st| {
        st.phase = ScanPhase::SearchingItems;
        st.begin_scan()
    });
    println!(
        "Scan #{generation} starting for {} (min ilvl {})",
        request.location, request.min_item_level
    );

    let Ok(xivapi) = XivApiClient::new() else {
        scan_request.set(None);
        state.with_mut(|st| st.phase = ScanPhase::Idle);
        push_toast(toasts.clone(), ToastKind::Error, "Failed to initialise the XIVAPI client.");
        return None;
    };

    let candidates = xivapi.search_candidates(request.min_item_level).await;

    if candidates.is_empty() {
        scan_request.set(None);
        state.with_mut(|st| {
            st.commit_session(SearchSession {
                generation,
                ..SearchSession::default()
            });
            st.phase = ScanPhase::Complete;
        });
        return Some(generation);
    }

    state.with_mut(|st| {
        st.phase = ScanPhase::FetchingPrices {
            percent: 0,
            candidates: candidates.len(),
        }
    });

    let Ok(universalis) = UniversalisClient::new() else {
        scan_request.set(None);
        state.with_mut(|st| st.phase = ScanPhase::Idle);
        push_toast(toasts.clone(), ToastKind::Error, "Failed to initialise the Universalis client.");
        return None;
    };

    let item_ids: Vec<u32> = candidates.iter().map(|c| c.id).collect();
    let mut progress_state = state.clone();
    let snapshot = universalis
        .fetch_market_data(
            &request.location,
            &item_ids,
            LISTINGS_PER_ITEM,
            move |percent| {
                progress_state.with_mut(|st| {
                    if let ScanPhase::FetchingPrices { percent: current, .. } = &mut st.phase {
                        *current = percent;
                    }
                });
            },
        )
        .await;

    let favorites = state.with(|st| st.favorites.clone());
    let report = evaluate_deals(
        &candidates,
        &snapshot,
        &request.filters,
        &favorites,
        &request.location,
    );
    println!(
        "Scan #{generation} evaluated {} candidates: {} deals, {} rejected",
        report.candidates_considered,
        report.deals.len(),
        report.tally.total()
    );

    scan_request.set(None);
    state.with_mut(|st| {
        let mut session = SearchSession {
            generation,
            deals: report.deals,
            sort: SortState::default(),
            tally: report.tally,
            candidates_considered: report.candidates_considered,
        };
        sort_deals(&mut session.deals, session.sort);
        if !st.commit_session(session) {
            println!("Scan #{generation} finished after a newer scan; discarding its results.");
        }
        st.phase = ScanPhase::Complete;
    });

    Some(generation)
}

#[component]
pub fn Scanner() -> Element {
    rsx! { Shell { ScannerPage {} } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Shell { SettingsPage {} } }
}
