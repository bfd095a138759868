use dioxus::prelude::*;

use crate::{
    app::{persist_favorites, ScanRequest},
    domain::{
        sort_deals, worlds, AppState, DealFilters, QualityFilter, ScanPhase, SearchSession,
        SortColumn,
    },
    ui::components::{
        deal_table::{format_number, DealRow, DealTable},
        kpi_card::KpiCard,
        progress_bar::ProgressBar,
        toast::{push_toast, ToastKind, ToastMessage},
    },
};

/// Sentinel value for the world selector meaning "query the whole DC".
const ENTIRE_DC: &str = "all";

const INPUT_CLASS: &str = "mt-1 w-full rounded-lg border border-slate-700 bg-slate-950 px-3 py-2 text-sm text-slate-100 focus:border-indigo-500 focus:outline-none";
const LABEL_CLASS: &str = "block text-xs font-semibold uppercase text-slate-500";

#[component]
pub fn ScannerPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let scan_request = use_context::<Signal<Option<ScanRequest>>>();

    let mut region_input = use_signal(|| worlds::DEFAULT_REGION.to_string());
    let mut dc_input = use_signal(|| worlds::DEFAULT_DATA_CENTER.to_string());
    let mut world_input = use_signal(|| ENTIRE_DC.to_string());
    let mut min_ilvl_input = use_signal(|| "580".to_string());
    let mut min_stock_input = use_signal(|| "1".to_string());
    let mut quality_input = use_signal(|| "any".to_string());
    let mut min_seals_input = use_signal(|| "0".to_string());
    let mut min_efficiency_input = use_signal(|| "0".to_string());
    let mut favorites_only = use_signal(|| false);

    let phase = state.with(|st| st.phase.clone());
    let session = state.with(|st| st.session.clone());
    let favorites = state.with(|st| st.favorites.clone());

    let scanning = matches!(
        phase,
        ScanPhase::SearchingItems | ScanPhase::FetchingPrices { .. }
    );

    let on_region_change = move |evt: FormEvent| {
        let name = evt.value();
        if let Some(region) = worlds::region(&name) {
            let first_dc = region
                .data_centers
                .first()
                .map(|dc| dc.name.to_string())
                .unwrap_or_default();
            dc_input.set(first_dc);
            world_input.set(ENTIRE_DC.to_string());
        }
        region_input.set(name);
    };

    let on_dc_change = move |evt: FormEvent| {
        dc_input.set(evt.value());
        world_input.set(ENTIRE_DC.to_string());
    };

    let on_scan = {
        let state = state.clone();
        let toasts = toasts.clone();
        let mut scan_request = scan_request.clone();
        move |_| {
            let busy = state.with(|st| {
                matches!(
                    st.phase,
                    ScanPhase::SearchingItems | ScanPhase::FetchingPrices { .. }
                )
            });
            if busy {
                push_toast(toasts.clone(), ToastKind::Warning, "A scan is already running.");
                return;
            }

            let world = world_input();
            let location = if world == ENTIRE_DC {
                dc_input()
            } else {
                world.clone()
            };
            if location.is_empty() {
                push_toast(
                    toasts.clone(),
                    ToastKind::Warning,
                    "Select a world or data center first.",
                );
                return;
            }

            let filters = DealFilters {
                min_stock: min_stock_input().trim().parse().unwrap_or(1).max(1),
                quality: match quality_input().as_str() {
                    "nq" => QualityFilter::NormalOnly,
                    "hq" => QualityFilter::HighQualityOnly,
                    _ => QualityFilter::Any,
                },
                min_seals: min_seals_input().trim().parse().unwrap_or(0),
                min_efficiency: min_efficiency_input().trim().parse().unwrap_or(0.0),
                favorites_only: favorites_only(),
            };

            scan_request.set(Some(ScanRequest {
                location,
                min_item_level: min_ilvl_input().trim().parse().unwrap_or(1),
                filters,
            }));
        }
    };

    let on_sort = {
        let mut state = state.clone();
        move |column: SortColumn| {
            state.with_mut(|st| {
                if st.session.deals.is_empty() {
                    return;
                }
                st.session.sort = st.session.sort.toggled(column);
                let sort = st.session.sort;
                sort_deals(&mut st.session.deals, sort);
            });
        }
    };

    let on_toggle_favorite = {
        let mut state = state.clone();
        move |item_id: u32| {
            state.with_mut(|st| {
                st.toggle_favorite(item_id);
            });
            persist_favorites(&state);
        }
    };

    let rows: Vec<DealRow> = session
        .deals
        .iter()
        .map(|deal| DealRow {
            item_id: deal.item_id,
            name: deal.name.clone(),
            item_level: deal.item_level,
            icon_url: format!("https://xivapi.com{}", deal.icon_path),
            world: deal.world.clone(),
            hq: deal.hq,
            price_display: format!("{} g", format_number(deal.price)),
            stock_display: if deal.stock_at_price == deal.total_stock {
                format_number(deal.stock_at_price)
            } else {
                format!("{}/{}", deal.stock_at_price, deal.total_stock)
            },
            stock_title: format!(
                "{} at this price, {} total",
                deal.stock_at_price, deal.total_stock
            ),
            seals_display: format_number(deal.seals),
            fc_display: format_number(deal.fc_points),
            efficiency: deal.efficiency,
            is_favorite: favorites.contains(&deal.item_id),
        })
        .collect();

    let status = status_message(&phase, &session);
    let status_is_error = matches!(&phase, ScanPhase::Complete if session.deals.is_empty());
    let best_efficiency = session
        .deals
        .iter()
        .map(|deal| deal.efficiency)
        .fold(f64::NEG_INFINITY, f64::max);
    let show_summary = matches!(phase, ScanPhase::Complete) && !session.deals.is_empty();

    let region_name = region_input();
    let dc_name = dc_input();
    let world_name = world_input();
    let quality = quality_input();

    rsx! {
        div { class: "space-y-6",
            section {
                class: "rounded-xl border border-slate-800 bg-slate-900/40 p-4",
                div { class: "grid gap-4 sm:grid-cols-3 lg:grid-cols-5",
                    div {
                        label { class: "{LABEL_CLASS}", "Region" }
                        select {
                            class: "{INPUT_CLASS}",
                            onchange: on_region_change,
                            for region in worlds::REGIONS.iter() {
                                option {
                                    value: region.name,
                                    selected: region_name == region.name,
                                    "{region.name}"
                                }
                            }
                        }
                    }
                    div {
                        label { class: "{LABEL_CLASS}", "Data Center" }
                        select {
                            class: "{INPUT_CLASS}",
                            onchange: on_dc_change,
                            if let Some(region) = worlds::region(&region_name) {
                                for dc in region.data_centers.iter() {
                                    option {
                                        value: dc.name,
                                        selected: dc_name == dc.name,
                                        "{dc.name}"
                                    }
                                }
                            }
                        }
                    }
                    div {
                        label { class: "{LABEL_CLASS}", "World" }
                        select {
                            class: "{INPUT_CLASS}",
                            onchange: move |evt: FormEvent| world_input.set(evt.value()),
                            option {
                                value: ENTIRE_DC,
                                selected: world_name == ENTIRE_DC,
                                "Entire DC (Available)"
                            }
                            if let Some(dc) = worlds::data_center(&region_name, &dc_name) {
                                for world in dc.worlds.iter() {
                                    option {
                                        value: *world,
                                        selected: world_name == *world,
                                        "{world}"
                                    }
                                }
                            }
                        }
                    }
                    div {
                        label { class: "{LABEL_CLASS}", "Min iLvl" }
                        input {
                            class: "{INPUT_CLASS}",
                            inputmode: "numeric",
                            value: min_ilvl_input(),
                            oninput: move |evt| min_ilvl_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: "{LABEL_CLASS}", "Min Stock" }
                        input {
                            class: "{INPUT_CLASS}",
                            inputmode: "numeric",
                            value: min_stock_input(),
                            oninput: move |evt| min_stock_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: "{LABEL_CLASS}", "Quality" }
                        select {
                            class: "{INPUT_CLASS}",
                            onchange: move |evt: FormEvent| quality_input.set(evt.value()),
                            option { value: "any", selected: quality == "any", {QualityFilter::Any.label()} }
                            option { value: "nq", selected: quality == "nq", {QualityFilter::NormalOnly.label()} }
                            option { value: "hq", selected: quality == "hq", {QualityFilter::HighQualityOnly.label()} }
                        }
                    }
                    div {
                        label { class: "{LABEL_CLASS}", "Min Seals" }
                        input {
                            class: "{INPUT_CLASS}",
                            inputmode: "numeric",
                            value: min_seals_input(),
                            oninput: move |evt| min_seals_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: "{LABEL_CLASS}", "Min Efficiency" }
                        input {
                            class: "{INPUT_CLASS}",
                            inputmode: "decimal",
                            value: min_efficiency_input(),
                            oninput: move |evt| min_efficiency_input.set(evt.value()),
                        }
                    }
                    div { class: "flex items-end gap-2 pb-1",
                        input {
                            r#type: "checkbox",
                            id: "fav-filter",
                            class: "h-4 w-4 cursor-pointer accent-amber-400",
                            checked: favorites_only(),
                            onclick: move |_| {
                                let current = favorites_only();
                                favorites_only.set(!current);
                            },
                        }
                        label {
                            class: "cursor-pointer text-sm text-slate-300",
                            r#for: "fav-filter",
                            "Favorites only"
                        }
                    }
                    div { class: "flex items-end",
                        button {
                            class: "w-full rounded-lg bg-indigo-500 px-4 py-2 text-sm font-semibold text-white hover:bg-indigo-400 disabled:cursor-not-allowed disabled:opacity-50",
                            disabled: scanning,
                            onclick: on_scan,
                            if scanning { "Scanning..." } else { "Scan" }
                        }
                    }
                }
            }

            if let Some(message) = status {
                p {
                    class: if status_is_error { "text-sm text-rose-400" } else { "text-sm text-slate-400" },
                    "{message}"
                }
            }

            if let ScanPhase::FetchingPrices { percent, .. } = phase {
                ProgressBar { percent }
            }

            if show_summary {
                section {
                    class: "grid gap-4 sm:grid-cols-3",
                    KpiCard {
                        title: "Deals Found".to_string(),
                        value: session.deals.len().to_string(),
                        description: Some(format!("out of {} candidates", session.candidates_considered)),
                    }
                    KpiCard {
                        title: "Best Efficiency".to_string(),
                        value: format!("{best_efficiency:.2}"),
                        description: Some("seals per gil".to_string()),
                    }
                    KpiCard {
                        title: "Hidden by Filters".to_string(),
                        value: session.tally.total().to_string(),
                        description: Some("see status line for the breakdown".to_string()),
                    }
                }
            }

            DealTable {
                rows,
                sort: session.sort,
                on_sort,
                on_toggle_favorite,
            }
        }
    }
}

fn status_message(phase: &ScanPhase, session: &SearchSession) -> Option<String> {
    match phase {
        ScanPhase::Idle => None,
        ScanPhase::SearchingItems => {
            Some("Scanning the item sheet for turn-in candidates...".to_string())
        }
        ScanPhase::FetchingPrices { candidates, .. } => Some(format!(
            "Found {candidates} candidates. Fetching latest prices..."
        )),
        ScanPhase::Complete => Some(if session.deals.is_empty() {
            if session.candidates_considered == 0 {
                "No items found matching criteria.".to_string()
            } else {
                format!(
                    "Found {} items, but all were hidden: {}",
                    session.candidates_considered,
                    session.tally.reasons().join(", ")
                )
            }
        } else {
            format!("Found {} deal(s).", session.deals.len())
        }),
    }
}
