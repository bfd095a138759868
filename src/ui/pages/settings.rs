use dioxus::prelude::*;

use crate::{
    app::persist_favorites,
    domain::AppState,
    infra::cache::{clear_candidate_cache, load_candidate_cache},
    ui::components::toast::{push_toast, ToastKind, ToastMessage},
    util::version::{check_for_update, version_label},
};

#[component]
pub fn SettingsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    // Re-read after each clear so the card reflects reality.
    let cache_version = use_signal(|| 0u32);
    let cache_info = {
        let _refresh = cache_version();
        load_candidate_cache().map(|cache| {
            (
                cache.items.len(),
                cache.min_item_level,
                cache.age_string(),
                cache.is_expired(),
            )
        })
    };

    let favorite_count = state.with(|st| st.favorites.len());
    let checking_update = use_signal(|| false);

    let on_clear_cache = {
        let toasts = toasts.clone();
        let mut cache_version = cache_version.clone();
        move |_| {
            match clear_candidate_cache() {
                Ok(()) => push_toast(
                    toasts.clone(),
                    ToastKind::Info,
                    "Cleared the candidate catalog. The next scan will query XIVAPI again.",
                ),
                Err(err) => push_toast(
                    toasts.clone(),
                    ToastKind::Error,
                    format!("Failed to clear the catalog cache: {err}"),
                ),
            }
            cache_version.set(cache_version() + 1);
        }
    };

    let on_clear_favorites = {
        let mut state = state.clone();
        let toasts = toasts.clone();
        move |_| {
            state.with_mut(|st| st.favorites.clear());
            persist_favorites(&state);
            push_toast(toasts.clone(), ToastKind::Info, "Cleared all favorites.");
        }
    };

    let on_check_update = {
        let toasts = toasts.clone();
        let mut checking_update = checking_update.clone();
        move |_| {
            if checking_update() {
                return;
            }
            checking_update.set(true);
            let toasts = toasts.clone();
            let mut checking_update = checking_update.clone();
            spawn(async move {
                match check_for_update().await {
                    Ok(info) => {
                        let kind = if info.update_available() {
                            ToastKind::Warning
                        } else {
                            ToastKind::Success
                        };
                        push_toast(toasts.clone(), kind, info.to_string());
                    }
                    Err(err) => push_toast(
                        toasts.clone(),
                        ToastKind::Error,
                        format!("Update check failed: {err}"),
                    ),
                }
                checking_update.set(false);
            });
        }
    };

    let version = version_label();

    rsx! {
        div { class: "space-y-8",
            section {
                class: "rounded-xl border border-slate-800 bg-slate-900/40 p-6",
                h2 { class: "text-sm font-semibold uppercase tracking-wide text-slate-500", "Candidate Catalog" }
                match cache_info {
                    Some((count, min_ilvl, age, expired)) => rsx! {
                        p { class: "mt-3 text-sm text-slate-300",
                            {format!("{count} cached items (min ilvl {min_ilvl}), fetched {age} ago")}
                            if expired {
                                span { class: "ml-2 text-xs text-amber-400", "expired" }
                            }
                        }
                    },
                    None => rsx! {
                        p { class: "mt-3 text-sm text-slate-400", "No cached catalog. The next scan will query XIVAPI." }
                    },
                }
                button {
                    class: "mt-4 rounded-lg border border-amber-500/40 px-4 py-2 text-xs font-semibold uppercase tracking-wide text-amber-200 hover:bg-amber-500/10",
                    onclick: on_clear_cache,
                    "Clear Catalog Cache"
                }
            }

            section {
                class: "rounded-xl border border-slate-800 bg-slate-900/40 p-6",
                h2 { class: "text-sm font-semibold uppercase tracking-wide text-slate-500", "Favorites" }
                p { class: "mt-2 text-sm text-slate-400",
                    {format!("{favorite_count} item(s) starred. Favorites persist across restarts.")}
                }
                button {
                    class: "mt-3 rounded-lg border border-rose-500/40 px-4 py-2 text-xs font-semibold uppercase tracking-wide text-rose-200 hover:bg-rose-500/10",
                    onclick: on_clear_favorites,
                    "Clear Favorites"
                }
            }

            section {
                class: "rounded-xl border border-slate-800 bg-slate-900/40 p-6",
                h2 { class: "text-sm font-semibold uppercase tracking-wide text-slate-500", "Updates" }
                p { class: "mt-2 text-sm text-slate-400", "Running {version}" }
                button {
                    class: "mt-3 rounded-lg border border-indigo-500/40 px-4 py-2 text-xs font-semibold uppercase tracking-wide text-indigo-200 hover:bg-indigo-500/10 disabled:opacity-50",
                    disabled: checking_update(),
                    onclick: on_check_update,
                    if checking_update() { "Checking..." } else { "Check for Updates" }
                }
            }

            section {
                class: "rounded-xl border border-slate-800 bg-slate-900/40 p-6 text-slate-400",
                h2 { class: "text-sm font-semibold uppercase tracking-wide text-slate-500", "Data Attribution" }
                p { class: "mt-2 text-sm",
                    "Item data courtesy of "
                    a { class: "text-indigo-300 hover:text-indigo-100", href: "https://v2.xivapi.com", target: "_blank", "XIVAPI" }
                    ", market data courtesy of "
                    a { class: "text-indigo-300 hover:text-indigo-100", href: "https://universalis.app", target: "_blank", "Universalis" }
                    "."
                }
                p { class: "mt-1 text-xs text-slate-500", "Neither service is affiliated with this app. Be gentle with their rate limits." }
            }
        }
    }
}
