use dioxus::{document, prelude::*};

use crate::domain::{SortColumn, SortState};

/// Pre-formatted row data; all number formatting happens before rsx.
#[derive(Clone, PartialEq)]
pub struct DealRow {
    pub item_id: u32,
    pub name: String,
    pub item_level: u16,
    pub icon_url: String,
    pub world: String,
    pub hq: bool,
    pub price_display: String,
    pub stock_display: String,
    pub stock_title: String,
    pub seals_display: String,
    pub fc_display: String,
    pub efficiency: f64,
    pub is_favorite: bool,
}

#[component]
pub fn DealTable(
    rows: Vec<DealRow>,
    sort: SortState,
    on_sort: EventHandler<SortColumn>,
    on_toggle_favorite: EventHandler<u32>,
) -> Element {
    let is_empty = rows.is_empty();

    rsx! {
        div {
            class: "rounded-xl border border-slate-800 bg-slate-900/40 overflow-hidden",
            table {
                class: "min-w-full divide-y divide-slate-800 text-sm",
                thead {
                    class: "border-b border-slate-800 bg-slate-900/60 text-left text-xs uppercase tracking-wide text-slate-500",
                    tr {
                        th { class: "px-3 py-3" }
                        SortableHeader { column: SortColumn::Name, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::ItemLevel, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::World, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::Quality, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::Price, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::Stock, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::Seals, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::FcPoints, sort, on_sort: on_sort.clone() }
                        SortableHeader { column: SortColumn::Efficiency, sort, on_sort: on_sort.clone() }
                        th { class: "px-3 py-3 font-medium", "Actions" }
                    }
                }
                tbody {
                    class: "divide-y divide-slate-800",
                    for row in rows {
                        DealRowView { row, on_toggle_favorite: on_toggle_favorite.clone() }
                    }
                    if is_empty {
                        tr {
                            td {
                                class: "px-4 py-6 text-center text-sm text-slate-500",
                                colspan: "11",
                                "Run a scan to list turn-in deals."
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn SortableHeader(column: SortColumn, sort: SortState, on_sort: EventHandler<SortColumn>) -> Element {
    let indicator = if sort.column == column {
        if sort.descending {
            " ▼"
        } else {
            " ▲"
        }
    } else {
        ""
    };
    let label = column.label();
    rsx! {
        th {
            class: "cursor-pointer select-none px-3 py-3 font-medium transition hover:text-slate-200",
            onclick: move |_| on_sort.call(column),
            "{label}{indicator}"
        }
    }
}

#[component]
fn DealRowView(row: DealRow, on_toggle_favorite: EventHandler<u32>) -> Element {
    let fav_class = if row.is_favorite {
        "text-lg text-amber-400 transition hover:scale-110"
    } else {
        "text-lg text-slate-600 transition hover:scale-110 hover:text-amber-300"
    };
    let efficiency_class = if row.efficiency > 0.4 {
        "px-3 py-3 text-right font-semibold text-emerald-300"
    } else if row.efficiency > 0.3 {
        "px-3 py-3 text-right font-semibold text-amber-300"
    } else {
        "px-3 py-3 text-right text-slate-400"
    };
    let efficiency_display = format!("{:.2}", row.efficiency);
    let market_url = format!("https://universalis.app/market/{}", row.item_id);
    let item_id = row.item_id;
    let copy_name = row.name.clone();

    rsx! {
        tr {
            class: "hover:bg-slate-800/40",
            td {
                class: "px-3 py-3 text-center",
                button {
                    class: "{fav_class}",
                    title: "Toggle favorite",
                    onclick: move |_| on_toggle_favorite.call(item_id),
                    "★"
                }
            }
            td {
                class: "px-3 py-3",
                a {
                    class: "flex items-center gap-2 font-medium text-slate-100 hover:underline",
                    href: "{market_url}",
                    target: "_blank",
                    title: "View full listings on Universalis",
                    img {
                        class: "h-8 w-8 rounded",
                        src: "{row.icon_url}",
                        alt: "",
                    }
                    span { "{row.name}" }
                }
            }
            td { class: "px-3 py-3 text-right text-slate-300", "{row.item_level}" }
            td { class: "px-3 py-3 text-slate-300", "{row.world}" }
            td {
                class: "px-3 py-3 text-center",
                if row.hq {
                    span {
                        class: "rounded-full border border-amber-500/40 bg-amber-500/10 px-2 py-0.5 text-[10px] font-semibold uppercase tracking-wide text-amber-200",
                        "HQ"
                    }
                } else {
                    span { class: "text-slate-600", "-" }
                }
            }
            td { class: "px-3 py-3 text-right text-slate-200", "{row.price_display}" }
            td {
                class: "px-3 py-3 text-right text-slate-300",
                title: "{row.stock_title}",
                "{row.stock_display}"
            }
            td { class: "px-3 py-3 text-right text-slate-200", "{row.seals_display}" }
            td {
                class: "px-3 py-3 text-right text-slate-300",
                title: if row.hq { "Doubled due to HQ" } else { "" },
                "{row.fc_display}"
            }
            td { class: "{efficiency_class}", "{efficiency_display}" }
            td {
                class: "px-3 py-3 text-right",
                button {
                    class: "rounded-md border border-slate-700 px-2 py-1 text-[10px] font-semibold uppercase tracking-wide text-slate-300 hover:border-indigo-500 hover:text-indigo-200",
                    title: "Copy item name",
                    onclick: move |_| copy_text_to_clipboard(&copy_name),
                    "Copy"
                }
            }
        }
    }
}

/// Insert thousands separators, e.g. `1234567` → `1,234,567`.
pub fn format_number(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Clipboard access goes through the webview; there is no portable Rust-side
/// clipboard in the Dioxus desktop shell.
fn copy_text_to_clipboard(text: &str) {
    if text.trim().is_empty() {
        return;
    }
    let payload = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    let script = format!(
        r#"(async () => {{
            const data = {payload};
            try {{
                if (navigator.clipboard && navigator.clipboard.writeText) {{
                    await navigator.clipboard.writeText(data);
                    return true;
                }}
            }} catch (_err) {{
                // fallback
            }}
            try {{
                const textarea = document.createElement('textarea');
                textarea.value = data;
                textarea.style.position = 'fixed';
                textarea.style.opacity = '0';
                document.body.appendChild(textarea);
                textarea.focus();
                textarea.select();
                const ok = document.execCommand('copy');
                document.body.removeChild(textarea);
                return ok;
            }} catch (_err) {{
                return false;
            }}
        }})()"#
    );
    let eval = document::eval(&script);
    spawn(async move {
        let _ = eval.await;
    });
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn separators_every_three_digits() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}
