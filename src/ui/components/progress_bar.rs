use dioxus::prelude::*;

/// Thin determinate bar for the sequential price-fetch loop.
#[component]
pub fn ProgressBar(percent: u8) -> Element {
    let clamped = percent.min(100);
    rsx! {
        div {
            class: "h-2 w-full overflow-hidden rounded-full bg-slate-800",
            div {
                class: "h-full rounded-full bg-indigo-500 transition-all duration-200",
                style: "width: {clamped}%;",
            }
        }
    }
}
