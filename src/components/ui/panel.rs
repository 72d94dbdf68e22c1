use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {PanelCard, section, "bg-card text-card-foreground flex flex-col gap-4 rounded-t-xl border py-4 shadow-lg"}
    clx! {PanelHeader, header, "flex items-center justify-between px-4"}
    clx! {PanelTitle, h2, "leading-none font-semibold"}
    clx! {PanelBody, div, "flex flex-col gap-3 px-4"}
    clx! {PanelFooter, footer, "flex items-center px-4", "gap-2"}
    clx! {ChipList, ul, "flex flex-wrap gap-2"}
}

pub use components::*;

/// Inline loading indicator.
#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <span
            class="inline-block size-4 animate-spin rounded-full border-2 border-current border-t-transparent"
            role="status"
            aria-label="Loading"
        ></span>
    }
}
