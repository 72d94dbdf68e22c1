use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

const FIELD_CLASS: &str = "placeholder:text-muted-foreground border-input w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50 disabled:cursor-not-allowed disabled:opacity-50 md:text-sm";

fn event_value(ev: &web_sys::Event) -> Option<String> {
    let target = ev.target()?;
    if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
        return Some(input.value());
    }
    target
        .dyn_ref::<web_sys::HtmlTextAreaElement>()
        .map(|t| t.value())
}

/// Labelled single-line input. The value is owned by the caller and every
/// keystroke goes through `on_input`.
#[component]
pub fn TextField(
    #[prop(into)] label: String,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(optional)] placeholder: &'static str,
) -> impl IntoView {
    let class = tw_merge!(FIELD_CLASS, "h-9");

    view! {
        <label class="flex flex-col gap-1 text-sm font-medium">
            {label}
            <input
                type=r#type
                class=class
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| {
                    if let Some(v) = event_value(&ev) {
                        on_input.run(v);
                    }
                }
            />
        </label>
    }
}

#[component]
pub fn TextArea(
    #[prop(into)] label: String,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
) -> impl IntoView {
    let class = tw_merge!(FIELD_CLASS, "min-h-20 py-2");

    view! {
        <label class="flex flex-col gap-1 text-sm font-medium">
            {label}
            <textarea
                class=class
                prop:value=move || value.get()
                on:input=move |ev| {
                    if let Some(v) = event_value(&ev) {
                        on_input.run(v);
                    }
                }
            ></textarea>
        </label>
    }
}
