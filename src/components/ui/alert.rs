use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-lg border px-4 py-3 text-sm"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed"}
}

pub use components::*;

/// Validation and server messages of the last failed submit.
#[component]
pub fn ErrorList(#[prop(into)] errors: Signal<Vec<String>>) -> impl IntoView {
    move || {
        let errors = errors.get();
        (!errors.is_empty()).then(|| {
            view! {
                <Alert class="border-destructive/50 text-destructive" attr:role="alert">
                    <ul class="list-disc pl-4">
                        {errors.into_iter().map(|e| view! { <li>{e}</li> }).collect_view()}
                    </ul>
                </Alert>
            }
        })
    }
}

/// A dismissible confirmation line.
#[component]
pub fn Notice(
    #[prop(into)] notice: Signal<Option<String>>,
    #[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
    move || {
        notice.get().map(|text| {
            view! {
                <Alert class="border-success/50 text-success flex items-center justify-between">
                    <AlertDescription>{text}</AlertDescription>
                    <button
                        class="text-xs underline"
                        on:click=move |_| on_dismiss.run(())
                    >
                        "OK"
                    </button>
                </Alert>
            }
        })
    }
}
