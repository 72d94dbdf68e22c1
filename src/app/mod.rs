use crate::filters::NOTES_PATH;
use crate::pages::NotesPage;
use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    // Router hooks used by the page need a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("notes") view=NotesPage />
                <Route path=path!("") view=|| view! { <Redirect path=NOTES_PATH /> } />
            </Routes>
        </Router>
    }
}
