use crate::api::ApiClient;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, ChipList, ErrorList, Notice, PanelBody, PanelCard,
    PanelFooter, PanelHeader, PanelTitle, Spinner, TextArea, TextField,
};
use crate::config::EnvConfig;
use crate::filters::{filter_href, FilterKey};
use crate::map::leaflet::{MapClickHandler, MarkerClickHandler};
use crate::map::LeafletMap;
use crate::models::{Credentials, NoteForm, Registration};
use crate::panel::PanelMode;
use crate::router::LeptosRouter;
use crate::state::{AppState, SyncController};
use crate::storage::LocalSessionStore;
use crate::text::{hashtag_links, url_text, URL_TEXT_MAX};
use leptos::ev::MouseEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_location, use_navigate};
use leptos_router::NavigateOptions;
use std::future::Future;
use std::rc::Rc;

/// Id of the element the map is attached to.
const MAP_CONTAINER_ID: &str = "map";

type Controller = SyncController<ApiClient>;
type Slot = StoredValue<Option<Controller>, LocalStorage>;

fn with_controller(ctl: Slot, f: impl FnOnce(Controller)) {
    if let Some(c) = ctl.get_value() {
        f(c);
    }
}

fn spawn_with<F, Fut>(ctl: Slot, f: F)
where
    F: FnOnce(Controller) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    if let Some(c) = ctl.get_value() {
        spawn_local(f(c));
    }
}

#[component]
pub fn NotesPage() -> impl IntoView {
    let config = EnvConfig::from_window();
    let revision = RwSignal::new(0u64);
    let ctl: Slot = StoredValue::new_local(None);

    // Map callbacks go through the shared handle; the controller is created after the map.
    let on_click: MapClickHandler = Rc::new(move |at| {
        with_controller(ctl, |c| c.on_map_click(at));
    });
    let on_marker: MarkerClickHandler = Rc::new(move |note, at| {
        with_controller(ctl, |c| c.on_marker_click(&note, at));
    });
    let map = Rc::new(LeafletMap::new(config.map.clone(), on_click, on_marker));
    let map_slot = StoredValue::new_local(map.clone());

    let location = use_location();
    let navigate = use_navigate();
    let router = LeptosRouter::new(
        move || {
            format!(
                "{}?{}",
                location.pathname.get_untracked(),
                location.search.get_untracked().trim_start_matches('?')
            )
        },
        move |href| {
            navigate(
                href,
                NavigateOptions {
                    replace: true,
                    scroll: false,
                    ..Default::default()
                },
            )
        },
    );

    let controller = SyncController::new(
        ApiClient::from_config(&config),
        map,
        Rc::new(router),
        Rc::new(LocalSessionStore),
        config.map.panel_offset_px,
    );
    controller.set_listener(move || {
        revision.try_update(|r| *r += 1);
    });
    controller.init_from_persistent();
    ctl.set_value(Some(controller));

    let state = Signal::derive(move || {
        revision.track();
        ctl.with_value(|c| c.as_ref().map(SyncController::snapshot))
            .unwrap_or_default()
    });

    // Attach once the container is in the DOM, then replay engine state.
    Effect::new(move |_| {
        let map = map_slot.get_value();
        if map.is_attached() {
            return;
        }
        map.attach(MAP_CONTAINER_ID);
        with_controller(ctl, |c| c.redraw_map());
    });

    Effect::new(move |_| {
        location.pathname.track();
        location.search.track();
        spawn_with(ctl, |c| async move {
            c.sync_route().await.ok();
        });
    });

    let mode = Memo::new(move |_| state.with(|s| s.panel.mode()));
    let open = Memo::new(move |_| state.with(|s| s.panel.is_open()));
    let loading = Memo::new(move |_| state.with(|s| s.notes.is_loading()));

    let title = move || match mode.get() {
        PanelMode::Create => "New note",
        PanelMode::Details => "Note",
        PanelMode::Auth => "Account",
        PanelMode::Register => "Register",
    };

    let body = move || match mode.get() {
        PanelMode::Create => view! { <CreateForm ctl=ctl state=state /> }.into_any(),
        PanelMode::Details => view! { <DetailsView ctl=ctl state=state /> }.into_any(),
        PanelMode::Auth => view! { <AuthForm ctl=ctl state=state /> }.into_any(),
        PanelMode::Register => view! { <RegisterForm ctl=ctl /> }.into_any(),
    };

    view! {
        <div class="relative h-screen w-screen overflow-hidden">
            <div id=MAP_CONTAINER_ID class="absolute inset-0 z-0"></div>

            <FilterBar ctl=ctl state=state />

            <aside class="absolute bottom-0 left-0 right-0 z-10 mx-auto max-w-xl">
                <PanelCard>
                    <PanelHeader>
                        <PanelTitle>{title}</PanelTitle>
                        <div class="flex items-center gap-2">
                            <Show when=move || loading.get()>
                                <Spinner />
                            </Show>
                            <SessionButtons ctl=ctl state=state />
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Icon
                                attr:aria-label="Toggle panel"
                                on:click=move |_| with_controller(ctl, |c| c.toggle_panel())
                            >
                                {move || if open.get() { "▾" } else { "▴" }}
                            </Button>
                        </div>
                    </PanelHeader>
                    <Show when=move || open.get()>
                        <PanelBody>
                            <Notice
                                notice=Signal::derive(move || {
                                    state.with(|s| s.panel.notice().map(str::to_string))
                                })
                                on_dismiss=Callback::new(move |_: ()| {
                                    with_controller(ctl, |c| c.dismiss_notice())
                                })
                            />
                            <ErrorList errors=Signal::derive(move || {
                                state.with(|s| s.panel.errors().to_vec())
                            }) />
                            {body}
                        </PanelBody>
                    </Show>
                </PanelCard>
            </aside>
        </div>
    }
}

#[component]
fn FilterBar(ctl: Slot, state: Signal<AppState>) -> impl IntoView {
    let chips = move || {
        state.with(|s| {
            s.filters
                .active()
                .iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <nav class="absolute left-2 top-2 z-10">
            <ChipList>
                <For
                    each=chips
                    key=|chip: &(FilterKey, String)| format!("{}={}", chip.0, chip.1)
                    children=move |(key, value)| {
                        let on_remove = move |_: MouseEvent| {
                            spawn_with(ctl, move |c| async move {
                                c.remove_filter(key).await.ok();
                            });
                        };
                        view! {
                            <li class="bg-card flex items-center gap-1 rounded-full border px-3 py-1 text-xs shadow-sm">
                                {format!("{key}: {value}")}
                                <button
                                    class="text-muted-foreground hover:text-foreground"
                                    aria-label="Remove filter"
                                    on:click=on_remove
                                >
                                    "×"
                                </button>
                            </li>
                        }
                    }
                />
            </ChipList>
        </nav>
    }
}

#[component]
fn SessionButtons(ctl: Slot, state: Signal<AppState>) -> impl IntoView {
    let authenticated = Memo::new(move |_| state.with(|s| s.session.is_authenticated()));

    view! {
        <Show
            when=move || authenticated.get()
            fallback=move || {
                view! {
                    <Button
                        variant=ButtonVariant::Link
                        size=ButtonSize::Sm
                        on:click=move |_| with_controller(ctl, |c| c.show_auth())
                    >
                        "Login"
                    </Button>
                    <Button
                        variant=ButtonVariant::Link
                        size=ButtonSize::Sm
                        on:click=move |_| with_controller(ctl, |c| c.show_register())
                    >
                        "Register"
                    </Button>
                }
            }
        >
            <Button
                variant=ButtonVariant::Link
                size=ButtonSize::Sm
                on:click=move |_| with_controller(ctl, |c| c.show_auth())
            >
                {move || state.with(|s| s.session.username().to_string())}
            </Button>
        </Show>
    }
}

fn note_field(
    ctl: Slot,
    state: Signal<AppState>,
    label: &'static str,
    placeholder: &'static str,
    get: fn(&NoteForm) -> &str,
    set: fn(&mut NoteForm, String),
) -> impl IntoView {
    view! {
        <TextField
            label=label
            placeholder=placeholder
            value=Signal::derive(move || state.with(|s| get(s.panel.form()).to_string()))
            on_input=Callback::new(move |v: String| {
                with_controller(ctl, move |c| c.edit_form(move |f| set(f, v)))
            })
        />
    }
}

/// Url, text and coordinates of the form in the panel.
#[component]
fn NoteFields(ctl: Slot, state: Signal<AppState>) -> impl IntoView {
    view! {
        {note_field(ctl, state, "URL", "https://", |f| f.url.as_str(), |f, v| f.url = v)}
        <TextArea
            label="Text"
            value=Signal::derive(move || state.with(|s| s.panel.form().text.clone()))
            on_input=Callback::new(move |v: String| {
                with_controller(ctl, move |c| c.edit_form(move |f| f.text = v))
            })
        />
        <div class="grid grid-cols-2 gap-2">
            {note_field(ctl, state, "Latitude", "-90 to 90", |f| f.lat.as_str(), |f, v| f.lat = v)}
            {note_field(ctl, state, "Longitude", "-180 to 180", |f| f.long.as_str(), |f, v| f.long = v)}
        </div>
    }
}

#[component]
fn CreateForm(ctl: Slot, state: Signal<AppState>) -> impl IntoView {
    let on_submit = move |_: MouseEvent| {
        spawn_with(ctl, |c| async move {
            c.create_note().await.ok();
        });
    };

    view! {
        <p class="text-muted-foreground text-xs">"Click on the map to place a note."</p>
        <NoteFields ctl=ctl state=state />
        <PanelFooter>
            <Button on:click=on_submit>"Create"</Button>
            <Button
                variant=ButtonVariant::Outline
                on:click=move |_| with_controller(ctl, |c| c.cancel())
            >
                "Cancel"
            </Button>
        </PanelFooter>
    }
}

#[component]
fn DetailsView(ctl: Slot, state: Signal<AppState>) -> impl IntoView {
    let editing = Memo::new(move |_| state.with(|s| s.panel.is_editing()));
    let can_edit = Memo::new(move |_| state.with(|s| s.session.can_edit(s.panel.form())));

    let on_save = move |_: MouseEvent| {
        spawn_with(ctl, |c| async move {
            c.update_note().await.ok();
        });
    };

    let on_delete = move |_: MouseEvent| {
        let code = state.with_untracked(|s| s.panel.form().code.clone());
        let confirmed = window()
            .confirm_with_message("Delete this note?")
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        spawn_with(ctl, move |c| async move {
            c.delete_note(&code).await.ok();
        });
    };

    let read_only = move || {
        let form = state.with(|s| s.panel.form().clone());
        view! {
            <dl class="grid grid-cols-[auto_1fr] gap-x-3 gap-y-1 text-sm">
                <dt class="text-muted-foreground">"Creator"</dt>
                <dd>
                    <a class="underline" href=filter_href(FilterKey::Creator, &form.creator)>
                        {form.creator.clone()}
                    </a>
                </dd>
                <dt class="text-muted-foreground">"Country"</dt>
                <dd>
                    <a class="underline" href=filter_href(FilterKey::Country, &form.country)>
                        {form.country.clone()}
                    </a>
                </dd>
            </dl>
            <a
                class="text-primary break-all text-sm underline"
                href=form.url.clone()
                target="_blank"
                rel="noopener noreferrer"
            >
                {url_text(&form.url, URL_TEXT_MAX)}
            </a>
            <p class="whitespace-pre-wrap text-sm" inner_html=hashtag_links(&form.text)></p>
        }
    };

    view! {
        <Show when=move || editing.get() fallback=read_only>
            <NoteFields ctl=ctl state=state />
        </Show>
        <PanelFooter>
            <Show when=move || can_edit.get()>
                <Show
                    when=move || editing.get()
                    fallback=move || {
                        view! {
                            <Button
                                variant=ButtonVariant::Outline
                                on:click=move |_| with_controller(ctl, |c| c.set_editing(true))
                            >
                                "Edit"
                            </Button>
                        }
                    }
                >
                    <Button on:click=on_save>"Save"</Button>
                </Show>
                <Button variant=ButtonVariant::Destructive on:click=on_delete>
                    "Delete"
                </Button>
            </Show>
            <Button
                variant=ButtonVariant::Ghost
                on:click=move |_| with_controller(ctl, |c| c.cancel())
            >
                "Close"
            </Button>
        </PanelFooter>
    }
}

#[component]
fn AuthForm(ctl: Slot, state: Signal<AppState>) -> impl IntoView {
    let authenticated = Memo::new(move |_| state.with(|s| s.session.is_authenticated()));
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let new_name = RwSignal::new(state.with_untracked(|s| s.session.username().to_string()));

    let on_login = move |_: MouseEvent| {
        let credentials = Credentials {
            username: username.get_untracked(),
            password: password.get_untracked(),
        };
        spawn_with(ctl, move |c| async move {
            if c.login(credentials).await.is_ok() {
                password.set(String::new());
            }
        });
    };

    let on_rename = move |_: MouseEvent| {
        let name = new_name.get_untracked();
        spawn_with(ctl, move |c| async move {
            c.update_own_user(&name).await.ok();
        });
    };

    let on_logout = move |_: MouseEvent| {
        spawn_with(ctl, |c| async move {
            // Local state is already cleared; the failure was logged.
            c.logout().await.ok();
        });
    };

    view! {
        <Show
            when=move || authenticated.get()
            fallback=move || {
                view! {
                    <TextField
                        label="Username"
                        value=username
                        on_input=Callback::new(move |v: String| username.set(v))
                    />
                    <TextField
                        label="Password"
                        r#type="password"
                        value=password
                        on_input=Callback::new(move |v: String| password.set(v))
                    />
                    <PanelFooter>
                        <Button on:click=on_login>"Login"</Button>
                        <Button
                            variant=ButtonVariant::Link
                            on:click=move |_| with_controller(ctl, |c| c.show_register())
                        >
                            "Create an account"
                        </Button>
                    </PanelFooter>
                }
            }
        >
            <TextField
                label="Username"
                value=new_name
                on_input=Callback::new(move |v: String| new_name.set(v))
            />
            <PanelFooter>
                <Button on:click=on_rename>"Update"</Button>
                <Button variant=ButtonVariant::Outline on:click=on_logout>
                    "Logout"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    on:click=move |_| with_controller(ctl, |c| c.cancel())
                >
                    "Close"
                </Button>
            </PanelFooter>
        </Show>
    }
}

#[component]
fn RegisterForm(ctl: Slot) -> impl IntoView {
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let password2 = RwSignal::new(String::new());

    let on_register = move |_: MouseEvent| {
        let registration = Registration {
            username: username.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            password2: password2.get_untracked(),
        };
        spawn_with(ctl, move |c| async move {
            c.register(registration).await.ok();
        });
    };

    view! {
        <TextField label="Username" value=username on_input=Callback::new(move |v: String| username.set(v)) />
        <TextField
            label="Email"
            r#type="email"
            value=email
            on_input=Callback::new(move |v: String| email.set(v))
        />
        <TextField
            label="Password"
            r#type="password"
            value=password
            on_input=Callback::new(move |v: String| password.set(v))
        />
        <TextField
            label="Confirm password"
            r#type="password"
            value=password2
            on_input=Callback::new(move |v: String| password2.set(v))
        />
        <PanelFooter>
            <Button on:click=on_register>"Register"</Button>
            <Button
                variant=ButtonVariant::Outline
                on:click=move |_| with_controller(ctl, |c| c.cancel())
            >
                "Cancel"
            </Button>
        </PanelFooter>
    }
}
