//! Application state and the controller that keeps the map, note list, URL
//! filters and side panel consistent with each other.

use crate::api::NotesApi;
use crate::error::{ApiResult, ClientError, ValidationErrors, ValidationIssue};
use crate::filters::{FilterKey, FilterRouter, FilterSet, Reconcile, Route};
use crate::map::{MapSync, MapWidget};
use crate::models::{Credentials, LatLng, Note, NoteForm, Registration, UserUpdate};
use crate::notes::{FetchOutcome, NoteStore};
use crate::panel::{Panel, PanelMode};
use crate::router::RouterPort;
use crate::session::{AuthSession, SessionStore, USERNAME_KEY};
use crate::validation::{validate_login, validate_note, validate_registration, validate_username};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};


pub const NOTE_CREATED: &str = "Note created!";
pub const NOTE_UPDATED: &str = "Note updated!";
pub const REGISTERED: &str = "Register successful";
pub const PROFILE_UPDATED: &str = "Profile updated";

/// Everything the engine knows, in one place.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub notes: NoteStore,
    pub filters: FilterRouter,
    pub map: MapSync,
    pub panel: Panel,
    pub session: AuthSession,
}

impl AppState {
    pub fn new(panel_offset_px: f64) -> Self {
        Self {
            map: MapSync::new(panel_offset_px),
            ..Default::default()
        }
    }
}

type Listener = Rc<dyn Fn()>;

/// Owns the [`AppState`] and is the only thing that mutates it.
///
/// Single-threaded: the state sits in a `RefCell` and no borrow is held
/// across an `.await`, so overlapping calls interleave only at network
/// suspension points.
pub struct SyncController<A> {
    api: A,
    map: Rc<dyn MapWidget>,
    router: Rc<dyn RouterPort>,
    store: Rc<dyn SessionStore>,
    state: Rc<RefCell<AppState>>,
    listener: Rc<RefCell<Option<Listener>>>,
}

impl<A: Clone> Clone for SyncController<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            map: self.map.clone(),
            router: self.router.clone(),
            store: self.store.clone(),
            state: self.state.clone(),
            listener: self.listener.clone(),
        }
    }
}

impl<A: NotesApi> SyncController<A> {
    pub fn new(
        api: A,
        map: Rc<dyn MapWidget>,
        router: Rc<dyn RouterPort>,
        store: Rc<dyn SessionStore>,
        panel_offset_px: f64,
    ) -> Self {
        Self {
            api,
            map,
            router,
            store,
            state: Rc::new(RefCell::new(AppState::new(panel_offset_px))),
            listener: Rc::new(RefCell::new(None)),
        }
    }

    /// Called after every state change.
    pub fn set_listener(&self, f: impl Fn() + 'static) {
        *self.listener.borrow_mut() = Some(Rc::new(f));
    }

    fn notify(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(f) = listener {
            f();
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Log a failure and show it in the panel.
    fn fail(&self, e: ClientError) -> ClientError {
        warn!(error = %e, "request failed");
        self.state.borrow_mut().panel.set_errors(e.user_messages());
        self.notify();
        e
    }

    // ---- session ----

    pub fn init_from_persistent(&self) {
        let stored = self.store.get(USERNAME_KEY);
        let mut st = self.state.borrow_mut();
        st.session.restore(stored);
        if st.session.is_authenticated() {
            debug!(username = st.session.username(), "session restored");
        }
        drop(st);
        self.notify();
    }

    pub async fn login(&self, credentials: Credentials) -> ApiResult<()> {
        validate_login(&credentials).map_err(|e| self.fail(e.into()))?;
        self.api
            .login(&credentials)
            .await
            .map_err(|e| self.fail(e))?;

        let username = credentials.username.trim().to_string();
        self.store.set(USERNAME_KEY, &username);
        {
            let mut st = self.state.borrow_mut();
            st.session.sign_in(username.clone());
            st.panel.reset();
        }
        info!(%username, "signed in");
        self.sync_pointer();
        self.notify();
        Ok(())
    }

    /// Local state is cleared before the request. A failed request is
    /// logged and returned but not shown.
    pub async fn logout(&self) -> ApiResult<()> {
        self.store.remove(USERNAME_KEY);
        {
            let mut st = self.state.borrow_mut();
            st.session.sign_out();
            st.panel.set_editing(false);
        }
        info!("signed out");
        self.notify();

        let result = self.api.logout().await;
        if let Err(e) = &result {
            warn!(error = %e, "logout request failed");
        }
        result
    }

    pub async fn register(&self, registration: Registration) -> ApiResult<()> {
        validate_registration(&registration).map_err(|e| self.fail(e.into()))?;
        self.api
            .register(&registration)
            .await
            .map_err(|e| self.fail(e))?;

        info!(username = registration.username.trim(), "registered");
        {
            let mut st = self.state.borrow_mut();
            st.panel.reset();
            st.panel.set_notice(Some(REGISTERED.to_string()));
        }
        self.sync_pointer();
        self.notify();
        Ok(())
    }

    pub async fn update_own_user(&self, username: &str) -> ApiResult<()> {
        validate_username(username).map_err(|e| self.fail(e.into()))?;
        let update = UserUpdate {
            username: Some(username.trim().to_string()),
        };
        let user = self
            .api
            .update_own_user(&update)
            .await
            .map_err(|e| self.fail(e))?;

        self.store.set(USERNAME_KEY, &user.username);
        {
            let mut st = self.state.borrow_mut();
            st.session.sign_in(user.username.clone());
            st.panel.clear_errors();
            st.panel.set_notice(Some(PROFILE_UPDATED.to_string()));
        }
        info!(username = %user.username, "profile updated");
        self.notify();
        Ok(())
    }

    // ---- note list ----

    /// Fetch with `filters` and render the result if it is still the newest.
    pub async fn list(&self, filters: &FilterSet) -> ApiResult<FetchOutcome> {
        let token = self.state.borrow_mut().notes.begin_fetch();
        debug!(token = token.value(), query = %filters.to_query_string(), "fetching notes");
        self.notify();

        let result = self.api.list_notes(filters).await;

        let outcome = {
            let mut st = self.state.borrow_mut();
            match result {
                Ok(notes) => Ok(st.notes.complete_fetch(token, notes)),
                Err(e) if st.notes.fail_fetch(token) => Err(e),
                Err(_) => Ok(FetchOutcome::Stale),
            }
        };

        match outcome {
            Ok(FetchOutcome::Applied) => {
                self.render_notes();
                self.notify();
                Ok(FetchOutcome::Applied)
            }
            Ok(FetchOutcome::Stale) => {
                debug!(token = token.value(), "dropping stale response");
                Ok(FetchOutcome::Stale)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Refetch with the active filters.
    pub async fn refresh(&self) -> ApiResult<FetchOutcome> {
        let filters = self.state.borrow().filters.active().clone();
        self.list(&filters).await
    }

    /// Feed a router location in. Returns `None` when nothing was fetched.
    pub async fn on_route_change(&self, route: &Route) -> ApiResult<Option<FetchOutcome>> {
        let decision = self.state.borrow_mut().filters.reconcile(route);
        let Reconcile::Apply(filters) = decision else {
            return Ok(None);
        };

        self.router.replace_filters(&filters);
        self.notify();
        self.list(&filters).await.map(Some)
    }

    /// Reconcile against wherever the router is now.
    pub async fn sync_route(&self) -> ApiResult<Option<FetchOutcome>> {
        let route = self.router.current();
        self.on_route_change(&route).await
    }

    pub async fn remove_filter(&self, key: FilterKey) -> ApiResult<Option<FetchOutcome>> {
        let removed = self.state.borrow_mut().filters.remove(key);
        let Some(filters) = removed else {
            return Ok(None);
        };

        self.router.replace_filters(&filters);
        self.notify();
        self.list(&filters).await.map(Some)
    }

    // ---- note mutations ----

    pub async fn create_note(&self) -> ApiResult<Note> {
        let form = self.state.borrow().panel.form().clone();
        let payload = validate_note(&form).map_err(|e| self.fail(e.into()))?;

        let created = self
            .api
            .create_note(&payload)
            .await
            .map_err(|e| self.fail(e))?;
        info!(code = %created.code, "note created");

        self.state.borrow_mut().panel.finish_submit(NOTE_CREATED);
        self.sync_pointer();
        self.notify();
        // A failed refetch is already shown; the note itself was stored.
        self.refresh().await.ok();
        Ok(created)
    }

    /// Save the details form. Only the note's creator may do this.
    pub async fn update_note(&self) -> ApiResult<Note> {
        let (form, allowed) = {
            let st = self.state.borrow();
            let form = st.panel.form().clone();
            let allowed =
                st.panel.mode() == PanelMode::Details && st.session.can_edit(&form);
            (form, allowed)
        };
        if !allowed {
            let errors = ValidationErrors(vec![ValidationIssue::NotEditable]);
            return Err(self.fail(errors.into()));
        }
        let payload = validate_note(&form).map_err(|e| self.fail(e.into()))?;

        let updated = self
            .api
            .update_note(&form.code, &payload)
            .await
            .map_err(|e| self.fail(e))?;
        info!(code = %form.code, "note updated");

        self.state.borrow_mut().panel.finish_submit(NOTE_UPDATED);
        self.sync_pointer();
        self.notify();
        self.refresh().await.ok();
        Ok(updated)
    }

    pub async fn delete_note(&self, code: &str) -> ApiResult<()> {
        self.api
            .delete_note(code)
            .await
            .map_err(|e| self.fail(e))?;
        info!(code, "note deleted");

        {
            let mut st = self.state.borrow_mut();
            if st.panel.detail_code() == Some(code) {
                st.panel.reset();
            }
        }
        self.sync_pointer();
        self.notify();
        self.refresh().await.ok();
        Ok(())
    }

    // ---- map ----

    /// A click on empty map. Ignored while a note's details are shown.
    pub fn on_map_click(&self, at: LatLng) {
        {
            let mut st = self.state.borrow_mut();
            if st.panel.mode() == PanelMode::Details {
                debug!(lat = at.lat, long = at.long, "map click ignored in details");
                return;
            }
            st.panel.start_draft(at);
        }
        self.sync_pointer();
        self.center_view();
        self.notify();
    }

    pub fn on_marker_click(&self, note: &Note, at: LatLng) {
        self.state.borrow_mut().panel.show_details(note, at);
        self.sync_pointer();
        self.center_view();
        self.notify();
    }

    /// Apply a keystroke to the panel form.
    pub fn edit_form(&self, f: impl FnOnce(&mut NoteForm)) {
        self.state.borrow_mut().panel.edit_form(f);
        self.sync_pointer();
        self.center_view();
        self.notify();
    }

    /// Clear every marker and draw the current collection.
    fn render_notes(&self) {
        let notes = self.state.borrow().notes.notes().to_vec();
        self.map.clear_notes();
        self.map.add_notes(&notes);
        self.state.borrow_mut().map.set_rendered(notes.len());
        self.sync_pointer();
    }

    /// Make the widget's pointer match the panel.
    fn sync_pointer(&self) {
        let change = {
            let mut guard = self.state.borrow_mut();
            let st = &mut *guard;
            let target = st.panel.pointer_target();
            st.map.place_pointer(target).then_some(target)
        };
        match change {
            Some(Some(at)) => self.map.show_pointer(at),
            Some(None) => self.map.hide_pointer(),
            None => {}
        }
    }

    /// Pan so the active note sits above the panel.
    fn center_view(&self) {
        let target = {
            let st = self.state.borrow();
            st.panel.pointer_target().or_else(|| st.panel.form().position())
        };
        let Some(target) = target else {
            return;
        };
        let zoom = self.map.zoom();
        let center = self.state.borrow_mut().map.follow(target, zoom);
        if let Some(center) = center {
            self.map.pan_to(center);
        }
    }

    /// Draw everything again, e.g. after the widget was (re)attached.
    pub fn redraw_map(&self) {
        let (notes, pointer) = {
            let st = self.state.borrow();
            (st.notes.notes().to_vec(), st.map.pointer())
        };
        self.map.clear_notes();
        self.map.add_notes(&notes);
        match pointer {
            Some(at) => self.map.show_pointer(at),
            None => self.map.hide_pointer(),
        }
        self.state.borrow_mut().map.set_rendered(notes.len());
    }

    // ---- panel ----

    pub fn show_auth(&self) {
        self.state.borrow_mut().panel.show_auth();
        self.sync_pointer();
        self.notify();
    }

    pub fn show_register(&self) {
        self.state.borrow_mut().panel.show_register();
        self.sync_pointer();
        self.notify();
    }

    pub fn cancel(&self) {
        self.state.borrow_mut().panel.reset();
        self.sync_pointer();
        self.notify();
    }

    pub fn toggle_panel(&self) {
        self.state.borrow_mut().panel.toggle();
        self.notify();
    }

    pub fn set_panel_open(&self, open: bool) {
        self.state.borrow_mut().panel.set_open(open);
        self.notify();
    }

    /// Show or hide the edit form; refused unless the session owns the note.
    pub fn set_editing(&self, editing: bool) {
        {
            let mut guard = self.state.borrow_mut();
            let st = &mut *guard;
            let allowed = st.session.can_edit(st.panel.form());
            st.panel.set_editing(editing && allowed);
        }
        self.notify();
    }

    pub fn dismiss_notice(&self) {
        self.state.borrow_mut().panel.set_notice(None);
        self.notify();
    }
}
