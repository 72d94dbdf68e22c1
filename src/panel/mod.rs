use crate::models::{LatLng, Note, NoteForm};

/// Which form the side panel shows. Exactly one is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PanelMode {
    #[default]
    Create,
    Details,
    Auth,
    Register,
}

/// Side panel state.
///
/// All fields change through the named transitions below; entering a mode
/// always clears the error list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Panel {
    mode: PanelMode,
    open: bool,
    form: NoteForm,
    /// A map-click draft is waiting to be submitted.
    draft_pending: bool,
    /// Last in-range draft position, or the raw click position.
    anchor: Option<LatLng>,
    /// Details view shows the edit form.
    editing: bool,
    errors: Vec<String>,
    notice: Option<String>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn form(&self) -> &NoteForm {
        &self.form
    }

    pub fn draft_pending(&self) -> bool {
        self.draft_pending
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn enter(&mut self, mode: PanelMode) {
        self.mode = mode;
        self.errors.clear();
        self.editing = false;
        if mode != PanelMode::Create {
            self.draft_pending = false;
            self.anchor = None;
        }
    }

    /// Map click: a fresh draft at `at`.
    pub fn start_draft(&mut self, at: LatLng) {
        self.enter(PanelMode::Create);
        self.form = NoteForm::draft_at(at);
        self.draft_pending = true;
        self.anchor = Some(at);
        self.notice = None;
        self.open = true;
    }

    /// Marker click: show `note` as it sits at `at`.
    pub fn show_details(&mut self, note: &Note, at: LatLng) {
        self.enter(PanelMode::Details);
        self.form = NoteForm::from(&Note {
            lat: at.lat,
            long: at.long,
            ..note.clone()
        });
        self.notice = None;
        self.open = true;
    }

    pub fn show_auth(&mut self) {
        self.enter(PanelMode::Auth);
        self.notice = None;
        self.open = true;
    }

    pub fn show_register(&mut self) {
        self.enter(PanelMode::Register);
        self.notice = None;
        self.open = true;
    }

    /// Back to an empty create form.
    pub fn reset(&mut self) {
        self.enter(PanelMode::Create);
        self.form = NoteForm::default();
        self.draft_pending = false;
        self.anchor = None;
    }

    /// A create or update went through.
    pub fn finish_submit(&mut self, notice: impl Into<String>) {
        self.reset();
        self.notice = Some(notice.into());
    }

    pub fn edit_form(&mut self, f: impl FnOnce(&mut NoteForm)) {
        f(&mut self.form);
        if let Some(at) = self.form.position() {
            self.anchor = Some(at);
        }
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing && self.mode == PanelMode::Details;
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// Where the pointer marker belongs, if anywhere.
    ///
    /// Coordinates the form can't place (mid-typing, or a click on a
    /// wrapped world copy) leave it at the anchor.
    pub fn pointer_target(&self) -> Option<LatLng> {
        if self.mode != PanelMode::Create || !self.draft_pending {
            return None;
        }
        self.form.position().or(self.anchor)
    }

    /// Code of the note shown in the details view.
    pub fn detail_code(&self) -> Option<&str> {
        (self.mode == PanelMode::Details && !self.form.code.is_empty())
            .then_some(self.form.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Note {
        Note {
            code: "n1".into(),
            creator: "ali".into(),
            url: "https://a.io".into(),
            lat: 1.0,
            long: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let p = Panel::new();
        assert_eq!(p.mode(), PanelMode::Create);
        assert!(!p.is_open());
        assert!(!p.draft_pending());
    }

    #[test]
    fn test_start_draft_opens_panel() {
        let mut p = Panel::new();
        p.start_draft(LatLng::new(10.0, 20.0));
        assert_eq!(p.mode(), PanelMode::Create);
        assert!(p.is_open());
        assert_eq!(p.form().lat, "10");
        assert_eq!(p.form().long, "20");
        assert_eq!(p.pointer_target(), Some(LatLng::new(10.0, 20.0)));
    }

    #[test]
    fn test_entering_a_mode_clears_errors() {
        let mut p = Panel::new();
        for step in 0..4 {
            p.set_errors(vec!["boom".into()]);
            match step {
                0 => p.show_auth(),
                1 => p.show_register(),
                2 => p.show_details(&note(), LatLng::new(1.0, 2.0)),
                _ => p.reset(),
            }
            assert!(p.errors().is_empty());
        }
    }

    #[test]
    fn test_details_uses_click_position() {
        let mut p = Panel::new();
        p.show_details(&note(), LatLng::new(1.5, 2.5));
        assert_eq!(p.mode(), PanelMode::Details);
        assert_eq!(p.form().code, "n1");
        assert_eq!(p.form().lat, "1.5");
        assert_eq!(p.detail_code(), Some("n1"));
        assert_eq!(p.pointer_target(), None);
    }

    #[test]
    fn test_leaving_create_drops_the_draft() {
        let mut p = Panel::new();
        p.start_draft(LatLng::new(1.0, 1.0));
        p.show_auth();
        assert!(!p.draft_pending());
        p.reset();
        assert_eq!(p.pointer_target(), None);
    }

    #[test]
    fn test_editing_only_in_details() {
        let mut p = Panel::new();
        p.set_editing(true);
        assert!(!p.is_editing());
        p.show_details(&note(), LatLng::new(1.0, 2.0));
        p.set_editing(true);
        assert!(p.is_editing());
        p.reset();
        assert!(!p.is_editing());
    }

    #[test]
    fn test_pointer_follows_valid_form_coordinates() {
        let mut p = Panel::new();
        p.start_draft(LatLng::new(1.0, 1.0));
        p.edit_form(|f| f.lat = "5".into());
        assert_eq!(p.pointer_target(), Some(LatLng::new(5.0, 1.0)));
        p.edit_form(|f| f.lat = "oops".into());
        assert_eq!(p.pointer_target(), Some(LatLng::new(5.0, 1.0)));
    }

    #[test]
    fn test_wrapped_click_still_has_a_pointer() {
        let mut p = Panel::new();
        p.start_draft(LatLng::new(1.0, 1.0));
        p.start_draft(LatLng::new(10.0, 190.0));
        assert_eq!(p.form().position(), None);
        assert_eq!(p.pointer_target(), Some(LatLng::new(10.0, 190.0)));
        p.reset();
        assert_eq!(p.pointer_target(), None);
    }

    #[test]
    fn test_finish_submit_sets_notice() {
        let mut p = Panel::new();
        p.start_draft(LatLng::new(1.0, 1.0));
        p.finish_submit("Note created!");
        assert_eq!(p.mode(), PanelMode::Create);
        assert!(!p.draft_pending());
        assert_eq!(p.notice(), Some("Note created!"));
        assert_eq!(p.form(), &NoteForm::default());
    }
}
