use crate::models::Note;

/// Sequence number of a note-list request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchToken(u64);

impl FetchToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was the newest one and replaced the collection.
    Applied,
    /// A later request was issued meanwhile; the response was dropped.
    Stale,
}

/// Cache of the notes currently shown on the map.
///
/// Responses may arrive in any order; only the one carrying the newest token
/// is allowed to replace the collection.
#[derive(Clone, Debug, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
    issued: u64,
    loading: bool,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_fetch(&mut self) -> FetchToken {
        self.issued = self.issued.saturating_add(1);
        self.loading = true;
        FetchToken(self.issued)
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        token.0 == self.issued
    }

    pub fn complete_fetch(&mut self, token: FetchToken, notes: Vec<Note>) -> FetchOutcome {
        if !self.is_current(token) {
            return FetchOutcome::Stale;
        }
        self.notes = notes;
        self.loading = false;
        FetchOutcome::Applied
    }

    /// Record a failed request. The collection is left as it was.
    ///
    /// Returns whether the failure belongs to the newest request.
    pub fn fail_fetch(&mut self, token: FetchToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.loading = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(code: &str) -> Note {
        Note {
            code: code.to_string(),
            url: "https://a.io".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tokens_increase() {
        let mut s = NoteStore::new();
        let a = s.begin_fetch();
        let b = s.begin_fetch();
        assert!(b > a);
        assert!(!s.is_current(a));
        assert!(s.is_current(b));
    }

    #[test]
    fn test_late_older_response_is_dropped() {
        let mut s = NoteStore::new();
        let a = s.begin_fetch();
        let b = s.begin_fetch();

        assert_eq!(s.complete_fetch(b, vec![note("b")]), FetchOutcome::Applied);
        assert!(!s.is_loading());
        assert_eq!(s.complete_fetch(a, vec![note("a")]), FetchOutcome::Stale);

        assert_eq!(s.notes(), &[note("b")]);
    }

    #[test]
    fn test_older_response_before_newer_is_dropped_too() {
        let mut s = NoteStore::new();
        let a = s.begin_fetch();
        let b = s.begin_fetch();
        assert_eq!(s.complete_fetch(a, vec![note("a")]), FetchOutcome::Stale);
        assert!(s.is_loading());
        assert!(s.notes().is_empty());
        assert_eq!(s.complete_fetch(b, vec![]), FetchOutcome::Applied);
    }

    #[test]
    fn test_failure_keeps_previous_notes() {
        let mut s = NoteStore::new();
        let a = s.begin_fetch();
        s.complete_fetch(a, vec![note("a")]);
        let b = s.begin_fetch();
        assert!(s.fail_fetch(b));
        assert_eq!(s.notes(), &[note("a")]);
        assert!(!s.is_loading());
    }

    #[test]
    fn test_failure_of_a_superseded_request_is_ignored() {
        let mut s = NoteStore::new();
        let a = s.begin_fetch();
        let _b = s.begin_fetch();
        assert!(!s.fail_fetch(a));
        assert!(s.is_loading());
    }
}
