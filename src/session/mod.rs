use crate::models::NoteForm;

/// Storage key of the signed-in username.
pub const USERNAME_KEY: &str = "geonotes_username";

/// Key-value store that survives reloads.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory projection of the persisted session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSession {
    authenticated: bool,
    username: String,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Load from the persisted entry; blank counts as signed out.
    pub fn restore(&mut self, stored: Option<String>) {
        match stored.filter(|u| !u.trim().is_empty()) {
            Some(username) => self.sign_in(username),
            None => self.sign_out(),
        }
    }

    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.authenticated = true;
        self.username = username.into();
    }

    pub fn sign_out(&mut self) {
        self.authenticated = false;
        self.username.clear();
    }

    /// Only the creator of a saved note gets the edit affordance. The server
    /// still enforces ownership.
    pub fn can_edit(&self, note: &NoteForm) -> bool {
        self.authenticated && !note.code.is_empty() && note.creator == self.username
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned_by(creator: &str) -> NoteForm {
        NoteForm {
            code: "n1".into(),
            creator: creator.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_restore() {
        let mut s = AuthSession::new();
        s.restore(Some("ali".into()));
        assert!(s.is_authenticated());
        assert_eq!(s.username(), "ali");

        s.restore(Some("  ".into()));
        assert!(!s.is_authenticated());
        assert_eq!(s.username(), "");

        s.restore(None);
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_can_edit_only_own_saved_notes() {
        let mut s = AuthSession::new();
        assert!(!s.can_edit(&owned_by("")));

        s.sign_in("ali");
        assert!(s.can_edit(&owned_by("ali")));
        assert!(!s.can_edit(&owned_by("sara")));

        let draft = NoteForm {
            creator: "ali".into(),
            ..Default::default()
        };
        assert!(!s.can_edit(&draft));
    }
}
