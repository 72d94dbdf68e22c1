//! Form rules. Pure functions: every violated rule is collected, nothing
//! short-circuits, and nothing here touches the network.

use crate::error::{ValidationErrors, ValidationIssue};
use crate::models::{parse_coordinate, Credentials, NoteForm, NotePayload, Registration};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern is valid")
});

pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

/// Check a note form and build the request body from it.
pub fn validate_note(form: &NoteForm) -> Result<NotePayload, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if let Err(e) = url::Url::parse(form.url.trim()) {
        errors.push(ValidationIssue::InvalidUrl(e.to_string()));
    }

    let lat = parse_coordinate(&form.lat, 90.0);
    if lat.is_none() {
        errors.push(ValidationIssue::InvalidLatitude);
    }

    let long = parse_coordinate(&form.long, 180.0);
    if long.is_none() {
        errors.push(ValidationIssue::InvalidLongitude);
    }

    match (lat, long) {
        (Some(lat), Some(long)) if errors.is_empty() => Ok(NotePayload {
            url: form.url.trim().to_string(),
            text: form.text.clone(),
            lat,
            long,
        }),
        _ => Err(errors),
    }
}

pub fn validate_login(c: &Credentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if c.username.trim().is_empty() {
        errors.push(ValidationIssue::MissingUsername);
    }
    if c.password.is_empty() {
        errors.push(ValidationIssue::MissingPassword);
    }
    errors.into_result(())
}

pub fn validate_registration(r: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if r.username.trim().is_empty() {
        errors.push(ValidationIssue::MissingUsername);
    }

    // An empty email is reported once, as missing.
    if r.email.trim().is_empty() {
        errors.push(ValidationIssue::MissingEmail);
    } else if !is_valid_email(r.email.trim()) {
        errors.push(ValidationIssue::InvalidEmail);
    }

    if r.password.is_empty() {
        errors.push(ValidationIssue::MissingPassword);
    }
    if r.password2.is_empty() {
        errors.push(ValidationIssue::MissingPasswordConfirmation);
    }
    if r.password != r.password2 {
        errors.push(ValidationIssue::PasswordMismatch);
    }

    errors.into_result(())
}

pub fn validate_username(username: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if username.trim().is_empty() {
        errors.push(ValidationIssue::MissingUsername);
    }
    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(url: &str, lat: &str, long: &str) -> NoteForm {
        NoteForm {
            url: url.to_string(),
            lat: lat.to_string(),
            long: long.to_string(),
            text: "hello #world".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_note_builds_payload() {
        let payload = validate_note(&form("https://example.com/a", "32.5", "52")).unwrap();
        assert_eq!(
            payload,
            NotePayload {
                url: "https://example.com/a".to_string(),
                text: "hello #world".to_string(),
                lat: 32.5,
                long: 52.0,
            }
        );
    }

    #[test]
    fn test_coordinate_boundaries() {
        assert!(validate_note(&form("https://a.io", "90", "180")).is_ok());
        assert!(validate_note(&form("https://a.io", "-90", "-180")).is_ok());

        let e = validate_note(&form("https://a.io", "90.0001", "0")).unwrap_err();
        assert_eq!(e.issues(), &[ValidationIssue::InvalidLatitude]);

        let e = validate_note(&form("https://a.io", "0", "-180.0001")).unwrap_err();
        assert_eq!(e.issues(), &[ValidationIssue::InvalidLongitude]);
    }

    #[test]
    fn test_non_finite_and_non_numeric_coordinates() {
        for bad in ["NaN", "inf", "-infinity", "", "north"] {
            let e = validate_note(&form("https://a.io", bad, bad)).unwrap_err();
            assert_eq!(
                e.issues(),
                &[ValidationIssue::InvalidLatitude, ValidationIssue::InvalidLongitude],
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_relative_or_garbage_url_is_rejected() {
        let e = validate_note(&form("not a url", "1", "1")).unwrap_err();
        assert!(matches!(e.issues(), [ValidationIssue::InvalidUrl(_)]));

        let e = validate_note(&form("/relative/path", "1", "1")).unwrap_err();
        assert!(matches!(e.issues(), [ValidationIssue::InvalidUrl(_)]));
    }

    #[test]
    fn test_every_note_violation_is_collected() {
        let e = validate_note(&form("", "100", "200")).unwrap_err();
        assert_eq!(e.issues().len(), 3);
    }

    #[test]
    fn test_login_requires_both_fields() {
        let e = validate_login(&Credentials::default()).unwrap_err();
        assert_eq!(
            e.issues(),
            &[ValidationIssue::MissingUsername, ValidationIssue::MissingPassword]
        );

        assert!(validate_login(&Credentials {
            username: "u".into(),
            password: "p".into(),
        })
        .is_ok());
    }

    #[test]
    fn test_registration_collects_mismatch_and_bad_email() {
        let r = Registration {
            username: "sara".into(),
            email: "sara-at-example".into(),
            password: "secret1".into(),
            password2: "secret2".into(),
        };
        let e = validate_registration(&r).unwrap_err();
        assert!(e.contains(&ValidationIssue::PasswordMismatch));
        assert!(e.contains(&ValidationIssue::InvalidEmail));
        assert_eq!(e.issues().len(), 2);
    }

    #[test]
    fn test_registration_empty_form() {
        let e = validate_registration(&Registration::default()).unwrap_err();
        assert_eq!(
            e.issues(),
            &[
                ValidationIssue::MissingUsername,
                ValidationIssue::MissingEmail,
                ValidationIssue::MissingPassword,
                ValidationIssue::MissingPasswordConfirmation,
            ]
        );
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a.b@example.co"));
        assert!(is_valid_email("\"quoted name\"@example.com"));
        assert!(is_valid_email("x@[10.0.0.1]"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("@example.com"));
    }
}
