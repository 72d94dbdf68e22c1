use std::fmt;

/// A single violated form rule.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Latitude is not valid.")]
    InvalidLatitude,
    #[error("Longitude is not valid.")]
    InvalidLongitude,
    #[error("Username is mandatory.")]
    MissingUsername,
    #[error("Email is mandatory.")]
    MissingEmail,
    #[error("Password is mandatory.")]
    MissingPassword,
    #[error("Password confirmation is mandatory.")]
    MissingPasswordConfirmation,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Only the creator can edit this note.")]
    NotEditable,
}

/// Every rule a submission violated, in rule order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn push(&mut self, issue: ValidationIssue) {
        self.0.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, issue: &ValidationIssue) -> bool {
        self.0.contains(issue)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    /// `Ok(value)` when no rule was violated.
    pub(crate) fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}

pub(crate) const NETWORK_MESSAGE: &str = "Could not reach the server. Please try again.";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Transport failure or an unreadable response.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success status with the server's message.
    #[error("{message}")]
    ServerRejected { status: u16, message: String },
}

impl ClientError {
    pub(crate) fn network(e: impl fmt::Display) -> Self {
        Self::Network(e.to_string())
    }

    /// Lines to show the user for this failure.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors.0.iter().map(|i| i.to_string()).collect(),
            Self::Network(_) => vec![NETWORK_MESSAGE.to_string()],
            Self::ServerRejected { message, .. } => vec![message.clone()],
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type ApiResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_show_a_generic_message() {
        let e = ClientError::network("connection refused");
        assert_eq!(e.user_messages(), vec![NETWORK_MESSAGE.to_string()]);
        assert!(e.to_string().contains("connection refused"));
    }

    #[test]
    fn server_rejections_are_shown_verbatim() {
        let e = ClientError::ServerRejected {
            status: 401,
            message: "Invalid username or password".to_string(),
        };
        assert_eq!(e.user_messages(), vec!["Invalid username or password"]);
    }

    #[test]
    fn validation_errors_list_every_issue() {
        let mut errors = ValidationErrors::default();
        errors.push(ValidationIssue::InvalidLatitude);
        errors.push(ValidationIssue::InvalidLongitude);
        let e = ClientError::from(errors);
        assert_eq!(
            e.user_messages(),
            vec!["Latitude is not valid.", "Longitude is not valid."]
        );
    }
}
