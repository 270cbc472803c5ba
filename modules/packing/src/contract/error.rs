use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackingError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("An item named '{name}' already exists in this event")]
    DuplicateItem { name: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },
}

impl PackingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn duplicate_item(name: impl Into<String>) -> Self {
        Self::DuplicateItem { name: name.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateItem { .. } => "duplicate_item",
            Self::Forbidden { .. } => "forbidden",
        }
    }
}

impl From<crate::domain::error::DomainError> for PackingError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
            e @ (EventNotFound { .. }
            | ItemNotFound { .. }
            | CategoryNotFound { .. }
            | UserNotFound { .. }
            | MemberNotFound { .. }) => Self::not_found(e.to_string()),
            DuplicateItem { name, .. } => Self::duplicate_item(name),
            e @ (PermissionDenied { .. }
            | OwnerProtected { .. }
            | SecondOwner { .. }
            | SelfManagement { .. }) => Self::forbidden(e.to_string()),
        }
    }
}
