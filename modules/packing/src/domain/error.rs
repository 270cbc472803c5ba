use thiserror::Error;

use crate::contract::model::{CategoryId, EventId, ItemId, UserId};

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Event not found: {id}")]
    EventNotFound { id: EventId },

    #[error("Item {item_id} not found in event {event_id}")]
    ItemNotFound { event_id: EventId, item_id: ItemId },

    #[error("Category {category_id} not found in event {event_id}")]
    CategoryNotFound {
        event_id: EventId,
        category_id: CategoryId,
    },

    #[error("User not found: {id}")]
    UserNotFound { id: UserId },

    #[error("User {user_id} is not a member of event {event_id}")]
    MemberNotFound { event_id: EventId, user_id: UserId },

    #[error("Item '{name}' already exists in event {event_id}")]
    DuplicateItem { event_id: EventId, name: String },

    #[error("User {user_id} may not {action} in event {event_id}")]
    PermissionDenied {
        event_id: EventId,
        user_id: UserId,
        action: &'static str,
    },

    #[error("The owner of event {event_id} cannot be removed or change role")]
    OwnerProtected { event_id: EventId, user_id: UserId },

    #[error("Event {event_id} already has an owner; {user_id} cannot become a second one")]
    SecondOwner { event_id: EventId, user_id: UserId },

    #[error("User {user_id} cannot change or remove their own membership")]
    SelfManagement { user_id: UserId },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn event_not_found(id: EventId) -> Self {
        Self::EventNotFound { id }
    }

    pub fn item_not_found(event_id: EventId, item_id: ItemId) -> Self {
        Self::ItemNotFound { event_id, item_id }
    }

    pub fn category_not_found(event_id: EventId, category_id: CategoryId) -> Self {
        Self::CategoryNotFound {
            event_id,
            category_id,
        }
    }

    pub fn user_not_found(id: UserId) -> Self {
        Self::UserNotFound { id }
    }

    pub fn member_not_found(event_id: EventId, user_id: UserId) -> Self {
        Self::MemberNotFound { event_id, user_id }
    }

    pub fn duplicate_item(event_id: EventId, name: impl Into<String>) -> Self {
        Self::DuplicateItem {
            event_id,
            name: name.into(),
        }
    }

    pub fn permission_denied(event_id: EventId, user_id: UserId, action: &'static str) -> Self {
        Self::PermissionDenied {
            event_id,
            user_id,
            action,
        }
    }

    pub fn owner_protected(event_id: EventId, user_id: UserId) -> Self {
        Self::OwnerProtected { event_id, user_id }
    }

    pub fn second_owner(event_id: EventId, user_id: UserId) -> Self {
        Self::SecondOwner { event_id, user_id }
    }

    pub fn self_management(user_id: UserId) -> Self {
        Self::SelfManagement { user_id }
    }

    /// Error family, matching the public contract codes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::EventNotFound { .. }
            | Self::ItemNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::MemberNotFound { .. } => "not_found",
            Self::DuplicateItem { .. } => "duplicate_item",
            Self::PermissionDenied { .. }
            | Self::OwnerProtected { .. }
            | Self::SecondOwner { .. }
            | Self::SelfManagement { .. } => "forbidden",
        }
    }
}
