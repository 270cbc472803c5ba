//! Role-based permission policy.
//!
//! Everything here is a pure function of its arguments: no store access, no
//! side effects. Callers resolve the actor's role in the event first; `None`
//! means the actor is not a member and may only read.

use crate::contract::model::{Capabilities, EventId, Role, UserId};
use crate::domain::error::DomainError;

/// Mutating actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddItem,
    EditItem,
    DeleteItem,
    ManageMembers,
    DeleteEvent,
    ChangeOtherRole,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::AddItem => "add items",
            Action::EditItem => "edit this item",
            Action::DeleteItem => "delete this item",
            Action::ManageMembers => "manage members",
            Action::DeleteEvent => "delete the event",
            Action::ChangeOtherRole => "change this member's role",
        }
    }
}

/// What an action is aimed at, for the rules that look past the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The event as a whole.
    Event,
    /// An item and its current assignee.
    Item { assigned_to: Option<&'a UserId> },
    /// A membership: the target user, the role they hold now (if any) and the
    /// requested role (`None` for removal).
    Member {
        user_id: &'a UserId,
        current: Option<Role>,
        requested: Option<Role>,
    },
}

/// Whether `role` may perform `action` at all, ignoring the target.
///
/// Owner and Admin may do everything; Member may only touch items (and is
/// further restricted to their own by [`is_allowed`]); Viewer is read-only.
pub const fn role_allows(role: Role, action: Action) -> bool {
    match role {
        Role::Owner | Role::Admin => true,
        Role::Member => matches!(action, Action::EditItem | Action::DeleteItem),
        Role::Viewer => false,
    }
}

/// Full check of `actor` (holding `role`) performing `action` on `target`.
pub fn is_allowed(actor: &UserId, role: Option<Role>, action: Action, target: Target<'_>) -> bool {
    let Some(role) = role else {
        return false;
    };
    if !role_allows(role, action) {
        return false;
    }

    match target {
        Target::Event => true,
        Target::Item { assigned_to } => {
            role != Role::Member || assigned_to.is_some_and(|assignee| assignee == actor)
        }
        Target::Member {
            user_id,
            current,
            requested,
        } => member_change_violation(actor, user_id, current, requested).is_none(),
    }
}

/// Like [`is_allowed`] but reports the reason for a refusal.
pub fn authorize(
    event_id: &EventId,
    actor: &UserId,
    role: Option<Role>,
    action: Action,
    target: Target<'_>,
) -> Result<(), DomainError> {
    if let Target::Member {
        user_id,
        current,
        requested,
    } = target
    {
        if role.is_some_and(|r| role_allows(r, action)) {
            return check_member_change(event_id, actor, user_id, current, requested);
        }
    }

    if is_allowed(actor, role, action, target) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            event_id.clone(),
            actor.clone(),
            action.as_str(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberViolation {
    SelfManagement,
    OwnerProtected,
    SecondOwner,
}

fn member_change_violation(
    actor: &UserId,
    target: &UserId,
    current: Option<Role>,
    requested: Option<Role>,
) -> Option<MemberViolation> {
    if actor == target {
        return Some(MemberViolation::SelfManagement);
    }
    match (current, requested) {
        // re-asserting the owner's own role changes nothing
        (Some(Role::Owner), Some(Role::Owner)) => None,
        (Some(Role::Owner), _) => Some(MemberViolation::OwnerProtected),
        (_, Some(Role::Owner)) => Some(MemberViolation::SecondOwner),
        _ => None,
    }
}

/// Owner protection and self-management rules for membership changes.
///
/// Applies regardless of role; the store enforces it on every membership
/// mutation.
pub fn check_member_change(
    event_id: &EventId,
    actor: &UserId,
    target: &UserId,
    current: Option<Role>,
    requested: Option<Role>,
) -> Result<(), DomainError> {
    match member_change_violation(actor, target, current, requested) {
        None => Ok(()),
        Some(MemberViolation::SelfManagement) => Err(DomainError::self_management(actor.clone())),
        Some(MemberViolation::OwnerProtected) => Err(DomainError::owner_protected(
            event_id.clone(),
            target.clone(),
        )),
        Some(MemberViolation::SecondOwner) => Err(DomainError::second_owner(
            event_id.clone(),
            target.clone(),
        )),
    }
}

/// UI flags for a member holding `role` (or a non-member).
pub fn capabilities(role: Option<Role>) -> Capabilities {
    let allows = |action| role.is_some_and(|r| role_allows(r, action));
    Capabilities {
        role,
        can_add_items: allows(Action::AddItem),
        can_manage_members: allows(Action::ManageMembers),
        can_delete_event: allows(Action::DeleteEvent),
    }
}
