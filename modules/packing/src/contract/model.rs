use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Fresh random identifier (UUID v4).
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of an [`Event`].
    EventId
);
string_id!(
    /// Identifier of an [`Item`], unique within its event.
    ItemId
);
string_id!(
    /// Identifier of a [`Category`], unique within its event.
    CategoryId
);
string_id!(
    /// Identifier of a person; the same user may belong to many events.
    UserId
);

/// Raised when a role or status literal cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLiteralError {
    pub kind: &'static str,
    pub value: String,
}

/// Lowercase with spaces, dashes and underscores removed: "To Pack" → "topack".
fn fold_literal(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Role a user holds within one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Owner, Role::Admin, Role::Member, Role::Viewer];

    /// Canonical lowercase spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseLiteralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_literal(s).as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "viewer" => Ok(Role::Viewer),
            _ => Err(ParseLiteralError {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

/// Packing lifecycle of an item. Any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemStatus {
    #[default]
    ToPack,
    Packed,
    Delivered,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [
        ItemStatus::ToPack,
        ItemStatus::Packed,
        ItemStatus::Delivered,
    ];

    /// Canonical snake_case spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            ItemStatus::ToPack => "to_pack",
            ItemStatus::Packed => "packed",
            ItemStatus::Delivered => "delivered",
        }
    }

    /// Delivered items count as packed too.
    pub const fn is_packed(self) -> bool {
        matches!(self, ItemStatus::Packed | ItemStatus::Delivered)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ParseLiteralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_literal(s).as_str() {
            "topack" => Ok(ItemStatus::ToPack),
            "packed" => Ok(ItemStatus::Packed),
            "delivered" => Ok(ItemStatus::Delivered),
            _ => Err(ParseLiteralError {
                kind: "item status",
                value: s.to_string(),
            }),
        }
    }
}

/// A person known to the system, independent of any event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
}

impl UserProfile {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }
}

/// Membership of a user in one event, with profile fields copied for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub name: String,
    pub avatar: String,
    pub role: Role,
}

impl Member {
    pub fn from_profile(profile: &UserProfile, role: Role) -> Self {
        Self {
            user_id: profile.id.clone(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category_id: CategoryId,
    pub assigned_to: Option<UserId>,
    pub status: ItemStatus,
    pub notes: Option<String>,
    pub is_required: bool,
    pub quantity: u32,
}

/// A trip or activity; owns its categories, items and memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub created_by: UserId,
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub members: Vec<Member>,
}

impl Event {
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn member(&self, user_id: &UserId) -> Option<&Member> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    pub fn owner(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.role == Role::Owner)
    }
}

/// Data for creating a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: String,
    pub location: String,
    /// `None` seeds the configured default categories.
    pub categories: Option<Vec<CategoryInput>>,
}

/// Caller-supplied category for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub id: Option<CategoryId>,
    pub name: String,
    pub color: Option<String>,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<CategoryId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Data for adding an item to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInput {
    pub name: String,
    pub category_id: CategoryId,
    pub assigned_to: Option<UserId>,
    pub notes: Option<String>,
    pub is_required: bool,
    /// Defaults to 1.
    pub quantity: Option<u32>,
}

impl ItemInput {
    pub fn new(name: impl Into<String>, category_id: impl Into<CategoryId>) -> Self {
        Self {
            name: name.into(),
            category_id: category_id.into(),
            assigned_to: None,
            notes: None,
            is_required: false,
            quantity: None,
        }
    }

    pub fn assigned_to(mut self, user_id: impl Into<UserId>) -> Self {
        self.assigned_to = Some(user_id.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Partial update for an item.
///
/// `assigned_to` and `notes` are tri-state: `None` leaves the field alone,
/// `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category_id: Option<CategoryId>,
    pub assigned_to: Option<Option<UserId>>,
    pub status: Option<ItemStatus>,
    pub notes: Option<Option<String>>,
    pub is_required: Option<bool>,
    pub quantity: Option<u32>,
}

impl ItemPatch {
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Item filter; absent criteria do not constrain, present ones are AND'd.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemFilter {
    pub category_id: Option<CategoryId>,
    pub status: Option<ItemStatus>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        self.category_id
            .as_ref()
            .map_or(true, |c| &item.category_id == c)
            && self.status.map_or(true, |s| item.status == s)
    }
}

/// Packing/delivery completion of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub packed_percentage: u8,
    pub delivered_percentage: u8,
    pub packed_count: usize,
    pub delivered_count: usize,
    pub total_items: usize,
}

/// Dashboard card for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub item_count: usize,
    pub member_count: usize,
    pub progress: ProgressSummary,
}

/// One category with the items matched under a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGroup {
    pub category: Category,
    pub items: Vec<Item>,
}

/// What the current user may do in one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub role: Option<Role>,
    pub can_add_items: bool,
    pub can_manage_members: bool,
    pub can_delete_event: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_any_casing() {
        assert_eq!("Owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" member ".parse::<Role>().unwrap(), Role::Member);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn status_parses_legacy_spellings() {
        for raw in ["toPack", "To Pack", "to_pack", "TOPACK", "to-pack"] {
            assert_eq!(raw.parse::<ItemStatus>().unwrap(), ItemStatus::ToPack, "{raw}");
        }
        assert_eq!("Delivered".parse::<ItemStatus>().unwrap(), ItemStatus::Delivered);
        let err = "lost".parse::<ItemStatus>().unwrap_err();
        assert_eq!(err.kind, "item status");
    }

    #[test]
    fn canonical_spelling_roundtrips() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        for status in ItemStatus::ALL {
            assert_eq!(status.to_string().parse::<ItemStatus>().unwrap(), status);
        }
    }

    #[test]
    fn filter_ands_criteria() {
        let item = Item {
            id: "i1".into(),
            name: "Laptop".into(),
            category_id: "tech".into(),
            assigned_to: None,
            status: ItemStatus::Packed,
            notes: None,
            is_required: false,
            quantity: 1,
        };

        assert!(ItemFilter::default().matches(&item));
        assert!(ItemFilter {
            category_id: Some("tech".into()),
            status: Some(ItemStatus::Packed),
        }
        .matches(&item));
        assert!(!ItemFilter {
            category_id: Some("tech".into()),
            status: Some(ItemStatus::ToPack),
        }
        .matches(&item));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EventId::generate(), EventId::generate());
    }
}
