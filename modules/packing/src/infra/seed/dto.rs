use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::contract::model::{
    Capabilities, Category, EventSummary, Item, ItemGroup, Member, ProgressSummary, UserProfile,
};

/// Whole-store snapshot as stored in seed files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotDto {
    #[serde(default)]
    pub users: Vec<UserDto>,
    #[serde(default)]
    pub events: Vec<EventDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventDto {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD` or RFC 3339.
    pub date: String,
    pub location: String,
    pub created_by: String,
    #[serde(default)]
    pub categories: Vec<CategoryDto>,
    #[serde(default)]
    pub items: Vec<ItemDto>,
    #[serde(default)]
    pub members: Vec<MemberDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemDto {
    pub id: String,
    pub name: String,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Any spelling of a status (`toPack`, `to_pack`, `To Pack`...).
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    pub role: String,
}

// Output-only shapes for the view layer.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDto {
    pub packed_percentage: u8,
    pub delivered_percentage: u8,
    pub packed_count: usize,
    pub delivered_count: usize,
    pub total_items: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummaryDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub item_count: usize,
    pub member_count: usize,
    pub progress: ProgressDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemGroupDto {
    pub category: CategoryDto,
    pub items: Vec<ItemDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub can_add_items: bool,
    pub can_manage_members: bool,
    pub can_delete_event: bool,
}

// Conversion implementations from contract models

impl From<&UserProfile> for UserDto {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            color: Some(category.color.clone()),
        }
    }
}

impl From<&Item> for ItemDto {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            category_id: item.category_id.to_string(),
            assigned_to: item.assigned_to.as_ref().map(ToString::to_string),
            status: item.status.as_str().to_string(),
            notes: item.notes.clone(),
            is_required: item.is_required,
            quantity: item.quantity,
        }
    }
}

impl From<&Member> for MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.user_id.to_string(),
            name: member.name.clone(),
            avatar: member.avatar.clone(),
            role: member.role.as_str().to_string(),
        }
    }
}

impl From<ProgressSummary> for ProgressDto {
    fn from(p: ProgressSummary) -> Self {
        Self {
            packed_percentage: p.packed_percentage,
            delivered_percentage: p.delivered_percentage,
            packed_count: p.packed_count,
            delivered_count: p.delivered_count,
            total_items: p.total_items,
        }
    }
}

impl From<&EventSummary> for EventSummaryDto {
    fn from(s: &EventSummary) -> Self {
        Self {
            id: s.id.to_string(),
            title: s.title.clone(),
            description: s.description.clone(),
            date: s.date,
            location: s.location.clone(),
            item_count: s.item_count,
            member_count: s.member_count,
            progress: s.progress.into(),
        }
    }
}

impl From<&ItemGroup> for ItemGroupDto {
    fn from(group: &ItemGroup) -> Self {
        Self {
            category: (&group.category).into(),
            items: group.items.iter().map(ItemDto::from).collect(),
        }
    }
}

impl From<Capabilities> for CapabilitiesDto {
    fn from(c: Capabilities) -> Self {
        Self {
            role: c.role.map(|r| r.as_str().to_string()),
            can_add_items: c.can_add_items,
            can_manage_members: c.can_manage_members,
            can_delete_event: c.can_delete_event,
        }
    }
}
