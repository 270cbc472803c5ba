//! Field validation and the consistency rules every stored event satisfies.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};

use crate::contract::model::{Event, Role};
use crate::domain::error::DomainError;

/// Color given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

/// Comparison key for item names: trimmed and lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trimmed `value`; rejects blank input.
pub fn required_text(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`] with an upper bound on the character count.
pub fn bounded_text(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let text = required_text(field, value)?;
    let len = text.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(text)
}

/// Blank optional text is stored as absent.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn quantity(value: u32) -> Result<u32, DomainError> {
    if value == 0 {
        return Err(DomainError::validation("quantity", "must be at least 1"));
    }
    Ok(value)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (keeping its calendar date).
pub fn parse_event_date(raw: &str) -> Result<NaiveDate, DomainError> {
    let raw = required_text("date", raw)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            DomainError::validation("date", format!("'{raw}' is not a date (expected YYYY-MM-DD)"))
        })
}

/// Check every invariant of a complete event. Used when loading snapshots.
pub fn validate_event(event: &Event) -> Result<(), DomainError> {
    let ctx = |msg: String| DomainError::validation(format!("event {}", event.id), msg);

    required_text("title", &event.title).map_err(|e| ctx(e.to_string()))?;

    let owners: Vec<_> = event
        .members
        .iter()
        .filter(|m| m.role == Role::Owner)
        .collect();
    match owners.as_slice() {
        [owner] if owner.user_id == event.created_by => {}
        [owner] => {
            return Err(ctx(format!(
                "owner {} is not the creator {}",
                owner.user_id, event.created_by
            )))
        }
        _ => return Err(ctx(format!("expected exactly one owner, found {}", owners.len()))),
    }

    let mut member_ids = HashSet::new();
    for m in &event.members {
        if !member_ids.insert(&m.user_id) {
            return Err(ctx(format!("user {} is a member twice", m.user_id)));
        }
    }

    let mut category_ids = HashSet::new();
    for c in &event.categories {
        if !category_ids.insert(&c.id) {
            return Err(ctx(format!("duplicate category id {}", c.id)));
        }
    }

    let mut item_ids = HashSet::new();
    let mut names = HashSet::new();
    for item in &event.items {
        if !item_ids.insert(&item.id) {
            return Err(ctx(format!("duplicate item id {}", item.id)));
        }
        if !names.insert(normalize_name(&item.name)) {
            return Err(ctx(format!("duplicate item name '{}'", item.name)));
        }
        if !category_ids.contains(&item.category_id) {
            return Err(ctx(format!(
                "item {} references unknown category {}",
                item.id, item.category_id
            )));
        }
        if let Some(assignee) = &item.assigned_to {
            if !member_ids.contains(assignee) {
                return Err(ctx(format!(
                    "item {} is assigned to non-member {}",
                    item.id, assignee
                )));
            }
        }
        if item.quantity == 0 {
            return Err(ctx(format!("item {} has zero quantity", item.id)));
        }
    }
    Ok(())
}
