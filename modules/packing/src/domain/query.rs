//! Read-only views derived from event snapshots.
//!
//! Nothing here mutates or locks: functions take a borrowed [`Event`] (or an
//! `Arc` snapshot) and compute from it.

use std::borrow::Borrow;
use std::sync::Arc;

use crate::contract::model::{
    Category, Event, EventSummary, Item, ItemFilter, ItemGroup, ItemId, ItemStatus,
    ProgressSummary, Role, UserId,
};
use crate::domain::rules::normalize_name;

/// True iff another item in `event` has the same trimmed, case-insensitive
/// name as `candidate`. `exclude` skips the item being edited. A blank
/// candidate never collides.
pub fn is_duplicate_item(event: &Event, candidate: &str, exclude: Option<&ItemId>) -> bool {
    let key = normalize_name(candidate);
    if key.is_empty() {
        return false;
    }
    event
        .items
        .iter()
        .filter(|item| exclude != Some(&item.id))
        .any(|item| normalize_name(&item.name) == key)
}

/// Items matching `filter`, in event order.
pub fn filtered_items<'a>(
    event: &'a Event,
    filter: &'a ItemFilter,
) -> impl Iterator<Item = &'a Item> + 'a {
    event.items.iter().filter(move |item| filter.matches(item))
}

/// One category and its matching items, borrowed from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: &'a Category,
    pub items: Vec<&'a Item>,
}

impl CategoryGroup<'_> {
    pub fn to_owned_group(&self) -> ItemGroup {
        ItemGroup {
            category: self.category.clone(),
            items: self.items.iter().map(|i| (*i).clone()).collect(),
        }
    }
}

/// Filtered items grouped by category over one event snapshot.
///
/// Groups follow category order, empty categories are skipped, and nothing is
/// computed until iterated. Iterating again starts over.
#[derive(Debug, Clone)]
pub struct CategoryGroups {
    event: Arc<Event>,
    filter: ItemFilter,
}

impl CategoryGroups {
    pub fn new(event: Arc<Event>, filter: ItemFilter) -> Self {
        Self { event, filter }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn filter(&self) -> &ItemFilter {
        &self.filter
    }

    pub fn iter(&self) -> Groups<'_> {
        Groups {
            categories: self.event.categories.iter(),
            event: &self.event,
            filter: &self.filter,
        }
    }

    pub fn to_owned_groups(&self) -> Vec<ItemGroup> {
        self.iter().map(|g| g.to_owned_group()).collect()
    }
}

impl<'a> IntoIterator for &'a CategoryGroups {
    type Item = CategoryGroup<'a>;
    type IntoIter = Groups<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`CategoryGroups::iter`].
#[derive(Debug, Clone)]
pub struct Groups<'a> {
    categories: std::slice::Iter<'a, Category>,
    event: &'a Event,
    filter: &'a ItemFilter,
}

impl<'a> Iterator for Groups<'a> {
    type Item = CategoryGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (event, filter) = (self.event, self.filter);
        self.categories.by_ref().find_map(|category| {
            if filter.category_id.as_ref().is_some_and(|c| c != &category.id) {
                return None;
            }
            let items: Vec<&Item> = filtered_items(event, filter)
                .filter(|item| item.category_id == category.id)
                .collect();
            (!items.is_empty()).then_some(CategoryGroup { category, items })
        })
    }
}

/// `round(count / total * 100)`, 0 for an empty event.
fn percentage(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // integer round-half-up, same as Math.round for non-negative input
    ((count * 200 + total) / (2 * total)) as u8
}

pub fn compute_progress(event: &Event) -> ProgressSummary {
    let total_items = event.items.len();
    let packed_count = event.items.iter().filter(|i| i.status.is_packed()).count();
    let delivered_count = event
        .items
        .iter()
        .filter(|i| i.status == ItemStatus::Delivered)
        .count();

    ProgressSummary {
        packed_percentage: percentage(packed_count, total_items),
        delivered_percentage: percentage(delivered_count, total_items),
        packed_count,
        delivered_count,
        total_items,
    }
}

/// Case-insensitive substring match against title or description. An empty
/// query keeps everything; order is preserved.
pub fn search_events<E: Borrow<Event>>(events: impl IntoIterator<Item = E>, query: &str) -> Vec<E> {
    let needle = query.to_lowercase();
    events
        .into_iter()
        .filter(|e| matches_query(e.borrow(), &needle))
        .collect()
}

fn matches_query(event: &Event, needle: &str) -> bool {
    needle.is_empty()
        || event.title.to_lowercase().contains(needle)
        || event.description.to_lowercase().contains(needle)
}

pub fn event_summary(event: &Event) -> EventSummary {
    EventSummary {
        id: event.id.clone(),
        title: event.title.clone(),
        description: event.description.clone(),
        date: event.date,
        location: event.location.clone(),
        item_count: event.items.len(),
        member_count: event.members.len(),
        progress: compute_progress(event),
    }
}

pub fn member_role(event: &Event, user_id: &UserId) -> Option<Role> {
    event.member(user_id).map(|m| m.role)
}
