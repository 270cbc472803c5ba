//! Authoritative in-memory model of events and their nested entities.
//!
//! Each event lives in its own slot: readers load an immutable `Arc<Event>`
//! snapshot without locking, writers serialize on the slot's mutex, mutate a
//! private copy and publish it only once every check passed. A failed
//! operation therefore never leaves a partial change behind. Operations on
//! different events never share a lock beyond the short registry lookup.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::contract::model::{
    Category, CategoryId, CategoryInput, Event, EventId, EventInput, Item, ItemFilter, ItemId,
    ItemInput, ItemPatch, Member, ProgressSummary, Role, UserId, UserProfile,
};
use crate::domain::error::DomainError;
use crate::domain::events::StoreEvent;
use crate::domain::policy;
use crate::domain::ports::{EventPublisher, NoopPublisher};
use crate::domain::query::{self, CategoryGroups};
use crate::domain::rules::{self, DEFAULT_CATEGORY_COLOR};

/// Store-level limits and defaults.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub default_categories: Vec<CategoryInput>,
    pub max_title_length: usize,
    pub max_item_name_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_categories: vec![
                CategoryInput::new("Tech").with_color("#0EA5E9"),
                CategoryInput::new("Food").with_color("#10B981"),
            ],
            max_title_length: 100,
            max_item_name_length: 100,
        }
    }
}

/// Complete store contents, used to initialize, reset and export the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub users: Vec<UserProfile>,
    pub events: Vec<Event>,
}

/// Extra check run against the current event state inside the writer lock,
/// before any change is made. Used to authorize against a consistent view.
pub type Guard<'a> = &'a dyn Fn(&Event) -> Result<(), DomainError>;

fn unguarded(_: &Event) -> Result<(), DomainError> {
    Ok(())
}

struct EventSlot {
    current: ArcSwap<Event>,
    writer: Mutex<()>,
    removed: AtomicBool,
}

impl EventSlot {
    fn new(event: Event) -> Arc<Self> {
        Arc::new(Self {
            current: ArcSwap::from_pointee(event),
            writer: Mutex::new(()),
            removed: AtomicBool::new(false),
        })
    }
}

#[derive(Default)]
struct Registry {
    order: Vec<EventId>,
    slots: HashMap<EventId, Arc<EventSlot>>,
}

impl Registry {
    fn insert(&mut self, event: Event) {
        let id = event.id.clone();
        self.order.push(id.clone());
        self.slots.insert(id, EventSlot::new(event));
    }

    /// Mark every slot removed, one writer lock at a time, so no mutation can
    /// complete against a slot that is no longer in the registry.
    fn retire(&self) {
        for slot in self.ordered_slots() {
            let _writer = slot.writer.lock();
            slot.removed.store(true, Ordering::Release);
        }
    }

    fn ordered_slots(&self) -> Vec<Arc<EventSlot>> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(id).cloned())
            .collect()
    }
}

/// The entity store. Cheap to share behind an `Arc`.
pub struct EventStore {
    config: StoreConfig,
    users: DashMap<UserId, UserProfile>,
    registry: RwLock<Registry>,
    publisher: Arc<dyn EventPublisher<StoreEvent>>,
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("users", &self.users.len())
            .field("events", &self.registry.read().order.len())
            .finish()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl EventStore {
    /// Empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_publisher(config, Arc::new(NoopPublisher))
    }

    pub fn with_publisher(
        config: StoreConfig,
        publisher: Arc<dyn EventPublisher<StoreEvent>>,
    ) -> Self {
        Self {
            config,
            users: DashMap::new(),
            registry: RwLock::new(Registry::default()),
            publisher,
        }
    }

    /// Store initialized from `snapshot`; fails if any event breaks an invariant.
    pub fn from_snapshot(config: StoreConfig, snapshot: Snapshot) -> Result<Self, DomainError> {
        let store = Self::new(config);
        store.load(snapshot)?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- lifecycle ---

    /// Replace the whole content with `snapshot`. On error nothing changes.
    pub fn reset(&self, snapshot: Snapshot) -> Result<(), DomainError> {
        self.load(snapshot).map(|_| ())
    }

    /// Drop every event and user. Mutations still in flight finish first;
    /// later ones on the dropped events fail with `NotFound`.
    pub fn clear(&self) {
        let mut registry = self.registry.write();
        registry.retire();
        *registry = Registry::default();
        self.users.clear();
        self.publisher.publish(&StoreEvent::StoreReset {
            events: 0,
            at: Utc::now(),
        });
        drop(registry);
        info!("Store cleared");
    }

    /// Point-in-time copy of the store, events in store order.
    pub fn snapshot(&self) -> Snapshot {
        let mut users: Vec<UserProfile> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Snapshot {
            users,
            events: self
                .list_events()
                .into_iter()
                .map(Arc::unwrap_or_clone)
                .collect(),
        }
    }

    fn load(&self, snapshot: Snapshot) -> Result<usize, DomainError> {
        let mut next = Registry::default();
        let mut seen = HashSet::new();
        for event in &snapshot.events {
            if !seen.insert(event.id.clone()) {
                return Err(DomainError::validation(
                    "events",
                    format!("duplicate event id {}", event.id),
                ));
            }
            rules::validate_event(event)?;
        }

        // Members carry profile data too; explicit users win.
        let mut profiles: HashMap<UserId, UserProfile> = HashMap::new();
        for member in snapshot.events.iter().flat_map(|e| e.members.iter()) {
            profiles
                .entry(member.user_id.clone())
                .or_insert_with(|| UserProfile {
                    id: member.user_id.clone(),
                    name: member.name.clone(),
                    avatar: member.avatar.clone(),
                });
        }
        for user in snapshot.users {
            rules::required_text("user name", &user.name)?;
            profiles.insert(user.id.clone(), user);
        }

        let count = snapshot.events.len();
        for event in snapshot.events {
            next.insert(event);
        }

        let mut registry = self.registry.write();
        registry.retire();
        *registry = next;
        self.users.clear();
        for (id, profile) in profiles {
            self.users.insert(id, profile);
        }
        self.publisher.publish(&StoreEvent::StoreReset {
            events: count,
            at: Utc::now(),
        });
        drop(registry);

        info!(events = count, users = self.users.len(), "Store loaded from snapshot");
        Ok(count)
    }

    // --- user directory ---

    /// Insert or refresh a profile; memberships of that user pick up the new
    /// name and avatar.
    pub fn register_user(&self, profile: UserProfile) -> Result<(), DomainError> {
        let name = rules::required_text("user name", &profile.name)?;
        let profile = UserProfile { name, ..profile };
        let changed = self
            .users
            .insert(profile.id.clone(), profile.clone())
            .is_some_and(|old| old != profile);

        if changed {
            let slots = self.registry.read().ordered_slots();
            for slot in slots {
                let _writer = slot.writer.lock();
                let current = slot.current.load_full();
                if current.member(&profile.id).is_none() {
                    continue;
                }
                let mut draft = Event::clone(&current);
                for m in draft.members.iter_mut().filter(|m| m.user_id == profile.id) {
                    m.name = profile.name.clone();
                    m.avatar = profile.avatar.clone();
                }
                slot.current.store(Arc::new(draft));
            }
        }
        debug!(user_id = %profile.id, "User registered");
        Ok(())
    }

    pub fn user(&self, id: &UserId) -> Option<UserProfile> {
        self.users.get(id).map(|u| u.value().clone())
    }

    // --- reads ---

    pub fn list_events(&self) -> Vec<Arc<Event>> {
        self.registry
            .read()
            .ordered_slots()
            .into_iter()
            .map(|slot| slot.current.load_full())
            .collect()
    }

    pub fn get_event(&self, id: &EventId) -> Result<Arc<Event>, DomainError> {
        Ok(self.slot(id)?.current.load_full())
    }

    fn slot(&self, id: &EventId) -> Result<Arc<EventSlot>, DomainError> {
        self.registry
            .read()
            .slots
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::event_not_found(id.clone()))
    }

    /// Run `f` on a private copy of the event under the event's writer lock
    /// and publish the copy only if `f` succeeds. The domain event built by
    /// `notify` goes out before the lock is released, so subscribers see
    /// changes in store order.
    fn mutate<T>(
        &self,
        event_id: &EventId,
        guard: Guard<'_>,
        f: impl FnOnce(&mut Event) -> Result<T, DomainError>,
        notify: impl FnOnce(&T) -> StoreEvent,
    ) -> Result<T, DomainError> {
        let slot = self.slot(event_id)?;
        let _writer = slot.writer.lock();
        if slot.removed.load(Ordering::Acquire) {
            return Err(DomainError::event_not_found(event_id.clone()));
        }
        let current = slot.current.load_full();
        guard(current.as_ref())?;
        let mut draft = Event::clone(&current);
        let out = f(&mut draft)?;
        slot.current.store(Arc::new(draft));
        self.publisher.publish(&notify(&out));
        Ok(out)
    }

    // --- events ---

    /// Create an event owned by `creator`, who is registered as a user.
    pub fn create_event(
        &self,
        creator: &UserProfile,
        input: EventInput,
    ) -> Result<Arc<Event>, DomainError> {
        let title = rules::bounded_text("title", &input.title, self.config.max_title_length)?;
        let description = rules::required_text("description", &input.description)?;
        let location = rules::required_text("location", &input.location)?;
        let date = rules::parse_event_date(&input.date)?;
        let creator_name = rules::required_text("creator name", &creator.name)?;

        let categories = self.build_categories(
            input
                .categories
                .unwrap_or_else(|| self.config.default_categories.clone()),
        )?;

        let creator = UserProfile {
            name: creator_name,
            ..creator.clone()
        };
        let event = Event {
            id: EventId::generate(),
            title,
            description,
            date,
            location,
            created_by: creator.id.clone(),
            categories,
            items: Vec::new(),
            members: vec![Member::from_profile(&creator, Role::Owner)],
        };

        self.users
            .entry(creator.id.clone())
            .or_insert_with(|| creator.clone());
        let snapshot = Arc::new(event.clone());
        let mut registry = self.registry.write();
        registry.insert(event);
        self.publisher.publish(&StoreEvent::EventCreated {
            id: snapshot.id.clone(),
            at: Utc::now(),
        });
        drop(registry);

        info!(event_id = %snapshot.id, owner = %creator.id, "Event created");
        Ok(snapshot)
    }

    fn build_categories(&self, inputs: Vec<CategoryInput>) -> Result<Vec<Category>, DomainError> {
        let mut seen = HashSet::new();
        inputs
            .into_iter()
            .map(|input| {
                let name = rules::required_text("category name", &input.name)?;
                let id = input.id.unwrap_or_else(CategoryId::generate);
                if id.as_str().trim().is_empty() {
                    return Err(DomainError::validation("category id", "must not be blank"));
                }
                if !seen.insert(id.clone()) {
                    return Err(DomainError::validation(
                        "category id",
                        format!("duplicate category id {id}"),
                    ));
                }
                Ok(Category {
                    id,
                    name,
                    color: rules::optional_text(input.color.as_deref())
                        .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
                })
            })
            .collect()
    }

    /// Remove the event with all its categories, items and memberships.
    pub fn delete_event(&self, id: &EventId) -> Result<(), DomainError> {
        self.delete_event_checked(id, &unguarded)
    }

    pub fn delete_event_checked(&self, id: &EventId, guard: Guard<'_>) -> Result<(), DomainError> {
        let mut registry = self.registry.write();
        let slot = registry
            .slots
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::event_not_found(id.clone()))?;
        {
            let _writer = slot.writer.lock();
            let current = slot.current.load_full();
            guard(current.as_ref())?;
            slot.removed.store(true, Ordering::Release);
        }
        registry.slots.remove(id);
        registry.order.retain(|e| e != id);
        self.publisher.publish(&StoreEvent::EventDeleted {
            id: id.clone(),
            at: Utc::now(),
        });
        drop(registry);

        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    // --- items ---

    pub fn add_item(&self, event_id: &EventId, input: ItemInput) -> Result<Item, DomainError> {
        self.add_item_checked(event_id, input, &unguarded)
    }

    pub fn add_item_checked(
        &self,
        event_id: &EventId,
        input: ItemInput,
        guard: Guard<'_>,
    ) -> Result<Item, DomainError> {
        let name = rules::bounded_text("name", &input.name, self.config.max_item_name_length)?;
        let quantity = rules::quantity(input.quantity.unwrap_or(1))?;

        let item = self.mutate(
            event_id,
            guard,
            |event| {
                if query::is_duplicate_item(event, &name, None) {
                    return Err(DomainError::duplicate_item(event.id.clone(), name.clone()));
                }
                ensure_category(event, &input.category_id)?;
                if let Some(assignee) = &input.assigned_to {
                    ensure_member(event, assignee)?;
                }

                let item = Item {
                    id: ItemId::generate(),
                    name,
                    category_id: input.category_id,
                    assigned_to: input.assigned_to,
                    status: Default::default(),
                    notes: rules::optional_text(input.notes.as_deref()),
                    is_required: input.is_required,
                    quantity,
                };
                event.items.push(item.clone());
                Ok(item)
            },
            |item| StoreEvent::ItemAdded {
                event_id: event_id.clone(),
                item_id: item.id.clone(),
                at: Utc::now(),
            },
        )?;

        info!(event_id = %event_id, item_id = %item.id, "Item added");
        Ok(item)
    }

    pub fn update_item(
        &self,
        event_id: &EventId,
        item_id: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item, DomainError> {
        self.update_item_checked(event_id, item_id, patch, &unguarded)
    }

    /// Merge `patch` into the item. References and name uniqueness are
    /// re-validated for the fields the patch touches.
    pub fn update_item_checked(
        &self,
        event_id: &EventId,
        item_id: &ItemId,
        patch: ItemPatch,
        guard: Guard<'_>,
    ) -> Result<Item, DomainError> {
        let name = patch
            .name
            .as_deref()
            .map(|n| rules::bounded_text("name", n, self.config.max_item_name_length))
            .transpose()?;
        let quantity = patch.quantity.map(rules::quantity).transpose()?;

        let item = self.mutate(
            event_id,
            guard,
            |event| {
                let index = event
                    .items
                    .iter()
                    .position(|i| &i.id == item_id)
                    .ok_or_else(|| DomainError::item_not_found(event.id.clone(), item_id.clone()))?;

                if let Some(name) = &name {
                    if query::is_duplicate_item(event, name, Some(item_id)) {
                        return Err(DomainError::duplicate_item(event.id.clone(), name.clone()));
                    }
                }
                if let Some(category_id) = &patch.category_id {
                    ensure_category(event, category_id)?;
                }
                if let Some(Some(assignee)) = &patch.assigned_to {
                    ensure_member(event, assignee)?;
                }

                let item = &mut event.items[index];
                if let Some(name) = name {
                    item.name = name;
                }
                if let Some(category_id) = patch.category_id {
                    item.category_id = category_id;
                }
                if let Some(assigned_to) = patch.assigned_to {
                    item.assigned_to = assigned_to;
                }
                if let Some(status) = patch.status {
                    item.status = status;
                }
                if let Some(notes) = patch.notes {
                    item.notes = rules::optional_text(notes.as_deref());
                }
                if let Some(is_required) = patch.is_required {
                    item.is_required = is_required;
                }
                if let Some(quantity) = quantity {
                    item.quantity = quantity;
                }
                Ok(item.clone())
            },
            |_| StoreEvent::ItemUpdated {
                event_id: event_id.clone(),
                item_id: item_id.clone(),
                at: Utc::now(),
            },
        )?;

        info!(event_id = %event_id, item_id = %item_id, status = %item.status, "Item updated");
        Ok(item)
    }

    pub fn delete_item(&self, event_id: &EventId, item_id: &ItemId) -> Result<Item, DomainError> {
        self.delete_item_checked(event_id, item_id, &unguarded)
    }

    pub fn delete_item_checked(
        &self,
        event_id: &EventId,
        item_id: &ItemId,
        guard: Guard<'_>,
    ) -> Result<Item, DomainError> {
        let removed = self.mutate(
            event_id,
            guard,
            |event| {
                let index = event
                    .items
                    .iter()
                    .position(|i| &i.id == item_id)
                    .ok_or_else(|| DomainError::item_not_found(event.id.clone(), item_id.clone()))?;
                Ok(event.items.remove(index))
            },
            |_| StoreEvent::ItemDeleted {
                event_id: event_id.clone(),
                item_id: item_id.clone(),
                at: Utc::now(),
            },
        )?;

        info!(event_id = %event_id, item_id = %item_id, "Item deleted");
        Ok(removed)
    }

    // --- memberships ---

    /// Add `user_id` to the event with `role`, or change their role.
    ///
    /// `actor` is the user performing the change: nobody changes their own
    /// membership here, the owner's role is fixed and there is never a second
    /// owner.
    pub fn set_membership(
        &self,
        actor: &UserId,
        event_id: &EventId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Member, DomainError> {
        self.set_membership_checked(actor, event_id, user_id, role, &unguarded)
    }

    pub fn set_membership_checked(
        &self,
        actor: &UserId,
        event_id: &EventId,
        user_id: &UserId,
        role: Role,
        guard: Guard<'_>,
    ) -> Result<Member, DomainError> {
        let profile = self
            .user(user_id)
            .ok_or_else(|| DomainError::user_not_found(user_id.clone()))?;

        let member = self.mutate(
            event_id,
            guard,
            |event| {
                let current = query::member_role(event, user_id);
                policy::check_member_change(&event.id, actor, user_id, current, Some(role))?;

                match event.members.iter_mut().find(|m| &m.user_id == user_id) {
                    Some(existing) => {
                        existing.role = role;
                        Ok(existing.clone())
                    }
                    None => {
                        let member = Member::from_profile(&profile, role);
                        event.members.push(member.clone());
                        Ok(member)
                    }
                }
            },
            |_| StoreEvent::MembershipSet {
                event_id: event_id.clone(),
                user_id: user_id.clone(),
                role,
                at: Utc::now(),
            },
        )?;

        info!(event_id = %event_id, user_id = %user_id, role = %role, "Membership set");
        Ok(member)
    }

    /// Remove `user_id` from the event. Items assigned to them become unassigned.
    pub fn remove_membership(
        &self,
        actor: &UserId,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<(), DomainError> {
        self.remove_membership_checked(actor, event_id, user_id, &unguarded)
    }

    pub fn remove_membership_checked(
        &self,
        actor: &UserId,
        event_id: &EventId,
        user_id: &UserId,
        guard: Guard<'_>,
    ) -> Result<(), DomainError> {
        let unassigned = self.mutate(
            event_id,
            guard,
            |event| {
                let current = query::member_role(event, user_id).ok_or_else(|| {
                    DomainError::member_not_found(event.id.clone(), user_id.clone())
                })?;
                policy::check_member_change(&event.id, actor, user_id, Some(current), None)?;

                event.members.retain(|m| &m.user_id != user_id);
                let mut unassigned = 0usize;
                for item in event
                    .items
                    .iter_mut()
                    .filter(|i| i.assigned_to.as_ref() == Some(user_id))
                {
                    item.assigned_to = None;
                    unassigned += 1;
                }
                Ok(unassigned)
            },
            |_| StoreEvent::MembershipRemoved {
                event_id: event_id.clone(),
                user_id: user_id.clone(),
                at: Utc::now(),
            },
        )?;

        info!(event_id = %event_id, user_id = %user_id, unassigned, "Membership removed");
        Ok(())
    }

    // --- views ---

    /// False for an unknown event.
    pub fn is_duplicate_item(
        &self,
        event_id: &EventId,
        name: &str,
        exclude: Option<&ItemId>,
    ) -> bool {
        self.get_event(event_id)
            .map(|event| query::is_duplicate_item(&event, name, exclude))
            .unwrap_or(false)
    }

    pub fn group_items_by_category(
        &self,
        event_id: &EventId,
        filter: ItemFilter,
    ) -> Result<CategoryGroups, DomainError> {
        Ok(CategoryGroups::new(self.get_event(event_id)?, filter))
    }

    pub fn compute_progress(&self, event_id: &EventId) -> Result<ProgressSummary, DomainError> {
        let event = self.get_event(event_id)?;
        Ok(query::compute_progress(&event))
    }

    pub fn search_events(&self, query: &str) -> Vec<Arc<Event>> {
        query::search_events(self.list_events(), query)
    }
}

fn ensure_category(event: &Event, id: &CategoryId) -> Result<(), DomainError> {
    event
        .category(id)
        .map(|_| ())
        .ok_or_else(|| DomainError::category_not_found(event.id.clone(), id.clone()))
}

fn ensure_member(event: &Event, user_id: &UserId) -> Result<(), DomainError> {
    event
        .member(user_id)
        .map(|_| ())
        .ok_or_else(|| DomainError::member_not_found(event.id.clone(), user_id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::ItemStatus;

    fn owner() -> UserProfile {
        UserProfile::new("1", "John Doe")
    }

    fn beach_trip(store: &EventStore) -> Arc<Event> {
        store
            .create_event(
                &owner(),
                EventInput {
                    title: "Beach Trip".into(),
                    description: "Weekend getaway".into(),
                    date: "2023-07-22".into(),
                    location: "Malibu, CA".into(),
                    categories: Some(vec![CategoryInput::new("Essentials").with_id("c1")]),
                },
            )
            .unwrap()
    }

    #[test]
    fn create_event_seeds_owner_and_categories() {
        let store = EventStore::default();
        let event = beach_trip(&store);

        assert_eq!(event.members.len(), 1);
        assert_eq!(event.owner().unwrap().user_id, UserId::from("1"));
        assert_eq!(event.created_by, UserId::from("1"));
        assert_eq!(event.categories[0].color, DEFAULT_CATEGORY_COLOR);
        assert!(event.items.is_empty());
        assert!(store.user(&UserId::from("1")).is_some());
    }

    #[test]
    fn create_event_uses_default_categories() {
        let store = EventStore::default();
        let event = store
            .create_event(
                &owner(),
                EventInput {
                    title: "Hackathon".into(),
                    description: "Annual".into(),
                    date: "2023-12-15T10:00:00Z".into(),
                    location: "SF".into(),
                    categories: None,
                },
            )
            .unwrap();
        let names: Vec<_> = event.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Tech", "Food"]);
        assert_eq!(event.categories[0].color, "#0EA5E9");
    }

    #[test]
    fn create_event_rejects_blank_fields() {
        let store = EventStore::default();
        for field in ["title", "description", "date", "location"] {
            let mut input = EventInput {
                title: "t".into(),
                description: "d".into(),
                date: "2024-01-01".into(),
                location: "l".into(),
                categories: None,
            };
            match field {
                "title" => input.title = "  ".into(),
                "description" => input.description = String::new(),
                "date" => input.date = " ".into(),
                _ => input.location = "\t".into(),
            }
            let err = store.create_event(&owner(), input).unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }), "{field}: {err:?}");
        }
        assert!(store.list_events().is_empty());
    }

    #[test]
    fn create_event_rejects_duplicate_category_ids() {
        let store = EventStore::default();
        let err = store
            .create_event(
                &owner(),
                EventInput {
                    title: "t".into(),
                    description: "d".into(),
                    date: "2024-01-01".into(),
                    location: "l".into(),
                    categories: Some(vec![
                        CategoryInput::new("A").with_id("x"),
                        CategoryInput::new("B").with_id("x"),
                    ]),
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn failed_update_leaves_item_untouched() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        let item = store
            .add_item(&event.id, ItemInput::new("Sunscreen", "c1"))
            .unwrap();

        let patch = ItemPatch {
            status: Some(ItemStatus::Delivered),
            category_id: Some("nope".into()),
            ..ItemPatch::default()
        };
        let err = store.update_item(&event.id, &item.id, patch).unwrap_err();
        assert!(matches!(err, DomainError::CategoryNotFound { .. }));

        let after = store.get_event(&event.id).unwrap();
        assert_eq!(after.item(&item.id).unwrap().status, ItemStatus::ToPack);
    }

    #[test]
    fn rename_to_own_name_with_different_case_is_allowed() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        let item = store
            .add_item(&event.id, ItemInput::new("Sunscreen", "c1"))
            .unwrap();
        store
            .add_item(&event.id, ItemInput::new("Towels", "c1"))
            .unwrap();

        let renamed = store
            .update_item(&event.id, &item.id, ItemPatch::rename("SUNSCREEN "))
            .unwrap();
        assert_eq!(renamed.name, "SUNSCREEN");

        let err = store
            .update_item(&event.id, &item.id, ItemPatch::rename("towels"))
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateItem { .. }));
    }

    #[test]
    fn removing_member_unassigns_their_items() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        store.register_user(UserProfile::new("3", "Mike")).unwrap();
        store
            .set_membership(&"1".into(), &event.id, &"3".into(), Role::Member)
            .unwrap();
        let item = store
            .add_item(&event.id, ItemInput::new("Towels", "c1").assigned_to("3"))
            .unwrap();

        store
            .remove_membership(&"1".into(), &event.id, &"3".into())
            .unwrap();

        let after = store.get_event(&event.id).unwrap();
        assert!(after.member(&"3".into()).is_none());
        assert_eq!(after.item(&item.id).unwrap().assigned_to, None);
    }

    #[test]
    fn set_membership_requires_known_user() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        let err = store
            .set_membership(&"1".into(), &event.id, &"ghost".into(), Role::Viewer)
            .unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound { .. }));
    }

    #[test]
    fn register_user_refreshes_member_display_fields() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        store
            .register_user(UserProfile::new("1", "Johnny").with_avatar("a.png"))
            .unwrap();

        let owner = store.get_event(&event.id).unwrap().owner().cloned().unwrap();
        assert_eq!(owner.name, "Johnny");
        assert_eq!(owner.avatar, "a.png");
    }

    #[test]
    fn guard_failure_prevents_mutation() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        let deny = |e: &Event| -> Result<(), DomainError> {
            Err(DomainError::permission_denied(
                e.id.clone(),
                "x".into(),
                "add items",
            ))
        };

        let err = store
            .add_item_checked(&event.id, ItemInput::new("Hat", "c1"), &deny)
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
        assert!(store.get_event(&event.id).unwrap().items.is_empty());

        assert!(store.delete_event_checked(&event.id, &deny).is_err());
        assert!(store.get_event(&event.id).is_ok());
    }

    #[test]
    fn snapshot_reset_roundtrip() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        store
            .add_item(&event.id, ItemInput::new("Sunscreen", "c1"))
            .unwrap();
        let snapshot = store.snapshot();

        let other = EventStore::default();
        other.reset(snapshot.clone()).unwrap();
        assert_eq!(other.snapshot(), snapshot);

        other.clear();
        assert!(other.list_events().is_empty());
        assert!(other.user(&"1".into()).is_none());
    }

    #[test]
    fn invalid_snapshot_leaves_store_unchanged() {
        let store = EventStore::default();
        let event = beach_trip(&store);

        let mut bad = store.snapshot();
        bad.events[0].members.clear();
        let err = store.reset(bad).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(store.get_event(&event.id).is_ok());
    }

    #[test]
    fn deleted_event_is_gone_for_later_mutations() {
        let store = EventStore::default();
        let event = beach_trip(&store);
        store.delete_event(&event.id).unwrap();

        let err = store
            .add_item(&event.id, ItemInput::new("Hat", "c1"))
            .unwrap_err();
        assert!(matches!(err, DomainError::EventNotFound { .. }));
        assert!(matches!(
            store.delete_event(&event.id).unwrap_err(),
            DomainError::EventNotFound { .. }
        ));
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<StoreEvent>>,
    }

    impl EventPublisher<StoreEvent> for Recorder {
        fn publish(&self, event: &StoreEvent) {
            self.seen.lock().push(event.clone());
        }
    }

    impl Recorder {
        fn kinds(&self) -> Vec<&'static str> {
            self.seen
                .lock()
                .iter()
                .map(|e| match e {
                    StoreEvent::EventCreated { .. } => "created",
                    StoreEvent::EventDeleted { .. } => "deleted",
                    StoreEvent::ItemAdded { .. } => "item_added",
                    StoreEvent::ItemUpdated { .. } => "item_updated",
                    StoreEvent::ItemDeleted { .. } => "item_deleted",
                    StoreEvent::MembershipSet { .. } => "member_set",
                    StoreEvent::MembershipRemoved { .. } => "member_removed",
                    StoreEvent::StoreReset { .. } => "reset",
                })
                .collect()
        }
    }

    #[test]
    fn successful_mutations_publish_in_order() {
        let recorder = Arc::new(Recorder::default());
        let store = EventStore::with_publisher(StoreConfig::default(), recorder.clone());
        let event = beach_trip(&store);
        store.register_user(UserProfile::new("3", "Mike")).unwrap();

        let item = store
            .add_item(&event.id, ItemInput::new("Sunscreen", "c1"))
            .unwrap();
        store
            .update_item(&event.id, &item.id, ItemPatch::status(ItemStatus::Packed))
            .unwrap();
        store
            .set_membership(&"1".into(), &event.id, &"3".into(), Role::Member)
            .unwrap();
        store
            .remove_membership(&"1".into(), &event.id, &"3".into())
            .unwrap();
        store.delete_item(&event.id, &item.id).unwrap();
        store.reset(store.snapshot()).unwrap();
        store.delete_event(&event.id).unwrap();

        assert_eq!(
            recorder.kinds(),
            [
                "created",
                "item_added",
                "item_updated",
                "member_set",
                "member_removed",
                "item_deleted",
                "reset",
                "deleted",
            ]
        );
        assert!(matches!(
            recorder.seen.lock()[1],
            StoreEvent::ItemAdded { ref item_id, .. } if item_id == &item.id
        ));
        assert!(matches!(
            recorder.seen.lock()[6],
            StoreEvent::StoreReset { events: 1, .. }
        ));
    }

    #[test]
    fn rejected_mutations_publish_nothing() {
        let recorder = Arc::new(Recorder::default());
        let store = EventStore::with_publisher(StoreConfig::default(), recorder.clone());
        let event = beach_trip(&store);
        store
            .add_item(&event.id, ItemInput::new("Sunscreen", "c1"))
            .unwrap();
        let before = recorder.kinds().len();

        let dup = store.add_item(&event.id, ItemInput::new(" SUNSCREEN", "c1"));
        assert!(matches!(dup, Err(DomainError::DuplicateItem { .. })));

        let deny = |e: &Event| -> Result<(), DomainError> {
            Err(DomainError::permission_denied(
                e.id.clone(),
                "4".into(),
                "add items",
            ))
        };
        assert!(store
            .add_item_checked(&event.id, ItemInput::new("Hat", "c1"), &deny)
            .is_err());
        assert!(store
            .remove_membership(&"1".into(), &event.id, &"1".into())
            .is_err());
        let mut bad = store.snapshot();
        bad.events[0].members.clear();
        assert!(store.reset(bad).is_err());

        assert_eq!(recorder.kinds().len(), before);
    }

    #[test]
    fn mutation_in_flight_completes_before_clear() {
        use std::sync::Barrier;
        use std::thread;
        use std::time::Duration;

        let recorder = Arc::new(Recorder::default());
        let store = Arc::new(EventStore::with_publisher(
            StoreConfig::default(),
            recorder.clone(),
        ));
        let event = beach_trip(&store);
        let entered = Arc::new(Barrier::new(2));

        let adder = {
            let store = store.clone();
            let entered = entered.clone();
            let id = event.id.clone();
            thread::spawn(move || {
                let pause = |_: &Event| -> Result<(), DomainError> {
                    entered.wait();
                    thread::sleep(Duration::from_millis(50));
                    Ok(())
                };
                store.add_item_checked(&id, ItemInput::new("Hat", "c1"), &pause)
            })
        };

        entered.wait();
        store.clear();
        let added = adder.join().unwrap();

        // The add held the event lock first, so it lands before the clear.
        assert!(added.is_ok());
        assert_eq!(recorder.kinds(), ["created", "item_added", "reset"]);
        assert!(store.list_events().is_empty());
        assert!(matches!(
            store.add_item(&event.id, ItemInput::new("Cap", "c1")),
            Err(DomainError::EventNotFound { .. })
        ));
    }
}
