use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{
    Capabilities, Event, EventId, EventInput, EventSummary, Item, ItemFilter, ItemId, ItemInput,
    ItemPatch, Member, ProgressSummary, Role, UserId, UserProfile,
};
use crate::domain::error::DomainError;
use crate::domain::identity::IdentityContext;
use crate::domain::policy::{self, Action, Target};
use crate::domain::query::{self, CategoryGroups};
use crate::domain::store::EventStore;

/// Domain service: every mutation runs as the current user and is authorized
/// against their role in the target event.
///
/// Authorization runs inside the store's writer lock, so the role it sees is
/// the role at the moment the change is applied.
#[derive(Clone)]
pub struct Service {
    store: Arc<EventStore>,
    identity: Arc<IdentityContext>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("user", &self.identity.user_id())
            .finish()
    }
}

impl Service {
    pub fn new(store: Arc<EventStore>, identity: Arc<IdentityContext>) -> Self {
        Self { store, identity }
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    pub fn identity(&self) -> &Arc<IdentityContext> {
        &self.identity
    }

    pub fn current_user(&self) -> Arc<UserProfile> {
        self.identity.current_user()
    }

    /// Switch the acting user. The profile is registered so it can be added
    /// to events.
    #[instrument(
        name = "packing.service.switch_user",
        skip(self, profile),
        fields(user_id = %profile.id)
    )]
    pub fn switch_user(&self, profile: UserProfile) -> Result<(), DomainError> {
        self.store.register_user(profile.clone())?;
        self.identity.set_current_user(profile);
        info!("Switched current user");
        Ok(())
    }

    #[instrument(
        name = "packing.service.register_user",
        skip(self, profile),
        fields(user_id = %profile.id)
    )]
    pub fn register_user(&self, profile: UserProfile) -> Result<(), DomainError> {
        self.store.register_user(profile)
    }

    // --- reads ---

    pub fn list_events(&self) -> Vec<Arc<Event>> {
        self.store.list_events()
    }

    #[instrument(name = "packing.service.get_event", skip(self), fields(event_id = %event_id))]
    pub fn get_event(&self, event_id: &EventId) -> Result<Arc<Event>, DomainError> {
        debug!("Getting event by id");
        self.store.get_event(event_id)
    }

    pub fn search_events(&self, query: &str) -> Vec<Arc<Event>> {
        self.store.search_events(query)
    }

    #[instrument(name = "packing.service.event_summaries", skip(self))]
    pub fn event_summaries(&self, query: &str) -> Vec<EventSummary> {
        let summaries: Vec<_> = self
            .store
            .search_events(query)
            .iter()
            .map(|e| query::event_summary(e))
            .collect();
        debug!("Summarized {} events", summaries.len());
        summaries
    }

    pub fn is_duplicate_item(
        &self,
        event_id: &EventId,
        name: &str,
        exclude: Option<&ItemId>,
    ) -> bool {
        self.store.is_duplicate_item(event_id, name, exclude)
    }

    pub fn group_items_by_category(
        &self,
        event_id: &EventId,
        filter: ItemFilter,
    ) -> Result<CategoryGroups, DomainError> {
        self.store.group_items_by_category(event_id, filter)
    }

    pub fn compute_progress(&self, event_id: &EventId) -> Result<ProgressSummary, DomainError> {
        self.store.compute_progress(event_id)
    }

    /// Role of the current user in `event_id`, `None` for non-members.
    pub fn current_role(&self, event_id: &EventId) -> Result<Option<Role>, DomainError> {
        let event = self.store.get_event(event_id)?;
        Ok(query::member_role(&event, &self.identity.user_id()))
    }

    pub fn capabilities(&self, event_id: &EventId) -> Result<Capabilities, DomainError> {
        Ok(policy::capabilities(self.current_role(event_id)?))
    }

    // --- mutations ---

    #[instrument(
        name = "packing.service.create_event",
        skip(self, input),
        fields(title = %input.title)
    )]
    pub fn create_event(&self, input: EventInput) -> Result<Arc<Event>, DomainError> {
        info!("Creating new event");
        let creator = self.identity.current_user();
        let event = self
            .store
            .create_event(&creator, input)
            .inspect_err(log_rejection)?;
        info!("Successfully created event with id={}", event.id);
        Ok(event)
    }

    #[instrument(name = "packing.service.delete_event", skip(self), fields(event_id = %event_id))]
    pub fn delete_event(&self, event_id: &EventId) -> Result<(), DomainError> {
        let actor = self.identity.user_id();
        self.store
            .delete_event_checked(event_id, &|event| {
                policy::authorize(
                    &event.id,
                    &actor,
                    query::member_role(event, &actor),
                    Action::DeleteEvent,
                    Target::Event,
                )
            })
            .inspect_err(log_rejection)
    }

    #[instrument(
        name = "packing.service.add_item",
        skip(self, input),
        fields(event_id = %event_id, name = %input.name)
    )]
    pub fn add_item(&self, event_id: &EventId, input: ItemInput) -> Result<Item, DomainError> {
        let actor = self.identity.user_id();
        self.store
            .add_item_checked(event_id, input, &|event| {
                policy::authorize(
                    &event.id,
                    &actor,
                    query::member_role(event, &actor),
                    Action::AddItem,
                    Target::Event,
                )
            })
            .inspect_err(log_rejection)
    }

    #[instrument(
        name = "packing.service.update_item",
        skip(self, patch),
        fields(event_id = %event_id, item_id = %item_id)
    )]
    pub fn update_item(
        &self,
        event_id: &EventId,
        item_id: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item, DomainError> {
        let actor = self.identity.user_id();
        self.store
            .update_item_checked(event_id, item_id, patch, &|event| {
                authorize_item(event, &actor, item_id, Action::EditItem)
            })
            .inspect_err(log_rejection)
    }

    #[instrument(
        name = "packing.service.delete_item",
        skip(self),
        fields(event_id = %event_id, item_id = %item_id)
    )]
    pub fn delete_item(&self, event_id: &EventId, item_id: &ItemId) -> Result<Item, DomainError> {
        let actor = self.identity.user_id();
        self.store
            .delete_item_checked(event_id, item_id, &|event| {
                authorize_item(event, &actor, item_id, Action::DeleteItem)
            })
            .inspect_err(log_rejection)
    }

    #[instrument(
        name = "packing.service.set_membership",
        skip(self),
        fields(event_id = %event_id, user_id = %user_id, role = %role)
    )]
    pub fn set_membership(
        &self,
        event_id: &EventId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Member, DomainError> {
        let actor = self.identity.user_id();
        self.store
            .set_membership_checked(&actor, event_id, user_id, role, &|event| {
                let current = query::member_role(event, user_id);
                let action = if current.is_some() {
                    Action::ChangeOtherRole
                } else {
                    Action::ManageMembers
                };
                policy::authorize(
                    &event.id,
                    &actor,
                    query::member_role(event, &actor),
                    action,
                    Target::Member {
                        user_id,
                        current,
                        requested: Some(role),
                    },
                )
            })
            .inspect_err(log_rejection)
    }

    #[instrument(
        name = "packing.service.remove_membership",
        skip(self),
        fields(event_id = %event_id, user_id = %user_id)
    )]
    pub fn remove_membership(
        &self,
        event_id: &EventId,
        user_id: &UserId,
    ) -> Result<(), DomainError> {
        let actor = self.identity.user_id();
        self.store
            .remove_membership_checked(&actor, event_id, user_id, &|event| {
                policy::authorize(
                    &event.id,
                    &actor,
                    query::member_role(event, &actor),
                    Action::ManageMembers,
                    Target::Member {
                        user_id,
                        current: query::member_role(event, user_id),
                        requested: None,
                    },
                )
            })
            .inspect_err(log_rejection)
    }
}

fn log_rejection(err: &DomainError) {
    warn!(kind = err.kind(), error = %err, "Operation rejected");
}

/// Item-level check; a missing item is reported as such rather than as a
/// permission problem.
fn authorize_item(
    event: &Event,
    actor: &UserId,
    item_id: &ItemId,
    action: Action,
) -> Result<(), DomainError> {
    let item = event
        .item(item_id)
        .ok_or_else(|| DomainError::item_not_found(event.id.clone(), item_id.clone()))?;
    policy::authorize(
        &event.id,
        actor,
        query::member_role(event, actor),
        action,
        Target::Item {
            assigned_to: item.assigned_to.as_ref(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{CategoryInput, ItemStatus};
    use crate::domain::store::StoreConfig;

    fn setup() -> (Service, EventId) {
        let store = Arc::new(EventStore::new(StoreConfig::default()));
        let identity = Arc::new(IdentityContext::new(UserProfile::new("1", "John Doe")));
        let service = Service::new(store, identity);
        for (id, name) in [("2", "Jane Smith"), ("3", "Mike Johnson"), ("4", "Viv")] {
            service.register_user(UserProfile::new(id, name)).unwrap();
        }
        let event = service
            .create_event(EventInput {
                title: "Team Hackathon".into(),
                description: "Annual hackathon event".into(),
                date: "2023-12-15".into(),
                location: "San Francisco, CA".into(),
                categories: Some(vec![CategoryInput::new("Tech").with_id("1")]),
            })
            .unwrap();
        service.set_membership(&event.id, &"2".into(), Role::Admin).unwrap();
        service.set_membership(&event.id, &"3".into(), Role::Member).unwrap();
        service.set_membership(&event.id, &"4".into(), Role::Viewer).unwrap();
        (service, event.id.clone())
    }

    fn act_as(service: &Service, id: &str) {
        let profile = service.store().user(&id.into()).unwrap();
        service.switch_user(profile).unwrap();
    }

    #[test]
    fn member_edits_own_item_only() {
        let (service, event_id) = setup();
        let mine = service
            .add_item(&event_id, ItemInput::new("Laptop", "1").assigned_to("3"))
            .unwrap();
        let theirs = service
            .add_item(&event_id, ItemInput::new("Monitor", "1").assigned_to("2"))
            .unwrap();

        act_as(&service, "3");
        let updated = service
            .update_item(&event_id, &mine.id, ItemPatch::status(ItemStatus::Packed))
            .unwrap();
        assert_eq!(updated.status, ItemStatus::Packed);

        let err = service
            .update_item(&event_id, &theirs.id, ItemPatch::status(ItemStatus::Packed))
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));

        let err = service
            .add_item(&event_id, ItemInput::new("Mouse", "1"))
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }

    #[test]
    fn viewer_cannot_mutate() {
        let (service, event_id) = setup();
        let item = service
            .add_item(&event_id, ItemInput::new("Laptop", "1").assigned_to("4"))
            .unwrap();
        act_as(&service, "4");

        assert!(service
            .update_item(&event_id, &item.id, ItemPatch::status(ItemStatus::Packed))
            .is_err());
        assert!(service.delete_item(&event_id, &item.id).is_err());
        assert!(service.delete_event(&event_id).is_err());
        assert_eq!(
            service.capabilities(&event_id).unwrap().role,
            Some(Role::Viewer)
        );
    }

    #[test]
    fn admin_cannot_touch_owner() {
        let (service, event_id) = setup();
        act_as(&service, "2");

        let err = service
            .set_membership(&event_id, &"1".into(), Role::Viewer)
            .unwrap_err();
        assert!(matches!(err, DomainError::OwnerProtected { .. }));
        let err = service
            .remove_membership(&event_id, &"1".into())
            .unwrap_err();
        assert!(matches!(err, DomainError::OwnerProtected { .. }));

        service
            .set_membership(&event_id, &"3".into(), Role::Admin)
            .unwrap();
    }

    #[test]
    fn missing_item_is_not_found_not_forbidden() {
        let (service, event_id) = setup();
        act_as(&service, "3");
        let err = service
            .delete_item(&event_id, &ItemId::from("nope"))
            .unwrap_err();
        assert!(matches!(err, DomainError::ItemNotFound { .. }));
    }

    #[test]
    fn non_member_reads_but_cannot_act() {
        let (service, event_id) = setup();
        service
            .switch_user(UserProfile::new("9", "Stranger"))
            .unwrap();

        assert!(service.get_event(&event_id).is_ok());
        assert_eq!(service.capabilities(&event_id).unwrap(), Capabilities::default());
        assert!(matches!(
            service.delete_event(&event_id).unwrap_err(),
            DomainError::PermissionDenied { .. }
        ));
    }
}
