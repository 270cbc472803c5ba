use std::sync::Arc;

use crate::contract::{
    client::PackingApi,
    error::PackingError,
    model::{
        Capabilities, Event, EventId, EventInput, EventSummary, Item, ItemFilter, ItemGroup,
        ItemId, ItemInput, ItemPatch, Member, ProgressSummary, Role, UserId, UserProfile,
    },
};
use crate::domain::service::Service;

/// Local implementation of the PackingApi trait that delegates to the domain service
#[derive(Debug, Clone)]
pub struct PackingLocalClient {
    service: Arc<Service>,
}

impl PackingLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

impl PackingApi for PackingLocalClient {
    fn current_user(&self) -> UserProfile {
        UserProfile::clone(&self.service.current_user())
    }

    fn register_user(&self, profile: UserProfile) -> Result<(), PackingError> {
        Ok(self.service.register_user(profile)?)
    }

    fn list_events(&self) -> Vec<Event> {
        owned(self.service.list_events())
    }

    fn get_event(&self, event_id: &EventId) -> Result<Event, PackingError> {
        let event = self.service.get_event(event_id)?;
        Ok(Event::clone(&event))
    }

    fn search_events(&self, query: &str) -> Vec<Event> {
        owned(self.service.search_events(query))
    }

    fn event_summaries(&self, query: &str) -> Vec<EventSummary> {
        self.service.event_summaries(query)
    }

    fn create_event(&self, input: EventInput) -> Result<Event, PackingError> {
        let event = self.service.create_event(input)?;
        Ok(Event::clone(&event))
    }

    fn delete_event(&self, event_id: &EventId) -> Result<(), PackingError> {
        Ok(self.service.delete_event(event_id)?)
    }

    fn add_item(&self, event_id: &EventId, input: ItemInput) -> Result<Item, PackingError> {
        Ok(self.service.add_item(event_id, input)?)
    }

    fn update_item(
        &self,
        event_id: &EventId,
        item_id: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item, PackingError> {
        Ok(self.service.update_item(event_id, item_id, patch)?)
    }

    fn delete_item(&self, event_id: &EventId, item_id: &ItemId) -> Result<(), PackingError> {
        self.service.delete_item(event_id, item_id)?;
        Ok(())
    }

    fn set_membership(
        &self,
        event_id: &EventId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Member, PackingError> {
        Ok(self.service.set_membership(event_id, user_id, role)?)
    }

    fn remove_membership(&self, event_id: &EventId, user_id: &UserId) -> Result<(), PackingError> {
        Ok(self.service.remove_membership(event_id, user_id)?)
    }

    fn is_duplicate_item(&self, event_id: &EventId, name: &str, exclude: Option<&ItemId>) -> bool {
        self.service.is_duplicate_item(event_id, name, exclude)
    }

    fn group_items_by_category(
        &self,
        event_id: &EventId,
        filter: &ItemFilter,
    ) -> Result<Vec<ItemGroup>, PackingError> {
        let groups = self
            .service
            .group_items_by_category(event_id, filter.clone())?;
        Ok(groups.to_owned_groups())
    }

    fn compute_progress(&self, event_id: &EventId) -> Result<ProgressSummary, PackingError> {
        Ok(self.service.compute_progress(event_id)?)
    }

    fn capabilities(&self, event_id: &EventId) -> Result<Capabilities, PackingError> {
        Ok(self.service.capabilities(event_id)?)
    }
}

fn owned(events: Vec<Arc<Event>>) -> Vec<Event> {
    events.into_iter().map(Arc::unwrap_or_clone).collect()
}
