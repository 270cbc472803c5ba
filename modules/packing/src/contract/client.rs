use crate::contract::{
    error::PackingError,
    model::{
        Capabilities, Event, EventId, EventInput, EventSummary, Item, ItemFilter, ItemGroup,
        ItemId, ItemInput, ItemPatch, Member, ProgressSummary, Role, UserId, UserProfile,
    },
};

/// Public API of the packing module, acting on behalf of the current user.
///
/// Mutations are authorized against the current user's role in the target
/// event and either apply completely or leave the event untouched.
pub trait PackingApi: Send + Sync {
    /// Who the calls are made as.
    fn current_user(&self) -> UserProfile;

    /// Add or refresh a user profile in the directory.
    fn register_user(&self, profile: UserProfile) -> Result<(), PackingError>;

    /// All events in store order.
    fn list_events(&self) -> Vec<Event>;

    fn get_event(&self, event_id: &EventId) -> Result<Event, PackingError>;

    /// Case-insensitive substring match on title or description.
    fn search_events(&self, query: &str) -> Vec<Event>;

    /// Dashboard cards for events matching `query`.
    fn event_summaries(&self, query: &str) -> Vec<EventSummary>;

    /// Create an event owned by the current user.
    fn create_event(&self, input: EventInput) -> Result<Event, PackingError>;

    fn delete_event(&self, event_id: &EventId) -> Result<(), PackingError>;

    fn add_item(&self, event_id: &EventId, input: ItemInput) -> Result<Item, PackingError>;

    fn update_item(
        &self,
        event_id: &EventId,
        item_id: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item, PackingError>;

    fn delete_item(&self, event_id: &EventId, item_id: &ItemId) -> Result<(), PackingError>;

    fn set_membership(
        &self,
        event_id: &EventId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Member, PackingError>;

    fn remove_membership(&self, event_id: &EventId, user_id: &UserId) -> Result<(), PackingError>;

    /// Whether `name` collides with an existing item (trimmed, case-insensitive),
    /// ignoring `exclude` when editing that item.
    fn is_duplicate_item(&self, event_id: &EventId, name: &str, exclude: Option<&ItemId>) -> bool;

    fn group_items_by_category(
        &self,
        event_id: &EventId,
        filter: &ItemFilter,
    ) -> Result<Vec<ItemGroup>, PackingError>;

    fn compute_progress(&self, event_id: &EventId) -> Result<ProgressSummary, PackingError>;

    /// UI flags for the current user in `event_id`.
    fn capabilities(&self, event_id: &EventId) -> Result<Capabilities, PackingError>;
}
