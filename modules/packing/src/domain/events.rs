use chrono::{DateTime, Utc};

use crate::contract::model::{EventId, ItemId, Role, UserId};

/// Transport-agnostic domain event, published after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    EventCreated {
        id: EventId,
        at: DateTime<Utc>,
    },
    EventDeleted {
        id: EventId,
        at: DateTime<Utc>,
    },
    ItemAdded {
        event_id: EventId,
        item_id: ItemId,
        at: DateTime<Utc>,
    },
    ItemUpdated {
        event_id: EventId,
        item_id: ItemId,
        at: DateTime<Utc>,
    },
    ItemDeleted {
        event_id: EventId,
        item_id: ItemId,
        at: DateTime<Utc>,
    },
    MembershipSet {
        event_id: EventId,
        user_id: UserId,
        role: Role,
        at: DateTime<Utc>,
    },
    MembershipRemoved {
        event_id: EventId,
        user_id: UserId,
        at: DateTime<Utc>,
    },
    StoreReset {
        events: usize,
        at: DateTime<Utc>,
    },
}
