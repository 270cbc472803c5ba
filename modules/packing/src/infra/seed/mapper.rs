use crate::contract::model::{Category, Event, Item, ItemStatus, Member, Role, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::rules::{self, DEFAULT_CATEGORY_COLOR};
use crate::domain::store::Snapshot;
use crate::infra::seed::dto::{CategoryDto, EventDto, ItemDto, MemberDto, SnapshotDto, UserDto};

/// Convert a seed DTO into a store snapshot. Literals are parsed leniently;
/// cross-entity invariants are checked later by the store.
pub fn dto_to_snapshot(dto: SnapshotDto) -> Result<Snapshot, DomainError> {
    Ok(Snapshot {
        users: dto.users.into_iter().map(dto_to_user).collect(),
        events: dto
            .events
            .into_iter()
            .map(dto_to_event)
            .collect::<Result<_, _>>()?,
    })
}

pub fn snapshot_to_dto(snapshot: &Snapshot) -> SnapshotDto {
    SnapshotDto {
        users: snapshot.users.iter().map(UserDto::from).collect(),
        events: snapshot.events.iter().map(event_to_dto).collect(),
    }
}

pub fn event_to_dto(event: &Event) -> EventDto {
    EventDto {
        id: event.id.to_string(),
        title: event.title.clone(),
        description: event.description.clone(),
        date: event.date.format("%Y-%m-%d").to_string(),
        location: event.location.clone(),
        created_by: event.created_by.to_string(),
        categories: event.categories.iter().map(CategoryDto::from).collect(),
        items: event.items.iter().map(ItemDto::from).collect(),
        members: event.members.iter().map(MemberDto::from).collect(),
    }
}

fn dto_to_user(dto: UserDto) -> UserProfile {
    UserProfile::new(dto.id, dto.name).with_avatar(dto.avatar)
}

fn dto_to_event(dto: EventDto) -> Result<Event, DomainError> {
    let date = rules::parse_event_date(&dto.date)?;
    let items = dto
        .items
        .into_iter()
        .map(dto_to_item)
        .collect::<Result<_, _>>()?;
    let members = dto
        .members
        .into_iter()
        .map(dto_to_member)
        .collect::<Result<_, _>>()?;

    Ok(Event {
        id: dto.id.into(),
        title: dto.title,
        description: dto.description,
        date,
        location: dto.location,
        created_by: dto.created_by.into(),
        categories: dto.categories.into_iter().map(dto_to_category).collect(),
        items,
        members,
    })
}

fn dto_to_category(dto: CategoryDto) -> Category {
    Category {
        id: dto.id.into(),
        name: dto.name,
        color: dto
            .color
            .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
    }
}

fn dto_to_item(dto: ItemDto) -> Result<Item, DomainError> {
    let status = dto
        .status
        .parse::<ItemStatus>()
        .map_err(|e| DomainError::validation("status", e.to_string()))?;
    Ok(Item {
        id: dto.id.into(),
        name: dto.name,
        category_id: dto.category_id.into(),
        assigned_to: dto.assigned_to.map(Into::into),
        status,
        notes: rules::optional_text(dto.notes.as_deref()),
        is_required: dto.is_required,
        quantity: dto.quantity,
    })
}

fn dto_to_member(dto: MemberDto) -> Result<Member, DomainError> {
    let role = dto
        .role
        .parse::<Role>()
        .map_err(|e| DomainError::validation("role", e.to_string()))?;
    Ok(Member {
        user_id: dto.id.into(),
        name: dto.name,
        avatar: dto.avatar,
        role,
    })
}
