mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use packing::domain::error::DomainError;
use packing::domain::store::EventStore;
use packing::model::{CategoryInput, EventInput, ItemInput, ItemPatch, ItemStatus};

use common::john;

fn store_with_event() -> (Arc<EventStore>, packing::model::EventId) {
    let store = Arc::new(EventStore::default());
    let event = store
        .create_event(
            &john(),
            EventInput {
                title: "Team Hackathon".into(),
                description: "Annual hackathon event".into(),
                date: "2023-12-15".into(),
                location: "San Francisco, CA".into(),
                categories: Some(vec![CategoryInput::new("Tech").with_id("1")]),
            },
        )
        .unwrap();
    (store, event.id.clone())
}

#[test]
fn concurrent_duplicate_adds_admit_exactly_one() {
    for _ in 0..50 {
        let (store, event_id) = store_with_event();
        let barrier = Barrier::new(2);

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = ["Laptop", " laptop"]
                .into_iter()
                .map(|name| {
                    let (store, event_id, barrier) = (&store, &event_id, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        store.add_item(event_id, ItemInput::new(name, "1"))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::DuplicateItem { .. }))));
        assert_eq!(store.get_event(&event_id).unwrap().items.len(), 1);
    }
}

#[test]
fn readers_see_whole_states_during_writes() {
    let (store, event_id) = store_with_event();
    let names: Vec<String> = (0..20).map(|i| format!("item-{i}")).collect();
    let ids: Vec<_> = names
        .iter()
        .map(|n| store.add_item(&event_id, ItemInput::new(n.as_str(), "1")).unwrap().id)
        .collect();

    thread::scope(|s| {
        s.spawn(|| {
            for id in &ids {
                store
                    .update_item(&event_id, id, ItemPatch::status(ItemStatus::Delivered))
                    .unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..200 {
                let progress = store.compute_progress(&event_id).unwrap();
                assert_eq!(progress.total_items, 20);
                assert!(progress.delivered_count <= progress.packed_count);
            }
        });
    });

    let progress = store.compute_progress(&event_id).unwrap();
    assert_eq!(progress.delivered_percentage, 100);
}

#[test]
fn independent_events_progress_in_parallel() {
    let store = Arc::new(EventStore::default());
    let events: Vec<_> = (0..4)
        .map(|i| {
            store
                .create_event(
                    &john(),
                    EventInput {
                        title: format!("Event {i}"),
                        description: "d".into(),
                        date: "2024-01-01".into(),
                        location: "l".into(),
                        categories: Some(vec![CategoryInput::new("Gear").with_id("g")]),
                    },
                )
                .unwrap()
                .id
                .clone()
        })
        .collect();

    thread::scope(|s| {
        for event_id in &events {
            let store = &store;
            s.spawn(move || {
                for n in 0..25 {
                    store
                        .add_item(event_id, ItemInput::new(format!("thing {n}"), "g"))
                        .unwrap();
                }
            });
        }
    });

    for event_id in &events {
        assert_eq!(store.get_event(event_id).unwrap().items.len(), 25);
    }
}
