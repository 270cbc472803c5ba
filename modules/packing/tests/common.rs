#![allow(dead_code)]

use std::sync::Arc;

use packing::client::PackingApi;
use packing::domain::identity::IdentityContext;
use packing::domain::service::Service;
use packing::domain::store::{EventStore, StoreConfig};
use packing::gateways::local::PackingLocalClient;
use packing::model::{CategoryInput, Event, EventInput, UserProfile};

pub fn john() -> UserProfile {
    UserProfile::new("1", "John Doe")
}

/// Service and client acting as John over an empty store.
pub fn setup() -> (Arc<Service>, PackingLocalClient) {
    let store = Arc::new(EventStore::new(StoreConfig::default()));
    let identity = Arc::new(IdentityContext::new(john()));
    let service = Arc::new(Service::new(store, identity));
    let client = PackingLocalClient::new(service.clone());
    (service, client)
}

pub fn beach_trip(client: &dyn PackingApi) -> Event {
    client
        .create_event(EventInput {
            title: "Beach Trip".into(),
            description: "Weekend getaway".into(),
            date: "2023-07-22".into(),
            location: "Malibu, CA".into(),
            categories: Some(vec![CategoryInput::new("Essentials").with_id("c1")]),
        })
        .unwrap()
}
