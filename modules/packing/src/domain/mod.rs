pub mod error;
pub mod events;
pub mod identity;
pub mod policy;
pub mod ports;
pub mod query;
pub mod rules;
pub mod service;
pub mod store;
