//! State module
//!
//! The shared key-value store used to coordinate settings across UI tabs.

pub mod store;

pub use store::{SharedStore, StateMap, StoreError, SubscriptionId};
