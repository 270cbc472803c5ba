use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::contract::model::{UserId, UserProfile};

/// The user on whose behalf operations run.
///
/// Switching users is explicit; readers always see a whole profile.
#[derive(Debug)]
pub struct IdentityContext {
    current: ArcSwap<UserProfile>,
}

impl IdentityContext {
    pub fn new(user: UserProfile) -> Self {
        Self {
            current: ArcSwap::from_pointee(user),
        }
    }

    pub fn current_user(&self) -> Arc<UserProfile> {
        self.current.load_full()
    }

    pub fn user_id(&self) -> UserId {
        self.current.load().id.clone()
    }

    pub fn set_current_user(&self, user: UserProfile) {
        self.current.store(Arc::new(user));
    }
}
