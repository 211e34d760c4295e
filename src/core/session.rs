//! Session-scoped cart persistence.
//!
//! The storefront does not own sessions; it only needs a keyed read/write store for carts.
//! [`MemorySessionStore`] backs single-process deployments and tests.

use crate::core::cart::Cart;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Keyed cart storage supplied by the session collaborator.
pub trait SessionStore: Send + Sync {
    /// Returns the cart for `session_id`, empty if none was saved.
    fn load(&self, session_id: &str) -> Cart;
    /// Replaces the cart for `session_id`.
    fn save(&self, session_id: &str, cart: Cart);
    /// Drops the cart for `session_id`.
    fn clear(&self, session_id: &str);
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    carts: RwLock<HashMap<String, Cart>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: &str) -> Cart {
        self.carts.read().get(session_id).cloned().unwrap_or_default()
    }

    fn save(&self, session_id: &str, cart: Cart) {
        self.carts.write().insert(session_id.to_string(), cart);
    }

    fn clear(&self, session_id: &str) {
        self.carts.write().remove(session_id);
    }
}
