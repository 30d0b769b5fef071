//! Shared in-flight request cache
//!
//! Every normalized identity maps to one shared future. The first request
//! starts the fetch; later requests (including ones made after it settles)
//! await the same outcome. Failures are cached too.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures_util::future::{LocalBoxFuture, Shared};

use crate::LoadError;

/// Outcome of a load, shareable between any number of requesters
pub type ResourceFuture = Shared<LocalBoxFuture<'static, Result<String, LoadError>>>;

/// Identity-keyed request cache; clones share the same entries
#[derive(Clone, Default)]
pub struct ResourceCache {
    entries: Rc<RefCell<HashMap<String, ResourceFuture>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached future for `identity`, or start one with `start`.
    /// The boolean is true when the entry already existed.
    pub fn get_or_start(
        &self,
        identity: &str,
        start: impl FnOnce() -> ResourceFuture,
    ) -> (ResourceFuture, bool) {
        if let Some(existing) = self.entries.borrow().get(identity) {
            return (existing.clone(), true);
        }

        // `start` runs without the borrow held so it may consult the cache.
        let future = start();
        self.entries
            .borrow_mut()
            .insert(identity.to_string(), future.clone());
        (future, false)
    }

    pub fn get(&self, identity: &str) -> Option<ResourceFuture> {
        self.entries.borrow().get(identity).cloned()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.borrow().contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget every entry; in-flight futures keep running for their holders
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        f.debug_struct("ResourceCache").field("entries", &keys).finish()
    }
}
