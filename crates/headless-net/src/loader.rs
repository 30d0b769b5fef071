//! Resource Loader
//!
//! Loads text resources by identity. Each request is normalized, passed
//! through the policy, then served from the shared cache or started there.

use std::fmt;
use std::rc::Rc;

use futures_util::FutureExt;

use crate::cache::{ResourceCache, ResourceFuture};
use crate::fetch::{HttpFetcher, ResourceFetcher};
use crate::identity::{is_remote, normalize};
use crate::policy::{DefaultPolicy, ResourcePolicy};
use crate::LoadError;

/// Deduplicating loader for local files and remote text resources
#[derive(Clone)]
pub struct ResourceLoader {
    policy: Rc<dyn ResourcePolicy>,
    cache: ResourceCache,
    fetcher: Rc<dyn ResourceFetcher>,
}

impl ResourceLoader {
    pub fn new(
        policy: Rc<dyn ResourcePolicy>,
        cache: ResourceCache,
        fetcher: Rc<dyn ResourceFetcher>,
    ) -> Self {
        Self {
            policy,
            cache,
            fetcher,
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn policy(&self) -> &dyn ResourcePolicy {
        self.policy.as_ref()
    }

    /// Load `identity` as text.
    ///
    /// Order of operations: normalize, `map`, `ignore` (ready empty text,
    /// nothing cached), `before_load`, then the cache lookup. A miss starts
    /// the fetch immediately and records it before returning, so requests
    /// made back to back share one fetch even before anyone polls.
    pub fn get(&self, identity: &str) -> ResourceFuture {
        let identity = self.policy.map(&normalize(identity));

        if self.policy.ignore(&identity) {
            tracing::debug!(identity = %identity, "resource ignored by policy");
            return async { Ok(String::new()) }.boxed_local().shared();
        }

        self.policy.before_load(&identity);

        let (future, cached) = self.cache.get_or_start(&identity, || self.start(&identity));
        tracing::debug!(identity = %identity, cached, "resource requested");
        future
    }

    fn start(&self, identity: &str) -> ResourceFuture {
        let headers = if is_remote(identity) {
            self.policy.request_headers(identity)
        } else {
            Vec::new()
        };

        let fetch = self.fetcher.fetch(identity, headers);
        let identity = identity.to_string();
        async move {
            fetch.await.map_err(|cause| {
                tracing::warn!(identity = %identity, error = %cause, "resource load failed");
                LoadError::new(identity, cause)
            })
        }
        .boxed_local()
        .shared()
    }
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new(
            Rc::new(DefaultPolicy),
            ResourceCache::default(),
            Rc::new(HttpFetcher::default()),
        )
    }
}

impl fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
