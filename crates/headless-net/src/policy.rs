//! Resource policy hooks
//!
//! The owner of a loader decides how identities are remapped, which ones
//! are skipped, who observes loads and which extra request headers remote
//! fetches carry.

use std::fmt;

/// Policy consulted by [`crate::ResourceLoader`] for every request
pub trait ResourcePolicy {
    /// Rewrite a normalized identity before anything else happens
    fn map(&self, identity: &str) -> String {
        identity.to_string()
    }

    /// Skip the resource; the load succeeds with empty text
    fn ignore(&self, _identity: &str) -> bool {
        false
    }

    /// Observe a load that is about to be served (cached or not)
    fn before_load(&self, _identity: &str) {}

    /// Extra headers for remote requests; they override the fetcher's defaults
    fn request_headers(&self, _identity: &str) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Policy with every hook left at its default
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl ResourcePolicy for DefaultPolicy {}

type MapFn = Box<dyn Fn(&str) -> String>;
type IgnoreFn = Box<dyn Fn(&str) -> bool>;
type ObserveFn = Box<dyn Fn(&str)>;
type HeadersFn = Box<dyn Fn(&str) -> Vec<(String, String)>>;

/// Closure-backed [`ResourcePolicy`]
///
/// ```
/// use headless_net::PolicyHooks;
///
/// let hooks = PolicyHooks::new()
///     .with_map(|id| id.replace("http://old.example", "http://new.example"))
///     .with_ignore(|id| id.ends_with(".woff2"));
/// ```
#[derive(Default)]
pub struct PolicyHooks {
    map: Option<MapFn>,
    ignore: Option<IgnoreFn>,
    before_load: Option<ObserveFn>,
    request_headers: Option<HeadersFn>,
}

impl PolicyHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(mut self, map: impl Fn(&str) -> String + 'static) -> Self {
        self.map = Some(Box::new(map));
        self
    }

    pub fn with_ignore(mut self, ignore: impl Fn(&str) -> bool + 'static) -> Self {
        self.ignore = Some(Box::new(ignore));
        self
    }

    pub fn with_before_load(mut self, before_load: impl Fn(&str) + 'static) -> Self {
        self.before_load = Some(Box::new(before_load));
        self
    }

    pub fn with_request_headers(
        mut self,
        request_headers: impl Fn(&str) -> Vec<(String, String)> + 'static,
    ) -> Self {
        self.request_headers = Some(Box::new(request_headers));
        self
    }
}

impl ResourcePolicy for PolicyHooks {
    fn map(&self, identity: &str) -> String {
        match &self.map {
            Some(map) => map(identity),
            None => identity.to_string(),
        }
    }

    fn ignore(&self, identity: &str) -> bool {
        self.ignore.as_ref().is_some_and(|ignore| ignore(identity))
    }

    fn before_load(&self, identity: &str) {
        if let Some(before_load) = &self.before_load {
            before_load(identity);
        }
    }

    fn request_headers(&self, identity: &str) -> Vec<(String, String)> {
        self.request_headers
            .as_ref()
            .map_or_else(Vec::new, |headers| headers(identity))
    }
}

impl fmt::Debug for PolicyHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyHooks")
            .field("map", &self.map.is_some())
            .field("ignore", &self.ignore.is_some())
            .field("before_load", &self.before_load.is_some())
            .field("request_headers", &self.request_headers.is_some())
            .finish()
    }
}
