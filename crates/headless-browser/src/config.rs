//! Browser configuration

use std::fmt;
use std::rc::Rc;

use headless_net::{
    DefaultPolicy, HttpFetcher, ResourceCache, ResourceFetcher, ResourceLoader, ResourcePolicy,
};

/// Options for one page load
#[derive(Clone)]
pub struct BrowserConfig {
    /// Address of the page; stylesheet hrefs resolve against it
    pub base_uri: String,
    /// Fetch external stylesheets before firing onload
    pub load_css_file: bool,
    /// Remap/ignore/observe hooks and extra request headers
    pub policy: Rc<dyn ResourcePolicy>,
    /// Request cache; clone one into several configs to share it
    pub cache: ResourceCache,
    pub fetcher: Rc<dyn ResourceFetcher>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            load_css_file: true,
            policy: Rc::new(DefaultPolicy),
            cache: ResourceCache::default(),
            fetcher: Rc::new(HttpFetcher::default()),
        }
    }
}

impl BrowserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    pub fn with_load_css_file(mut self, load_css_file: bool) -> Self {
        self.load_css_file = load_css_file;
        self
    }

    pub fn with_policy(mut self, policy: impl ResourcePolicy + 'static) -> Self {
        self.policy = Rc::new(policy);
        self
    }

    pub fn with_cache(mut self, cache: ResourceCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl ResourceFetcher + 'static) -> Self {
        self.fetcher = Rc::new(fetcher);
        self
    }

    /// Loader sharing this config's policy, cache and fetcher
    pub fn loader(&self) -> ResourceLoader {
        ResourceLoader::new(self.policy.clone(), self.cache.clone(), self.fetcher.clone())
    }
}

impl fmt::Debug for BrowserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserConfig")
            .field("base_uri", &self.base_uri)
            .field("load_css_file", &self.load_css_file)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
