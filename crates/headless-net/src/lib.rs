//! Headless Networking
//!
//! Loads the text resources a page refers to (stylesheets, mostly):
//! - local paths read through smol's async filesystem
//! - `http(s)://` URLs fetched with reqwest, gzip/deflate bodies decoded
//! - one shared outcome per normalized identity, failures included
//! - policy hooks for remapping, skipping and observing loads

mod cache;
mod error;
mod fetch;
mod identity;
mod loader;
mod policy;

pub use cache::{ResourceCache, ResourceFuture};
pub use error::{FetchError, LoadError};
pub use fetch::{ACCEPTED_ENCODINGS, DEFAULT_USER_AGENT, HttpFetcher, ResourceFetcher, decode_body};
pub use identity::{is_remote, normalize, normalize_path};
pub use loader::ResourceLoader;
pub use policy::{DefaultPolicy, PolicyHooks, ResourcePolicy};
