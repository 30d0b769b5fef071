//! Headless Browser
//!
//! A server-side browser environment: parse a page with html5ever, expose
//! it as a DOM, fetch its external stylesheets and signal when it has
//! loaded.
//!
//! ```no_run
//! use headless_browser::{BrowserConfig, browser};
//!
//! let html = r#"<link rel="stylesheet" href="site.css"><p>Hello</p>"#;
//! let config = BrowserConfig::new().with_base_uri("/srv/site/index.html");
//! let window = smol::block_on(browser(html, config))?;
//! println!("{:?}", window.document().query_selector("p")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod resolve;
mod window;

pub use config::BrowserConfig;
pub use resolve::resolve_href;
pub use window::{LoadState, Window};

pub use headless_dom as dom;
pub use headless_html::HtmlError;
pub use headless_net as net;
pub use headless_net::LoadError;

/// Errors from the top-level browser operations
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// The window went away before reporting an outcome
    #[error("window closed before it finished loading")]
    Closed,
}

/// Parse `html` and return its window without waiting for anything.
///
/// Loading starts when the caller assigns an onload handler.
pub fn sync(html: &str, config: BrowserConfig) -> Result<Window, HtmlError> {
    let document = headless_html::parse_with_base(html, &config.base_uri)?;
    Ok(Window::new(document, &config))
}

/// Parse `html`, load its stylesheets and resolve with the loaded window
pub async fn browser(html: &str, config: BrowserConfig) -> Result<Window, BrowserError> {
    let window = sync(html, config)?;

    let (tx, rx) = smol::channel::bounded(1);
    let on_error = tx.clone();
    window.set_onload(move || {
        let _ = tx.try_send(Ok(()));
    });
    window.set_onerror(move |err| {
        let _ = on_error.try_send(Err(err.clone()));
    });

    window.settle().await?;
    // A successful settle has already run onload.
    match rx.try_recv() {
        Ok(Ok(())) => Ok(window),
        Ok(Err(err)) => Err(BrowserError::Load(err)),
        Err(_) => Err(BrowserError::Closed),
    }
}

/// Fetch the page at `url` (local path or `http(s)://` URL) and load it.
///
/// The page is fetched through the same policy, cache and fetcher as its
/// stylesheets, and `url` becomes the document's base URI.
pub async fn open(url: &str, config: BrowserConfig) -> Result<Window, BrowserError> {
    let config = config.with_base_uri(url);
    let html = config.loader().get(url).await?;
    tracing::debug!(url, bytes = html.len(), "fetched page");
    browser(&html, config).await
}
