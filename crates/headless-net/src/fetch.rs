//! Fetching
//!
//! [`ResourceFetcher`] is the transport seam of the loader. [`HttpFetcher`]
//! reads local files through smol and performs remote GETs with reqwest's
//! blocking client on smol's blocking pool, so the calling executor never
//! blocks.

use std::io::Read;
use std::time::Duration;

use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use reqwest::StatusCode;
use reqwest::header::{
    ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
    USER_AGENT,
};

use crate::FetchError;
use crate::identity::is_remote;

/// Default `user-agent` for remote requests
pub const DEFAULT_USER_AGENT: &str = concat!("headless-browser/", env!("CARGO_PKG_VERSION"));

/// Encodings advertised in `accept-encoding`
pub const ACCEPTED_ENCODINGS: &str = "gzip, deflate";

/// Fetch a normalized identity as text
pub trait ResourceFetcher {
    /// `headers` are extra request headers; local fetches ignore them
    fn fetch(
        &self,
        identity: &str,
        headers: Vec<(String, String)>,
    ) -> LocalBoxFuture<'static, Result<String, FetchError>>;
}

/// Default fetcher for local paths and `http(s)://` URLs
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    user_agent: String,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a whole-request timeout; remote requests never time out otherwise
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn request_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(|_| FetchError::InvalidHeader {
                name: USER_AGENT.to_string(),
            })?,
        );
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPTED_ENCODINGS));

        for (name, value) in extra {
            let invalid = || FetchError::InvalidHeader { name: name.clone() };
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(
        &self,
        identity: &str,
        headers: Vec<(String, String)>,
    ) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        let identity = identity.to_string();

        if !is_remote(&identity) {
            return async move {
                let bytes = smol::fs::read(&identity).await?;
                Ok(into_text(bytes))
            }
            .boxed_local();
        }

        let headers = self.request_headers(&headers);
        let timeout = self.timeout;
        async move {
            let headers = headers?;
            smol::unblock(move || fetch_remote(&identity, headers, timeout)).await
        }
        .boxed_local()
    }
}

fn fetch_remote(
    url: &str,
    headers: HeaderMap,
    timeout: Option<Duration>,
) -> Result<String, FetchError> {
    let url = url::Url::parse(url)?;
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;

    let response = client.get(url.clone()).headers(headers).send()?;
    let status = response.status();
    tracing::info!(%url, status = status.as_u16(), "remote resource response");

    if !status.is_success() {
        return Err(status_error(status));
    }

    let content_type = header_str(response.headers(), &CONTENT_TYPE);
    if !content_type
        .as_deref()
        .is_some_and(|t| t.trim_start().to_ascii_lowercase().starts_with("text/"))
    {
        return Err(FetchError::ContentType { content_type });
    }

    let encoding = header_str(response.headers(), &CONTENT_ENCODING);
    let body = response.bytes()?.to_vec();
    let body = decode_body(encoding.as_deref(), body)?;
    Ok(into_text(body))
}

fn status_error(status: StatusCode) -> FetchError {
    FetchError::Status {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
    }
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

/// Undo a `content-encoding`; unknown or absent encodings pass through
pub fn decode_body(encoding: Option<&str>, body: Vec<u8>) -> Result<Vec<u8>, FetchError> {
    let encoding = encoding.map(str::to_ascii_lowercase);
    match encoding.as_deref() {
        Some("gzip" | "x-gzip") => {
            tracing::debug!(bytes = body.len(), "decoding gzip body");
            read_all(MultiGzDecoder::new(body.as_slice())).map_err(|source| FetchError::Decode {
                encoding: "gzip",
                source,
            })
        }
        Some("deflate") => {
            tracing::debug!(bytes = body.len(), "decoding deflate body");
            // Servers disagree on whether deflate means zlib-wrapped or raw.
            read_all(ZlibDecoder::new(body.as_slice()))
                .or_else(|_| read_all(DeflateDecoder::new(body.as_slice())))
                .map_err(|source| FetchError::Decode {
                    encoding: "deflate",
                    source,
                })
        }
        _ => Ok(body),
    }
}

fn read_all(mut reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

/// Bytes to text; invalid UTF-8 sequences become U+FFFD
fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
