//! Cookie-bearing HTTP session carrier
//!
//! Both the broker handshake and the Tahvel client talk HTTP through the
//! [`HttpTransport`] trait. The production implementation, [`ReqwestTransport`],
//! keeps one cookie jar for its whole lifetime, follows redirects and reports
//! the URL it finally landed on, which is where the broker hands out tokens.

use crate::tls_client::{DEFAULT_MAX_REDIRECTS, TlsClientConfig, create_tls_client};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// User agent sent when none is configured. The broker serves its login
/// pages to browsers, so the client introduces itself as one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// URL of the last hop after redirects, when the transport can observe it.
    pub final_url: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            final_url: None,
            body: body.into(),
        }
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// The HTTP operations the login flow and the Tahvel client need.
///
/// Implementations must share cookies across all calls made through the same
/// value: the broker binds its CSRF token and login state to the session cookie.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    async fn get_with_bearer(&self, url: &str, token: &str)
    -> Result<HttpResponse, TransportError>;

    /// POST an already encoded `application/x-www-form-urlencoded` body.
    async fn post_form(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError>;
}

/// Encode key/value pairs as a form body.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Value of query parameter `name` in `url`, if present and non-empty.
///
/// Single-page apps put their routing state behind `#`, so when the real query
/// string lacks the parameter the query part of the fragment (`#/path?a=b`)
/// is searched as well.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let in_query = url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned());

    in_query
        .or_else(|| {
            let fragment = url.fragment()?;
            let (_, query) = fragment.split_once('?')?;
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|value| !value.is_empty())
}

/// A cookie as it is persisted between runs: the origin it was sent to and its
/// `name=value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub url: String,
    pub cookie: String,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl TransportConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// [`HttpTransport`] over a reqwest client with a persistent cookie jar.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| TransportError::Client(format!("invalid user agent: {}", e)))?,
        );

        let jar = Arc::new(Jar::default());
        let client = create_tls_client(
            TlsClientConfig::default()
                .with_headers(headers)
                .with_timeout(config.timeout)
                .with_max_redirects(config.max_redirects)
                .with_cookie_jar(jar.clone()),
        )
        .map_err(TransportError::Client)?;

        Ok(Self { client, jar })
    }

    /// Snapshot the cookies the jar would send to each of `urls`.
    pub fn export_cookies(&self, urls: &[&str]) -> Vec<StoredCookie> {
        let mut stored = Vec::new();
        for raw in urls {
            let Ok(url) = Url::parse(raw) else {
                tracing::warn!(url = %raw, "Skipping cookie export for unparseable URL");
                continue;
            };
            let Some(header) = self.jar.cookies(&url) else {
                continue;
            };
            let Ok(header) = header.to_str() else {
                continue;
            };
            stored.extend(
                header
                    .split(';')
                    .map(str::trim)
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| StoredCookie {
                        url: raw.to_string(),
                        cookie: pair.to_string(),
                    }),
            );
        }
        stored
    }

    /// Put previously exported cookies back into the jar.
    pub fn import_cookies(&self, cookies: &[StoredCookie]) -> Result<(), TransportError> {
        for stored in cookies {
            let url = parse_url(&stored.url)?;
            self.jar.add_cookie_str(&stored.cookie, &url);
        }
        Ok(())
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        tracing::debug!(%url, status, %final_url, "HTTP response received");

        Ok(HttpResponse {
            status,
            final_url: Some(final_url),
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(parse_url(url)?)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;
        Self::read(url, response).await
    }

    async fn get_with_bearer(
        &self,
        url: &str,
        token: &str,
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(parse_url(url)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;
        Self::read(url, response).await
    }

    async fn post_form(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(parse_url(url)?)
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;
        Self::read(url, response).await
    }
}

fn parse_url(url: &str) -> Result<Url, TransportError> {
    Url::parse(url).map_err(|e| TransportError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
