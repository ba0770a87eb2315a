use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::{Client, redirect};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use std::time::Duration;

/// Redirect hops followed before a request fails.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

#[derive(Clone, Debug)]
pub struct TlsClientConfig {
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
    pub max_redirects: usize,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TlsClientConfig {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            cookie_jar: None,
        }
    }
}

impl TlsClientConfig {
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Attach a cookie jar; every request made by the client reads and writes it.
    pub fn with_cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }
}

pub fn create_tls_client(config: TlsClientConfig) -> Result<Client, String> {
    // needed to use OS-provided CA certificates with Rustls
    let arc_crypto_provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls_config = rustls::ClientConfig::builder_with_provider(arc_crypto_provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| format!("Failed to build client TLS config: {}", e))?
        .with_platform_verifier()
        .with_no_client_auth();

    let mut builder = Client::builder()
        .use_preconfigured_tls(tls_config)
        .default_headers(config.headers)
        .redirect(redirect::Policy::limited(config.max_redirects));

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(jar) = config.cookie_jar {
        builder = builder.cookie_provider(jar);
    }

    builder
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))
}
