//! Plumbing shared by the broker handshake, the Tahvel client and the CLI.
//!
//! - `tls_client`: reqwest client construction (rustls, platform verifier, cookie jar)
//! - `http`: the [`HttpTransport`](http::HttpTransport) seam and its reqwest implementation
//! - `session_cache`: on-disk cache of a finished login (cookies + bearer token)

pub mod http;
pub mod session_cache;
pub mod tls_client;

pub use http::{
    DEFAULT_USER_AGENT, HttpResponse, HttpTransport, ReqwestTransport, StoredCookie,
    TransportConfig, TransportError, form_body, query_param,
};
pub use session_cache::{CacheError, SessionCache, SessionCacheStore};
