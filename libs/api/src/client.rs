//! TahvelClient implementation

use std::sync::Arc;

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tunniplaan_shared::{HttpResponse, HttpTransport, query_param};

use crate::TahvelConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{Timetable, User, UserAttribute};

const VIEW_TOKEN_PARAM: &str = "viewAuth";

/// Credential for the timetable endpoints, taken from a personal timetable link.
pub struct ViewToken(SecretString);

impl ViewToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ViewToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ViewToken([REDACTED])")
    }
}

/// Client for the Tahvel backend
///
/// Shares its transport with the login so the session cookies set during the
/// TARA redirect chain stay attached.
pub struct TahvelClient {
    transport: Arc<dyn HttpTransport>,
    bearer_token: SecretString,
    config: TahvelConfig,
}

impl TahvelClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        bearer_token: impl Into<String>,
        config: TahvelConfig,
    ) -> Self {
        Self {
            transport,
            bearer_token: SecretString::from(bearer_token.into()),
            config,
        }
    }

    /// Get the logged-in user's profile
    pub async fn get_user(&self) -> ApiResult<User> {
        let url = self.config.url(&self.config.user_path);
        let response = self
            .transport
            .get_with_bearer(&url, self.bearer_token.expose_secret())
            .await?;
        decode(&url, response)
    }

    /// Resolve a personal timetable link to its view token.
    ///
    /// A link that already carries `viewAuth` is used as is; otherwise it is
    /// followed and the token is read from where the redirects end.
    pub async fn get_view_token(&self, link: &str) -> ApiResult<ViewToken> {
        if let Some(token) = query_param(link, VIEW_TOKEN_PARAM) {
            return Ok(ViewToken::new(token));
        }

        let response = self.transport.get(link).await?;
        if !response.is_success() {
            return Err(status_error(link, response));
        }

        response
            .final_url
            .as_deref()
            .and_then(|url| query_param(url, VIEW_TOKEN_PARAM))
            .map(ViewToken::new)
            .ok_or(ApiError::MissingViewToken)
    }

    /// Get the attributes (school, role, group) behind a view token
    pub async fn get_user_attributes(&self, view: &ViewToken) -> ApiResult<Vec<UserAttribute>> {
        let url = format!(
            "{}?{}={}",
            self.config.url(&self.config.user_attributes_path),
            VIEW_TOKEN_PARAM,
            urlencoding::encode(view.expose())
        );
        let response = self.transport.get(&url).await?;
        decode(&url, response)
    }

    /// Get timetable events between `from` and `thru`, both inclusive
    pub async fn get_timetable(
        &self,
        view: &ViewToken,
        from: NaiveDate,
        thru: NaiveDate,
    ) -> ApiResult<Timetable> {
        let url = format!(
            "{}?{}={}&from={}&thru={}",
            self.config.url(&self.config.timetable_path),
            VIEW_TOKEN_PARAM,
            urlencoding::encode(view.expose()),
            urlencoding::encode(&day_start(from)),
            urlencoding::encode(&day_start(thru)),
        );
        let response = self.transport.get(&url).await?;
        let timetable: Timetable = decode(&url, response)?;
        tracing::debug!(
            events = timetable.timetable_events.len(),
            %from,
            %thru,
            "Timetable fetched"
        );
        Ok(timetable)
    }
}

fn day_start(day: NaiveDate) -> String {
    format!("{}T00:00:00Z", day.format("%Y-%m-%d"))
}

/// Decode a successful JSON response, or turn the status into an error.
fn decode<T: DeserializeOwned>(url: &str, response: HttpResponse) -> ApiResult<T> {
    if !response.is_success() {
        return Err(status_error(url, response));
    }
    serde_json::from_str(&response.body).map_err(|source| ApiError::Decode {
        url: strip_query(url),
        source,
    })
}

fn status_error(url: &str, response: HttpResponse) -> ApiError {
    tracing::warn!(url = %strip_query(url), status = response.status, "Tahvel request failed");
    ApiError::Status {
        status: response.status,
        url: strip_query(url),
        body: response.body,
    }
}

/// Tokens travel in query strings; keep them out of errors and logs.
fn strip_query(url: &str) -> String {
    url.split(['?', '#']).next().unwrap_or(url).to_string()
}
