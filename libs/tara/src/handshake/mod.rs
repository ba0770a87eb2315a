//! The Smart-ID handshake with the TARA broker
//!
//! [`Tara`] owns the broker [`Session`] for exactly one login attempt. Any
//! failure, and any finished wait, drops the session: a stale CSRF token is
//! never carried into the next attempt, which must start again from
//! [`Tara::login_via_smart_id`].

use std::sync::Arc;

use tunniplaan_shared::{HttpTransport, form_body, query_param};

use crate::config::TaraConfig;
use crate::error::{AcceptFailure, BoxError, TIMEOUT_STATUS, TaraError, TaraResult};
use crate::extract::{MarkerScraper, TokenScraper};
use crate::id_code::IdCode;
use crate::poll::{PollMachine, PollResult, PollStep};
use crate::session::{AuthToken, LoginResult, Session};


/// Emit a tracing event unless the handshake was configured quiet.
macro_rules! unless_quiet {
    ($tara:expr, $level:ident, $($arg:tt)+) => {
        if !$tara.config.quiet {
            tracing::$level!($($arg)+);
        }
    };
}

const TOKEN_PARAM: &str = "token";

pub struct Tara {
    config: TaraConfig,
    transport: Arc<dyn HttpTransport>,
    scraper: Arc<dyn TokenScraper>,
    session: Option<Session>,
}

impl Tara {
    /// The transport must not be shared with a concurrent login: the broker
    /// keeps its state in the transport's cookies.
    pub fn new(config: TaraConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            scraper: Arc::new(MarkerScraper),
            session: None,
        }
    }

    pub fn with_scraper(mut self, scraper: Arc<dyn TokenScraper>) -> Self {
        self.scraper = scraper;
        self
    }

    pub fn config(&self) -> &TaraConfig {
        &self.config
    }

    /// Live broker session, if a login is in progress.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn control_code(&self) -> Option<&str> {
        self.session.as_ref()?.control_code.as_deref()
    }

    /// Open a fresh broker session and capture its CSRF token.
    ///
    /// Any previous session is discarded first, whether or not this succeeds.
    pub async fn initialize_session(&mut self) -> TaraResult<&Session> {
        self.session = None;

        let url = &self.config.session_init_url;
        let response = self.transport.get(url).await.map_err(|e| {
            unless_quiet!(self, error, endpoint = %url, error = %e, "Failed to initialize TARA session.");
            TaraError::session("Failed to initialize a TARA session.", Some(Box::new(e)))
        })?;

        if !response.is_success() {
            unless_quiet!(self, error, endpoint = %url, status = response.status, "Failed to initialize TARA session.");
            return Err(TaraError::session(
                "Failed to initialize a TARA session.",
                Some(BoxError::from(format!(
                    "session init answered HTTP {}",
                    response.status
                ))),
            ));
        }

        let Some(csrf) = self.scraper.csrf_token(&response.body) else {
            unless_quiet!(self, error, endpoint = %url, "CSRF token not found in the session init page.");
            return Err(TaraError::session(
                "CSRF token not found in the response body.",
                None,
            ));
        };

        unless_quiet!(self, info, "TARA session initialized successfully.");
        Ok(self.session.insert(Session::new(csrf)))
    }

    /// Start a Smart-ID login for `id_code`.
    ///
    /// Always begins with a fresh session. On success the returned control
    /// code must be shown to the user, then [`wait_for_authentication`]
    /// called.
    ///
    /// [`wait_for_authentication`]: Tara::wait_for_authentication
    pub async fn login_via_smart_id(&mut self, id_code: &IdCode) -> TaraResult<LoginResult> {
        let result = self.submit_id_code(id_code).await;
        if let Err(e) = &result {
            unless_quiet!(
                self,
                error,
                id_code = %id_code.masked(),
                error = %e,
                response_body = e.response_body().unwrap_or_default(),
                "Smart-ID login failed."
            );
            self.session = None;
        }
        result
    }

    async fn submit_id_code(&mut self, id_code: &IdCode) -> TaraResult<LoginResult> {
        let csrf = self
            .initialize_session()
            .await
            .map_err(|e| {
                TaraError::login(
                    "An error occurred during Smart-ID login.",
                    None,
                    Some(Box::new(e)),
                )
            })?
            .captured_csrf
            .clone();

        let body = form_body(&[("_csrf", &csrf), ("idCode", id_code.as_str())]);
        let response = self
            .transport
            .post_form(&self.config.smart_id_init_url(), &body)
            .await
            .map_err(|e| {
                TaraError::login(
                    "An error occurred during Smart-ID login.",
                    None,
                    Some(Box::new(e)),
                )
            })?;

        if !response.is_success() {
            return Err(TaraError::login(
                "An error occurred during Smart-ID login.",
                Some(response.body),
                Some(BoxError::from(format!(
                    "Smart-ID init answered HTTP {}",
                    response.status
                ))),
            ));
        }

        let control_code = self.scraper.control_code(&response.body);
        let new_csrf = self.scraper.csrf_token(&response.body);
        let (Some(control_code), Some(new_csrf)) = (control_code, new_csrf) else {
            return Err(TaraError::login(
                "Could not parse control code or new CSRF token from the login initiation response.",
                Some(response.body),
                None,
            ));
        };

        let Some(session) = self.session.as_mut() else {
            return Err(TaraError::session(
                "Session was dropped during Smart-ID login.",
                None,
            ));
        };
        session.captured_csrf = new_csrf;
        session.control_code = Some(control_code.clone());

        unless_quiet!(self, info, id_code = %id_code.masked(), "Smart-ID login initiated successfully.");
        Ok(LoginResult { control_code })
    }

    /// Poll until the user confirms on their phone, then exchange the
    /// confirmation for a bearer token.
    ///
    /// Runs to completion, failure or timeout; wrap it in a deadline for
    /// earlier cancellation. The session is discarded either way.
    pub async fn wait_for_authentication(&mut self) -> TaraResult<AuthToken> {
        let result = self.poll_until_done().await;
        self.session = None;
        result
    }

    async fn poll_until_done(&self) -> TaraResult<AuthToken> {
        unless_quiet!(self, info, "Starting to poll for authentication completion.");
        let mut machine = PollMachine::new(self.config.max_poll_attempts);

        loop {
            let poll = self.poll_authentication_status().await?;

            match machine.advance(&poll.status) {
                PollStep::Wait => {
                    tracing::debug!(state = ?machine.state(), "Authentication still pending");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                PollStep::Accept => {
                    unless_quiet!(self, info, "Polling status is COMPLETED. Accepting authentication.");
                    return self.accept_authentication().await;
                }
                PollStep::Fail(status) => {
                    unless_quiet!(self, error, %status, "Polling returned an unhandled status.");
                    return Err(TaraError::polling(
                        format!("Received unhandled status '{status}' while polling."),
                        Some(status),
                        None,
                    ));
                }
                PollStep::TimedOut => {
                    unless_quiet!(self, error, attempts = self.config.max_poll_attempts, "Authentication polling timed out.");
                    return Err(TaraError::polling(
                        "Authentication polling timed out.",
                        Some(TIMEOUT_STATUS.to_string()),
                        None,
                    ));
                }
                PollStep::Finished => {
                    return Err(TaraError::polling(
                        "Polling already finished.",
                        None,
                        None,
                    ));
                }
            }
        }
    }

    async fn poll_authentication_status(&self) -> TaraResult<PollResult> {
        let url = self.config.poll_url();
        let polling_failed = |source: BoxError| {
            unless_quiet!(self, error, endpoint = %url, error = %source, "Polling for authentication status failed.");
            TaraError::polling("Polling request failed.", None, Some(source))
        };

        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|e| polling_failed(Box::new(e)))?;

        if !response.is_success() {
            return Err(polling_failed(BoxError::from(format!(
                "poll endpoint answered HTTP {}",
                response.status
            ))));
        }

        serde_json::from_str(&response.body).map_err(|e| polling_failed(Box::new(e)))
    }

    async fn accept_authentication(&self) -> TaraResult<AuthToken> {
        let Some(session) = self.session.as_ref() else {
            return Err(TaraError::session(
                "Cannot accept authentication without a valid session and CSRF token.",
                None,
            ));
        };

        let url = self.config.accept_url();
        let accept_failed = |failure: AcceptFailure, source: Option<BoxError>| {
            unless_quiet!(
                self,
                error,
                endpoint = %url,
                error = source.as_ref().map(ToString::to_string).unwrap_or_default(),
                "{failure}"
            );
            TaraError::broker(failure, source)
        };

        let body = form_body(&[("_csrf", &session.captured_csrf)]);
        let response = self
            .transport
            .post_form(&url, &body)
            .await
            .map_err(|e| accept_failed(AcceptFailure::Request, Some(Box::new(e))))?;

        match response.status {
            429 => return Err(accept_failed(AcceptFailure::RateLimited, None)),
            status if !response.is_success() => {
                return Err(accept_failed(AcceptFailure::UnexpectedStatus(status), None));
            }
            _ => {}
        }

        let Some(final_url) = response.final_url else {
            return Err(accept_failed(AcceptFailure::MissingFinalUrl, None));
        };

        let Some(token) = query_param(&final_url, TOKEN_PARAM) else {
            unless_quiet!(self, error, final_url = %final_url, "Token parameter not found in the final redirect URL.");
            return Err(TaraError::broker(AcceptFailure::MissingToken, None));
        };

        unless_quiet!(self, info, "Authentication accepted successfully and token captured.");
        Ok(AuthToken::new(token))
    }
}
