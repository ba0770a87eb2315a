//! Broker endpoint and polling configuration

use std::time::Duration;

/// TARA production host
pub const DEFAULT_BROKER_URL: &str = "https://tara.ria.ee";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;

const SMART_ID_INIT_PATH: &str = "/auth/sid/init";
const SMART_ID_POLL_PATH: &str = "/auth/sid/poll";
const AUTH_ACCEPT_PATH: &str = "/auth/accept";

/// Configuration for one [`Tara`](crate::Tara) handshake
#[derive(Debug, Clone)]
pub struct TaraConfig {
    /// Relying-party URL that starts a broker session (redirects to the broker)
    pub session_init_url: String,
    /// Broker base URL, without trailing slash
    pub broker_url: String,
    /// Delay between two status polls
    pub poll_interval: Duration,
    /// Poll requests made before giving up
    pub max_poll_attempts: u32,
    /// Suppress the handshake's own log events
    pub quiet: bool,
}

impl TaraConfig {
    pub fn new(session_init_url: impl Into<String>) -> Self {
        Self {
            session_init_url: session_init_url.into(),
            broker_url: DEFAULT_BROKER_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            quiet: true,
        }
    }

    pub fn with_broker_url(mut self, url: impl Into<String>) -> Self {
        self.broker_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// At least one poll is always made.
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts.max(1);
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn smart_id_init_url(&self) -> String {
        format!("{}{}", self.broker_url, SMART_ID_INIT_PATH)
    }

    pub fn poll_url(&self) -> String {
        format!("{}{}", self.broker_url, SMART_ID_POLL_PATH)
    }

    pub fn accept_url(&self) -> String {
        format!("{}{}", self.broker_url, AUTH_ACCEPT_PATH)
    }
}
