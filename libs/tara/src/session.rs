use secrecy::{ExposeSecret, SecretString};

/// Broker session state for one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Latest CSRF token; replaced after the ID-code submission
    pub captured_csrf: String,
    /// Set once by the ID-code submission
    pub control_code: Option<String>,
}

impl Session {
    pub fn new(captured_csrf: impl Into<String>) -> Self {
        Self {
            captured_csrf: captured_csrf.into(),
            control_code: None,
        }
    }
}

/// Result of starting a Smart-ID login, shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    /// Number the user must match in the Smart-ID app
    pub control_code: String,
}

/// Bearer token issued after a completed login. Treat as a credential.
pub struct AuthToken(SecretString);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}
