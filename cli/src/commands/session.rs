//! Getting an authenticated Tahvel client, from the session cache or a fresh
//! Smart-ID login.

use std::sync::Arc;

use chrono::Utc;
use tunniplaan_api::{TahvelClient, User};
use tunniplaan_shared::{ReqwestTransport, SessionCache};
use tunniplaan_tara::{AuthToken, IdCode, Tara};

use super::{SessionOptions, error_chain};
use crate::config::AppConfig;

pub struct Authenticated {
    pub client: TahvelClient,
    /// Profile already fetched while validating a cached session
    pub user: Option<User>,
}

pub fn new_transport(config: &AppConfig) -> Result<Arc<ReqwestTransport>, String> {
    ReqwestTransport::new(config.transport_config())
        .map(Arc::new)
        .map_err(|e| error_chain(&e))
}

/// Reuse the cached session when asked to and it still works, otherwise log in.
pub async fn authenticate(
    config: &AppConfig,
    options: SessionOptions,
) -> Result<Authenticated, String> {
    // Checked first so a missing ID code fails before any request is made.
    let id_code = config.require_id_code()?;

    if options.reuse_session {
        if let Some(authenticated) = try_cached_session(config).await? {
            return Ok(authenticated);
        }
    }

    let transport = new_transport(config)?;
    let token = smart_id_login(config, options, &transport, &id_code).await?;

    if !options.no_save_session {
        if let Err(e) = save_session(config, &transport, &token) {
            tracing::warn!(error = %e, "Could not save session cache");
        }
    }

    Ok(Authenticated {
        client: TahvelClient::new(transport, token.expose(), config.tahvel_config()),
        user: None,
    })
}

/// Run the Smart-ID handshake, printing the control code for the user.
pub async fn smart_id_login(
    config: &AppConfig,
    options: SessionOptions,
    transport: &Arc<ReqwestTransport>,
    id_code: &IdCode,
) -> Result<AuthToken, String> {
    if !id_code.has_valid_checksum() {
        tracing::warn!(
            id_code = %id_code.masked(),
            "ID code check digit does not match, trying anyway"
        );
    }

    let mut tara = Tara::new(config.tara_config(options.quiet), transport.clone());

    let login = tara
        .login_via_smart_id(id_code)
        .await
        .map_err(|e| error_chain(&e))?;

    println!("Control Code: {}", login.control_code);
    println!("Check your phone and authenticate via the app.");

    tara.wait_for_authentication()
        .await
        .map_err(|e| error_chain(&e))
}

/// Write the token and the cookies of `transport` to the session cache.
pub fn save_session(
    config: &AppConfig,
    transport: &ReqwestTransport,
    token: &AuthToken,
) -> Result<(), String> {
    let cookies = transport.export_cookies(&[
        config.tara_base_url.as_str(),
        config.tahvel_base_url.as_str(),
    ]);
    config
        .session_store()
        .save(&SessionCache::new(token.expose(), cookies))
        .map_err(|e| format!("Failed to save session cache: {}", e))
}

/// A working session from the cache, `None` when there is none or it was
/// rejected. Rejected entries are removed.
async fn try_cached_session(config: &AppConfig) -> Result<Option<Authenticated>, String> {
    let store = config.session_store();
    let cache = match store.load() {
        Ok(Some(cache)) => cache,
        Ok(None) => {
            tracing::debug!(path = %store.path().display(), "No cached session");
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable session cache");
            return Ok(None);
        }
    };

    // Own transport so a rejected session's cookies never reach the login.
    let transport = new_transport(config)?;
    if let Err(e) = transport.import_cookies(&cache.cookies) {
        tracing::warn!(error = %e, "Ignoring session cache with bad cookies");
        return Ok(None);
    }

    let client = TahvelClient::new(transport, cache.bearer_token.clone(), config.tahvel_config());
    match client.get_user().await {
        Ok(user) => {
            tracing::info!(
                age_minutes = cache.age(Utc::now()).num_minutes(),
                "Reusing cached session"
            );
            Ok(Some(Authenticated {
                client,
                user: Some(user),
            }))
        }
        Err(e) => {
            tracing::warn!(error = %error_chain(&e), "Cached session rejected, logging in again");
            if e.is_unauthorized() {
                if let Err(e) = store.clear() {
                    tracing::warn!(error = %e, "Could not remove stale session cache");
                }
            }
            Ok(None)
        }
    }
}
