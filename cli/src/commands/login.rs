//! Login command - run the Smart-ID handshake and cache the session

use super::SessionOptions;
use super::session::{new_transport, save_session, smart_id_login};
use crate::config::AppConfig;

/// Handle the login command. Always logs in afresh, ignoring any cache.
pub async fn handle_login(config: &AppConfig, options: SessionOptions) -> Result<(), String> {
    let id_code = config.require_id_code()?;
    let transport = new_transport(config)?;

    let token = smart_id_login(config, options, &transport, &id_code).await?;

    if options.no_save_session {
        println!("Logged in. Session not saved.");
    } else {
        save_session(config, &transport, &token)?;
        println!(
            "Logged in. Session saved to {}",
            config.session_file.display()
        );
    }
    Ok(())
}
