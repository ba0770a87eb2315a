//! Logout command - remove the cached session

use crate::config::AppConfig;

/// Handle the logout command
pub fn handle_logout(config: &AppConfig) -> Result<(), String> {
    let store = config.session_store();
    let removed = store
        .clear()
        .map_err(|e| format!("Failed to remove session cache: {}", e))?;

    if removed {
        println!("Session cache removed: {}", store.path().display());
    } else {
        println!("No cached session.");
    }
    Ok(())
}
