//! User command - greet the user and print their profile

use super::session::authenticate;
use super::{SessionOptions, error_chain};
use crate::config::AppConfig;

pub async fn handle_user(config: &AppConfig, options: SessionOptions) -> Result<(), String> {
    let authenticated = authenticate(config, options).await?;

    let user = match authenticated.user {
        Some(user) => user,
        None => authenticated
            .client
            .get_user()
            .await
            .map_err(|e| error_chain(&e))?,
    };

    println!("Tere '{}'", user.display_name());
    println!(
        "{}",
        serde_json::to_string_pretty(&user).map_err(|e| e.to_string())?
    );
    Ok(())
}
