use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::AppConfig;

mod login;
mod logout;
mod session;
mod timetable;
mod user;

/// Days shown by `timetable` when `--days` is not given
const DEFAULT_TIMETABLE_DAYS: u32 = 7;

#[derive(Subcommand, PartialEq, Debug)]
pub enum Commands {
    /// Log in with Smart-ID and cache the session
    Login,

    /// Show the logged-in user's profile
    User,

    /// Show the timetable behind a personal timetable link
    Timetable {
        /// Personal timetable link from Tahvel (carries or redirects to a viewAuth token)
        #[arg(long)]
        link: String,

        /// First day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Number of days to show
        #[arg(long, default_value_t = DEFAULT_TIMETABLE_DAYS)]
        days: u32,
    },

    /// Remove the cached session
    Logout,
}

/// Flags that shape how a session is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Suppress the handshake's own log events
    pub quiet: bool,
    /// Try the cached session before logging in
    pub reuse_session: bool,
    /// Do not write the session cache after a login
    pub no_save_session: bool,
}

impl Commands {
    pub async fn run(self, config: AppConfig, options: SessionOptions) -> Result<(), String> {
        match self {
            Commands::Login => login::handle_login(&config, options).await,
            Commands::User => user::handle_user(&config, options).await,
            Commands::Timetable { link, from, days } => {
                timetable::handle_timetable(&config, options, &link, from, days).await
            }
            Commands::Logout => logout::handle_logout(&config),
        }
    }
}

/// Render an error with its `source()` chain, outermost first.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
