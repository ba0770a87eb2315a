//! Tahvel API client
//!
//! Provides access to the parts of the Tahvel study information system a
//! student needs after logging in:
//! - the user profile (bearer token from the TARA login)
//! - user attributes and the timetable (view token from a personal
//!   timetable link)

mod client;
mod error;
mod models;

pub use client::{TahvelClient, ViewToken};
pub use error::{ApiError, ApiResult};
pub use models::*;

/// Tahvel production backend
pub const DEFAULT_TAHVEL_URL: &str = "https://tahvel.edu.ee/hois_back";

const USER_PATH: &str = "/user";
const USER_ATTRIBUTES_PATH: &str = "/timetableevents/timetableByPerson/userAttributes";
const TIMETABLE_PATH: &str = "/timetableevents/timetableByPerson";

/// Configuration for [`TahvelClient`]
#[derive(Clone, Debug)]
pub struct TahvelConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    pub user_path: String,
    pub user_attributes_path: String,
    pub timetable_path: String,
}

impl TahvelConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_TAHVEL_URL.to_string(),
            user_path: USER_PATH.to_string(),
            user_attributes_path: USER_ATTRIBUTES_PATH.to_string(),
            timetable_path: TIMETABLE_PATH.to_string(),
        }
    }

    /// Set backend base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for TahvelConfig {
    fn default() -> Self {
        Self::new()
    }
}
