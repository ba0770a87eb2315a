//! Smart-ID login against the TARA identity broker
//!
//! The broker speaks server-rendered HTML. A login is a short protocol over one
//! cookie-bound HTTP session:
//!
//! 1. open the relying party's login URL, which redirects to the broker and
//!    yields a CSRF token
//! 2. submit the national ID code; the broker answers with the control code the
//!    user must match on their phone and a fresh CSRF token
//! 3. poll the broker until the user confirms
//! 4. accept the authentication; the redirect chain ends on a URL carrying the
//!    bearer token in its `token` query parameter
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tunniplaan_shared::{ReqwestTransport, TransportConfig};
//! use tunniplaan_tara::{IdCode, Tara, TaraConfig};
//!
//! let transport = Arc::new(ReqwestTransport::new(TransportConfig::default())?);
//! let mut tara = Tara::new(
//!     TaraConfig::new("https://tahvel.edu.ee/hois_back/taraLogin"),
//!     transport,
//! );
//!
//! let id_code: IdCode = "38001010000".parse()?;
//! let login = tara.login_via_smart_id(&id_code).await?;
//! println!("Control Code: {}", login.control_code);
//!
//! let token = tara.wait_for_authentication().await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod handshake;
pub mod id_code;
pub mod poll;
pub mod session;

pub use config::TaraConfig;
pub use error::{AcceptFailure, BoxError, TIMEOUT_STATUS, TaraError, TaraResult};
pub use extract::{MarkerScraper, TokenScraper, extract_between};
pub use handshake::Tara;
pub use id_code::IdCode;
pub use poll::{PollMachine, PollResult, PollState, PollStatus, PollStep};
pub use session::{AuthToken, LoginResult, Session};
