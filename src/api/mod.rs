//! # API Module
//!
//! HTTP handlers served by the transient callback listener that runs while
//! the user authorizes dwbackup in the browser.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the OAuth redirect (`code`, `state`, `error`),
//!   exchanges the code, writes the credential file and hands the authorized
//!   client back to the waiting driver. Answers `200 Login Completed!`, or
//!   `403 Couldn't get token` when the authorization cannot be completed.
//! - [`health`] - Reports that the listener is up, with the crate version.
//!
//! Both handlers are wired in [`crate::server::router`]; the callback gets its
//! [`crate::session::AuthorizationSession`] through an axum `Extension`.

mod callback;
mod health;

pub use callback::{LOGIN_COMPLETED, TOKEN_FAILED, TOKEN_NOT_SAVED, callback, complete_authorization};
pub use health::health;
