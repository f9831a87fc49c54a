//! # CLI Module
//!
//! Command implementations called from `main`. Each command returns
//! [`crate::Res`]; `main` prints the error and exits when one fails.
//!
//! - [`backup`] - authorize, then copy the source playlist into
//!   `Backup year: <Y> week: <W>`
//! - [`auth`] - authorize only, leaving a valid credential on disk
//!
//! ## Usage
//!
//! ```bash
//! dwbackup                      # same as `dwbackup backup`
//! dwbackup backup --list        # also print the copied tracks
//! dwbackup auth --force --open  # re-run the browser flow
//! ```

mod auth;
mod backup;

pub use auth::auth;
pub use backup::backup;
