//! Shared utilities.
//!
//! - [`email`]: SMTP delivery of password-reset emails

pub mod email;
