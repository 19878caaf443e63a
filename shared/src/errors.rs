//! Error types for the Amlak application

use thiserror::Error;

/// Authentication and authorization failures
///
/// Every failure is terminal for the request it occurs in. The message a
/// caller sees is the variant's display string; internal causes are logged
/// server-side and never surfaced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately one message for
    /// both so usernames cannot be enumerated.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Lockout window is active; login refused regardless of password.
    #[error("Account is locked, please try again later")]
    AccountLocked,

    /// Banned or deactivated account.
    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    /// Authenticated but not permitted (wrong role or not the owner).
    #[error("Not permitted to perform this action")]
    Forbidden,
}
