//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod ad;
pub mod user;

pub use ad::{AdRecord, AdRepository};
pub use user::{LockoutState, NewUser, UpdateModeration, UserRecord, UserRepository};
