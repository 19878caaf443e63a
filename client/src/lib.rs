//! Amlak Client Library
//!
//! Client-side counterpart of the backend's identity core: holds the token
//! and cached profile between page loads, expires idle sessions locally,
//! and wraps outgoing requests with bearer credentials and a single
//! refresh-on-401 retry.

mod api;
mod session;

pub use api::{ApiClient, ClientError};
pub use session::{MemoryStore, SessionManager, SessionStore};
