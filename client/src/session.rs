//! Client-side session state
//!
//! `SessionManager` owns the token, refresh token and cached public
//! profile through a key/value `SessionStore` (the browser-localStorage
//! contract). A session is valid only while the token is decodable, its
//! embedded expiry is in the future, AND the idle gap since the last
//! activity is under the session timeout; any of those failing tears the
//! whole session down.
//!
//! Values are stored verbatim: the token is already a signed public
//! assertion, so obfuscating it buys nothing.

use amlak_shared::types::PublicUser;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

const TOKEN_KEY: &str = "auth_token";
const REFRESH_KEY: &str = "auth_refresh";
const USER_KEY: &str = "auth_user";
const LAST_ACTIVITY_KEY: &str = "auth_last_activity";

/// Idle-session timeout, independent of token expiry
pub fn default_session_timeout() -> Duration {
    Duration::minutes(30)
}

/// Persistent key/value storage for session state
///
/// Implementations must tolerate concurrent access; the in-memory store
/// below is the test double, a real client backs this with whatever the
/// platform offers.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory session store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.lock().unwrap().remove(key);
    }
}

/// Client-side session manager
///
/// Constructed once per client process and passed to whatever issues HTTP
/// calls; there is no ambient global.
pub struct SessionManager<S: SessionStore> {
    store: S,
    session_timeout: Duration,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, default_session_timeout())
    }

    pub fn with_timeout(store: S, session_timeout: Duration) -> Self {
        Self {
            store,
            session_timeout,
        }
    }

    /// Store a token and mark the session active
    pub fn set_token(&self, token: &str) {
        self.store.set(TOKEN_KEY, token);
        self.touch();
    }

    /// Current token, if the session is still valid.
    ///
    /// Calling this may tear the session down as a side effect: an expired
    /// token or an idle timeout clears all stored state and returns None.
    /// A successful read counts as activity (sliding window).
    pub fn token(&self) -> Option<String> {
        let token = self.store.get(TOKEN_KEY)?;

        if token_expired(&token) {
            debug!("stored token expired, clearing session");
            self.clear();
            return None;
        }

        if self.idle_expired() {
            debug!("session idle timeout reached, clearing session");
            self.clear();
            return None;
        }

        self.touch();
        Some(token)
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.store.set(REFRESH_KEY, token);
    }

    /// The refresh token is not gated on the idle window; it is only ever
    /// used for the single refresh attempt after a 401.
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_KEY)
    }

    /// Cache the authenticated user's public profile
    pub fn set_user(&self, user: &PublicUser) {
        match serde_json::to_string(user) {
            Ok(json) => self.store.set(USER_KEY, &json),
            Err(e) => debug!("failed to serialize user profile: {e}"),
        }
    }

    /// Cached profile; an unparseable value tears the session down
    pub fn user(&self) -> Option<PublicUser> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(_) => {
                self.clear();
                None
            }
        }
    }

    /// True iff both a valid token and a cached profile are present
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.user().is_some()
    }

    /// UI-gating convenience only; the server-side guard is authoritative
    pub fn is_admin(&self) -> bool {
        self.user().map_or(false, |u| u.role.is_admin())
    }

    /// Clear all session state unconditionally.
    /// Navigation back to an unauthenticated view is the embedder's job.
    pub fn logout(&self) {
        debug!("logging out, clearing session state");
        self.clear();
    }

    fn touch(&self) {
        self.store
            .set(LAST_ACTIVITY_KEY, &Utc::now().timestamp_millis().to_string());
    }

    fn idle_expired(&self) -> bool {
        let Some(raw) = self.store.get(LAST_ACTIVITY_KEY) else {
            return true;
        };
        let Ok(last_activity) = raw.parse::<i64>() else {
            return true;
        };
        let idle = Utc::now().timestamp_millis() - last_activity;
        idle >= self.session_timeout.num_milliseconds()
    }

    fn clear(&self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(REFRESH_KEY);
        self.store.remove(USER_KEY);
        self.store.remove(LAST_ACTIVITY_KEY);
    }
}

/// Expiry claim from a JWT payload, without signature verification.
/// The client holds no key; only the server can verify. An undecodable
/// token counts as expired.
fn token_expiry_unix(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = Base64UrlUnpadded::decode_vec(payload).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("exp")?.as_i64()
}

fn token_expired(token: &str) -> bool {
    match token_expiry_unix(token) {
        Some(exp) => exp <= Utc::now().timestamp(),
        None => true,
    }
}
