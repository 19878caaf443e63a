//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the token issuer and the authorization guard.

pub mod ad;
pub mod moderation;
pub mod user;

pub use ad::AdService;
pub use moderation::ModerationService;
pub use user::UserService;
