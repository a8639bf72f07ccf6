//! Domain models for the marketplace.
//!
//! These types represent validated domain objects separate from database
//! row types.

pub mod session;
pub mod user;
pub mod vendor;

pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserProfile};
pub use vendor::{OpeningHour, Vendor};
