//! Business logic services for the marketplace.
//!
//! # Services
//!
//! - `auth` - Registration, activation links, password login
//! - `email` - Transactional email (activation, approval notices)
//! - `profiles` - Profile updates and geolocation derivation
//! - `vendors` - Vendor onboarding, approval, opening hours, availability

pub mod auth;
pub mod email;
pub mod profiles;
pub mod vendors;
