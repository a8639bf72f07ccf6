//! Core types for Plateful.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod geo;
pub mod hours;
pub mod id;
pub mod role;
pub mod slug;

pub use email::{Email, EmailError};
pub use geo::{GeoPoint, GeoPointError};
pub use hours::{Availability, OpeningWindow, TimeSlot, TimeSlotError, Weekday, evaluate};
pub use id::*;
pub use role::{Role, dashboard_path};
pub use slug::{Slug, SlugError};
