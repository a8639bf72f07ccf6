//! Plateful Core - Shared domain types.
//!
//! This crate provides the domain vocabulary used across all Plateful
//! components:
//! - `marketplace` - The public marketplace web service
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Anything that talks to the outside world lives
//! in the service crates.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, slugs, roles, geographic points, and
//!   the opening-hours model with its availability evaluator

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
