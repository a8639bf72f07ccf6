//! Integration tests for Plateful.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p plateful-cli -- migrate
//!
//! # Start the marketplace server
//! cargo run -p plateful-marketplace
//!
//! # Run the integration tests against it
//! cargo test -p plateful-integration-tests -- --ignored
//! ```
//!
//! The tests in `tests/` talk to a running server over HTTP and are marked
//! `#[ignore]` so `cargo test` stays green without one.
