//! Domain primitives for the campus errand service.
//!
//! Everything here is pure: no I/O, no async. The database, event and API
//! crates build on these types.

pub mod error;
pub mod incentive;
pub mod lifecycle;
pub mod notification;
pub mod roles;
pub mod types;
