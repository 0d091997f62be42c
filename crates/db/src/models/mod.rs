//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs, validated with `validator` where they carry
//!   user-supplied text

pub mod message;
pub mod notification;
pub mod product;
pub mod rating;
pub mod request;
pub mod user;
