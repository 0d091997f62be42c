//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the user behind a JWT Bearer token.
//! - [`rbac::RequireHosteller`] -- requester-only routes.
//! - [`rbac::RequireDayScholar`] -- fulfiller-only routes.
//! - [`rbac::RequireAuth`] -- any authenticated user.

pub mod auth;
pub mod rbac;
