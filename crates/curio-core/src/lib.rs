//! Business rules for curio. Every operation takes the acting user as an
//! explicit `Option<UserId>`; `None` is an anonymous caller.

pub mod comments;
pub mod error;
pub mod facets;
pub mod products;
pub mod users;
pub mod validate;
pub mod votes;

pub use error::{CoreError, CoreResult};

#[cfg(test)]
pub(crate) mod testutil;
