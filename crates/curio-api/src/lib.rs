pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod facets;
pub mod middleware;
pub mod products;
pub mod routes;
pub mod users;
pub mod votes;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
