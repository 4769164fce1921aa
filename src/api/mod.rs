//! The thin `axum` HTTP surface: routes translate requests into engine and
//! store calls, handlers shape the responses, DTOs keep the wire format
//! distinct from the domain models.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::build_router;
