//! Web layer for the transit service.
//!
//! Thin JSON handlers over [`TransitService`](crate::service::TransitService).

mod dto;
mod error;
mod routes;
mod state;

pub use dto::*;
pub use error::AppError;
pub use routes::create_router;
pub use state::{AppState, Transit};
