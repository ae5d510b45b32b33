//! Application layer: typed API access, DTOs, errors, view state and services.

pub mod api;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;

pub use error::{EnsureSuccess, Envelope, ServiceError};
pub use state::ValidationView;
