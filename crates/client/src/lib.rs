//! Bursar client - expense validation workflow against the school backend.
//!
//! `application` holds the service and view state, `infrastructure` the
//! reqwest adapter, notifiers and the poll scheduler, `ports` the seams
//! between them.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::services::{ExpenseValidationService, ValidationOutcome};
pub use application::{ServiceError, ValidationView};
pub use config::{ClientConfig, ConfigError};
pub use infrastructure::{activate, start_polling, PollHandle, DEFAULT_POLL_INTERVAL};
