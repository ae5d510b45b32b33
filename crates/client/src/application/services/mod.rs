//! Application services
//!
//! Services implement the use cases of the validation client. They depend on
//! port traits, not concrete infrastructure implementations.

pub mod expense_validation_service;

pub use expense_validation_service::{
    ExpenseValidationService, ValidationOutcome, BULK_VALIDATE_PATH, CONNECTION_TEST_PATH,
    PENDING_PATH,
};
