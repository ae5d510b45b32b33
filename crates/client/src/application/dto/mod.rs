//! Data transfer objects exchanged with the backend.

pub mod expense_workflow;

pub use expense_workflow::{
    BulkValidateRequest, BulkValidateResponse, ConnectionTestData, ConnectionTestResponse,
    PendingExpensesResponse,
};
