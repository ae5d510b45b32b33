//! Bursar domain - expense validation types and the pure views derived from them.
//!
//! No I/O lives here; the client crate fetches snapshots and feeds them in.

extern crate self as bursar_domain;

pub mod entities;
pub mod error;
pub mod grouping;
pub mod ids;
pub mod value_objects;

pub use entities::{CategoryRef, PendingExpense, ResponsibleRef};
pub use error::DomainError;
pub use grouping::{
    group_by_category, group_by_responsible, total_amount, ExpenseGroup, UNASSIGNED_KEY,
    UNCATEGORIZED_KEY,
};
pub use ids::{CategoryId, ExpenseId, ResponsibleId};
pub use value_objects::{UserPermissions, ValidationAction, ValidationDecision, ValidationStats};
