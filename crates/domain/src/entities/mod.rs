//! Domain entities - Core business objects with identity

mod expense;

pub use expense::{CategoryRef, PendingExpense, ResponsibleRef};
