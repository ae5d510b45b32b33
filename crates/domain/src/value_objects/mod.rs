//! Value objects - Immutable objects defined by their attributes

mod permissions;
mod stats;
mod validation;

pub use permissions::UserPermissions;
pub use stats::ValidationStats;
pub use validation::{ValidationAction, ValidationDecision};
