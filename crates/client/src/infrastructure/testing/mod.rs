//! Test doubles shared by unit tests and downstream crates (`testing` feature)

pub mod fixtures;

pub use fixtures::FakeWorkflowBackend;
