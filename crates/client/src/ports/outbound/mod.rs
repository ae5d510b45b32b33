//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with external systems without
//! depending on concrete implementations.

pub mod api_port;
pub mod clock_port;
pub mod notifier_port;
pub mod raw_api_port;

pub use api_port::ApiError;
pub use clock_port::ClockPort;
pub use notifier_port::{Notice, NoticeLevel, NotifierPort};
pub use raw_api_port::RawApiPort;

#[cfg(any(test, feature = "testing"))]
pub use notifier_port::MockNotifierPort;
#[cfg(any(test, feature = "testing"))]
pub use raw_api_port::MockRawApiPort;
