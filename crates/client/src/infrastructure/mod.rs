pub mod clock;
pub mod http_client;
pub mod notifier;
pub mod polling;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::SystemClock;
pub use http_client::ApiAdapter;
pub use notifier::{ChannelNotifier, TracingNotifier};
pub use polling::{activate, start_polling, PollHandle, DEFAULT_POLL_INTERVAL};
