//! Raw API Port - Object-safe HTTP boundary
//!
//! Works in `serde_json::Value` so it can live behind `Arc<dyn RawApiPort>`.
//! The application layer's `Api` wrapper adds typed (de)serialization on top.

use async_trait::async_trait;
use serde_json::Value;

use super::ApiError;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RawApiPort: Send + Sync {
    /// GET `path` (relative to the configured base URL) and return the JSON body
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    /// POST a JSON body to `path` and return the JSON body of the response
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}
