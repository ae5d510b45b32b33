//! Typed API wrapper for application services.
//!
//! `RawApiPort` is object-safe and speaks `serde_json::Value`. `Api` wraps an
//! `Arc<dyn RawApiPort>` and adds the typed request/response conversions the
//! services work with.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::ports::outbound::{ApiError, RawApiPort};

#[derive(Clone)]
pub struct Api {
    raw: Arc<dyn RawApiPort>,
}

impl Api {
    pub fn new(raw: Arc<dyn RawApiPort>) -> Self {
        Self { raw }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.raw.get_json(path).await?;
        serde_json::from_value(value).map_err(|e| ApiError::ParseError(e.to_string()))
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Send + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body_value =
            serde_json::to_value(body).map_err(|e| ApiError::SerializeError(e.to_string()))?;
        let value = self.raw.post_json(path, &body_value).await?;
        serde_json::from_value(value).map_err(|e| ApiError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::MockRawApiPort;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    #[tokio::test]
    async fn get_parses_typed_body() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_json()
            .withf(|path| path == "/ping")
            .returning(|_| Ok(json!({ "ok": true })));

        let api = Api::new(Arc::new(raw));
        let pong: Pong = api.get("/ping").await.unwrap();
        assert_eq!(pong, Pong { ok: true });
    }

    #[tokio::test]
    async fn get_reports_shape_mismatch_as_parse_error() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_json()
            .returning(|_| Ok(json!({ "ok": "not a bool" })));

        let api = Api::new(Arc::new(raw));
        let result: Result<Pong, ApiError> = api.get("/ping").await;
        assert!(matches!(result, Err(ApiError::ParseError(_))));
    }

    #[tokio::test]
    async fn post_sends_serialized_body() {
        let mut raw = MockRawApiPort::new();
        raw.expect_post_json()
            .withf(|path, body| path == "/echo" && body == &json!({ "n": 3 }))
            .returning(|_, _| Ok(json!({ "ok": true })));

        let api = Api::new(Arc::new(raw));
        let pong: Pong = api.post("/echo", &json!({ "n": 3 })).await.unwrap();
        assert!(pong.ok);
    }
}
