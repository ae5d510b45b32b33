//! Validation capability of the signed-in user

use serde::{Deserialize, Serialize};

/// Capability flag plus display details returned by the backend.
///
/// The connection check answers in camelCase while the pending list embeds
/// snake_case, so both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    #[serde(rename = "canValidate", alias = "can_validate", default)]
    pub can_validate: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_both_spellings() {
        let camel: UserPermissions = serde_json::from_value(json!({
            "canValidate": true,
            "username": "bursar",
            "role": "admin",
        }))
        .unwrap();
        let snake: UserPermissions =
            serde_json::from_value(json!({ "can_validate": true })).unwrap();

        assert!(camel.can_validate);
        assert_eq!(camel.role.as_deref(), Some("admin"));
        assert!(snake.can_validate);
    }

    #[test]
    fn missing_flag_means_denied() {
        let perms: UserPermissions = serde_json::from_value(json!({ "username": "x" })).unwrap();
        assert!(!perms.can_validate);
    }
}
