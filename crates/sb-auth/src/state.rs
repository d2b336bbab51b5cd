//! Typed access to the shared widget state
//!
//! The model is a stringly-keyed store owned by the host; this module pins
//! down the key schema the handshake touches and the commit ordering.

use sb_model::{keys, WidgetModel};
use sb_types::{AppError, AppResult};
use serde_json::Value;
use tracing::debug;

/// Read `login_url`, if set.
pub(crate) fn read_login_url(model: &dyn WidgetModel) -> AppResult<Option<String>> {
    match model.get(keys::LOGIN_URL)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(url)) => Ok(Some(url)),
        Some(other) => Err(AppError::Config(format!(
            "login_url must be a string, got {}",
            other
        ))),
    }
}

/// Read `allowed_origins`, if set.
pub(crate) fn read_allowed_origins(model: &dyn WidgetModel) -> AppResult<Option<Vec<String>>> {
    let value = match model.get(keys::ALLOWED_ORIGINS)? {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let items = value.as_array().ok_or_else(|| {
        AppError::Config("allowed_origins must be an array of strings".to_string())
    })?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                AppError::Config(format!("allowed_origins entry {} is not a string", item))
            })
        })
        .collect::<AppResult<Vec<_>>>()
        .map(Some)
}

/// Commit an accepted token
///
/// Ordering is part of the contract: the token lands before `connected`
/// flips, and persistence is requested last, exactly once.
pub fn commit_token(model: &dyn WidgetModel, token: &str) -> AppResult<()> {
    model.set(keys::TOKEN, Value::String(token.to_string()))?;
    model.set(keys::CONNECTED, Value::Bool(true))?;
    model.save_changes()?;
    debug!("Committed token to widget state");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use sb_model::MemoryModel;
    use serde_json::json;
    use std::sync::Arc;

    /// Model that records the order of every call it receives.
    #[derive(Clone, Default)]
    struct RecordingModel {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingModel {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl WidgetModel for RecordingModel {
        fn get(&self, key: &str) -> AppResult<Option<Value>> {
            self.calls.lock().push(format!("get {}", key));
            Ok(None)
        }

        fn set(&self, key: &str, value: Value) -> AppResult<()> {
            self.calls.lock().push(format!("set {}={}", key, value));
            Ok(())
        }

        fn save_changes(&self) -> AppResult<()> {
            self.calls.lock().push("save_changes".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_commit_orders_token_then_connected_then_save() {
        let model = RecordingModel::default();

        commit_token(&model, "tok123").unwrap();

        assert_eq!(
            model.calls(),
            vec![
                "set token=\"tok123\"".to_string(),
                "set connected=true".to_string(),
                "save_changes".to_string(),
            ]
        );
    }

    #[test]
    fn test_commit_requests_persistence_exactly_once() {
        let model = MemoryModel::new();

        commit_token(&model, "tok123").unwrap();

        assert_eq!(model.save_count(), 1);
        assert_eq!(model.persisted(keys::TOKEN), Some(json!("tok123")));
        assert_eq!(model.persisted(keys::CONNECTED), Some(json!(true)));
    }

    #[test]
    fn test_commit_surfaces_save_failure() {
        let model = MemoryModel::new();
        model.fail_next_save();

        let err = commit_token(&model, "tok123").unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        // Nothing reached persistence
        assert_eq!(model.persisted(keys::TOKEN), None);
        assert_eq!(model.persisted(keys::CONNECTED), None);
    }

    #[test]
    fn test_read_login_url() {
        let model = MemoryModel::new().with_value(keys::LOGIN_URL, json!("https://idp.example/auth"));
        assert_eq!(
            read_login_url(&model).unwrap(),
            Some("https://idp.example/auth".to_string())
        );

        assert_eq!(read_login_url(&MemoryModel::new()).unwrap(), None);
    }

    #[test]
    fn test_read_login_url_rejects_non_string() {
        let model = MemoryModel::new().with_value(keys::LOGIN_URL, json!(42));
        assert!(matches!(
            read_login_url(&model).unwrap_err(),
            AppError::Config(_)
        ));
    }

    #[test]
    fn test_read_allowed_origins() {
        let model = MemoryModel::new()
            .with_value(keys::ALLOWED_ORIGINS, json!(["https://a.test", "https://b.test"]));
        assert_eq!(
            read_allowed_origins(&model).unwrap(),
            Some(vec!["https://a.test".to_string(), "https://b.test".to_string()])
        );

        assert_eq!(read_allowed_origins(&MemoryModel::new()).unwrap(), None);
    }

    #[test]
    fn test_read_allowed_origins_rejects_non_list() {
        let model = MemoryModel::new().with_value(keys::ALLOWED_ORIGINS, json!("https://a.test"));
        assert!(matches!(
            read_allowed_origins(&model).unwrap_err(),
            AppError::Config(_)
        ));

        let model = MemoryModel::new().with_value(keys::ALLOWED_ORIGINS, json!(["https://a.test", 7]));
        assert!(matches!(
            read_allowed_origins(&model).unwrap_err(),
            AppError::Config(_)
        ));
    }
}
