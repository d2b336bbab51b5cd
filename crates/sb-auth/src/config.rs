//! Login configuration read from the widget model
//!
//! Validation happens before any window opens: a widget misconfigured here
//! should fail the click, not open a popup to a blank destination.

use crate::origin::OriginAllowList;
use crate::state;
use sb_model::WidgetModel;
use sb_types::{AppError, AppResult};
use url::Url;

/// Configuration of one login attempt
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Absolute URL of the external login page.
    pub login_url: String,

    /// Origins allowed to post the callback message.
    pub allowed_origins: OriginAllowList,
}

impl LoginConfig {
    /// Read and validate configuration from the model.
    pub fn from_model(model: &dyn WidgetModel) -> AppResult<Self> {
        let login_url = state::read_login_url(model)?
            .ok_or_else(|| AppError::Config("login_url is not set".to_string()))?;
        if login_url.trim().is_empty() {
            return Err(AppError::Config("login_url is empty".to_string()));
        }

        let parsed = Url::parse(&login_url)
            .map_err(|e| AppError::Config(format!("login_url is not an absolute URL: {}", e)))?;
        if parsed.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "login_url {:?} cannot address a login page",
                login_url
            )));
        }

        let raw_origins = state::read_allowed_origins(model)?
            .ok_or_else(|| AppError::Config("allowed_origins is not set".to_string()))?;
        let allowed_origins = OriginAllowList::new(&raw_origins)?;

        Ok(Self {
            login_url,
            allowed_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_model::{keys, MemoryModel};
    use serde_json::json;

    fn configured_model() -> MemoryModel {
        MemoryModel::new()
            .with_value(keys::LOGIN_URL, json!("https://idp.example/auth"))
            .with_value(keys::ALLOWED_ORIGINS, json!(["https://cb.example"]))
    }

    #[test]
    fn test_valid_configuration() {
        let config = LoginConfig::from_model(&configured_model()).unwrap();

        assert_eq!(config.login_url, "https://idp.example/auth");
        assert_eq!(config.allowed_origins.len(), 1);
        assert!(config.allowed_origins.is_allowed("https://cb.example"));
    }

    #[test]
    fn test_missing_login_url() {
        let model =
            MemoryModel::new().with_value(keys::ALLOWED_ORIGINS, json!(["https://cb.example"]));

        let err = LoginConfig::from_model(&model).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("login_url"));
    }

    #[test]
    fn test_empty_login_url() {
        let model = configured_model();
        model.set(keys::LOGIN_URL, json!("")).unwrap();

        assert!(LoginConfig::from_model(&model).is_err());
    }

    #[test]
    fn test_relative_login_url() {
        let model = configured_model();
        model.set(keys::LOGIN_URL, json!("/auth/start")).unwrap();

        let err = LoginConfig::from_model(&model).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_missing_allowed_origins() {
        let model =
            MemoryModel::new().with_value(keys::LOGIN_URL, json!("https://idp.example/auth"));

        let err = LoginConfig::from_model(&model).unwrap_err();
        assert!(err.to_string().contains("allowed_origins"));
    }

    #[test]
    fn test_empty_allowed_origins() {
        let model = configured_model();
        model.set(keys::ALLOWED_ORIGINS, json!([])).unwrap();

        assert!(LoginConfig::from_model(&model).is_err());
    }

    #[test]
    fn test_allowed_origin_with_path_is_rejected() {
        let model = configured_model();
        model
            .set(keys::ALLOWED_ORIGINS, json!(["https://cb.example/callback"]))
            .unwrap();

        assert!(LoginConfig::from_model(&model).is_err());
    }
}
