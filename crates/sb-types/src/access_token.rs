//! Typed Salesforce access-token payload
//!
//! The login handshake commits the token to the widget model as an opaque
//! string. Hosts that want to look inside it can parse it into this type,
//! which models the web-server-flow token response including Salesforce's
//! quirks: `scope` may arrive as a space-separated string instead of an
//! array, and `issued_at` is a millisecond timestamp sent as a decimal
//! string.

use crate::errors::AppResult;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Access token issued by the Salesforce web server OAuth flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The session token used for API requests
    pub access_token: String,

    /// Base64-encoded HMAC signature over `id` + `issued_at`
    #[serde(default)]
    pub signature: Option<String>,

    /// Granted scopes (accepts an array or a space-separated string)
    #[serde(default, deserialize_with = "scope_list")]
    pub scope: Vec<String>,

    /// OpenID Connect ID token, when the `openid` scope was granted
    #[serde(default)]
    pub id_token: Option<String>,

    /// Instance URL API calls should be issued against
    pub instance_url: String,

    /// Identity URL of the authenticated user
    pub id: String,

    /// Token type (always "Bearer" in practice)
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Issue time in milliseconds since the epoch (accepts a decimal string)
    #[serde(default, deserialize_with = "millis")]
    pub issued_at: Option<i64>,

    /// Refresh token, when the flow requested one
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Experience Cloud site URL, for site-scoped logins
    #[serde(default)]
    pub sfdc_site_url: Option<String>,

    /// Experience Cloud site ID, for site-scoped logins
    #[serde(default)]
    pub sfdc_site_id: Option<String>,
}

impl AccessToken {
    /// Parse a raw token payload, as committed to the widget model.
    pub fn parse(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Issue time as a UTC timestamp, when the payload carried one.
    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        self.issued_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn scope_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScopeRepr {
        List(Vec<String>),
        Joined(String),
    }

    match ScopeRepr::deserialize(deserializer)? {
        ScopeRepr::List(list) => Ok(list),
        ScopeRepr::Joined(joined) => {
            Ok(joined.split_whitespace().map(str::to_string).collect())
        }
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MillisRepr {
        Number(i64),
        Text(String),
    }

    match Option::<MillisRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(MillisRepr::Number(ms)) => Ok(Some(ms)),
        Some(MillisRepr::Text(text)) => text
            .parse::<i64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid issued_at: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_token_deserialization() {
        let json = r#"{
            "access_token": "00Dxx!session",
            "signature": "c2ln",
            "scope": ["api", "refresh_token"],
            "id_token": "eyJ.token",
            "instance_url": "https://acme.my.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx",
            "token_type": "Bearer",
            "issued_at": "1714380000000",
            "refresh_token": "5Aep.refresh",
            "sfdc_site_url": null,
            "sfdc_site_id": null
        }"#;

        let token = AccessToken::parse(json).unwrap();
        assert_eq!(token.access_token, "00Dxx!session");
        assert_eq!(token.scope, vec!["api", "refresh_token"]);
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.issued_at, Some(1_714_380_000_000));
        assert_eq!(token.refresh_token, Some("5Aep.refresh".to_string()));
    }

    #[test]
    fn test_minimal_token_deserialization() {
        let json = r#"{
            "access_token": "00Dxx!session",
            "instance_url": "https://acme.my.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx"
        }"#;

        let token = AccessToken::parse(json).unwrap();
        assert_eq!(token.access_token, "00Dxx!session");
        assert_eq!(token.token_type, "Bearer"); // default
        assert!(token.scope.is_empty());
        assert_eq!(token.issued_at, None);
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.signature, None);
    }

    #[test]
    fn test_scope_accepts_space_separated_string() {
        let json = r#"{
            "access_token": "t",
            "instance_url": "https://acme.my.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx",
            "scope": "api refresh_token web"
        }"#;

        let token = AccessToken::parse(json).unwrap();
        assert_eq!(token.scope, vec!["api", "refresh_token", "web"]);
    }

    #[test]
    fn test_issued_at_accepts_number() {
        let json = r#"{
            "access_token": "t",
            "instance_url": "https://acme.my.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx",
            "issued_at": 1714380000000
        }"#;

        let token = AccessToken::parse(json).unwrap();
        assert_eq!(token.issued_at, Some(1_714_380_000_000));
    }

    #[test]
    fn test_issued_at_rejects_garbage() {
        let json = r#"{
            "access_token": "t",
            "instance_url": "https://acme.my.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx",
            "issued_at": "not-a-timestamp"
        }"#;

        assert!(AccessToken::parse(json).is_err());
    }

    #[test]
    fn test_issued_at_utc() {
        let json = r#"{
            "access_token": "t",
            "instance_url": "https://acme.my.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx",
            "issued_at": "0"
        }"#;

        let token = AccessToken::parse(json).unwrap();
        let issued = token.issued_at_utc().unwrap();
        assert_eq!(issued.timestamp_millis(), 0);
    }

    #[test]
    fn test_parse_rejects_non_json_token() {
        assert!(AccessToken::parse("not json at all").is_err());
    }
}
