//! HTTP authentication shared by the resolver transport and the HTTP connector
//!
//! Secrets never live in configuration files; only the names of the
//! environment variables holding them do.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Authentication configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Auth type
    #[serde(rename = "type")]
    pub auth_type: AuthType,

    /// Token from environment variable (for bearer and api_key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Username (for basic auth)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password from environment variable (for basic auth)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Header name (for api_key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

/// Authentication type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    None,
    Bearer,
    Basic,
    ApiKey,
}

impl AuthConfig {
    /// Apply authentication to a request
    pub fn apply(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let req = match self.auth_type {
            AuthType::None => req,
            AuthType::Bearer => {
                let token = env_secret(&self.token_env, "token_env")?;
                req.bearer_auth(token)
            }
            AuthType::Basic => {
                let username = self
                    .username
                    .clone()
                    .context("username required for basic auth")?;
                let password = env_secret(&self.password_env, "password_env")?;
                req.basic_auth(username, Some(password))
            }
            AuthType::ApiKey => {
                let header = self
                    .header
                    .clone()
                    .context("header required for api_key auth")?;
                let token = env_secret(&self.token_env, "token_env")?;
                req.header(header, token)
            }
        };

        Ok(req)
    }

    /// Names of fields missing for this auth type
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match self.auth_type {
            AuthType::None => {}
            AuthType::Bearer => {
                if self.token_env.is_none() {
                    missing.push("token_env");
                }
            }
            AuthType::Basic => {
                if self.username.is_none() {
                    missing.push("username");
                }
                if self.password_env.is_none() {
                    missing.push("password_env");
                }
            }
            AuthType::ApiKey => {
                if self.header.is_none() {
                    missing.push("header");
                }
                if self.token_env.is_none() {
                    missing.push("token_env");
                }
            }
        }
        missing
    }
}

/// Apply optional authentication to a request
pub fn apply_auth(
    auth: Option<&AuthConfig>,
    req: reqwest::RequestBuilder,
) -> Result<reqwest::RequestBuilder> {
    match auth {
        Some(auth) => auth.apply(req),
        None => Ok(req),
    }
}

fn env_secret(env_var: &Option<String>, field_name: &str) -> Result<String> {
    let var_name = env_var
        .as_ref()
        .with_context(|| format!("{} required for this auth type", field_name))?;

    std::env::var(var_name).with_context(|| {
        format!(
            "Environment variable {} not set (required for auth)",
            var_name
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields() {
        let auth = AuthConfig {
            auth_type: AuthType::Basic,
            token_env: None,
            username: Some("svc".to_string()),
            password_env: None,
            header: None,
        };
        assert_eq!(auth.missing_fields(), vec!["password_env"]);

        let auth = AuthConfig {
            auth_type: AuthType::None,
            token_env: None,
            username: None,
            password_env: None,
            header: None,
        };
        assert!(auth.missing_fields().is_empty());
    }

    #[test]
    fn test_auth_yaml() {
        let yaml = r#"
type: api_key
header: X-Api-Key
token_env: METAROUTE_TEST_KEY
"#;
        let auth: AuthConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(auth.auth_type, AuthType::ApiKey);
        assert!(auth.missing_fields().is_empty());
    }

    #[test]
    fn test_bearer_requires_env_var() {
        let auth = AuthConfig {
            auth_type: AuthType::Bearer,
            token_env: Some("METAROUTE_TEST_UNSET_TOKEN".to_string()),
            username: None,
            password_env: None,
            header: None,
        };
        let req = reqwest::Client::new().get("http://localhost/");
        let err = auth.apply(req).unwrap_err().to_string();
        assert!(err.contains("METAROUTE_TEST_UNSET_TOKEN"));
    }
}
