//! Client configuration
//!
//! Read from the environment or built explicitly. Missing workspace settings
//! are reported as `ClientError::NotConfigured`, which callers surface as an
//! inconclusive outcome rather than a failure.

use quasar_core::domain::{WorkspaceContext, APP_ID_ENV_VAR};
use quasar_core::{ClientError, Result};

pub const ENV_SUBSCRIPTION_ID: &str = "QUASAR_SUBSCRIPTION_ID";
pub const ENV_RESOURCE_GROUP: &str = "QUASAR_RESOURCE_GROUP";
pub const ENV_WORKSPACE_NAME: &str = "QUASAR_WORKSPACE_NAME";
pub const ENV_LOCATION: &str = "QUASAR_LOCATION";
pub const ENV_ENDPOINT: &str = "QUASAR_ENDPOINT";
pub const ENV_ACCESS_TOKEN: &str = "QUASAR_ACCESS_TOKEN";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub workspace: WorkspaceContext,
    /// Overrides the endpoint derived from the location
    pub endpoint: Option<String>,
    /// Pre-acquired bearer token
    pub access_token: Option<String>,
    /// Caller-supplied application id (validated when the client is built)
    pub app_id: Option<String>,
    /// Environment-level application id
    pub env_app_id: Option<String>,
}

impl ClientConfig {
    pub fn new(workspace: WorkspaceContext) -> Self {
        Self {
            workspace,
            endpoint: None,
            access_token: None,
            app_id: None,
            env_app_id: None,
        }
    }

    /// Load from `QUASAR_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let workspace = WorkspaceContext::new(
            required(ENV_SUBSCRIPTION_ID),
            required(ENV_RESOURCE_GROUP),
            required(ENV_WORKSPACE_NAME),
            required(ENV_LOCATION),
        );

        if !missing.is_empty() {
            return Err(ClientError::NotConfigured(format!(
                "workspace settings missing: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            workspace,
            endpoint: get(ENV_ENDPOINT),
            access_token: get(ENV_ACCESS_TOKEN),
            app_id: None,
            env_app_id: get(APP_ID_ENV_VAR),
        })
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Explicit endpoint, or `https://{location}.quantum.azure.com`
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.quantum.azure.com", self.workspace.location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_complete_environment() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_SUBSCRIPTION_ID, "sub"),
            (ENV_RESOURCE_GROUP, "rg"),
            (ENV_WORKSPACE_NAME, "ws"),
            (ENV_LOCATION, "eastus"),
            (APP_ID_ENV_VAR, "EnvVarAppId"),
        ]))
        .unwrap();

        assert_eq!(config.workspace.name, "ws");
        assert_eq!(config.env_app_id.as_deref(), Some("EnvVarAppId"));
        assert!(config.access_token.is_none());
        assert_eq!(config.endpoint(), "https://eastus.quantum.azure.com");
    }

    #[test]
    fn test_missing_workspace_is_not_configured() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_SUBSCRIPTION_ID, "sub"),
            (ENV_LOCATION, " "),
        ]))
        .unwrap_err();

        assert!(err.is_not_configured());
        let message = err.to_string();
        assert!(message.contains(ENV_RESOURCE_GROUP));
        assert!(message.contains(ENV_WORKSPACE_NAME));
        assert!(message.contains(ENV_LOCATION));
        assert!(!message.contains(ENV_SUBSCRIPTION_ID));
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let config = ClientConfig::new(WorkspaceContext::new("s", "r", "w", "westus"))
            .with_endpoint("http://localhost:8080");
        assert_eq!(config.endpoint(), "http://localhost:8080");
    }
}
