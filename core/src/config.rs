//! Client configuration.
//!
//! Values may be supplied directly or read from `CONTACTHUB_*` environment
//! variables.

use std::time::Duration;

use crate::auth::Auth;
use crate::error::{HubError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.contactlab.it/hub/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a ContactHub client.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// API root, without the `/workspaces/{id}` suffix.
    pub base_url: String,
    pub auth: Auth,
    /// Per-request timeout applied by the transport.
    pub timeout: Duration,
}

impl HubConfig {
    pub fn new(auth: Auth) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration from the process environment.
    ///
    /// `CONTACTHUB_TOKEN`, `CONTACTHUB_WORKSPACE_ID` and `CONTACTHUB_NODE_ID`
    /// are required; `CONTACTHUB_BASE_URL` and `CONTACTHUB_TIMEOUT_SECS` are
    /// optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| HubError::Config(format!("{key} is not set")))
        };

        let auth = Auth::new(
            &required("CONTACTHUB_TOKEN")?,
            &required("CONTACTHUB_WORKSPACE_ID")?,
            &required("CONTACTHUB_NODE_ID")?,
        );
        let mut config = Self::new(auth);

        if let Some(url) = lookup("CONTACTHUB_BASE_URL") {
            config.base_url = url;
        }
        if let Some(secs) = lookup("CONTACTHUB_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                HubError::Config(format!("CONTACTHUB_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_required_and_defaults() {
        let config = HubConfig::from_lookup(lookup(&[
            ("CONTACTHUB_TOKEN", "tok"),
            ("CONTACTHUB_WORKSPACE_ID", "ws-1"),
            ("CONTACTHUB_NODE_ID", "node-1"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.auth.workspace_id, "ws-1");
        assert_eq!(config.auth.node_id, "node-1");
    }

    #[test]
    fn optional_overrides_apply() {
        let config = HubConfig::from_lookup(lookup(&[
            ("CONTACTHUB_TOKEN", "tok"),
            ("CONTACTHUB_WORKSPACE_ID", "ws-1"),
            ("CONTACTHUB_NODE_ID", "node-1"),
            ("CONTACTHUB_BASE_URL", "http://localhost:3000"),
            ("CONTACTHUB_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = HubConfig::from_lookup(lookup(&[
            ("CONTACTHUB_WORKSPACE_ID", "ws-1"),
            ("CONTACTHUB_NODE_ID", "node-1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, HubError::Config(ref m) if m.contains("CONTACTHUB_TOKEN")));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = HubConfig::from_lookup(lookup(&[
            ("CONTACTHUB_TOKEN", "tok"),
            ("CONTACTHUB_WORKSPACE_ID", "ws-1"),
            ("CONTACTHUB_NODE_ID", "node-1"),
            ("CONTACTHUB_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, HubError::Config(_)));
    }
}
