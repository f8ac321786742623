// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external identity provider.
//!
//! The provider resolves a bearer credential to `(id, role, name)` via
//! `GET /user/me` and answers profile lookups via `GET /user/{id}`. All
//! calls carry a bounded timeout. Failures on the credential-resolution
//! path propagate (callers fail closed); failures on the profile path
//! degrade to `None` (callers substitute a generic label).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use claimflow_config::model::IdentityConfig;
use claimflow_core::{ClaimflowError, Identity, IdentityResolver, Role};

/// Identity provider reached over HTTP.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

/// Profile payload returned by `GET /user/me`.
#[derive(Debug, Deserialize)]
struct UserProfile {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    roles: Vec<RoleEntry>,
}

#[derive(Debug, Deserialize)]
struct RoleEntry {
    name: String,
}

/// Profile payload returned by `GET /user/{id}`.
#[derive(Debug, Deserialize)]
struct NamedProfile {
    #[serde(default)]
    name: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self, ClaimflowError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClaimflowError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClaimflowError {
        if e.is_timeout() {
            ClaimflowError::Timeout {
                duration: self.timeout,
            }
        } else {
            ClaimflowError::Upstream {
                message: "identity provider unreachable".to_string(),
                source: Some(Box::new(e)),
            }
        }
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityProvider {
    async fn resolve(&self, bearer: &str) -> Result<Identity, ClaimflowError> {
        let url = format!("{}/user/me", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClaimflowError::Upstream {
                message: format!("identity provider answered {status}"),
                source: None,
            });
        }

        let profile: UserProfile = response.json().await.map_err(|e| {
            ClaimflowError::Upstream {
                message: "identity provider returned a malformed profile".to_string(),
                source: Some(Box::new(e)),
            }
        })?;

        // An identity without a role cannot be authorized; failing here is
        // the closed outcome.
        let role = profile
            .roles
            .first()
            .map(|r| Role::from_role_name(&r.name))
            .ok_or_else(|| ClaimflowError::Upstream {
                message: "identity provider returned no roles".to_string(),
                source: None,
            })?;

        Ok(Identity {
            user_id: profile.id,
            role,
            name: profile.name,
        })
    }

    async fn lookup_display_name(&self, user_id: &str) -> Option<String> {
        let url = format!("{}/user/{user_id}", self.base_url);
        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "display-name lookup failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                user_id,
                "display-name lookup answered non-success"
            );
            return None;
        }
        match response.json::<NamedProfile>().await {
            Ok(profile) => profile.name,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "display-name payload malformed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, timeout_secs: u64) -> IdentityConfig {
        IdentityConfig {
            base_url: base_url.to_string(),
            timeout_secs,
        }
    }

    #[tokio::test]
    async fn resolve_parses_identity_and_forwards_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-1",
                "name": "Ada",
                "roles": [{"name": "admin"}, {"name": "client"}]
            })))
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(&config(&server.uri(), 5)).unwrap();
        let identity = provider.resolve("tok-1").await.unwrap();
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.name.as_deref(), Some("Ada"));
        // The first role wins.
        assert_eq!(identity.role, Role::Staff);
    }

    #[tokio::test]
    async fn resolve_maps_client_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-2",
                "roles": [{"name": "client"}]
            })))
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(&config(&server.uri(), 5)).unwrap();
        let identity = provider.resolve("tok").await.unwrap();
        assert_eq!(identity.role, Role::Client);
        assert!(identity.name.is_none());
    }

    #[tokio::test]
    async fn resolve_propagates_auth_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(&config(&server.uri(), 5)).unwrap();
        let err = provider.resolve("bad-token").await.unwrap_err();
        assert!(matches!(err, ClaimflowError::Upstream { .. }));
    }

    #[tokio::test]
    async fn resolve_rejects_roleless_identities() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-3",
                "roles": []
            })))
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(&config(&server.uri(), 5)).unwrap();
        let err = provider.resolve("tok").await.unwrap_err();
        assert!(matches!(err, ClaimflowError::Upstream { .. }));
    }

    #[tokio::test]
    async fn display_name_lookup_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/u-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-1",
                "name": "Ada"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/u-404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(&config(&server.uri(), 5)).unwrap();
        assert_eq!(provider.lookup_display_name("u-1").await.as_deref(), Some("Ada"));
        assert!(provider.lookup_display_name("u-404").await.is_none());
    }

    #[tokio::test]
    async fn slow_display_name_lookup_times_out_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/u-slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "u-slow", "name": "Slow"}))
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(&config(&server.uri(), 1)).unwrap();
        assert!(provider.lookup_display_name("u-slow").await.is_none());
    }
}
