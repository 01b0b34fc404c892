//! Authorization Policy Service
//!
//! [`PolicyClient`] is the seam between the reconciler and the remote
//! policy store. [`ResourceManagerClient`] talks to the Cloud Resource
//! Manager v3 REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::types::{IamError, Policy};
use crate::tools::TokenProvider;

const RESOURCE_MANAGER_API: &str = "https://cloudresourcemanager.googleapis.com/v3";

/// Highest policy schema version we request (keeps conditional bindings intact)
const REQUESTED_POLICY_VERSION: i32 = 3;

/// Get/set access to a resource's IAM policy.
///
/// `resource` is a full resource name such as `projects/my-project`.
#[async_trait]
pub trait PolicyClient: Send + Sync {
    async fn get_policy(&self, resource: &str) -> Result<Policy, IamError>;

    /// Replace the whole policy; returns the stored policy
    async fn set_policy(&self, resource: &str, policy: &Policy) -> Result<Policy, IamError>;
}

/// Cloud Resource Manager REST client
pub struct ResourceManagerClient {
    http_client: Client,
    base_url: String,
    tokens: TokenProvider,
}

impl ResourceManagerClient {
    pub fn new(tokens: TokenProvider) -> Result<Self, IamError> {
        Self::with_base_url(RESOURCE_MANAGER_API, tokens)
    }

    /// Point the client at a different endpoint (tests, private access)
    pub fn with_base_url(base_url: &str, tokens: TokenProvider) -> Result<Self, IamError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    async fn call(&self, resource: &str, method: &str, body: serde_json::Value) -> Result<Policy, IamError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| IamError::AuthenticationFailed(e.to_string()))?;

        let url = format!("{}/{}:{}", self.base_url, resource, method);
        debug!(url = %url, "Calling Resource Manager");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(IamError::Api { status, body });
        }

        Ok(response.json::<Policy>().await?)
    }
}

#[async_trait]
impl PolicyClient for ResourceManagerClient {
    async fn get_policy(&self, resource: &str) -> Result<Policy, IamError> {
        let body = json!({
            "options": { "requestedPolicyVersion": REQUESTED_POLICY_VERSION }
        });
        let policy = self.call(resource, "getIamPolicy", body).await?;
        debug!(resource = %resource, bindings = policy.bindings.len(), "Fetched IAM policy");
        Ok(policy)
    }

    async fn set_policy(&self, resource: &str, policy: &Policy) -> Result<Policy, IamError> {
        let body = json!({ "policy": policy });
        let stored = self.call(resource, "setIamPolicy", body).await?;
        debug!(resource = %resource, bindings = stored.bindings.len(), "Stored IAM policy");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ResourceManagerClient {
        ResourceManagerClient::with_base_url(
            &server.uri(),
            TokenProvider::fixed("test-token"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_policy_parses_bindings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/soc-prod:getIamPolicy"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({"options": {"requestedPolicyVersion": 3}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "version": 1,
                "etag": "BwX=",
                "bindings": [
                    {"role": "roles/aiplatform.user", "members": ["serviceAccount:x@y"]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let policy = client(&server).get_policy("projects/soc-prod").await.unwrap();
        assert!(policy.has_binding("serviceAccount:x@y", "roles/aiplatform.user"));
        assert_eq!(policy.etag.as_deref(), Some("BwX="));
    }

    #[tokio::test]
    async fn test_set_policy_sends_whole_policy() {
        let server = MockServer::start().await;
        let policy = Policy::default().with_binding("roles/aiplatform.viewer", &["serviceAccount:x@y"]);

        Mock::given(method("POST"))
            .and(path("/projects/soc-prod:setIamPolicy"))
            .and(body_json(json!({
                "policy": {
                    "bindings": [
                        {"role": "roles/aiplatform.viewer", "members": ["serviceAccount:x@y"]}
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&policy))
            .expect(1)
            .mount(&server)
            .await;

        let stored = client(&server)
            .set_policy("projects/soc-prod", &policy)
            .await
            .unwrap();
        assert_eq!(stored, policy);
    }

    #[tokio::test]
    async fn test_error_status_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/soc-prod:getIamPolicy"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_policy("projects/soc-prod")
            .await
            .unwrap_err();

        match err {
            IamError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "PERMISSION_DENIED");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_policy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/soc-prod:getIamPolicy"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_policy("projects/soc-prod")
            .await
            .unwrap_err();
        assert!(matches!(err, IamError::MalformedPolicy(_)));
    }
}
