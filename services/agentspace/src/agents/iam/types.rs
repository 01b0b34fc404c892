//! Types for IAM policy reconciliation
//!
//! `Policy` mirrors the Resource Manager policy document. Fields the
//! reconciler does not interpret (`version`, `etag`, `condition`) are carried
//! through unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single role → members binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
}

impl Binding {
    pub fn new(role: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            role: role.into(),
            members,
            condition: None,
        }
    }

    /// True when no IAM condition restricts the binding
    pub fn is_unconditional(&self) -> bool {
        self.condition.is_none()
    }

    fn grants(&self, member: &str, role: &str) -> bool {
        self.is_unconditional() && self.role == role && self.members.iter().any(|m| m == member)
    }
}

/// Full IAM policy for a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

impl Policy {
    pub fn with_binding(mut self, role: &str, members: &[&str]) -> Self {
        self.bindings.push(Binding::new(
            role,
            members.iter().map(|m| m.to_string()).collect(),
        ));
        self
    }

    /// Exact string match on both role and member.
    ///
    /// Only unconditional bindings count; a conditional grant may not apply.
    pub fn has_binding(&self, member: &str, role: &str) -> bool {
        self.bindings.iter().any(|b| b.grants(member, role))
    }

    /// Add `member` to the unconditional binding for `role`, creating that
    /// binding if needed. Conditional bindings for the role are left alone.
    ///
    /// Returns false when the member already holds the role.
    pub fn grant(&mut self, member: &str, role: &str) -> bool {
        if self.has_binding(member, role) {
            return false;
        }

        match self
            .bindings
            .iter_mut()
            .find(|b| b.role == role && b.is_unconditional())
        {
            Some(binding) => binding.members.push(member.to_string()),
            None => self
                .bindings
                .push(Binding::new(role, vec![member.to_string()])),
        }
        true
    }

    /// Remove `member` from the unconditional binding for `role`; a binding
    /// left with no members is dropped.
    ///
    /// Returns false when the member did not hold the role.
    pub fn revoke(&mut self, member: &str, role: &str) -> bool {
        let Some(index) = self.bindings.iter().position(|b| b.grants(member, role)) else {
            return false;
        };

        let binding = &mut self.bindings[index];
        binding.members.retain(|m| m != member);
        if binding.members.is_empty() {
            self.bindings.remove(index);
        }
        true
    }

    /// Roles held unconditionally by `member`, sorted
    pub fn roles_for(&self, member: &str) -> Vec<String> {
        let mut roles: Vec<String> = self
            .bindings
            .iter()
            .filter(|b| b.grants(member, &b.role))
            .map(|b| b.role.clone())
            .collect();
        roles.sort();
        roles.dedup();
        roles
    }
}

/// A Google-managed service account and a role it should hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub service_account_email: String,
    pub role: String,
}

impl RoleBinding {
    pub fn new(service: &str, project_number: &str, role: &str) -> Self {
        Self {
            service_account_email: service_account_email(service, project_number),
            role: role.to_string(),
        }
    }

    /// Member identifier as it appears in a policy
    pub fn member(&self) -> String {
        service_account_member(&self.service_account_email)
    }
}

/// Service agent email for a Google-managed service.
///
/// Does not check `service` against the known set.
pub fn service_account_email(service: &str, project_number: &str) -> String {
    format!(
        "service-{}@gcp-sa-{}.iam.gserviceaccount.com",
        project_number, service
    )
}

pub fn service_account_member(email: &str) -> String {
    format!("serviceAccount:{}", email)
}

/// Roles a service agent needs, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequirement {
    /// Service identifier, e.g. `aiplatform-re`
    pub service: String,
    pub display_name: String,
    pub roles: Vec<String>,
    pub purpose: String,
}

impl PermissionRequirement {
    /// Label used in reconciliation results: `"<display_name>: <role>"`
    pub fn label(&self, role: &str) -> String {
        format!("{}: {}", self.display_name, role)
    }
}

/// Outcome of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Applied now, or would be applied under dry-run
    pub added: Vec<String>,
    /// Already present, untouched
    pub existing: Vec<String>,
    /// `"<label>: <error>"` for bindings that could not be checked or applied
    pub failed: Vec<String>,
}

impl ReconciliationResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One row of a verification report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStatus {
    pub label: String,
    pub granted: bool,
}

/// Read-only health check of the required bindings, in requirement order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub entries: Vec<PermissionStatus>,
}

impl VerificationReport {
    pub fn all_granted(&self) -> bool {
        self.entries.iter().all(|e| e.granted)
    }

    pub fn get(&self, label: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.granted)
    }

    pub fn missing(&self) -> impl Iterator<Item = &PermissionStatus> {
        self.entries.iter().filter(|e| !e.granted)
    }
}

/// Errors from the authorization policy service
#[derive(Debug, Error)]
pub enum IamError {
    /// Could not obtain credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API answered with a non-success status
    #[error("IAM API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Response could not be read as a policy
    #[error("Malformed policy: {0}")]
    MalformedPolicy(String),
}

impl From<reqwest::Error> for IamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            IamError::MalformedPolicy(err.to_string())
        } else {
            IamError::Request(err.to_string())
        }
    }
}
