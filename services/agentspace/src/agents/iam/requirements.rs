//! AgentSpace service agent requirements

use super::types::PermissionRequirement;

pub const AIPLATFORM_USER: &str = "roles/aiplatform.user";
pub const AIPLATFORM_VIEWER: &str = "roles/aiplatform.viewer";

/// Google-managed service agents the integration depends on
pub const KNOWN_SERVICES: &[(&str, &str)] = &[
    ("aiplatform-re", "AI Platform Reasoning Engine Service Agent"),
    ("discoveryengine", "Discovery Engine Service Account"),
];

/// Display name for a known service identifier
pub fn known_service(service: &str) -> Option<&'static str> {
    KNOWN_SERVICES
        .iter()
        .find(|(id, _)| *id == service)
        .map(|(_, name)| *name)
}

/// Bindings AgentSpace needs, in processing order
pub fn agentspace_requirements() -> Vec<PermissionRequirement> {
    vec![
        PermissionRequirement {
            service: "aiplatform-re".to_string(),
            display_name: "AI Platform Reasoning Engine".to_string(),
            roles: vec![AIPLATFORM_USER.to_string()],
            purpose: "Query RAG corpus during agent execution".to_string(),
        },
        PermissionRequirement {
            service: "discoveryengine".to_string(),
            display_name: "Discovery Engine".to_string(),
            roles: vec![AIPLATFORM_USER.to_string(), AIPLATFORM_VIEWER.to_string()],
            purpose: "Call ADK agent from AgentSpace".to_string(),
        },
    ]
}
