//! AgentSpace administration
//!
//! Pre-flight checks and IAM setup for deploying an ADK agent to Vertex AI
//! Agent Engine and registering it with AgentSpace.

pub mod agents;
pub mod tools;

pub use agents::env_config::{format_report, validate, EnvFile, ValidationOutcome};
pub use agents::iam::{agentspace_requirements, IamReconciler, PolicyClient, ResourceManagerClient};
pub use tools::TokenProvider;
