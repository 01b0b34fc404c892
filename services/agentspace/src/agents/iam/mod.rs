//! IAM Reconciliation Agent
//!
//! Grants the Google-managed service agents that AgentSpace relies on the
//! roles they need on the project.
//!
//! ## Service Agents
//!
//! - `aiplatform-re`: Reasoning Engine service agent, queries the RAG corpus
//!   while the agent runs (`roles/aiplatform.user`)
//! - `discoveryengine`: Discovery Engine service account, calls the agent from
//!   AgentSpace (`roles/aiplatform.user`, `roles/aiplatform.viewer`)
//!
//! ## Example Usage
//!
//! ```ignore
//! use agentspace_admin::agents::iam::{agentspace_requirements, IamReconciler, ResourceManagerClient};
//! use agentspace_admin::tools::TokenProvider;
//!
//! let client = ResourceManagerClient::new(TokenProvider::application_default())?;
//! let reconciler = IamReconciler::new(client, "my-project", "123456789");
//! let result = reconciler.reconcile(&agentspace_requirements(), true, false).await;
//! ```

pub mod client;
pub mod reconciler;
pub mod requirements;
pub mod types;

pub use client::{PolicyClient, ResourceManagerClient};
pub use reconciler::{has_binding, IamReconciler};
pub use requirements::{agentspace_requirements, known_service, KNOWN_SERVICES};
pub use types::*;
