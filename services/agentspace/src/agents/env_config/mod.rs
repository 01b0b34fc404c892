//! Environment Configuration Agent
//!
//! Catches configuration copied from `.env.example` without being filled in,
//! before any deployment or registration step touches the cloud.
//!
//! ## Components
//!
//! - [`PlaceholderRules`]: exact-match and pattern placeholder table
//! - [`validate`] / [`classify`]: pure checks over an [`EnvSnapshot`]
//! - [`check`]: `validate` plus RAG corpus format and file path checks
//! - [`format_report`]: grouped remediation text for the console
//! - [`EnvFile`]: the local `KEY=value` store
//!
//! ## Example Usage
//!
//! ```ignore
//! use agentspace_admin::agents::env_config::{validate, format_report, EnvFile};
//!
//! let env = EnvFile::new(".env").snapshot()?;
//! let outcome = validate(&["GCP_PROJECT_ID", "SOAR_API_KEY"], &env);
//! if !outcome.all_valid {
//!     eprintln!("{}", format_report(&outcome.findings));
//! }
//! ```

pub mod env_file;
pub mod report;
pub mod rules;
pub mod types;
pub mod validator;

pub use env_file::EnvFile;
pub use report::format_report;
pub use rules::{PlaceholderMatch, PlaceholderRules};
pub use types::{Classification, EnvSnapshot, FindingKind, ValidationFinding, ValidationOutcome};
pub use validator::{
    check, classify, classify_with, validate, validate_path, validate_rag_corpus_id, validate_with,
    AGENTSPACE_REQUIRED_VARS, DEPLOY_REQUIRED_VARS, IAM_REQUIRED_VARS,
};
