//! Agent Engine Listing
//!
//! Lists the reasoning engines (deployed ADK agents) in a project, following
//! page tokens up to a fixed page ceiling.
//!
//! ## Example Usage
//!
//! ```ignore
//! use agentspace_admin::agents::agent_engine::{PageLimits, ReasoningEngineClient};
//! use agentspace_admin::tools::TokenProvider;
//!
//! let client = ReasoningEngineClient::new("my-project", "us-central1", TokenProvider::application_default())?;
//! let paged = client.list(PageLimits::default()).await?;
//! for engine in &paged.items {
//!     println!("{} {}", engine.id(), engine.display_name);
//! }
//! ```

pub mod client;
pub mod pagination;

pub use client::{ReasoningEngine, ReasoningEngineClient};
pub use pagination::{collect_pages, Page, PageLimits, PageSource, Paged};
