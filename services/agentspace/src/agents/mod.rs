pub mod agent_engine;
pub mod env_config;
pub mod iam;
