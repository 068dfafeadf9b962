//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration and secret loading
//! - IDT: Vendor token exchange and CRISPR design API client
//! - Adapters: Platform integrations (Slack)

pub mod config;
pub mod idt;
pub mod adapters;
