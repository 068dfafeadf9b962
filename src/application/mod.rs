//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Vendor call orchestration with token refresh
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing, dispatching, reply formatting

pub mod errors;
pub mod services;
pub mod messaging;
