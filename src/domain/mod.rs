//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (CommandRequest, AccessToken, GuideSet)
//! - Traits: Abstractions for infrastructure (Bot, CrisprVendor)

pub mod entities;
pub mod traits;
