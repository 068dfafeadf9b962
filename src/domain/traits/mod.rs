//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod vendor;

pub use bot::{Bot, BotInfo};
pub use vendor::{CrisprVendor, TokenSource, VendorResult};
