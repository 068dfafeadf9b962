//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod guide;
pub mod invocation;
pub mod token;

pub use command::{CommandRequest, Species, Subcommand};
pub use guide::{GuideCandidate, GuideSet, ScoreTier};
pub use invocation::Invocation;
pub use token::AccessToken;
