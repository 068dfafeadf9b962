//! Message handling - Slash command parsing, dispatching and reply formatting

pub mod dispatcher;
pub mod formatter;
pub mod parser;

pub use dispatcher::{CommandDispatcher, DispatchState};
pub use formatter::ResponseFormatter;
pub use parser::CommandParser;
