//! Message handling - command parsing and dispatch

pub mod bus;
pub mod parser;
pub mod registry;

pub use bus::CommandBus;
pub use parser::{parse_command, ParsedCommand};
pub use registry::CommandRegistry;
