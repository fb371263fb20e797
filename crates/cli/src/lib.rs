//! Interactive shell over the JSON key-value store.

pub mod command;
pub mod repl;

pub use command::{parse, Command};
pub use repl::Repl;
