pub mod shell;
pub mod tokenize;
pub mod types;

pub use shell::split_compound_command;
pub use tokenize::tokenize;
pub use types::{CommandLine, Operator};
