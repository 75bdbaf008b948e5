mod args;
mod commands;

pub use args::{BuildArgs, Cli, Commands};
pub use commands::{handle_build_command, handle_modify_command};
