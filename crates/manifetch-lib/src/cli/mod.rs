mod args;
mod commands;
mod fetch;
mod params;

pub use args::{Args, Command, parse_args};
pub use commands::resolve_command;
pub use fetch::run_fetch;
pub use params::FetchParams;
