//! Runs ripgrep as a child process and turns its `--json` output into
//! per-file results.

pub mod args;
pub mod parser;
pub mod paths;
pub mod ripgrep;

pub use args::{build_args, command_line, Invocation};
pub use parser::ResultCollector;
pub use ripgrep::{assemble, SearchRunner, ToolOutput, DEFAULT_PROGRAM};
