//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
mod mapper;
pub(crate) mod parsers;
mod types;


pub use cli::TesterArgs;
pub use mapper::build_run_config;
pub use types::{HttpMethod, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
#[cfg(test)]
pub(crate) use defaults::default_charts_path;
pub(crate) use parsers::parse_header;
