//! CLI module: argument parsing into [`crate::config::AppConfig`].

mod clap_parser;

pub use clap_parser::{Cli, Command, InputArgs};
