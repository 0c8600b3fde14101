//! Vector analogies CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (search, solve, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    format_options, handle_config, handle_search, handle_solve, render_card, render_config,
    select_first_option, solve_analogy,
};
