//! Vector Analogies
//!
//! Resolve "What is to A as B is to C?" over an embedding search service.
//!
//! # Usage
//!
//! ```bash
//! vector-analogies search <TEXT>
//! vector-analogies solve --a <TEXT> --b <TEXT> --c <TEXT> [--convention a+b-c|a-b+c]
//! vector-analogies config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/vector-analogies/config.toml)
//! 3. Environment variables (ANALOGY_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use analogy_cli::{handle_config, handle_search, handle_solve, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { text } => {
            handle_search(cli.config.as_deref(), cli.log_level.as_deref(), &text).await?;
        }
        Commands::Solve {
            a,
            b,
            c,
            convention,
            debounce_ms,
        } => {
            handle_solve(
                cli.config.as_deref(),
                cli.log_level.as_deref(),
                [a.as_str(), b.as_str(), c.as_str()],
                convention,
                debounce_ms,
            )
            .await?;
        }
        Commands::Config => {
            handle_config(cli.config.as_deref(), cli.log_level.as_deref())?;
        }
    }

    Ok(())
}
