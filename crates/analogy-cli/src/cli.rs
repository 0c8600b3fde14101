//! CLI argument parsing for `vector-analogies`.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

use analogy_types::SignConvention;

/// Vector Analogies
///
/// Solve analogies over an embedding index: what is to A as B is to C?
#[derive(Parser, Debug)]
#[command(name = "vector-analogies")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/vector-analogies/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the index and list matching items
    Search {
        /// Query text
        text: String,
    },

    /// Resolve an analogy from three query texts
    Solve {
        /// Query for operand A
        #[arg(long = "a")]
        a: String,

        /// Query for operand B
        #[arg(long = "b")]
        b: String,

        /// Query for operand C
        #[arg(long = "c")]
        c: String,

        /// Sign convention: a+b-c or a-b+c
        #[arg(long)]
        convention: Option<SignConvention>,

        /// Override the debounce delay in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve() {
        let cli = Cli::parse_from([
            "vector-analogies",
            "solve",
            "--a",
            "Paris",
            "--b",
            "Italy",
            "--c",
            "France",
            "--convention",
            "a-b+c",
        ]);

        match cli.command {
            Commands::Solve {
                a,
                b,
                c,
                convention,
                debounce_ms,
            } => {
                assert_eq!(a, "Paris");
                assert_eq!(b, "Italy");
                assert_eq!(c, "France");
                assert_eq!(convention, Some(SignConvention::SubtractAdd));
                assert_eq!(debounce_ms, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "vector-analogies",
            "search",
            "Paris",
            "--log-level",
            "debug",
            "--config",
            "/tmp/analogy.toml",
        ]);

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config.as_deref(), Some("/tmp/analogy.toml"));
        assert!(matches!(cli.command, Commands::Search { ref text } if text == "Paris"));
    }

    #[test]
    fn test_rejects_unknown_convention() {
        let result = Cli::try_parse_from([
            "vector-analogies",
            "solve",
            "--a",
            "x",
            "--b",
            "y",
            "--c",
            "z",
            "--convention",
            "a*b",
        ]);
        assert!(result.is_err());
    }
}
