//! Command-line interface for stylebench.
//!
//! Provides subcommands for dataset fetching, prompt rendering, model
//! inference, consistency scoring, and significance testing.

mod commands;

pub use commands::{
    parse_cli, run, run_with_cli, Cli, Commands, FetchArgs, InferArgs, PromptsArgs, ScoreArgs,
    StatsArgs,
};
