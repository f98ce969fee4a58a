//! Command-line interface definitions

pub mod handler;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "formexpr", version, about = "Evaluate and inspect ${...} template expressions")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a template and print the result
    Eval {
        /// Template text, e.g. "Hello ${name}"
        template: String,

        /// JSON file whose top-level object is the evaluation context
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Context value as key=value (value parsed as JSON, else taken as a string)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Print the typed result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a template and show its structure without evaluating it
    Check {
        template: String,
    },

    /// List suggestions for a partial expression
    Suggest {
        /// Text typed so far, e.g. "user." or "upper("
        partial: String,

        /// Context JSON file whose keys are registered as variables
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered functions
    Functions,
}
