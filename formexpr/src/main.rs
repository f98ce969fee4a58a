use anyhow::Result;
use clap::Parser;
use colored::*;

mod cli;

use cli::{Cli, Commands, handler};

fn main() {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(args) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let engine = handler::build_engine(args.config.as_deref())?;

    match args.command {
        Commands::Eval {
            template,
            context,
            set,
            json,
        } => handler::handle_eval(&engine, &template, context.as_deref(), &set, json),
        Commands::Check { template } => handler::handle_check(&engine, &template),
        Commands::Suggest {
            partial,
            context,
            json,
        } => handler::handle_suggest(&engine, &partial, context.as_deref(), json),
        Commands::Functions => handler::handle_functions(&engine),
    }
}
