mod commands;
mod editor;

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;
use log::{debug, error};
use typeshell_config::{LOG_ENV, PROMPT};
use typeshell_core::Session;

/// Interactive typed command interpreter.
///
/// Without `-c`, lines are read from stdin until `exit` or end of input, with
/// line editing and tab completion when stdin is a terminal.
#[derive(Parser, Debug)]
#[command(name = "typeshell", version, about)]
struct Cli {
    /// Prompt printed before each line
    #[arg(long, default_value = PROMPT)]
    prompt: String,

    /// Run LINE and exit (repeatable, runs in order)
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    commands: Vec<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::new().filter_or(LOG_ENV, log_level(cli.verbose, cli.quiet)),
    )
    .init();

    let session = Rc::new(Session::new(commands::registry()?)?.with_prompt(cli.prompt.as_str()));
    debug!("{} commands registered", session.registry().len());

    if cli.commands.is_empty() {
        if io::stdin().is_terminal() {
            editor::run(session, &cli.prompt)?;
        } else {
            session.cmdloop(io::stdin().lock(), io::stdout())?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    for line in &cli.commands {
        match session.onecmd(line) {
            Ok(value) if value.is_unit() => {}
            Ok(value) => println!("{value}"),
            Err(err) => {
                error!("{line:?} failed");
                eprintln!("❌ Error: {}", session.last_error().unwrap_or_else(|| err.to_string()));
                return Ok(ExitCode::FAILURE);
            }
        }
        if !session.is_running() {
            break;
        }
    }
    Ok(ExitCode::SUCCESS)
}
