//! An interpreter session: the user's commands plus the builtin ones, the
//! last error and the read/dispatch loop.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use log::trace;
use typeshell_config::PROMPT;

use crate::autocomplete::{Autocomplete, Completion};
use crate::cmdline::CommandLine;
use crate::command::{Command, CommandRegistry, Parameter};
use crate::error::{DefinitionError, InvokeError};
use crate::invoker::Invoker;
use crate::matcher;
use crate::types::Value;

/// Names of the commands every session provides.
pub const BUILTIN_COMMANDS: &[&str] = &["EOF", "exit", "get_error", "help"];

#[derive(Debug)]
struct SessionState {
    last_error: RefCell<Option<String>>,
    running: Cell<bool>,
}

/// Help text of every command, by name.
type HelpIndex = Rc<RefCell<BTreeMap<String, String>>>;

pub struct Session {
    registry: CommandRegistry,
    state: Rc<SessionState>,
    prompt: String,
}

impl Session {
    /// Builds a session over `commands` and the builtin commands.
    ///
    /// # Errors
    /// [`DefinitionError::DuplicateCommand`] if a user command takes the name
    /// of a builtin one.
    pub fn new(commands: CommandRegistry) -> Result<Self, DefinitionError> {
        let state = Rc::new(SessionState {
            last_error: RefCell::new(None),
            running: Cell::new(true),
        });
        let topics: HelpIndex = Rc::default();

        let registry = CommandRegistry::builder()
            .register_all(commands.commands().cloned())
            .register(help_command(Rc::clone(&topics)))
            .register(get_error_command(Rc::clone(&state)))
            .register(exit_command("exit", Rc::clone(&state)))
            .register(exit_command("EOF", Rc::clone(&state)))
            .build()?;

        topics
            .borrow_mut()
            .extend(registry.commands().map(|cmd| (cmd.name().to_string(), cmd.help())));

        Ok(Self {
            registry,
            state,
            prompt: PROMPT.to_string(),
        })
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// All commands, builtins included.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// False once `exit` or `EOF` ran.
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Report of the error raised by the last line, if it failed.
    pub fn last_error(&self) -> Option<String> {
        self.state.last_error.borrow().clone()
    }

    /// Runs one line. A blank line does nothing.
    ///
    /// A failure is remembered for `get_error` and returned; a success clears
    /// the remembered failure.
    pub fn onecmd(&self, line: &str) -> Result<Value, InvokeError> {
        if line.trim().is_empty() {
            return Ok(Value::Unit);
        }
        trace!("dispatching {line:?}");

        let result = CommandLine::parse(line)
            .map_err(InvokeError::from)
            .and_then(|cmdline| Invoker::new(&self.registry).invoke(&cmdline));

        *self.state.last_error.borrow_mut() = result.as_ref().err().map(|err| report(err));
        result
    }

    /// Completion suggestions for `line` with the cursor at byte `cursor`.
    pub fn complete(&self, line: &str, cursor: usize) -> Vec<Completion> {
        Autocomplete::new(&self.registry).complete(line, cursor)
    }

    /// Reads lines from `reader` and runs them until end of input or until
    /// `exit` runs. Results other than unit and errors are written to
    /// `writer`; errors do not stop the loop.
    pub fn cmdloop<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> io::Result<()> {
        let mut line = String::new();
        while self.is_running() {
            write!(writer, "{}", self.prompt)?;
            writer.flush()?;

            line.clear();
            if reader.read_line(&mut line)? == 0 {
                writeln!(writer)?;
                break;
            }

            match self.onecmd(line.trim_end_matches(['\r', '\n'])) {
                Ok(value) if value.is_unit() => {}
                Ok(value) => writeln!(writer, "{value}")?,
                Err(err) => writeln!(writer, "❌ Error: {err} (try \"get_error\" for details)")?,
            }
        }
        Ok(())
    }
}

/// The error and the chain of its causes, one per line.
fn report(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\n  caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn help_command(topics: HelpIndex) -> Command {
    Command::new("help", move |args| {
        let topic: String = args.get("topic")?;
        let topics = topics.borrow();
        let available = format!(
            "available commands: {}",
            topics.keys().map(String::as_str).collect::<Vec<_>>().join(" ")
        );
        if topic.is_empty() {
            return Ok(Value::Str(available));
        }

        let text = match matcher::choose(&topic, topics.keys().map(String::as_str)) {
            Ok(name) => topics.get(name).cloned().unwrap_or_default(),
            Err(_) => format!("no such command: {topic}\n{available}"),
        };
        Ok(Value::Str(text.trim_end().to_string()))
    })
    .param(Parameter::of::<String>("topic").with_default(""))
    .with_description(
        "Displays a description of given command or lists all available commands.\n\
         In the first case it also shows the parameters, optional ones are\n\
         displayed with question marks.",
    )
}

fn get_error_command(state: Rc<SessionState>) -> Command {
    Command::new("get_error", move |_| {
        let text = state
            .last_error
            .borrow()
            .clone()
            .unwrap_or_else(|| "no errors".to_string());
        Ok(Value::Str(text))
    })
    .with_description("Displays the error raised by the last command.")
}

fn exit_command(name: &str, state: Rc<SessionState>) -> Command {
    Command::new(name, move |_| {
        state.running.set(false);
        Ok(Value::Str("exiting".to_string()))
    })
    .with_description("Terminates the command loop.")
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;
    use crate::error::InputError;

    fn session() -> Session {
        let registry = CommandRegistry::builder()
            .register(
                Command::new("sum", |args| {
                    let first: i64 = args.get("first")?;
                    let second: i64 = args.get("second")?;
                    Ok(Value::Int(i128::from(first + second)))
                })
                .param(Parameter::of::<i64>("first"))
                .param(Parameter::of::<i64>("second"))
                .with_description("Adds two numbers."),
            )
            .register(Command::new("fail", |_| {
                Err(anyhow!("disk on fire")).context("cannot save")
            }))
            .build()
            .unwrap();
        Session::new(registry).unwrap()
    }

    #[test]
    fn test_builtins_registered() {
        let session = session();
        for name in BUILTIN_COMMANDS {
            assert!(session.registry().get(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_builtin_name_clash() {
        let registry = CommandRegistry::builder()
            .register(Command::new("help", |_| Ok(Value::Unit)))
            .build()
            .unwrap();
        assert_eq!(
            Session::new(registry).err(),
            Some(DefinitionError::DuplicateCommand("help".into()))
        );
    }

    #[test]
    fn test_blank_line_is_noop() {
        let session = session();
        assert_eq!(session.onecmd("").unwrap(), Value::Unit);
        assert_eq!(session.onecmd("   ").unwrap(), Value::Unit);
    }

    #[test]
    fn test_last_error_set_and_cleared() {
        let session = session();
        assert_eq!(session.onecmd("get_error").unwrap(), Value::Str("no errors".into()));

        assert!(matches!(
            session.onecmd("sum 1"),
            Err(InvokeError::InvalidInput(InputError::MissingArgument(_)))
        ));
        assert_eq!(
            session.last_error().as_deref(),
            Some("missing value for argument: second")
        );
        assert_eq!(
            session.onecmd("get_error").unwrap(),
            Value::Str("missing value for argument: second".into())
        );
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn test_handler_error_report_has_causes() {
        let session = session();
        assert!(matches!(session.onecmd("fail"), Err(InvokeError::Handler(_))));
        assert_eq!(
            session.last_error().as_deref(),
            Some("cannot save\n  caused by: disk on fire")
        );
    }

    #[test]
    fn test_help() {
        let session = session();
        assert_eq!(
            session.onecmd("help").unwrap(),
            Value::Str("available commands: EOF exit fail get_error help sum".into())
        );
        assert_eq!(
            session.onecmd("help su").unwrap(),
            Value::Str("Adds two numbers.\n\nARGUMENTS: sum first second".into())
        );
        let Value::Str(text) = session.onecmd("help nothing").unwrap() else {
            panic!("help returns text");
        };
        assert!(text.starts_with("no such command: nothing\navailable commands: "));
    }

    #[test]
    fn test_exit_stops_loop() {
        let session = session();
        let mut out = Vec::new();
        session
            .cmdloop("sum 1 2\nbogus\nexit\nsum 3 4\n".as_bytes(), &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "> 3\n> ❌ Error: no such command: bogus (try \"get_error\" for details)\n> exiting\n"
        );
        assert!(!session.is_running());
    }

    #[test]
    fn test_loop_ends_at_eof() {
        let session = session().with_prompt("$ ");
        let mut out = Vec::new();
        session.cmdloop("sum 1 2".as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "$ 3\n$ \n");
        assert!(session.is_running());
    }
}
