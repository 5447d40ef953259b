//! Turning a parsed line into a handler call.

use log::trace;

use crate::cmdline::{CommandLine, Slot};
use crate::command::{Arguments, Command, CommandRegistry, Parameter};
use crate::error::{InputError, InvokeError};
use crate::matcher;
use crate::types::{construct, Value};

/// Builds the typed value of `param` from `text`.
///
/// # Errors
/// [`InputError::InvalidArgument`] wrapping the construction failure.
pub fn construct_argument(param: &Parameter, text: &str) -> Result<Value, InputError> {
    construct(&param.ty, text).map_err(|source| InputError::InvalidArgument {
        param: param.name.clone(),
        source,
    })
}

/// Binds the arguments of `cmdline` to `cmd` and constructs their values.
/// Parameters left out take their defaults.
///
/// # Errors
/// Binding errors, [`InputError::MissingArgument`] for a left out parameter
/// without default, or the first construction failure.
pub fn bind_and_construct(cmd: &Command, cmdline: &CommandLine) -> Result<Arguments, InputError> {
    let assignment = cmdline.assign_args(cmd)?;
    let mut args = Arguments::default();

    for param in cmd.params() {
        let value = match assignment.get(&param.name) {
            Some(Slot::Bound(text)) => construct_argument(param, text)?,
            Some(Slot::Missing) | None => param
                .default
                .clone()
                .ok_or_else(|| InputError::MissingArgument(param.name.clone()))?,
        };
        args.push(param.name.clone(), value);
    }

    Ok(args)
}

/// Dispatches lines against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Invoker<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> Invoker<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    /// Resolves the command a possibly abbreviated name refers to.
    pub fn resolve(&self, name: &str) -> Result<&'r Command, InputError> {
        let chosen = matcher::choose(name, self.registry.names())?;
        self.registry
            .get(chosen)
            .ok_or_else(|| InputError::UnknownCommand(name.to_string()))
    }

    /// Runs the command `cmdline` refers to.
    ///
    /// # Errors
    /// [`InvokeError::InvalidInput`] if the line cannot be turned into a call,
    /// in which case no handler ran. [`InvokeError::Handler`] carries the
    /// handler's own error unchanged.
    pub fn invoke(&self, cmdline: &CommandLine) -> Result<Value, InvokeError> {
        let cmd = self.resolve(cmdline.command())?;
        let args = bind_and_construct(cmd, cmdline)?;
        trace!("calling {} with {args:?}", cmd.name());
        cmd.call(&args).map_err(InvokeError::Handler)
    }
}
