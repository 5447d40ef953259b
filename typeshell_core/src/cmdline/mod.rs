//! Parsing of a typed-in line and binding of its arguments to parameters.

use log::warn;

use crate::command::{is_identifier, Command, Parameter};
use crate::error::InputError;
use crate::split::{drop_enclosing_quotes, split_words};

/// One piece of the line after the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// A bare value, bound to the next free parameter.
    Positional(String),
    /// A `name=value` pair.
    Named { name: String, value: String },
}

impl Argument {
    fn named(name: &str, value: &str) -> Self {
        Argument::Named {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// What a parameter received from the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Text bound to the parameter, still unconstructed.
    Bound(String),
    /// Nothing was given for the parameter.
    Missing,
}

/// Result of binding a line's arguments to a command's parameters.
///
/// Entries are kept in the order they were bound, followed by the missing
/// parameters in declared order.
#[derive(Debug, Clone)]
pub struct Assignment<'c> {
    slots: Vec<(&'c Parameter, Slot)>,
}

impl<'c> Assignment<'c> {
    fn is_assigned(&self, name: &str) -> bool {
        self.slots.iter().any(|(param, _)| param.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|(param, _)| param.name == name)
            .map(|(_, slot)| slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'c Parameter, &Slot)> {
        self.slots.iter().map(|(param, slot)| (*param, slot))
    }

    fn first_missing(&self) -> Option<&'c Parameter> {
        self.slots
            .iter()
            .find(|(_, slot)| *slot == Slot::Missing)
            .map(|(param, _)| *param)
    }

    fn last_bound(&self) -> Option<(&'c Parameter, &str)> {
        self.slots.iter().rev().find_map(|(param, slot)| match slot {
            Slot::Bound(text) => Some((*param, text.as_str())),
            Slot::Missing => None,
        })
    }
}

/// The parameter under the cursor and the text typed for it so far.
#[derive(Debug, Clone)]
pub struct IncompleteArgument<'c> {
    pub param: &'c Parameter,
    pub value: String,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    raw: String,
    quoted_words: Vec<String>,
    words: Vec<String>,
    args: Vec<Argument>,
}

impl CommandLine {
    /// Splits `raw` into words and sorts them into the command name and its
    /// arguments. Unterminated quotes are tolerated so that lines still being
    /// edited can be parsed.
    ///
    /// # Errors
    /// [`InputError::DuplicateArgument`] if two `name=value` arguments share
    /// a name.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let quoted_words: Vec<String> = split_words(raw, true)?
            .into_iter()
            .map(str::to_string)
            .collect();
        let words: Vec<String> = quoted_words
            .iter()
            .map(|word| drop_enclosing_quotes(word).to_string())
            .collect();

        let mut args: Vec<Argument> = Vec::new();
        for word in words.iter().skip(1) {
            let arg = match word.split_once('=') {
                Some((name, value)) if is_identifier(name) => {
                    let repeated = args.iter().any(|arg| {
                        matches!(arg, Argument::Named { name: prev, .. } if prev == name)
                    });
                    if repeated {
                        return Err(InputError::DuplicateArgument(name.to_string()));
                    }
                    Argument::named(name, value)
                }
                _ => Argument::Positional(word.clone()),
            };
            args.push(arg);
        }

        Ok(Self {
            raw: raw.to_string(),
            quoted_words,
            words,
            args,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The typed command name; empty for a blank line.
    pub fn command(&self) -> &str {
        self.words.first().map_or("", String::as_str)
    }

    /// All words, quotes removed.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Whether the last word is finished, i.e. the cursor sits after
    /// whitespace that ends it.
    pub fn has_trailing_whitespace(&self) -> bool {
        if self.raw.is_empty() {
            return false;
        }
        match self.quoted_words.last() {
            Some(last) => !self.raw.ends_with(last.as_str()),
            None => true,
        }
    }

    /// Binds the arguments to the parameters of `cmd`.
    ///
    /// Positional arguments fill the first free parameter. A named argument
    /// that matches no parameter is reported and bound as positional
    /// `name=value` text.
    ///
    /// # Errors
    /// - [`InputError::DuplicateArgument`] if a parameter is bound twice.
    /// - [`InputError::TooManyArguments`] if a value is left with no free
    ///   parameter.
    pub fn assign_args<'c>(&self, cmd: &'c Command) -> Result<Assignment<'c>, InputError> {
        let mut assignment = Assignment { slots: Vec::new() };

        for arg in &self.args {
            let (target, text) = match arg {
                Argument::Named { name, value } => {
                    if assignment.is_assigned(name) {
                        return Err(InputError::DuplicateArgument(name.clone()));
                    }
                    match cmd.param_named(name) {
                        Some(param) => (param, value.clone()),
                        None => {
                            warn!("unrecognized argument: {name}");
                            let text = format!("{name}={value}");
                            (first_unassigned(cmd, &assignment, &text)?, text)
                        }
                    }
                }
                Argument::Positional(value) => {
                    (first_unassigned(cmd, &assignment, value)?, value.clone())
                }
            };
            assignment.slots.push((target, Slot::Bound(text)));
        }

        for param in cmd.params() {
            if !assignment.is_assigned(&param.name) {
                assignment.slots.push((param, Slot::Missing));
            }
        }

        Ok(assignment)
    }

    /// Parameters still waiting for a value, in declared order. The parameter
    /// whose value is being typed counts as waiting.
    pub fn unassigned_params<'c>(&self, cmd: &'c Command) -> Result<Vec<&'c Parameter>, InputError> {
        let assignment = self.assign_args(cmd)?;
        let editing = if self.has_trailing_whitespace() {
            None
        } else {
            self.current_arg(cmd)?.map(|arg| arg.param.name.as_str())
        };

        Ok(cmd
            .params()
            .iter()
            .filter(|param| {
                Some(param.name.as_str()) == editing
                    || matches!(assignment.get(&param.name), Some(Slot::Missing))
            })
            .collect())
    }

    /// The parameter the cursor is on.
    ///
    /// After trailing whitespace that is the first missing parameter, with
    /// nothing typed yet. Otherwise it is the parameter bound last, with the
    /// text bound to it. `None` if every parameter is bound and the last word
    /// is finished, or if nothing was bound yet and the cursor is still on the
    /// command name.
    pub fn current_arg<'c>(&self, cmd: &'c Command) -> Result<Option<IncompleteArgument<'c>>, InputError> {
        let assignment = self.assign_args(cmd)?;

        let current = if self.has_trailing_whitespace() {
            assignment.first_missing().map(|param| IncompleteArgument {
                param,
                value: String::new(),
            })
        } else {
            assignment.last_bound().map(|(param, text)| IncompleteArgument {
                param,
                value: text.to_string(),
            })
        };
        Ok(current)
    }
}

fn first_unassigned<'c>(
    cmd: &'c Command,
    assignment: &Assignment<'c>,
    text: &str,
) -> Result<&'c Parameter, InputError> {
    cmd.params()
        .iter()
        .find(|param| !assignment.is_assigned(&param.name))
        .ok_or_else(|| InputError::TooManyArguments(text.to_string()))
}
