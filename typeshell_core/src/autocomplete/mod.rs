//! Completion of partially typed lines.

use log::debug;
use typeshell_config::{LIST_SEPARATOR, MAX_TYPE_DEPTH};

use crate::cmdline::CommandLine;
use crate::command::{Command, CommandRegistry};
use crate::error::{ConstructError, InputError};
use crate::invoker::Invoker;
use crate::matcher::match_string;
use crate::split::split_list;
use crate::types::TypeDescriptor;

/// One suggestion for the text under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Text to insert.
    pub text: String,
    /// Number of characters before the cursor that `text` replaces.
    pub replace_len: usize,
    /// Hint shown next to the suggestion.
    pub display: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>, replace_len: usize) -> Self {
        Self {
            text: text.into(),
            replace_len,
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// What a custom type's completion hook may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Replaces the whole partial value.
    Bare(String),
    /// Used as is.
    Full(Completion),
}

impl From<&str> for Suggestion {
    fn from(text: &str) -> Self {
        Suggestion::Bare(text.to_string())
    }
}

impl From<String> for Suggestion {
    fn from(text: String) -> Self {
        Suggestion::Bare(text)
    }
}

impl From<Completion> for Suggestion {
    fn from(completion: Completion) -> Self {
        Suggestion::Full(completion)
    }
}

/// Context-aware completion of a line being edited.
pub struct Autocomplete<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> Autocomplete<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    /// Suggestions for the text of `line` before byte offset `cursor`.
    ///
    /// On the first word, these are command names. Past it, they are names
    /// of parameters still waiting for a value followed by values for the
    /// parameter under the cursor. Never fails: a line that cannot be
    /// understood gets no suggestions.
    pub fn complete(&self, line: &str, cursor: usize) -> Vec<Completion> {
        let before = line.get(..cursor).unwrap_or(line);
        let typed = before.trim_start();

        if !typed.contains(char::is_whitespace) {
            return self.complete_commands(typed);
        }

        self.complete_arguments(before).unwrap_or_else(|err| {
            debug!("no completions for {before:?}: {err}");
            Vec::new()
        })
    }

    fn complete_commands(&self, typed: &str) -> Vec<Completion> {
        let replace_len = typed.chars().count();
        match_string(typed, self.registry.names())
            .into_iter()
            .filter_map(|name| self.registry.get(name))
            .map(|cmd| {
                let completion = Completion::new(cmd.name(), replace_len);
                match cmd.short_description() {
                    Some(short) => completion.with_display(short),
                    None => completion,
                }
            })
            .collect()
    }

    fn complete_arguments(&self, before: &str) -> Result<Vec<Completion>, InputError> {
        let cmdline = CommandLine::parse(before)?;
        let cmd = Invoker::new(self.registry).resolve(cmdline.command())?;

        let Some(current) = cmdline.current_arg(cmd)? else {
            return Ok(Vec::new());
        };

        let mut completions = complete_params(cmd, &cmdline)?;
        match complete_value(&current.param.ty, &current.value, 0) {
            Ok(values) => completions.extend(values),
            Err(err) => debug!("no value completions for {}: {err}", current.param.name),
        }
        Ok(completions)
    }
}

fn complete_params(cmd: &Command, cmdline: &CommandLine) -> Result<Vec<Completion>, InputError> {
    let partial = if cmdline.has_trailing_whitespace() {
        ""
    } else {
        cmdline.words().last().map_or("", String::as_str)
    };
    let replace_len = partial.chars().count();
    let unassigned = cmdline.unassigned_params(cmd)?;

    Ok(match_string(partial, unassigned.iter().map(|param| param.name.as_str()))
        .into_iter()
        .filter_map(|name| cmd.param_named(name))
        .map(|param| Completion::new(param.name.as_str(), replace_len).with_display(param.ty.to_string()))
        .collect())
}

fn complete_value(
    ty: &TypeDescriptor,
    partial: &str,
    depth: usize,
) -> Result<Vec<Completion>, ConstructError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ConstructError::TooDeep { limit: MAX_TYPE_DEPTH });
    }
    let replace_len = partial.chars().count();

    match ty {
        TypeDescriptor::Primitive(_) => Ok(Vec::new()),

        TypeDescriptor::Enum(enum_ty) => Ok(match_string(
            partial,
            enum_ty.members.iter().map(|member| member.name.as_str()),
        )
        .into_iter()
        .filter_map(|name| enum_ty.find(name))
        .map(|member| Completion::new(member.name.as_str(), replace_len).with_display(member.hint.as_str()))
        .collect()),

        TypeDescriptor::List(elem) => {
            let body = partial.strip_prefix('[').unwrap_or(partial);
            let pieces = split_list(body, LIST_SEPARATOR, true)?;
            let last = pieces.last().copied().unwrap_or("");
            complete_value(elem, last, depth + 1)
        }

        TypeDescriptor::Tuple(elems) => {
            let body = partial.strip_prefix('(').unwrap_or(partial);
            let pieces = split_list(body, LIST_SEPARATOR, true)?;
            match (pieces.last(), elems.get(pieces.len().saturating_sub(1))) {
                (Some(last), Some(elem)) => complete_value(elem, last, depth + 1),
                _ => Ok(Vec::new()),
            }
        }

        TypeDescriptor::Union(alts) => {
            let mut completions = Vec::new();
            for alt in alts {
                match complete_value(alt, partial, depth + 1) {
                    Ok(found) => completions.extend(found),
                    Err(err @ ConstructError::TooDeep { .. }) => return Err(err),
                    Err(err) => debug!("skipping {alt} completions: {err}"),
                }
            }
            Ok(completions)
        }

        TypeDescriptor::Custom(custom) => Ok(custom
            .complete(partial)
            .into_iter()
            .map(|suggestion| match suggestion {
                Suggestion::Bare(text) => Completion::new(text, replace_len),
                Suggestion::Full(completion) => completion,
            })
            .collect()),
    }
}
