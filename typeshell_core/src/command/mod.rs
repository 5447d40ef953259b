//! Command descriptors and the registry holding them.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{ArgumentError, DefinitionError, HandlerError};
use crate::types::{ArgType, IntoValue, TypeDescriptor, Value};

/// Function run when a command is invoked.
pub type Handler = Rc<dyn Fn(&Arguments) -> Result<Value, HandlerError>>;

/// One typed formal argument of a command.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Value used when the parameter receives no text.
    pub default: Option<Value>,
}

impl Parameter {
    /// A required parameter of type `ty`.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// A parameter typed after the Rust type `T`. `Option<T>` parameters
    /// default to `None`.
    pub fn of<T: ArgType>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: T::descriptor(),
            default: T::implicit_default(),
        }
    }

    pub fn with_default(mut self, value: impl IntoValue) -> Self {
        self.default = Some(value.into_value());
        self
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// A named action with typed parameters.
#[derive(Clone)]
pub struct Command {
    name: String,
    params: Vec<Parameter>,
    description: Option<String>,
    handler: Handler,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, HandlerError> + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            description: None,
            handler: Rc::new(handler),
        }
    }

    /// Appends a parameter; parameters bind positionally in the order added.
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn param_named(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|param| param.name == name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// First line of the description.
    pub fn short_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .and_then(|text| text.lines().next())
    }

    /// Description followed by an `ARGUMENTS:` line; optional parameters are
    /// marked with `?`.
    pub fn help(&self) -> String {
        let description = self
            .description
            .as_deref()
            .map(dedent)
            .unwrap_or_else(|| "No details available.".to_string());
        let mut usage = self.name.clone();
        for param in &self.params {
            usage.push(' ');
            usage.push_str(&param.name);
            if param.is_optional() {
                usage.push('?');
            }
        }
        format!("{}\n\nARGUMENTS: {}\n", description.trim(), usage)
    }

    /// Runs the handler with already constructed arguments.
    pub fn call(&self, args: &Arguments) -> Result<Value, HandlerError> {
        (self.handler)(args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Removes the indentation common to all non-blank lines.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_valid_command_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|ch| ch.is_whitespace() || ch == '"' || ch == '\'')
}

/// Whether `name` can be typed as `name=value`.
pub(crate) fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// All known commands, by name.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Command names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Collects commands and validates them into a [`CommandRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    commands: Vec<Command>,
}

impl RegistryBuilder {
    pub fn register(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn register_all(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    /// # Errors
    /// Returns the first [`DefinitionError`] found: a badly named or repeated
    /// command, or a badly named or repeated parameter.
    pub fn build(self) -> Result<CommandRegistry, DefinitionError> {
        let mut commands = BTreeMap::new();
        for command in self.commands {
            if !is_valid_command_name(&command.name) {
                return Err(DefinitionError::InvalidCommandName(command.name));
            }
            for (idx, param) in command.params.iter().enumerate() {
                if !is_identifier(&param.name) {
                    return Err(DefinitionError::InvalidParameterName {
                        command: command.name.clone(),
                        param: param.name.clone(),
                    });
                }
                if command.params[..idx].iter().any(|prev| prev.name == param.name) {
                    return Err(DefinitionError::DuplicateParameter {
                        command: command.name.clone(),
                        param: param.name.clone(),
                    });
                }
            }
            if commands.contains_key(&command.name) {
                return Err(DefinitionError::DuplicateCommand(command.name));
            }
            commands.insert(command.name.clone(), command);
        }
        Ok(CommandRegistry { commands })
    }
}

/// Constructed arguments of one call, in declared parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    pub(crate) fn push(&mut self, name: impl Into<String>, value: Value) {
        self.values.push((name.into(), value));
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Typed access to the argument of parameter `name`.
    pub fn get<T: ArgType>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self
            .value(name)
            .ok_or_else(|| ArgumentError::Missing(name.to_string()))?;
        T::from_value(value.clone()).map_err(|source| ArgumentError::Value {
            name: name.to_string(),
            source,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
