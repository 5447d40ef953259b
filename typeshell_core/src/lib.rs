//! Dispatch core of a typed, line-oriented command interpreter.
//!
//! A raw line goes through [`CommandLine::parse`], the command name is
//! resolved by the [`matcher`], arguments are bound to the command's
//! parameters and constructed into typed [`Value`]s, and finally the
//! command's handler is called by the [`Invoker`]. [`Autocomplete`] reuses the
//! same partial parse to suggest command names, parameter names and values for
//! a line still being edited. [`Session`] ties it together with the builtin
//! `help`, `get_error`, `exit` and `EOF` commands.

pub mod autocomplete;
pub mod cmdline;
pub mod command;
pub mod error;
pub mod invoker;
pub mod matcher;
pub mod session;
pub mod split;
pub mod types;

pub use autocomplete::{Autocomplete, Completion, Suggestion};
pub use cmdline::{Argument, Assignment, CommandLine, IncompleteArgument, Slot};
pub use command::{Arguments, Command, CommandRegistry, Handler, Parameter, RegistryBuilder};
pub use error::{
    ArgumentError, ConstructError, DefinitionError, HandlerError, InputError, InvokeError,
    TokenizeError, ValueError,
};
pub use invoker::{bind_and_construct, construct_argument, Invoker};
pub use session::Session;
pub use types::{
    construct, ArgType, Bytes, CustomType, CustomValue, EnumMember, EnumType, HexBytes, IntoValue,
    Primitive, TypeDescriptor, Value,
};
