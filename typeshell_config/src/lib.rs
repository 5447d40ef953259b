#![no_std]

//! Compile-time configuration shared by the interpreter crates.

/// Prompt printed before each line read by the interactive loop.
pub const PROMPT: &str = "> ";

/// Deepest nesting of list/tuple/union type descriptors followed by value
/// construction and completion.
pub const MAX_TYPE_DEPTH: usize = 32;

/// Separator between list and tuple elements.
pub const LIST_SEPARATOR: char = ',';

/// Environment variable holding the `env_logger` filter of the demo binaries.
pub const LOG_ENV: &str = "TYPESHELL_LOG";
