extern crate proc_macro;

mod commandgen;

use proc_macro::TokenStream;
use commandgen::command_impl;

/// Turns a function into a command definition.
///
/// Next to the function, a `<fn>_command()` constructor returning a
/// `typeshell_core::Command` is generated. See the `commandgen` module for
/// the accepted options.
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command_impl(attr, item)
}
