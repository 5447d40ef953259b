//! # Command Definition Macro
//!
//! `#[command]` is placed on a plain function. The function is kept as is and
//! a constructor `<fn>_command()` is emitted next to it, returning a
//! `typeshell_core::Command` whose parameters mirror the function's arguments.
//!
//! ## Attribute Options
//!
//! ```text
//! #[command]
//! #[command(name = "<command name>", description = "<help text>")]
//! ```
//!
//! - `name`: command name, defaults to the function name.
//! - `description`: help text, defaults to the function's doc comments.
//!
//! ## Parameters
//!
//! Every argument must be a plain identifier whose type implements
//! `typeshell_core::ArgType`. `#[default(<expr>)]` on an argument makes it
//! optional; the expression must evaluate to the argument's type, which then
//! also needs `typeshell_core::IntoValue`.
//!
//! ## Return Values
//!
//! | Signature          | Handler result                                      |
//! |--------------------|-----------------------------------------------------|
//! | no return type     | `Value::Unit`                                       |
//! | `... -> Result<T, E>` | `T` through `IntoValue`, `E` into `HandlerError` |
//! | `... -> T`         | `T` through `IntoValue`                             |

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    ext::IdentExt, parse_macro_input, Attribute, Error, Expr, ExprLit, FnArg, Ident, ItemFn, Lit,
    LitStr, Meta, MetaNameValue, Pat, Result, ReturnType, Type,
};

/// Options given inside `#[command(...)]`.
#[derive(Default)]
struct CommandArgs {
    name: Option<LitStr>,
    description: Option<LitStr>,
}

impl CommandArgs {
    fn parse_meta(&mut self, meta: syn::meta::ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("description") {
            self.description = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported command option, expected `name` or `description`"))
        }
    }
}

/// One function argument turned into a command parameter.
struct Param {
    ident: Ident,
    name: LitStr,
    ty: Type,
    default: Option<Expr>,
}

pub fn command_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = CommandArgs::default();
    let parser = syn::meta::parser(|meta| args.parse_meta(meta));
    parse_macro_input!(attr with parser);

    let func = parse_macro_input!(item as ItemFn);
    expand(args, func)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand(args: CommandArgs, mut func: ItemFn) -> Result<TokenStream2> {
    if let Some(asyncness) = &func.sig.asyncness {
        return Err(Error::new_spanned(asyncness, "commands cannot be async"));
    }
    if !func.sig.generics.params.is_empty() {
        return Err(Error::new_spanned(&func.sig.generics, "commands cannot be generic"));
    }

    let params = take_params(&mut func)?;
    let fn_ident = &func.sig.ident;
    let ctor_ident = format_ident!("{}_command", fn_ident.unraw());
    let vis = &func.vis;

    let name = args
        .name
        .unwrap_or_else(|| LitStr::new(&fn_ident.unraw().to_string(), fn_ident.span()));
    let description = args
        .description
        .map(|lit| lit.value())
        .or_else(|| doc_text(&func.attrs))
        .map(|text| quote! { .with_description(#text) });

    let param_defs = params.iter().map(|Param { name, ty, default, .. }| {
        let with_default = default.as_ref().map(|expr| {
            quote! { .with_default({ let __default: #ty = #expr; __default }) }
        });
        quote! { .param(::typeshell_core::Parameter::of::<#ty>(#name) #with_default) }
    });

    let bindings = params.iter().map(|Param { ident, name, ty, .. }| {
        quote! { let #ident: #ty = __args.get::<#ty>(#name)?; }
    });

    let idents = params.iter().map(|param| &param.ident);
    let call = quote! { #fn_ident(#(#idents),*) };
    let body = match &func.sig.output {
        ReturnType::Default => quote! {
            #call;
            ::core::result::Result::Ok(::typeshell_core::Value::Unit)
        },
        ReturnType::Type(_, ty) if is_result(ty) => quote! {
            let __value = #call.map_err(::typeshell_core::HandlerError::from)?;
            ::core::result::Result::Ok(::typeshell_core::IntoValue::into_value(__value))
        },
        ReturnType::Type(..) => quote! {
            ::core::result::Result::Ok(::typeshell_core::IntoValue::into_value(#call))
        },
    };

    let ctor_doc = format!("Command definition of [`{fn_ident}`].");
    Ok(quote! {
        #func

        #[doc = #ctor_doc]
        #vis fn #ctor_ident() -> ::typeshell_core::Command {
            ::typeshell_core::Command::new(#name, |__args: &::typeshell_core::Arguments| {
                #(#bindings)*
                #body
            })
            #(#param_defs)*
            #description
        }
    })
}

/// Collects the parameters and strips their `#[default]` attributes from the
/// emitted function.
fn take_params(func: &mut ItemFn) -> Result<Vec<Param>> {
    let mut params = Vec::new();
    for input in &mut func.sig.inputs {
        let arg = match input {
            FnArg::Receiver(receiver) => {
                return Err(Error::new_spanned(receiver, "commands cannot take `self`"));
            }
            FnArg::Typed(arg) => arg,
        };
        let ident = match arg.pat.as_ref() {
            Pat::Ident(pat) => pat.ident.clone(),
            other => {
                return Err(Error::new_spanned(
                    other,
                    "command parameters must be plain identifiers",
                ));
            }
        };

        let mut default = None;
        let mut kept: Vec<Attribute> = Vec::new();
        for attr in arg.attrs.drain(..) {
            if !attr.path().is_ident("default") {
                kept.push(attr);
                continue;
            }
            if default.is_some() {
                return Err(Error::new_spanned(attr, "duplicate `default` attribute"));
            }
            default = Some(attr.parse_args::<Expr>()?);
        }
        arg.attrs = kept;

        params.push(Param {
            name: LitStr::new(&ident.unraw().to_string(), ident.span()),
            ident,
            ty: (*arg.ty).clone(),
            default,
        });
    }
    Ok(params)
}

/// Doc comment lines joined back together, `None` when there are none.
fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(MetaNameValue {
                value: Expr::Lit(ExprLit { lit: Lit::Str(text), .. }),
                ..
            }) => Some(text.value()),
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).to_string())
        .collect();

    let text = lines.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Matches `Result<..>`, `io::Result<..>`, `anyhow::Result<..>` and the like.
fn is_result(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        Type::Group(group) => is_result(&group.elem),
        Type::Paren(paren) => is_result(&paren.elem),
        _ => false,
    }
}
