//! Parameter types: descriptors, typed values and their construction from text.
//!
//! A [`TypeDescriptor`] is a closed tree describing what a parameter accepts.
//! [`construct`] turns the text typed for a parameter into a [`Value`] by
//! walking that tree, and the completion engine walks the same tree to suggest
//! values. Rust types map onto descriptors through [`ArgType`].

mod arg;
mod construct;
mod value;

use std::fmt;
use std::rc::Rc;

pub use arg::{ArgType, Bytes, HexBytes};
pub use construct::construct;
pub use value::{CustomValue, IntoValue, Value};

use crate::autocomplete::Suggestion;
use crate::error::ConstructError;

/// Scalar types parsed directly from a single piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    Str,
    /// ASCII text taken as raw bytes.
    Bytes,
    /// Even-length hex string decoded into bytes (`AABB` => `[0xAA, 0xBB]`).
    HexStr,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
}

impl Primitive {
    /// Type name as shown to the user.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::Str => "str",
            Primitive::Bytes => "bytes",
            Primitive::HexStr => "hexstr",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::I128 => "i128",
            Primitive::Isize => "isize",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::Usize => "usize",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }
}

/// One member of an [`EnumType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Name typed by the user.
    pub name: String,
    /// Shown next to the name when completing.
    pub hint: String,
}

/// A closed set of named members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member with a completion hint.
    pub fn member(mut self, name: impl Into<String>, hint: impl Into<String>) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            hint: hint.into(),
        });
        self
    }

    /// Looks a member up by its exact name.
    pub fn find(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|member| member.name == name)
    }
}

/// A user-defined parameter type with its own parsing and, optionally, its
/// own completion.
pub trait CustomType {
    /// Type name as shown to the user.
    fn name(&self) -> &str;

    /// Builds a value from the text typed for a parameter.
    fn parse(&self, text: &str) -> Result<Value, ConstructError>;

    /// Suggests values for the partially typed `text`.
    fn complete(&self, _text: &str) -> Vec<Suggestion> {
        Vec::new()
    }
}

/// What a parameter accepts.
#[derive(Clone)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Enum(EnumType),
    /// Comma-separated elements, optionally wrapped in `[...]`.
    List(Box<TypeDescriptor>),
    /// Exactly one comma-separated element per type, optionally wrapped in `(...)`.
    Tuple(Vec<TypeDescriptor>),
    /// The first alternative that accepts the text wins.
    Union(Vec<TypeDescriptor>),
    Custom(Rc<dyn CustomType>),
}

impl TypeDescriptor {
    pub fn list(elem: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(elem))
    }

    pub fn custom<T: CustomType + 'static>(ty: T) -> Self {
        TypeDescriptor::Custom(Rc::new(ty))
    }
}

impl From<Primitive> for TypeDescriptor {
    fn from(primitive: Primitive) -> Self {
        TypeDescriptor::Primitive(primitive)
    }
}

impl From<EnumType> for TypeDescriptor {
    fn from(ty: EnumType) -> Self {
        TypeDescriptor::Enum(ty)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(primitive) => f.write_str(primitive.name()),
            TypeDescriptor::Enum(ty) => f.write_str(&ty.name),
            TypeDescriptor::List(elem) => write!(f, "List[{elem}]"),
            TypeDescriptor::Tuple(elems) => {
                f.write_str("Tuple[")?;
                write_joined(f, elems)?;
                f.write_str("]")
            }
            TypeDescriptor::Union(alts) => {
                f.write_str("Union[")?;
                write_joined(f, alts)?;
                f.write_str("]")
            }
            TypeDescriptor::Custom(ty) => f.write_str(ty.name()),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(primitive) => f.debug_tuple("Primitive").field(primitive).finish(),
            TypeDescriptor::Enum(ty) => f.debug_tuple("Enum").field(ty).finish(),
            TypeDescriptor::List(elem) => f.debug_tuple("List").field(elem).finish(),
            TypeDescriptor::Tuple(elems) => f.debug_tuple("Tuple").field(elems).finish(),
            TypeDescriptor::Union(alts) => f.debug_tuple("Union").field(alts).finish(),
            TypeDescriptor::Custom(ty) => f.debug_tuple("Custom").field(&ty.name()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_display_names() {
        let ty = TypeDescriptor::Union(vec![
            TypeDescriptor::list(Primitive::I64.into()),
            TypeDescriptor::Tuple(vec![Primitive::F64.into(), Primitive::Str.into()]),
            EnumType::new("Color").member("Red", "1").into(),
        ]);
        assert_eq!(ty.to_string(), "Union[List[i64], Tuple[f64, str], Color]");
    }

    #[test]
    fn test_enum_find() {
        let ty = EnumType::new("Color").member("Red", "1").member("Green", "2");
        assert_eq!(ty.find("Green").map(|m| m.hint.as_str()), Some("2"));
        assert!(ty.find("green").is_none());
    }
}
