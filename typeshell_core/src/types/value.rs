use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A constructed argument or a handler result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value; handlers without a result return this.
    Unit,
    Bool(bool),
    /// Any signed integer.
    Int(i128),
    /// Any unsigned integer.
    UInt(u128),
    Float(f64),
    Char(char),
    Str(String),
    Bytes(Vec<u8>),
    /// Name of an enum member.
    Enum(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Custom(CustomValue),
}

impl Value {
    /// Short name of the value's shape, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Custom(custom) => custom.type_name(),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: char, items: &[Value], close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "b\"{}\"", v.escape_ascii()),
            Value::Enum(member) => f.write_str(member),
            Value::List(items) => write_seq(f, '[', items, ']'),
            Value::Tuple(items) => write_seq(f, '(', items, ')'),
            Value::Custom(custom) => f.write_str(&custom.repr),
        }
    }
}

/// An instance of a user-defined type, shared behind an `Rc`.
#[derive(Clone)]
pub struct CustomValue {
    type_name: &'static str,
    repr: String,
    inner: Rc<dyn Any>,
}

impl CustomValue {
    /// Wraps `value`; its `Display` output becomes the value's printed form.
    pub fn new<T: Any + fmt::Display>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            repr: value.to_string(),
            inner: Rc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValue")
            .field("type_name", &self.type_name)
            .field("repr", &self.repr)
            .finish()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        (*self.inner).type_id() == (*other.inner).type_id() && self.repr == other.repr
    }
}

/// Conversion of handler results into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Unit
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for char {
    fn into_value(self) -> Value {
        Value::Char(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

macro_rules! into_value_int {
    ($variant:ident, $wide:ty: $($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self as $wide)
                }
            }
        )*
    };
}

into_value_int!(Int, i128: i8, i16, i32, i64, i128, isize);
into_value_int!(UInt, u128: u8, u16, u32, u64, u128, usize);

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Unit, IntoValue::into_value)
    }
}

macro_rules! into_value_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoValue),+> IntoValue for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_value(self) -> Value {
                let ($($name,)+) = self;
                Value::Tuple(vec![$($name.into_value()),+])
            }
        }
    };
}

into_value_tuple!(A);
into_value_tuple!(A, B);
into_value_tuple!(A, B, C);
into_value_tuple!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let value = (vec![1u8, 2], "x", 2.5f64).into_value();
        assert_eq!(value.to_string(), "([1, 2], x, 2.5)");
        assert_eq!(Value::Bytes(b"a\n".to_vec()).to_string(), "b\"a\\n\"");
        assert_eq!(Value::Unit.to_string(), "");
    }

    #[test]
    fn test_custom_value_downcast() {
        let value = CustomValue::new(42u16);
        assert_eq!(value.downcast_ref::<u16>(), Some(&42));
        assert!(value.downcast_ref::<u32>().is_none());
        assert_eq!(Value::Custom(value.clone()), Value::Custom(value));
        assert_ne!(
            Value::Custom(CustomValue::new(42u16)),
            Value::Custom(CustomValue::new(42u32))
        );
    }
}
