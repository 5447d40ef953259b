use super::{IntoValue, Primitive, TypeDescriptor, Value};
use crate::error::ValueError;

/// A Rust type usable as a command parameter.
///
/// Maps the type to the [`TypeDescriptor`] a parameter of this type accepts
/// and converts the constructed [`Value`] back into the Rust type.
pub trait ArgType: Sized {
    fn descriptor() -> TypeDescriptor;

    fn from_value(value: Value) -> Result<Self, ValueError>;

    /// Default used when the parameter is left out and no explicit default
    /// was declared.
    fn implicit_default() -> Option<Value> {
        None
    }
}

fn mismatch<T>(expected: impl Into<String>, found: &Value) -> Result<T, ValueError> {
    Err(ValueError::Mismatch {
        expected: expected.into(),
        found: found.kind().to_string(),
    })
}

impl ArgType for bool {
    fn descriptor() -> TypeDescriptor {
        Primitive::Bool.into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => mismatch("bool", &other),
        }
    }
}

impl ArgType for char {
    fn descriptor() -> TypeDescriptor {
        Primitive::Char.into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Char(v) => Ok(v),
            other => mismatch("char", &other),
        }
    }
}

impl ArgType for String {
    fn descriptor() -> TypeDescriptor {
        Primitive::Str.into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(v) | Value::Enum(v) => Ok(v),
            other => mismatch("str", &other),
        }
    }
}

/// Raw bytes of ASCII text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl ArgType for Bytes {
    fn descriptor() -> TypeDescriptor {
        Primitive::Bytes.into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(v) => Ok(Bytes(v)),
            other => mismatch("bytes", &other),
        }
    }
}

impl IntoValue for Bytes {
    fn into_value(self) -> Value {
        Value::Bytes(self.0)
    }
}

/// Bytes typed as a hex string, e.g. `AABBF3C6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl ArgType for HexBytes {
    fn descriptor() -> TypeDescriptor {
        Primitive::HexStr.into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(v) => Ok(HexBytes(v)),
            other => mismatch("hexstr", &other),
        }
    }
}

impl IntoValue for HexBytes {
    fn into_value(self) -> Value {
        Value::Bytes(self.0)
    }
}

macro_rules! arg_int {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl ArgType for $ty {
                fn descriptor() -> TypeDescriptor {
                    Primitive::$primitive.into()
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let converted = match &value {
                        Value::Int(v) => <$ty>::try_from(*v).ok(),
                        Value::UInt(v) => <$ty>::try_from(*v).ok(),
                        other => return mismatch(stringify!($ty), other),
                    };
                    converted.ok_or_else(|| ValueError::OutOfRange {
                        value: value.to_string(),
                        target: stringify!($ty),
                    })
                }
            }
        )*
    };
}

arg_int!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, i128 => I128, isize => Isize,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, u128 => U128, usize => Usize,
);

impl ArgType for f64 {
    fn descriptor() -> TypeDescriptor {
        Primitive::F64.into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::UInt(v) => Ok(v as f64),
            other => mismatch("f64", &other),
        }
    }
}

impl ArgType for f32 {
    fn descriptor() -> TypeDescriptor {
        Primitive::F32.into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl<T: ArgType> ArgType for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::descriptor())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => mismatch(Self::descriptor().to_string(), &other),
        }
    }
}

/// An optional parameter: left out, it is `None`.
impl<T: ArgType> ArgType for Option<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Unit => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn implicit_default() -> Option<Value> {
        Some(Value::Unit)
    }
}

macro_rules! arg_tuple {
    ($len:literal: $($name:ident),+) => {
        impl<$($name: ArgType),+> ArgType for ($($name,)+) {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::Tuple(vec![$($name::descriptor()),+])
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Tuple(items) if items.len() == $len => {
                        let mut items = items.into_iter();
                        Ok(($(
                            $name::from_value(items.next().unwrap_or(Value::Unit))?,
                        )+))
                    }
                    other => mismatch(Self::descriptor().to_string(), &other),
                }
            }
        }
    };
}

arg_tuple!(1: A);
arg_tuple!(2: A, B);
arg_tuple!(3: A, B, C);
arg_tuple!(4: A, B, C, D);
